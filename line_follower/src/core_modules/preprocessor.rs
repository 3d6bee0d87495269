// THEORY:
// The preprocessor turns one raw frame into the three single-channel views the
// rest of the tick consumes:
// 1.  **Grayscale**: Rec. 601 luma of every pixel.
// 2.  **Binary**: a fixed, non-adaptive cut on the luma. The intersection
//     detector reads this view.
// 3.  **Mask**: a colour-space test that keeps only pixels whose three channels
//     are all near white. Saturated colours can be bright in luma without
//     being white paint, so the line locator reads the mask, not the binary.
//
// It is a pure function of its input. An all-black frame simply yields
// all-black outputs.

use crate::core_modules::frame::{
    BinaryImage, Frame, GrayscaleImage, Mask, BLACK, WHITE, in_color_band, luma,
};
use image::GrayImage;

/// Luma at or above this value is white in the binary view.
pub const BINARY_THRESHOLD: u8 = 128;
/// Lower bound, per channel, of the near-white colour band used by the mask.
pub const MASK_CHANNEL_LOW: u8 = 200;
/// Upper bound, per channel, of the near-white colour band used by the mask.
pub const MASK_CHANNEL_HIGH: u8 = 255;

/// The three per-frame views derived from a raw frame.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub gray: GrayscaleImage,
    pub binary: BinaryImage,
    pub mask: Mask,
}

/// Builds the grayscale, binary and mask views in one pass over the frame.
pub fn preprocess(frame: &Frame) -> Preprocessed {
    let (width, height) = frame.dimensions();
    let mut gray = GrayImage::new(width, height);
    let mut binary = GrayImage::new(width, height);
    let mut mask = GrayImage::new(width, height);

    for (x, y, pixel) in frame.enumerate_pixels() {
        let luminance = luma(pixel);
        gray.put_pixel(x, y, image::Luma([luminance]));
        binary.put_pixel(x, y, image::Luma([threshold(luminance)]));

        let white = in_color_band(pixel, MASK_CHANNEL_LOW, MASK_CHANNEL_HIGH);
        mask.put_pixel(x, y, image::Luma([if white { WHITE } else { BLACK }]));
    }

    Preprocessed { gray, binary, mask }
}

#[inline]
fn threshold(luminance: u8) -> u8 {
    if luminance >= BINARY_THRESHOLD { WHITE } else { BLACK }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn all_black_frame_yields_black_views() {
        let frame = Frame::new(8, 6);
        let out = preprocess(&frame);

        assert_eq!(out.gray.dimensions(), (8, 6));
        assert!(out.gray.pixels().all(|p| p.0[0] == 0));
        assert!(out.binary.pixels().all(|p| p.0[0] == BLACK));
        assert!(out.mask.pixels().all(|p| p.0[0] == BLACK));
    }

    #[test]
    fn binary_cut_is_inclusive() {
        let mut frame = Frame::new(3, 1);
        frame.put_pixel(0, 0, Rgb([127, 127, 127]));
        frame.put_pixel(1, 0, Rgb([128, 128, 128]));
        frame.put_pixel(2, 0, Rgb([129, 129, 129]));
        let out = preprocess(&frame);

        assert_eq!(out.binary.get_pixel(0, 0).0[0], BLACK);
        assert_eq!(out.binary.get_pixel(1, 0).0[0], WHITE);
        assert_eq!(out.binary.get_pixel(2, 0).0[0], WHITE);
    }

    #[test]
    fn bright_colored_pixel_is_binary_white_but_not_mask_white() {
        // Luma of pure yellow is ~226, well above the cut, but blue is 0.
        let mut frame = Frame::new(2, 1);
        frame.put_pixel(0, 0, Rgb([255, 255, 0]));
        frame.put_pixel(1, 0, Rgb([210, 220, 230]));
        let out = preprocess(&frame);

        assert_eq!(out.binary.get_pixel(0, 0).0[0], WHITE);
        assert_eq!(out.mask.get_pixel(0, 0).0[0], BLACK);
        assert_eq!(out.mask.get_pixel(1, 0).0[0], WHITE);
    }
}
