// THEORY:
// The `frame` module holds the "dumb" data containers that flow through a
// single tick of the pipeline. A `Frame` is an RGB image owned by the tick
// that captured it; every derived image (grayscale, binary, mask) is built
// from it and dropped with it. Nothing here remembers a previous frame.
//
// The only arithmetic in this module is single-pixel: luma and the
// near-white colour test. Anything that needs a neighbourhood belongs to
// the locator or the intersection detector.

use image::{GrayImage, Rgb, RgbImage};

/// A raw colour frame, channels in R, G, B order.
pub type Frame = RgbImage;
/// Single-channel 8-bit luma.
pub type GrayscaleImage = GrayImage;
/// Per-pixel luma threshold, every pixel is 0 or 255.
pub type BinaryImage = GrayImage;
/// Per-pixel near-white colour test, every pixel is 0 or 255.
pub type Mask = GrayImage;

/// Value written for "white" in binary images and masks.
pub const WHITE: u8 = 255;
/// Value written for "black"/"not white".
pub const BLACK: u8 = 0;

/// Integer pixel coordinates of a blob's center of mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Centroid {
    pub x: u32,
    pub y: u32,
}

impl Centroid {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Luminance estimate (Rec. 601 luma), rounded to the nearest byte.
#[inline]
pub fn luma(pixel: &Rgb<u8>) -> u8 {
    let [red, green, blue] = pixel.0;
    let luminance = 0.299_f64 * red as f64 + 0.587_f64 * green as f64 + 0.114_f64 * blue as f64;
    luminance.round().clamp(0.0, 255.0) as u8
}

/// True when every channel lies in `[low, high]`.
#[inline]
pub fn in_color_band(pixel: &Rgb<u8>, low: u8, high: u8) -> bool {
    pixel.0.iter().all(|&channel| channel >= low && channel <= high)
}
