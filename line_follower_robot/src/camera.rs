use line_follower::{AcquisitionError, Frame, FrameSource};
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::info;

/// A V4L/OpenCV camera delivering RGB frames.
pub struct OpenCvCamera {
    capture: Option<VideoCapture>,
    width: u32,
    height: u32,
}

impl OpenCvCamera {
    pub fn open(device_index: i32) -> anyhow::Result<Self> {
        let capture = VideoCapture::new(device_index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            anyhow::bail!("could not open video source {device_index}");
        }

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        info!(device_index, width, height, "camera initialized");

        Ok(Self { capture: Some(capture), width, height })
    }

    fn grab(capture: &mut VideoCapture) -> opencv::Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }

        // OpenCV hands out BGR; the pipeline expects RGB.
        let mut rgb = Mat::default();
        imgproc::cvt_color(&frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
        Ok(Some(rgb))
    }
}

impl FrameSource for OpenCvCamera {
    fn read(&mut self) -> Result<Frame, AcquisitionError> {
        let capture = self.capture.as_mut().ok_or(AcquisitionError::NoFrame)?;
        let rgb = match Self::grab(capture) {
            Ok(Some(rgb)) => rgb,
            Ok(None) => return Err(AcquisitionError::NoFrame),
            Err(e) => return Err(AcquisitionError::Device(e.to_string())),
        };

        let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
        let bytes = rgb
            .data_bytes()
            .map_err(|e| AcquisitionError::Device(e.to_string()))?
            .to_vec();
        let actual = bytes.len();
        Frame::from_raw(width, height, bytes).ok_or(AcquisitionError::Malformed { width, height, actual })
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                tracing::warn!(error = %e, "camera release failed");
            }
            info!("camera released");
        }
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        self.release();
    }
}
