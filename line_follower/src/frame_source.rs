//! The camera side of the loop.

use crate::core_modules::frame::Frame;
use crate::error::AcquisitionError;

/// Yields raw colour frames on demand.
///
/// Implementations are opened by their own constructor (an open failure is an
/// initialization error, not an `AcquisitionError`) and are owned by the
/// control loop for its whole lifetime.
pub trait FrameSource {
    /// Blocks until the next frame is available or acquisition fails.
    fn read(&mut self) -> Result<Frame, AcquisitionError>;

    /// Resolved frame width and height, reported when the source is opened.
    fn dimensions(&self) -> (u32, u32);

    /// Releases the underlying device. Calling it again is a no-op.
    fn release(&mut self);
}
