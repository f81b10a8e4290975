//! Camera-side collaborators: a blocking frame source and the face/eye
//! geometry extractor that turns a frame into a [`DetectionFrame`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::constants::CAPTURE_STOP_POLL_MS;
use crate::tracking::types::DetectionFrame;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    Unavailable(String),
    #[error("frame read failed: {0}")]
    Read(String),
    #[error("frame source exhausted")]
    EndOfStream,
    #[error("capture stopped while waiting for a frame")]
    Stopped,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DetectError {
    #[error("detector failed: {0}")]
    Failed(String),
    #[error("face landmark set has {found} points, expected {expected}")]
    LandmarkCount { found: usize, expected: usize },
}

/// Blocking frame producer. Runs on the blocking pool; any error ends capture.
pub trait FrameSource: Send + 'static {
    type Frame: Send + Sync + 'static;

    /// Block until the next frame. `running` is lowered when capture should
    /// stop; a source that waits between frames returns
    /// [`CaptureError::Stopped`] once it sees that.
    fn next_frame(&mut self, running: &AtomicBool) -> Result<Self::Frame, CaptureError>;

    /// Release the underlying device. Called once when capture stops.
    fn release(&mut self) {}
}

/// Face and eye geometry extraction for one frame.
pub trait EyeDetector<F>: Send + Sync + 'static {
    fn detect(&self, frame: &F) -> Result<DetectionFrame, DetectError>;
}

/// Sleep until `due` in short slices, giving up early once `running` drops.
pub fn wait_until(due: Instant, running: &AtomicBool) -> Result<(), CaptureError> {
    let slice = Duration::from_millis(CAPTURE_STOP_POLL_MS);
    loop {
        if !running.load(Ordering::SeqCst) {
            return Err(CaptureError::Stopped);
        }
        let now = Instant::now();
        if now >= due {
            return Ok(());
        }
        std::thread::sleep((due - now).min(slice));
    }
}
