use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::devices::camera::{CaptureError, FrameSource};

/// Latest captured frame. Holds at most one frame; a new frame replaces an
/// unconsumed one.
pub type FrameSlot<F> = watch::Receiver<Option<Arc<F>>>;

pub fn slot<F>() -> (watch::Sender<Option<Arc<F>>>, FrameSlot<F>) {
    watch::channel(None)
}

/// Run the blocking read loop on the blocking pool.
///
/// Returns the number of frames produced. Ends when `running` is lowered,
/// when every slot receiver is gone, or with the source's error. The
/// source is released in every case.
pub fn spawn<S: FrameSource>(
    mut source: S,
    slot: watch::Sender<Option<Arc<S::Frame>>>,
    running: Arc<AtomicBool>,
) -> JoinHandle<Result<u64, CaptureError>> {
    tokio::task::spawn_blocking(move || {
        let mut produced = 0_u64;
        let result = loop {
            if !running.load(Ordering::SeqCst) {
                tracing::debug!(produced, "capture: stop requested");
                break Ok(produced);
            }

            match source.next_frame(&running) {
                Ok(frame) => {
                    if slot.send(Some(Arc::new(frame))).is_err() {
                        tracing::debug!(produced, "capture: consumer gone");
                        break Ok(produced);
                    }
                    produced += 1;
                }
                Err(CaptureError::Stopped) => {
                    tracing::debug!(produced, "capture: stopped while waiting");
                    break Ok(produced);
                }
                Err(CaptureError::EndOfStream) => {
                    tracing::info!(produced, "capture: source exhausted");
                    break Err(CaptureError::EndOfStream);
                }
                Err(e) => {
                    tracing::error!(error = %e, produced, "capture: device failure");
                    break Err(e);
                }
            }
        };

        source.release();
        result
    })
}
