use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, watch, Mutex};

use crate::devices::camera::{DetectError, EyeDetector};
use crate::devices::pointer::{apply_action, PointingDevice};
use crate::tracking::actions::PointerAction;
use crate::tracking::session::{FrameSnapshot, TrackingSession};
use crate::tracking::timer::{StageSummary, StageTimer};
use crate::workers::capture::FrameSlot;

const STAGE_DETECTION: &str = "detection";
const STAGE_TRACKING: &str = "tracking";
const STAGE_TOTAL: &str = "total";

/// Why the consumer loop ended.
#[derive(Debug)]
pub enum ConsumerExit {
    Shutdown,
    SlotClosed,
    DetectFailed(DetectError),
}

#[derive(Debug)]
pub struct TrackingReport {
    pub frames: u64,
    pub exit: ConsumerExit,
    pub stages: Vec<StageSummary>,
}

/// Consumer tick loop. Owns the session; observers only see snapshots.
pub async fn run<F, D, P>(
    mut slot: FrameSlot<F>,
    detector: Arc<D>,
    pointer: Arc<Mutex<P>>,
    mut session: TrackingSession,
    snapshots: watch::Sender<FrameSnapshot>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> TrackingReport
where
    F: Send + Sync + 'static,
    D: EyeDetector<F>,
    P: PointingDevice,
{
    let mut timer = StageTimer::new();

    let exit = loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => break ConsumerExit::Shutdown,
            changed = slot.changed() => {
                if changed.is_err() {
                    break ConsumerExit::SlotClosed;
                }
            }
        }

        let Some(frame) = slot.borrow_and_update().clone() else {
            continue;
        };

        timer.start(Instant::now(), true);
        let frame_no = session.frame_count() + 1;

        let det = detector.clone();
        let detection = match tokio::task::spawn_blocking(move || det.detect(&*frame)).await {
            Ok(Ok(detection)) => detection,
            Ok(Err(e)) => {
                tracing::error!(error = %e, frame = frame_no, "Eye detection failed");
                break ConsumerExit::DetectFailed(e);
            }
            Err(e) => {
                tracing::error!(error = %e, frame = frame_no, "Eye detection task panicked");
                break ConsumerExit::DetectFailed(DetectError::Failed(e.to_string()));
            }
        };
        record_stage(&mut timer, STAGE_DETECTION, frame_no, false);

        let outcome = session.tick(&detection, Instant::now());
        record_stage(&mut timer, STAGE_TRACKING, frame_no, false);

        apply_all(&pointer, &outcome.actions).await;
        record_stage(&mut timer, STAGE_TOTAL, frame_no, true);

        snapshots.send_replace(outcome.snapshot);
    };

    // 退出前释放所有仍按下的按键
    let releases = session.release_all();
    apply_all(&pointer, &releases).await;
    snapshots.send_replace(session.snapshot());

    let stages = timer.summary();
    for stage in &stages {
        tracing::info!(
            stage = %stage.stage,
            frames = stage.frames,
            average_ms = stage.average_ms,
            "Stage timing"
        );
    }

    TrackingReport {
        frames: session.frame_count(),
        exit,
        stages,
    }
}

async fn apply_all<P: PointingDevice>(pointer: &Mutex<P>, actions: &[PointerAction]) {
    if actions.is_empty() {
        return;
    }
    let mut device = pointer.lock().await;
    for action in actions {
        if let Err(e) = apply_action(&mut *device, *action) {
            tracing::warn!(error = %e, action = %action, "Pointer action failed");
        }
    }
}

fn record_stage(timer: &mut StageTimer, stage: &str, frame: u64, since_beginning: bool) {
    if let Err(e) = timer.capture(stage, frame, since_beginning, Instant::now()) {
        tracing::warn!(error = %e, "Stage timer misuse");
    }
}
