pub mod capture;
pub mod motion;
pub mod tracking;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::SensorConfig;
use crate::devices::camera::{CaptureError, DetectError, EyeDetector, FrameSource};
use crate::devices::pointer::PointingDevice;
use crate::devices::sensor::{MotionSensor, SensorError};
use crate::tracking::config::TrackingConfig;
use crate::tracking::session::{FrameSnapshot, TrackingSession};
use crate::tracking::timer::StageSummary;
use crate::workers::tracking::ConsumerExit;

/// 所有 worker 的枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerName {
    Capture,
    Tracking,
    Motion,
}

impl WorkerName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Tracking => "tracking",
            Self::Motion => "motion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPlan {
    pub name: WorkerName,
    pub enabled: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("{worker} worker panicked: {message}")]
    Panicked {
        worker: &'static str,
        message: String,
    },
}

/// How a session ended.
#[derive(Debug, PartialEq, Eq)]
pub enum StopReason {
    /// `stop()` or a process signal.
    Shutdown,
    /// The frame source ran out of frames.
    SourceEnded,
    CaptureFailed(CaptureError),
    DetectFailed(DetectError),
}

#[derive(Debug)]
pub struct RunSummary {
    pub session_id: Uuid,
    pub frames: u64,
    pub stop_reason: StopReason,
    pub stages: Vec<StageSummary>,
    /// `None` when no sensor was configured.
    pub motion: Option<Result<u64, SensorError>>,
}

/// Cloneable stop entry point for an observer or the process signal handler.
#[derive(Debug, Clone)]
pub struct StopHandle {
    shutdown_tx: broadcast::Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        tracing::info!("Stop requested");
        let _ = self.shutdown_tx.send(());
    }
}

pub struct WorkerManager<S, D, P>
where
    S: FrameSource,
    D: EyeDetector<S::Frame>,
    P: PointingDevice,
{
    source: S,
    detector: Arc<D>,
    pointer: Arc<Mutex<P>>,
    session: TrackingSession,
    sensor: Option<(Box<dyn MotionSensor>, SensorConfig)>,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
    snapshot_tx: watch::Sender<FrameSnapshot>,
}

impl<S, D, P> WorkerManager<S, D, P>
where
    S: FrameSource,
    D: EyeDetector<S::Frame>,
    P: PointingDevice,
{
    pub fn new(
        source: S,
        detector: D,
        pointer: Arc<Mutex<P>>,
        config: &TrackingConfig,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let session = TrackingSession::new(config);
        let (snapshot_tx, _) = watch::channel(session.snapshot());
        Self {
            source,
            detector: Arc::new(detector),
            pointer,
            session,
            sensor: None,
            shutdown_rx: shutdown_tx.subscribe(),
            shutdown_tx,
            snapshot_tx,
        }
    }

    /// Attach a wrist sensor. A disabled config leaves the motion worker off.
    pub fn with_sensor(mut self, sensor: Box<dyn MotionSensor>, config: SensorConfig) -> Self {
        if config.enabled {
            self.sensor = Some((sensor, config));
        }
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session.id()
    }

    pub fn planned_workers(&self) -> Vec<WorkerPlan> {
        vec![
            WorkerPlan {
                name: WorkerName::Capture,
                enabled: true,
            },
            WorkerPlan {
                name: WorkerName::Tracking,
                enabled: true,
            },
            WorkerPlan {
                name: WorkerName::Motion,
                enabled: self.sensor.is_some(),
            },
        ]
    }

    pub fn snapshots(&self) -> watch::Receiver<FrameSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot_stream(&self) -> WatchStream<FrameSnapshot> {
        WatchStream::new(self.snapshots())
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }

    /// Run the pipeline until stop, source exhaustion or a fatal device error.
    pub async fn start(self) -> Result<RunSummary, WorkerError> {
        let Self {
            source,
            detector,
            pointer,
            session,
            sensor,
            shutdown_tx,
            shutdown_rx,
            snapshot_tx,
        } = self;

        let session_id = session.id();
        let span = tracing::info_span!("tracking_session", session_id = %session_id);

        for name in [WorkerName::Capture, WorkerName::Tracking] {
            tracing::info!(parent: &span, worker = name.as_str(), "Starting worker");
        }

        let motion_handle = sensor.map(|(sensor, config)| {
            tracing::info!(parent: &span, worker = WorkerName::Motion.as_str(), "Starting worker");
            tokio::spawn(
                motion::run(sensor, config, pointer.clone(), shutdown_tx.subscribe())
                    .instrument(span.clone()),
            )
        });

        let running = Arc::new(AtomicBool::new(true));
        let (slot_tx, slot_rx) = capture::slot();
        let capture_handle = capture::spawn(source, slot_tx, running.clone());

        let tracking_handle = tokio::spawn(
            tracking::run(
                slot_rx,
                detector,
                pointer.clone(),
                session,
                snapshot_tx,
                shutdown_rx,
            )
            .instrument(span.clone()),
        );

        let report = tracking_handle.await;

        // 通知其余 worker 退出
        running.store(false, Ordering::SeqCst);
        let _ = shutdown_tx.send(());

        let capture_result = capture_handle.await.map_err(|e| WorkerError::Panicked {
            worker: WorkerName::Capture.as_str(),
            message: e.to_string(),
        });

        let motion = match motion_handle {
            Some(handle) => Some(handle.await.map_err(|e| WorkerError::Panicked {
                worker: WorkerName::Motion.as_str(),
                message: e.to_string(),
            })?),
            None => None,
        };
        if let Some(Err(e)) = &motion {
            tracing::warn!(parent: &span, error = %e, "Motion worker ended with error");
        }

        let report = report.map_err(|e| WorkerError::Panicked {
            worker: WorkerName::Tracking.as_str(),
            message: e.to_string(),
        })?;

        let stop_reason = match report.exit {
            ConsumerExit::Shutdown => StopReason::Shutdown,
            ConsumerExit::DetectFailed(e) => StopReason::DetectFailed(e),
            ConsumerExit::SlotClosed => match capture_result? {
                Err(CaptureError::EndOfStream) | Ok(_) => StopReason::SourceEnded,
                Err(e) => StopReason::CaptureFailed(e),
            },
        };

        tracing::info!(
            parent: &span,
            frames = report.frames,
            reason = ?stop_reason,
            "Tracking session ended"
        );

        Ok(RunSummary {
            session_id,
            frames: report.frames,
            stop_reason,
            stages: report.stages,
            motion,
        })
    }
}
