use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::config::SensorConfig;
use crate::devices::pointer::{apply_motion, PointingDevice};
use crate::devices::sensor::{connect_with_retry, MotionSensor, SensorError};
use crate::tracking::motion::MotionMapper;

/// Wrist-tilt cursor loop. Returns the number of cursor moves sent.
///
/// Connect failure is returned to the caller; it never stops the camera
/// pipeline.
pub async fn run<P: PointingDevice>(
    mut sensor: Box<dyn MotionSensor>,
    config: SensorConfig,
    pointer: Arc<Mutex<P>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<u64, SensorError> {
    connect_with_retry(
        sensor.as_mut(),
        config.connect_attempts,
        config.retry_backoff(),
        &mut shutdown_rx,
    )
    .await?;

    let mut mapper = MotionMapper::new(config.dead_zone, config.sensitivity);
    let mut moves = 0_u64;

    let result = loop {
        let sample = tokio::select! {
            biased;
            _ = shutdown_rx.recv() => break Ok(moves),
            sample = sensor.next_sample() => sample,
        };

        match sample {
            Ok(sample) => {
                let (dx, dy) = mapper.map(sample);
                if dx == 0 && dy == 0 {
                    continue;
                }
                let mut device = pointer.lock().await;
                if let Err(e) = apply_motion(&mut *device, dx, dy) {
                    tracing::warn!(error = %e, dx, dy, "Cursor move failed");
                    continue;
                }
                moves += 1;
            }
            Err(SensorError::Closed) => {
                tracing::info!(moves, "Motion sensor stream closed");
                break Ok(moves);
            }
            Err(e) => {
                tracing::warn!(error = %e, moves, "Motion sensor read failed");
                break Err(e);
            }
        }
    };

    sensor.disconnect().await;
    result
}
