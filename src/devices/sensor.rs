//! Wrist motion sensor interface and bounded connect retry.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

pub use crate::tracking::motion::MotionSample;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SensorError {
    #[error("sensor connect failed: {0}")]
    Connect(String),
    #[error("sensor unavailable after {attempts} connect attempts")]
    RetriesExhausted { attempts: u32 },
    #[error("sensor read failed: {0}")]
    Read(String),
    #[error("sensor stream closed")]
    Closed,
    #[error("sensor connect cancelled by shutdown")]
    Cancelled,
}

/// Angular-rate sample source. Samples arrive at the sensor's own rate after
/// a successful `connect`.
#[async_trait]
pub trait MotionSensor: Send + 'static {
    async fn connect(&mut self) -> Result<(), SensorError>;

    /// Next sample, or `Err(SensorError::Closed)` once the stream ends.
    async fn next_sample(&mut self) -> Result<MotionSample, SensorError>;

    async fn disconnect(&mut self);
}

/// Try `connect` up to `attempts` times with a fixed `backoff` in between.
/// The backoff sleep ends early when `shutdown` fires.
pub async fn connect_with_retry<S>(
    sensor: &mut S,
    attempts: u32,
    backoff: Duration,
    shutdown: &mut broadcast::Receiver<()>,
) -> Result<(), SensorError>
where
    S: MotionSensor + ?Sized,
{
    for attempt in 1..=attempts {
        match sensor.connect().await {
            Ok(()) => {
                tracing::info!(attempt, "Motion sensor connected");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "Motion sensor connect failed"
                );
            }
        }

        if attempt < attempts {
            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = shutdown.recv() => return Err(SensorError::Cancelled),
            }
        }
    }

    Err(SensorError::RetriesExhausted { attempts })
}
