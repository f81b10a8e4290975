use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("stage timer captured '{stage}' before start")]
    NotStarted { stage: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub stage: String,
    pub frames: usize,
    pub average_ms: f64,
}

/// Per-stage processing times, keyed by frame number.
#[derive(Debug, Default)]
pub struct StageTimer {
    beginning: Option<Instant>,
    last: Option<Instant>,
    samples: BTreeMap<String, BTreeMap<u64, Duration>>,
}

impl StageTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a stage. `new_frame` also moves the frame beginning.
    pub fn start(&mut self, now: Instant, new_frame: bool) {
        self.last = Some(now);
        if new_frame || self.beginning.is_none() {
            self.beginning = Some(now);
        }
    }

    /// Record the time since the last mark (or since the frame beginning).
    pub fn capture(
        &mut self,
        stage: &str,
        frame: u64,
        since_beginning: bool,
        now: Instant,
    ) -> Result<Duration, TimerError> {
        let (Some(last), Some(beginning)) = (self.last, self.beginning) else {
            return Err(TimerError::NotStarted {
                stage: stage.to_string(),
            });
        };

        let from = if since_beginning { beginning } else { last };
        let elapsed = now.saturating_duration_since(from);

        self.samples
            .entry(stage.to_string())
            .or_default()
            .insert(frame, elapsed);
        self.last = Some(now);
        Ok(elapsed)
    }

    /// Average per stage. The first frame of a stage is dropped when more
    /// are available; it carries detector warm-up.
    pub fn summary(&self) -> Vec<StageSummary> {
        self.samples
            .iter()
            .map(|(stage, frames)| {
                let skip = usize::from(frames.len() > 1);
                let kept: Vec<Duration> = frames.values().skip(skip).copied().collect();
                let total: Duration = kept.iter().sum();
                let average_ms = if kept.is_empty() {
                    0.0
                } else {
                    total.as_secs_f64() * 1000.0 / kept.len() as f64
                };
                StageSummary {
                    stage: stage.clone(),
                    frames: kept.len(),
                    average_ms,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_before_start_is_an_error() {
        let mut timer = StageTimer::new();
        let err = timer
            .capture("detection", 1, false, Instant::now())
            .unwrap_err();
        assert_eq!(
            err,
            TimerError::NotStarted {
                stage: "detection".to_string()
            }
        );
    }

    #[test]
    fn stages_chain_and_total_uses_beginning() {
        let t0 = Instant::now();
        let ms = |v: u64| t0 + Duration::from_millis(v);
        let mut timer = StageTimer::new();

        timer.start(t0, true);
        assert_eq!(
            timer.capture("detection", 1, false, ms(30)).unwrap(),
            Duration::from_millis(30)
        );
        assert_eq!(
            timer.capture("tracking", 1, false, ms(32)).unwrap(),
            Duration::from_millis(2)
        );
        assert_eq!(
            timer.capture("total", 1, true, ms(35)).unwrap(),
            Duration::from_millis(35)
        );
    }

    #[test]
    fn summary_skips_warm_up_frame() {
        let t0 = Instant::now();
        let mut timer = StageTimer::new();
        for (frame, cost) in [(1_u64, 500_u64), (2, 10), (3, 20)] {
            let start = t0 + Duration::from_secs(frame);
            timer.start(start, true);
            timer
                .capture("detection", frame, false, start + Duration::from_millis(cost))
                .unwrap();
        }

        let summary = timer.summary();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].frames, 2);
        assert!((summary[0].average_ms - 15.0).abs() < 1e-6);
    }
}
