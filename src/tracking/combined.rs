//! Combined-eye blink classifier.
//!
//! Both eyes' closeness ratios are averaged into one OPEN/CLOSED state. A
//! closed dwell that ends after at least `short_blink` is a short blink; one
//! that outlasts `long_hold` fires a hold while the eyes are still closed.
//! A single dwell yields at most one of the two.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::tracking::config::TrackingConfig;
use crate::tracking::types::EyeState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedEyeState {
    pub state: EyeState,
    pub since: Instant,
    pub action_taken: bool,
}

impl CombinedEyeState {
    fn entered(state: EyeState, now: Instant) -> Self {
        Self {
            state,
            since: now,
            action_taken: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum BlinkGesture {
    /// Eyes reopened after a closure of at least the short-blink threshold.
    ShortBlink { closed_for: Duration },
    /// Eyes stayed closed past the long-hold threshold.
    LongHold { closed_for: Duration },
}

#[derive(Debug, Clone)]
pub struct CombinedBlinkClassifier {
    ratio_threshold: f64,
    short_blink: Duration,
    long_hold: Duration,
    current: Option<CombinedEyeState>,
}

impl CombinedBlinkClassifier {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            ratio_threshold: config.closed_ratio_threshold,
            short_blink: config.short_blink(),
            long_hold: config.long_hold(),
            current: None,
        }
    }

    pub fn state(&self) -> Option<CombinedEyeState> {
        self.current
    }

    pub fn classify_ratio(&self, ratio: f64) -> EyeState {
        if ratio > self.ratio_threshold {
            EyeState::Closed
        } else {
            EyeState::Open
        }
    }

    pub fn update(
        &mut self,
        left_ratio: f64,
        right_ratio: f64,
        now: Instant,
    ) -> Option<BlinkGesture> {
        let ratio = (left_ratio + right_ratio) / 2.0;
        let state = self.classify_ratio(ratio);

        let Some(previous) = self.current else {
            self.current = Some(CombinedEyeState::entered(state, now));
            return None;
        };

        if state != previous.state {
            self.current = Some(CombinedEyeState::entered(state, now));

            let dwell = now.saturating_duration_since(previous.since);
            tracing::trace!(
                from = %previous.state,
                to = %state,
                dwell_ms = dwell.as_millis() as u64,
                "Combined eye transition"
            );

            if previous.state == EyeState::Closed
                && dwell >= self.short_blink
                && !previous.action_taken
            {
                return Some(BlinkGesture::ShortBlink { closed_for: dwell });
            }
            return None;
        }

        if state == EyeState::Closed && !previous.action_taken {
            let dwell = now.saturating_duration_since(previous.since);
            if dwell >= self.long_hold {
                if let Some(current) = self.current.as_mut() {
                    current.action_taken = true;
                }
                return Some(BlinkGesture::LongHold { closed_for: dwell });
            }
        }
        None
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}
