use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BLINK_WINDOW_MS, DEFAULT_CLOSED_RATIO_THRESHOLD, DEFAULT_EYE_DWELL_MS,
    DEFAULT_EYE_MATCH_THRESHOLD_PX, DEFAULT_LONG_HOLD_MS, DEFAULT_SHORT_BLINK_MS,
    DEFAULT_WINDOW_EXTENSION,
};
use crate::tracking::types::MirrorPolarity;

/// How blink states become pointer actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClickMode {
    /// Each eye drives its own button: closed dwell presses, open dwell releases.
    Independent,
    /// Both eyes fused: short blink clicks, held-closed fires the secondary click.
    Combined,
    /// Combined blinks grouped into single/double/triple patterns.
    #[default]
    Windowed,
}

impl ClickMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::Combined => "combined",
            Self::Windowed => "windowed",
        }
    }
}

impl FromStr for ClickMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(Self::Independent),
            "combined" => Ok(Self::Combined),
            "windowed" => Ok(Self::Windowed),
            other => Err(format!("unknown click mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingConfig {
    pub click_mode: ClickMode,
    pub polarity: MirrorPolarity,
    /// Max |dx| in pixels for a lone detection to inherit a cached identity.
    pub eye_match_threshold_px: f64,
    /// Minimum dwell before the single-eye debouncer acts.
    pub eye_dwell_ms: u64,
    /// Closeness ratio above which an eye (or the eye pair) counts as closed.
    pub closed_ratio_threshold: f64,
    pub short_blink_ms: u64,
    pub long_hold_ms: u64,
    pub blink_window_ms: u64,
    /// Fraction of `blink_window_ms` a new blink keeps the window open for.
    pub window_extension: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            click_mode: ClickMode::default(),
            polarity: MirrorPolarity::default(),
            eye_match_threshold_px: DEFAULT_EYE_MATCH_THRESHOLD_PX,
            eye_dwell_ms: DEFAULT_EYE_DWELL_MS,
            closed_ratio_threshold: DEFAULT_CLOSED_RATIO_THRESHOLD,
            short_blink_ms: DEFAULT_SHORT_BLINK_MS,
            long_hold_ms: DEFAULT_LONG_HOLD_MS,
            blink_window_ms: DEFAULT_BLINK_WINDOW_MS,
            window_extension: DEFAULT_WINDOW_EXTENSION,
        }
    }
}

impl TrackingConfig {
    pub fn eye_dwell(&self) -> Duration {
        Duration::from_millis(self.eye_dwell_ms)
    }

    pub fn short_blink(&self) -> Duration {
        Duration::from_millis(self.short_blink_ms)
    }

    pub fn long_hold(&self) -> Duration {
        Duration::from_millis(self.long_hold_ms)
    }

    pub fn blink_window(&self) -> Duration {
        Duration::from_millis(self.blink_window_ms)
    }

    pub fn window_extension(&self) -> Duration {
        let ms = (self.blink_window_ms as f64 * self.window_extension).round();
        Duration::from_millis(ms as u64)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.eye_match_threshold_px.is_finite() || self.eye_match_threshold_px < 0.0 {
            return Err("tracking.eye_match_threshold_px must be >= 0".to_string());
        }
        if !self.closed_ratio_threshold.is_finite() || self.closed_ratio_threshold <= 0.0 {
            return Err("tracking.closed_ratio_threshold must be > 0".to_string());
        }
        if self.short_blink_ms == 0 {
            return Err("tracking.short_blink_ms must be > 0".to_string());
        }
        if self.long_hold_ms <= self.short_blink_ms {
            return Err("tracking.long_hold_ms must be greater than short_blink_ms".to_string());
        }
        if self.blink_window_ms == 0 {
            return Err("tracking.blink_window_ms must be > 0".to_string());
        }
        if !(self.window_extension > 0.0 && self.window_extension <= 1.0) {
            return Err("tracking.window_extension must be in (0,1]".to_string());
        }
        Ok(())
    }
}
