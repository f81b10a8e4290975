use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BLINK_WINDOW_MS, DEFAULT_CLOSED_RATIO_THRESHOLD, DEFAULT_EYE_DWELL_MS,
    DEFAULT_EYE_MATCH_THRESHOLD_PX, DEFAULT_LOG_DIR, DEFAULT_LONG_HOLD_MS, DEFAULT_REPLAY_PATH,
    DEFAULT_SENSOR_CONNECT_ATTEMPTS, DEFAULT_SENSOR_DEAD_ZONE, DEFAULT_SENSOR_RETRY_BACKOFF_MS,
    DEFAULT_SENSOR_SENSITIVITY, DEFAULT_SHORT_BLINK_MS, DEFAULT_WINDOW_EXTENSION,
};
use crate::tracking::config::{ClickMode, TrackingConfig};
use crate::tracking::types::MirrorPolarity;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub replay_path: PathBuf,
    pub tracking: TrackingConfig,
    pub sensor: SensorConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    pub enabled: bool,
    pub dead_zone: u32,
    pub sensitivity: u32,
    pub connect_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dead_zone: DEFAULT_SENSOR_DEAD_ZONE,
            sensitivity: DEFAULT_SENSOR_SENSITIVITY,
            connect_attempts: DEFAULT_SENSOR_CONNECT_ATTEMPTS,
            retry_backoff_ms: DEFAULT_SENSOR_RETRY_BACKOFF_MS,
        }
    }
}

impl SensorConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=1000).contains(&self.sensitivity) {
            return Err("sensor.sensitivity must be in 1..=1000".to_string());
        }
        if self.connect_attempts == 0 {
            return Err("sensor.connect_attempts must be > 0".to_string());
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", DEFAULT_LOG_DIR),
            replay_path: PathBuf::from(env_or("REPLAY_PATH", DEFAULT_REPLAY_PATH)),
            tracking: TrackingConfig {
                click_mode: env_or_parse("CLICK_MODE", ClickMode::default()),
                polarity: env_or_parse("MIRROR_POLARITY", MirrorPolarity::default()),
                eye_match_threshold_px: env_or_parse(
                    "EYE_MATCH_THRESHOLD_PX",
                    DEFAULT_EYE_MATCH_THRESHOLD_PX,
                ),
                eye_dwell_ms: env_or_parse("EYE_DWELL_MS", DEFAULT_EYE_DWELL_MS),
                closed_ratio_threshold: env_or_parse(
                    "CLOSED_RATIO_THRESHOLD",
                    DEFAULT_CLOSED_RATIO_THRESHOLD,
                ),
                short_blink_ms: env_or_parse("SHORT_BLINK_MS", DEFAULT_SHORT_BLINK_MS),
                long_hold_ms: env_or_parse("LONG_HOLD_MS", DEFAULT_LONG_HOLD_MS),
                blink_window_ms: env_or_parse("BLINK_WINDOW_MS", DEFAULT_BLINK_WINDOW_MS),
                window_extension: env_or_parse(
                    "BLINK_WINDOW_EXTENSION",
                    DEFAULT_WINDOW_EXTENSION,
                ),
            },
            sensor: SensorConfig {
                enabled: env_or_bool("SENSOR_ENABLED", false),
                dead_zone: env_or_parse("SENSOR_DEAD_ZONE", DEFAULT_SENSOR_DEAD_ZONE),
                sensitivity: env_or_parse("SENSOR_SENSITIVITY", DEFAULT_SENSOR_SENSITIVITY),
                connect_attempts: env_or_parse(
                    "SENSOR_CONNECT_ATTEMPTS",
                    DEFAULT_SENSOR_CONNECT_ATTEMPTS,
                ),
                retry_backoff_ms: env_or_parse(
                    "SENSOR_RETRY_BACKOFF_MS",
                    DEFAULT_SENSOR_RETRY_BACKOFF_MS,
                ),
            },
        }
    }

    pub fn tracking(&self) -> TrackingConfig {
        self.tracking.clone()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.tracking.validate()?;
        self.sensor.validate()
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
