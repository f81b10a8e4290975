use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::constants::DEFAULT_LOG_DIR;

const LOG_FILE_PREFIX: &str = "blink-pointer";
const MAX_LOG_FILES: usize = 30;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to create rolling log appender in {dir}: {source}")]
    Appender {
        dir: String,
        source: tracing_appender::rolling::InitError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Install the global subscriber. Calling it again after a subscriber is
/// already installed is a no-op.
pub fn init_tracing(config: &LogConfig) -> Result<(), LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stdout_layer = fmt::layer().with_target(true).with_thread_ids(false);

    let registry = Registry::default().with(env_filter).with(stdout_layer);

    let result = if config.enable_file_logs {
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix("log")
            .max_log_files(MAX_LOG_FILES)
            .build(&config.log_dir)
            .map_err(|source| LoggingError::Appender {
                dir: config.log_dir.clone(),
                source,
            })?;
        let file_layer = fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .json();
        registry.with(file_layer).try_init()
    } else {
        registry.try_init()
    };

    // 全局 subscriber 已设置（如测试环境）视为成功
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("already been set") => Ok(()),
        Err(e) => Err(LoggingError::Init(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let cfg = LogConfig::default();
        assert!(init_tracing(&cfg).is_ok());
        assert!(init_tracing(&cfg).is_ok());
    }

    #[test]
    fn file_logging_creates_directory_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LogConfig {
            enable_file_logs: true,
            log_dir: dir.path().join("logs").to_string_lossy().into_owned(),
            ..LogConfig::default()
        };
        assert!(init_tracing(&cfg).is_ok());
        assert!(dir.path().join("logs").exists());
    }
}
