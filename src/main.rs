use std::process::ExitCode;
use std::sync::Arc;

use blink_pointer::config::Config;
use blink_pointer::devices::pointer::DryRunPointer;
use blink_pointer::devices::replay::{ReplayDetector, ReplaySource};
use blink_pointer::logging::{init_tracing, LogConfig};
use blink_pointer::workers::{StopHandle, StopReason, WorkerManager};
use tokio::sync::{broadcast, Mutex};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    if let Err(e) = init_tracing(&LogConfig {
        log_level: config.log_level.clone(),
        enable_file_logs: config.enable_file_logs,
        log_dir: config.log_dir.clone(),
    }) {
        eprintln!("blink-pointer: {e}");
        return ExitCode::FAILURE;
    }
    tracing::info!(
        click_mode = config.tracking.click_mode.as_str(),
        replay = %config.replay_path.display(),
        "Starting blink-pointer"
    );

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return ExitCode::FAILURE;
    }

    let source = match ReplaySource::open(&config.replay_path) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, path = %config.replay_path.display(), "Failed to open replay");
            return ExitCode::FAILURE;
        }
    };

    if config.sensor.enabled {
        tracing::warn!("SENSOR_ENABLED is set but no sensor transport is built in; cursor motion disabled");
    }

    let pointer = Arc::new(Mutex::new(DryRunPointer::default()));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let manager = WorkerManager::new(
        source,
        ReplayDetector,
        pointer,
        &config.tracking(),
        shutdown_tx,
    );
    tokio::spawn(shutdown_signal(manager.stop_handle()));

    let summary = match manager.start().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Worker manager failed");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        session_id = %summary.session_id,
        frames = summary.frames,
        "Shutdown complete"
    );

    match summary.stop_reason {
        StopReason::Shutdown | StopReason::SourceEnded => ExitCode::SUCCESS,
        StopReason::CaptureFailed(e) => {
            tracing::error!(error = %e, "Session ended by capture failure");
            ExitCode::FAILURE
        }
        StopReason::DetectFailed(e) => {
            tracing::error!(error = %e, "Session ended by detector failure");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal(stop: StopHandle) {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    stop.stop();
}
