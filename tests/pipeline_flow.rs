mod common;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};

use blink_pointer::config::SensorConfig;
use blink_pointer::devices::camera::{CaptureError, DetectError};
use blink_pointer::devices::replay::{ReplayDetector, ReplayRecord, ReplaySource};
use blink_pointer::devices::sensor::{MotionSample, SensorError};
use blink_pointer::tracking::types::DetectionFrame;
use blink_pointer::tracking::{ClickMode, TrackingConfig};
use blink_pointer::workers::{StopReason, WorkerManager, WorkerName};

use common::devices::{
    FailOnNoFace, Passthrough, RecordingPointer, ScriptEnd, ScriptedSensor, ScriptedSource,
};
use common::fixtures::{both_boxes, boxes};

const GAP: Duration = Duration::from_millis(10);

fn independent() -> TrackingConfig {
    TrackingConfig {
        click_mode: ClickMode::Independent,
        ..TrackingConfig::default()
    }
}

fn shared_pointer() -> Arc<Mutex<RecordingPointer>> {
    Arc::new(Mutex::new(RecordingPointer::centered()))
}

fn sensor_config() -> SensorConfig {
    SensorConfig {
        enabled: true,
        connect_attempts: 2,
        retry_backoff_ms: 10,
        ..SensorConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn exhausted_source_ends_session_and_releases_device() {
    let source = ScriptedSource::new(vec![both_boxes(); 5], GAP, ScriptEnd::EndOfStream);
    let released = source.released.clone();
    let (tx, _) = broadcast::channel(4);

    let manager = WorkerManager::new(source, Passthrough, shared_pointer(), &independent(), tx);
    let snapshots = manager.snapshots();
    let session_id = manager.session_id();

    let summary = manager.start().await.unwrap();

    assert_eq!(summary.stop_reason, StopReason::SourceEnded);
    assert_eq!(summary.session_id, session_id);
    assert!(summary.frames >= 1 && summary.frames <= 5);
    assert!(summary.motion.is_none());
    assert!(*released.lock().unwrap());
    assert_eq!(snapshots.borrow().frame, summary.frames);
    assert!(summary.stages.iter().any(|s| s.stage == "total"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn capture_failure_releases_held_buttons() {
    let mut frames = vec![both_boxes(); 3];
    frames.extend(vec![boxes(&[]); 40]);
    let source = ScriptedSource::new(
        frames,
        GAP,
        ScriptEnd::Fail(CaptureError::Read("usb reset".to_string())),
    );
    let pointer = shared_pointer();
    let (tx, _) = broadcast::channel(4);

    let summary = WorkerManager::new(source, Passthrough, pointer.clone(), &independent(), tx)
        .start()
        .await
        .unwrap();

    assert_eq!(
        summary.stop_reason,
        StopReason::CaptureFailed(CaptureError::Read("usb reset".to_string()))
    );

    let device = pointer.lock().await;
    assert_eq!(device.count("press_left"), 1);
    assert_eq!(device.count("press_right"), 1);
    assert!(!device.left_down);
    assert!(!device.right_down);
    let tail: Vec<&str> = device.calls.iter().rev().take(2).map(String::as_str).collect();
    assert_eq!(tail, vec!["release_right", "release_left"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_handle_ends_endless_source() {
    let source = ScriptedSource::new(vec![both_boxes()], GAP, ScriptEnd::Repeat);
    let released = source.released.clone();
    let (tx, _) = broadcast::channel(4);

    let manager = WorkerManager::new(source, Passthrough, shared_pointer(), &independent(), tx);
    let stop = manager.stop_handle();
    let mut snapshots = manager.snapshots();
    let run = tokio::spawn(manager.start());

    tokio::time::timeout(Duration::from_secs(2), snapshots.changed())
        .await
        .expect("first snapshot")
        .unwrap();
    stop.stop();

    let summary = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("pipeline stopped")
        .unwrap()
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::Shutdown);
    assert!(summary.frames >= 1);
    assert!(*released.lock().unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_during_long_recorded_gap_returns_promptly() {
    let record = |t_ms| ReplayRecord {
        t_ms,
        frame: both_boxes(),
        face_landmarks: None,
    };
    let source = ReplaySource::from_records(vec![record(0), record(8_000)]);
    let (tx, _) = broadcast::channel(4);

    let manager = WorkerManager::new(source, ReplayDetector, shared_pointer(), &independent(), tx);
    let stop = manager.stop_handle();
    let mut snapshots = manager.snapshots();
    let run = tokio::spawn(manager.start());

    tokio::time::timeout(Duration::from_secs(2), snapshots.changed())
        .await
        .expect("first snapshot")
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let stopped_at = std::time::Instant::now();
    stop.stop();
    let summary = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("stop ends the recorded gap")
        .unwrap()
        .unwrap();

    assert!(stopped_at.elapsed() < Duration::from_secs(1));
    assert_eq!(summary.stop_reason, StopReason::Shutdown);
    assert_eq!(summary.frames, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn detector_failure_ends_session() {
    let source = ScriptedSource::new(
        vec![both_boxes(), DetectionFrame::no_face()],
        GAP,
        ScriptEnd::EndOfStream,
    );
    let (tx, _) = broadcast::channel(4);

    let summary = WorkerManager::new(source, FailOnNoFace, shared_pointer(), &independent(), tx)
        .start()
        .await
        .unwrap();

    assert_eq!(
        summary.stop_reason,
        StopReason::DetectFailed(DetectError::Failed("model crashed".to_string()))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sensor_failure_leaves_blink_pipeline_running() {
    let source = ScriptedSource::new(vec![both_boxes(); 20], GAP, ScriptEnd::EndOfStream);
    let sensor = ScriptedSensor {
        connect_failures: u32::MAX,
        samples: VecDeque::new(),
        sample_gap: Duration::from_millis(1),
    };
    let (tx, _) = broadcast::channel(4);

    let manager = WorkerManager::new(source, Passthrough, shared_pointer(), &independent(), tx)
        .with_sensor(Box::new(sensor), sensor_config());
    assert!(manager
        .planned_workers()
        .iter()
        .any(|w| w.name == WorkerName::Motion && w.enabled));

    let summary = manager.start().await.unwrap();

    assert_eq!(summary.stop_reason, StopReason::SourceEnded);
    assert_eq!(
        summary.motion,
        Some(Err(SensorError::RetriesExhausted { attempts: 2 }))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wrist_samples_move_the_shared_pointer() {
    let source = ScriptedSource::new(vec![both_boxes(); 20], GAP, ScriptEnd::EndOfStream);
    let sensor = ScriptedSensor {
        connect_failures: 1,
        samples: VecDeque::from(vec![
            MotionSample::new(0.0, 0.0),
            MotionSample::new(1.0, 0.0),
            MotionSample::new(0.0, -1.0),
        ]),
        sample_gap: Duration::from_millis(2),
    };
    let pointer = shared_pointer();
    let (tx, _) = broadcast::channel(4);

    let summary = WorkerManager::new(source, Passthrough, pointer.clone(), &independent(), tx)
        .with_sensor(Box::new(sensor), sensor_config())
        .start()
        .await
        .unwrap();

    assert_eq!(summary.motion, Some(Ok(2)));
    let device = pointer.lock().await;
    assert_eq!(device.count("move_x 6"), 1);
    assert_eq!(device.count("move_y 6"), 1);
    assert_eq!(device.position, (5_006, 5_006));
}

#[tokio::test]
async fn disabled_sensor_config_keeps_motion_worker_off() {
    let source = ScriptedSource::new(Vec::new(), GAP, ScriptEnd::EndOfStream);
    let sensor = ScriptedSensor {
        connect_failures: 0,
        samples: VecDeque::new(),
        sample_gap: Duration::from_millis(1),
    };
    let (tx, _) = broadcast::channel(4);

    let manager = WorkerManager::new(source, Passthrough, shared_pointer(), &independent(), tx)
        .with_sensor(Box::new(sensor), SensorConfig::default());

    let motion = manager
        .planned_workers()
        .into_iter()
        .find(|w| w.name == WorkerName::Motion)
        .unwrap();
    assert!(!motion.enabled);
}
