use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;

use blink_pointer::devices::camera::{CaptureError, DetectError, EyeDetector, FrameSource};
use blink_pointer::devices::pointer::{PointerError, PointingDevice};
use blink_pointer::devices::sensor::{MotionSample, MotionSensor, SensorError};
use blink_pointer::tracking::types::DetectionFrame;

/// What a scripted source does once its frames run out.
#[derive(Debug, Clone)]
pub enum ScriptEnd {
    EndOfStream,
    Fail(CaptureError),
    /// Keep repeating the last frame.
    Repeat,
}

/// Frame source that replays detection frames with a fixed real-time gap.
pub struct ScriptedSource {
    frames: VecDeque<DetectionFrame>,
    last: Option<DetectionFrame>,
    gap: Duration,
    end: ScriptEnd,
    pub released: Arc<StdMutex<bool>>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<DetectionFrame>, gap: Duration, end: ScriptEnd) -> Self {
        Self {
            frames: frames.into(),
            last: None,
            gap,
            end,
            released: Arc::new(StdMutex::new(false)),
        }
    }
}

impl FrameSource for ScriptedSource {
    type Frame = DetectionFrame;

    fn next_frame(&mut self, _running: &AtomicBool) -> Result<DetectionFrame, CaptureError> {
        std::thread::sleep(self.gap);
        if let Some(frame) = self.frames.pop_front() {
            self.last = Some(frame.clone());
            return Ok(frame);
        }
        match (&self.end, &self.last) {
            (ScriptEnd::Repeat, Some(last)) => Ok(last.clone()),
            (ScriptEnd::Fail(e), _) => Err(e.clone()),
            _ => Err(CaptureError::EndOfStream),
        }
    }

    fn release(&mut self) {
        if let Ok(mut released) = self.released.lock() {
            *released = true;
        }
    }
}

/// Detector for sources whose frames are already detections.
pub struct Passthrough;

impl EyeDetector<DetectionFrame> for Passthrough {
    fn detect(&self, frame: &DetectionFrame) -> Result<DetectionFrame, DetectError> {
        Ok(frame.clone())
    }
}

/// Fails on the first frame that has no face.
pub struct FailOnNoFace;

impl EyeDetector<DetectionFrame> for FailOnNoFace {
    fn detect(&self, frame: &DetectionFrame) -> Result<DetectionFrame, DetectError> {
        if frame.face.is_none() {
            return Err(DetectError::Failed("model crashed".to_string()));
        }
        Ok(frame.clone())
    }
}

/// Pointer that records every call.
#[derive(Debug, Default)]
pub struct RecordingPointer {
    pub calls: Vec<String>,
    pub position: (i32, i32),
    pub left_down: bool,
    pub right_down: bool,
}

impl RecordingPointer {
    pub fn centered() -> Self {
        Self {
            position: (5_000, 5_000),
            ..Self::default()
        }
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }
}

impl PointingDevice for RecordingPointer {
    fn move_x(&mut self, delta: i32) -> Result<(), PointerError> {
        self.position.0 += delta;
        self.calls.push(format!("move_x {delta}"));
        Ok(())
    }

    fn move_y(&mut self, delta: i32) -> Result<(), PointerError> {
        self.position.1 += delta;
        self.calls.push(format!("move_y {delta}"));
        Ok(())
    }

    fn press_left(&mut self) -> Result<(), PointerError> {
        self.left_down = true;
        self.calls.push("press_left".to_string());
        Ok(())
    }

    fn release_left(&mut self) -> Result<(), PointerError> {
        self.left_down = false;
        self.calls.push("release_left".to_string());
        Ok(())
    }

    fn press_right(&mut self) -> Result<(), PointerError> {
        self.right_down = true;
        self.calls.push("press_right".to_string());
        Ok(())
    }

    fn release_right(&mut self) -> Result<(), PointerError> {
        self.right_down = false;
        self.calls.push("release_right".to_string());
        Ok(())
    }

    fn click(&mut self) -> Result<(), PointerError> {
        self.calls.push("click".to_string());
        Ok(())
    }

    fn current_position(&self) -> (i32, i32) {
        self.position
    }

    fn screen_size(&self) -> (u32, u32) {
        (10_000, 10_000)
    }
}

/// Sensor that fails `connect_failures` times, then yields its samples and closes.
pub struct ScriptedSensor {
    pub connect_failures: u32,
    pub samples: VecDeque<MotionSample>,
    pub sample_gap: Duration,
}

#[async_trait]
impl MotionSensor for ScriptedSensor {
    async fn connect(&mut self) -> Result<(), SensorError> {
        if self.connect_failures > 0 {
            self.connect_failures -= 1;
            return Err(SensorError::Connect("adapter busy".to_string()));
        }
        Ok(())
    }

    async fn next_sample(&mut self) -> Result<MotionSample, SensorError> {
        tokio::time::sleep(self.sample_gap).await;
        self.samples.pop_front().ok_or(SensorError::Closed)
    }

    async fn disconnect(&mut self) {}
}
