//! Recorded detection playback.
//!
//! A recording is JSON lines, one detection frame per line:
//!
//! ```text
//! {"t_ms":0,"face":{"x":0,"y":0,"width":300,"height":300},"eyes":[{"box":{"x":60,"y":80,"width":50,"height":50}}]}
//! {"t_ms":33,"face":null}
//! {"t_ms":66,"face":{"x":0,"y":0,"width":300,"height":300},"face_landmarks":[{"x":1.0,"y":2.0}, ...]}
//! ```
//!
//! `t_ms` is the offset from the first frame; playback sleeps to honor it
//! and gives up the wait as soon as capture is stopped.
//! A line with `face_landmarks` (68 points) is turned into landmark-mode
//! eyes by the detector.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::devices::camera::{wait_until, CaptureError, DetectError, EyeDetector, FrameSource};
use crate::tracking::landmarks::FACE_LANDMARK_COUNT;
use crate::tracking::types::{DetectionFrame, Point};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("replay io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("replay line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("replay recording is empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub t_ms: u64,
    #[serde(flatten)]
    pub frame: DetectionFrame,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_landmarks: Option<Vec<Point>>,
}

pub fn parse_recording(text: &str) -> Result<Vec<ReplayRecord>, ReplayError> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record = serde_json::from_str(line)
            .map_err(|source| ReplayError::Parse { line: idx + 1, source })?;
        records.push(record);
    }
    if records.is_empty() {
        return Err(ReplayError::Empty);
    }
    Ok(records)
}

#[derive(Debug)]
pub struct ReplaySource {
    records: VecDeque<ReplayRecord>,
    paced: bool,
    started: Option<Instant>,
}

impl ReplaySource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let records = parse_recording(&text)?;
        tracing::info!(path = %path.display(), frames = records.len(), "Loaded replay recording");
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<ReplayRecord>) -> Self {
        Self {
            records: records.into(),
            paced: true,
            started: None,
        }
    }

    /// Deliver frames as fast as they are pulled.
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl FrameSource for ReplaySource {
    type Frame = ReplayRecord;

    fn next_frame(&mut self, running: &AtomicBool) -> Result<ReplayRecord, CaptureError> {
        let t_ms = self.records.front().ok_or(CaptureError::EndOfStream)?.t_ms;

        if self.paced {
            let started = *self.started.get_or_insert_with(Instant::now);
            wait_until(started + Duration::from_millis(t_ms), running)?;
        }
        self.records.pop_front().ok_or(CaptureError::EndOfStream)
    }

    fn release(&mut self) {
        tracing::debug!(dropped = self.records.len(), "Replay source released");
        self.records.clear();
    }
}

/// Passes recorded detections through, expanding face landmarks when present.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayDetector;

impl EyeDetector<ReplayRecord> for ReplayDetector {
    fn detect(&self, record: &ReplayRecord) -> Result<DetectionFrame, DetectError> {
        match (&record.face_landmarks, record.frame.face) {
            (Some(points), Some(face)) => {
                if points.len() < FACE_LANDMARK_COUNT {
                    return Err(DetectError::LandmarkCount {
                        found: points.len(),
                        expected: FACE_LANDMARK_COUNT,
                    });
                }
                Ok(DetectionFrame::from_face_landmarks(face, points))
            }
            _ => Ok(record.frame.clone()),
        }
    }
}
