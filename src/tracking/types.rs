use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tracking::landmarks;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TrackingError {
    #[error("unknown eye identity has no opposite")]
    NoOppositeOfUnknown,
    #[error("closeness ratio unavailable for {0} eye")]
    RatioUnavailable(EyeIdentity),
}

/// Left/right label of a detected eye, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EyeIdentity {
    Left,
    Right,
    Unknown,
}

impl EyeIdentity {
    pub fn opposite(self) -> Result<Self, TrackingError> {
        match self {
            Self::Left => Ok(Self::Right),
            Self::Right => Ok(Self::Left),
            Self::Unknown => Err(TrackingError::NoOppositeOfUnknown),
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EyeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EyeState {
    Open,
    Closed,
}

impl EyeState {
    pub fn opposite(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for EyeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned detector rectangle in pixels. Eye boxes are relative to the face region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

/// Six ordered eye landmarks: outer corner, two upper lid points, inner
/// corner, two lower lid points (lower lid runs back toward the outer corner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EyeLandmarks {
    pub points: [Point; 6],
}

impl EyeLandmarks {
    pub fn new(points: [Point; 6]) -> Self {
        Self { points }
    }

    pub fn closeness_ratio(&self) -> f64 {
        landmarks::closeness_ratio(&self.points)
    }

    pub fn centroid(&self) -> Point {
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 6.0, sy / 6.0)
    }
}

/// One raw eye detection as produced by a detector backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EyeDetection {
    Box(BoundingBox),
    Landmarks(EyeLandmarks),
}

impl EyeDetection {
    /// Position used for left/right disambiguation.
    pub fn position(&self) -> Point {
        match self {
            Self::Box(b) => b.origin(),
            Self::Landmarks(l) => l.centroid(),
        }
    }

    pub fn closeness_ratio(&self) -> Option<f64> {
        match self {
            Self::Box(_) => None,
            Self::Landmarks(l) => Some(l.closeness_ratio()),
        }
    }
}

/// One eye's measurement in one frame, after identity resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeObservation {
    pub identity: EyeIdentity,
    pub state: EyeState,
    pub position: Point,
    pub detection: EyeDetection,
    pub closeness_ratio: Option<f64>,
}

impl EyeObservation {
    pub fn new(identity: EyeIdentity, state: EyeState, detection: EyeDetection) -> Self {
        Self {
            identity,
            state,
            position: detection.position(),
            closeness_ratio: detection.closeness_ratio(),
            detection,
        }
    }

    /// Treat the eye as shut because it was not detected this frame. A
    /// landmark eye's last ratio no longer applies, so it becomes fully closed.
    pub fn mark_closed(&mut self) {
        self.state = EyeState::Closed;
        if self.closeness_ratio.is_some() {
            self.closeness_ratio = Some(f64::INFINITY);
        }
    }
}

/// Output of the face/eye geometry extractor for one camera frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionFrame {
    pub face: Option<BoundingBox>,
    #[serde(default)]
    pub eyes: Vec<EyeDetection>,
}

impl DetectionFrame {
    pub fn no_face() -> Self {
        Self::default()
    }

    pub fn with_boxes(face: BoundingBox, eyes: impl IntoIterator<Item = BoundingBox>) -> Self {
        Self {
            face: Some(face),
            eyes: eyes.into_iter().map(EyeDetection::Box).collect(),
        }
    }
}

/// Which side of the image the user's left eye lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MirrorPolarity {
    /// Feed is mirrored: the smaller x coordinate is the user's left eye.
    #[default]
    SmallerXLeft,
    SmallerXRight,
}

impl MirrorPolarity {
    /// Identities for (smaller-x, larger-x) detections.
    pub fn order(self) -> (EyeIdentity, EyeIdentity) {
        match self {
            Self::SmallerXLeft => (EyeIdentity::Left, EyeIdentity::Right),
            Self::SmallerXRight => (EyeIdentity::Right, EyeIdentity::Left),
        }
    }
}

impl FromStr for MirrorPolarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smaller-x-left" | "mirrored" => Ok(Self::SmallerXLeft),
            "smaller-x-right" | "raw" => Ok(Self::SmallerXRight),
            other => Err(format!("unknown mirror polarity: {other}")),
        }
    }
}
