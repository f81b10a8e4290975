use std::time::{Duration, Instant};

use blink_pointer::tracking::actions::PointerAction;
use blink_pointer::tracking::types::{BoundingBox, DetectionFrame, EyeDetection, EyeLandmarks, Point};
use blink_pointer::tracking::TrackingSession;

const EYE_WIDTH: f64 = 30.0;

pub const OPEN_RATIO: f64 = 4.0;
pub const CLOSED_RATIO: f64 = 7.0;

pub fn face() -> BoundingBox {
    BoundingBox::new(100, 80, 300, 300)
}

pub fn eye_box(x: i32) -> BoundingBox {
    BoundingBox::new(x, 80, 50, 50)
}

/// Both eyes as cascade boxes, left of image at x=60, right at x=180.
pub fn both_boxes() -> DetectionFrame {
    DetectionFrame::with_boxes(face(), [eye_box(60), eye_box(180)])
}

pub fn boxes(xs: &[i32]) -> DetectionFrame {
    DetectionFrame::with_boxes(face(), xs.iter().map(|&x| eye_box(x)))
}

/// Six landmarks centred at (cx, cy) whose closeness ratio is `ratio`.
pub fn eye_with_ratio(cx: f64, cy: f64, ratio: f64) -> EyeLandmarks {
    let half_w = EYE_WIDTH / 2.0;
    let half_gap = EYE_WIDTH / ratio / 2.0;
    EyeLandmarks::new([
        Point::new(cx - half_w, cy),
        Point::new(cx - 5.0, cy - half_gap),
        Point::new(cx + 5.0, cy - half_gap),
        Point::new(cx + half_w, cy),
        Point::new(cx + 5.0, cy + half_gap),
        Point::new(cx - 5.0, cy + half_gap),
    ])
}

/// Landmark-mode frame where both eyes share `ratio`.
pub fn landmark_frame(ratio: f64) -> DetectionFrame {
    DetectionFrame {
        face: Some(face()),
        eyes: vec![
            EyeDetection::Landmarks(eye_with_ratio(150.0, 160.0, ratio)),
            EyeDetection::Landmarks(eye_with_ratio(250.0, 160.0, ratio)),
        ],
    }
}

pub fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

/// Feed `(ms, frame)` pairs through the session and collect every action
/// with the millisecond it fired at.
pub fn drive(
    session: &mut TrackingSession,
    t0: Instant,
    frames: impl IntoIterator<Item = (u64, DetectionFrame)>,
) -> Vec<(u64, PointerAction)> {
    let mut fired = Vec::new();
    for (ms, frame) in frames {
        let outcome = session.tick(&frame, at(t0, ms));
        fired.extend(outcome.actions.into_iter().map(|a| (ms, a)));
    }
    fired
}

/// Frames every `step` ms from `from` (inclusive) to `to` (exclusive).
pub fn every(step: u64, from: u64, to: u64, frame: DetectionFrame) -> Vec<(u64, DetectionFrame)> {
    (from..to)
        .step_by(step as usize)
        .map(|ms| (ms, frame.clone()))
        .collect()
}

/// Landmark frames sampled every 50 ms: closed during each `[start, end)`
/// span, open otherwise, up to `until`.
pub fn blink_track(closed_spans: &[(u64, u64)], until: u64) -> Vec<(u64, DetectionFrame)> {
    (0..until)
        .step_by(50)
        .map(|ms| {
            let closed = closed_spans.iter().any(|&(s, e)| ms >= s && ms < e);
            let ratio = if closed { CLOSED_RATIO } else { OPEN_RATIO };
            (ms, landmark_frame(ratio))
        })
        .collect()
}
