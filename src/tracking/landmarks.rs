//! Eye closeness ratio from facial landmarks.
//!
//! The ratio is the inverse of the usual eye aspect ratio: horizontal
//! eye-corner distance divided by the vertical eyelid gap, so it grows as
//! the lid closes.
//! - p0, p3: eye corners
//! - p1, p2: upper lid
//! - p5, p4: lower lid, paired with p1 and p2

use std::ops::Range;

use crate::tracking::types::{BoundingBox, DetectionFrame, EyeDetection, EyeLandmarks, Point};

/// Number of points in the 68-point face landmark layout.
pub const FACE_LANDMARK_COUNT: usize = 68;

/// Landmark index ranges of the two eyes in the 68-point layout, in image order.
pub const EYE_LANDMARK_RANGES: [Range<usize>; 2] = [36..42, 42..48];

const MIN_LID_GAP: f64 = 1e-6;

pub fn closeness_ratio(points: &[Point; 6]) -> f64 {
    let horizontal = points[0].distance(&points[3]);

    let upper = points[1].midpoint(&points[2]);
    let lower = points[5].midpoint(&points[4]);
    let vertical = upper.distance(&lower);

    // 眼睑完全闭合时垂直距离为 0
    if vertical < MIN_LID_GAP {
        return f64::INFINITY;
    }

    horizontal / vertical
}

/// Extract both 6-point eye groups from a 68-point face landmark set.
pub fn eye_groups(face_landmarks: &[Point]) -> Option<[EyeLandmarks; 2]> {
    if face_landmarks.len() < FACE_LANDMARK_COUNT {
        return None;
    }

    let group = |range: &Range<usize>| -> EyeLandmarks {
        let mut points = [Point::default(); 6];
        points.copy_from_slice(&face_landmarks[range.clone()]);
        EyeLandmarks::new(points)
    };

    Some([group(&EYE_LANDMARK_RANGES[0]), group(&EYE_LANDMARK_RANGES[1])])
}

impl DetectionFrame {
    /// Build a landmark-mode frame. A landmark set that is too short yields a
    /// frame with the face but no eyes.
    pub fn from_face_landmarks(face: BoundingBox, face_landmarks: &[Point]) -> Self {
        let eyes = eye_groups(face_landmarks)
            .map(|groups| groups.into_iter().map(EyeDetection::Landmarks).collect())
            .unwrap_or_default();

        Self {
            face: Some(face),
            eyes,
        }
    }
}
