//! Wrist tilt to cursor delta mapping.
//!
//! Samples arrive as angular rates in sensor units. They are scaled by 1000,
//! the second axis inverted, the first sample taken as the resting origin,
//! a symmetric dead-zone applied and the result divided down by the
//! sensitivity.

use serde::{Deserialize, Serialize};

const SCALE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone)]
pub struct MotionMapper {
    dead_zone: f64,
    divisor: f64,
    origin: Option<(f64, f64)>,
}

impl MotionMapper {
    /// `sensitivity` is clamped to 1..=1000; the divisor is `1000 / sensitivity`.
    pub fn new(dead_zone: u32, sensitivity: u32) -> Self {
        let sensitivity = sensitivity.clamp(1, 1000);
        Self {
            dead_zone: f64::from(dead_zone),
            divisor: f64::from(1000 / sensitivity),
            origin: None,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.origin.is_some()
    }

    pub fn recalibrate(&mut self) {
        self.origin = None;
    }

    /// Map a sample to an integer (dx, dy). The first sample calibrates and
    /// always maps to (0, 0).
    pub fn map(&mut self, sample: MotionSample) -> (i32, i32) {
        let x = sample.x * SCALE;
        let y = -sample.y * SCALE;

        let Some((ox, oy)) = self.origin else {
            self.origin = Some((x, y));
            return (0, 0);
        };

        (self.axis(x - ox), self.axis(y - oy))
    }

    fn axis(&self, value: f64) -> i32 {
        let outside = if value.abs() < self.dead_zone {
            0.0
        } else {
            value - self.dead_zone.copysign(value)
        };
        (outside / self.divisor).trunc() as i32
    }
}
