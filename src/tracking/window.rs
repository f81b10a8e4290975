//! Event-window blink aggregator.
//!
//! Short blinks are collected into a window that opens on the first blink
//! and is kept open a little longer by every further blink. When the
//! deadline passes, the number of blinks decides the pattern.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::tracking::config::TrackingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BlinkPattern {
    Single,
    Double,
    TripleOrMore,
}

impl BlinkPattern {
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            _ => Some(Self::TripleOrMore),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlinkEventWindow {
    base: Duration,
    extension: Duration,
    blinks: Vec<Instant>,
    deadline: Option<Instant>,
}

impl BlinkEventWindow {
    pub fn new(base: Duration, extension: Duration) -> Self {
        Self {
            base,
            extension,
            blinks: Vec::new(),
            deadline: None,
        }
    }

    pub fn from_config(config: &TrackingConfig) -> Self {
        Self::new(config.blink_window(), config.window_extension())
    }

    pub fn blinks(&self) -> &[Instant] {
        &self.blinks
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_open(&self) -> bool {
        self.deadline.is_some()
    }

    /// Record a qualifying blink, opening or extending the window.
    pub fn record(&mut self, now: Instant) {
        self.blinks.push(now);
        let deadline = match self.deadline {
            None => now + self.base,
            Some(current) => current.max(now + self.extension),
        };
        self.deadline = Some(deadline);
        tracing::trace!(count = self.blinks.len(), "Blink recorded in window");
    }

    /// Classify and clear the window once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<BlinkPattern> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }

        let pattern = BlinkPattern::from_count(self.blinks.len());
        if pattern.is_none() {
            tracing::debug!("Blink window closed without blinks");
        }
        self.clear();
        pattern
    }

    pub fn clear(&mut self) {
        self.blinks.clear();
        self.deadline = None;
    }
}
