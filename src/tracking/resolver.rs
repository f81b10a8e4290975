//! Eye identity resolution.
//!
//! The cascade detector emits unordered, unlabelled eye boxes and loses an
//! eye as soon as its lid closes. The resolver labels detections LEFT/RIGHT
//! from their x order, falls back to x proximity against the previous frame
//! when only one eye is visible, and treats a vanished eye as a closed one.

use serde::Serialize;

use crate::tracking::config::TrackingConfig;
use crate::tracking::types::{EyeDetection, EyeIdentity, EyeObservation, EyeState, MirrorPolarity};

/// Most recent observation per known identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EyeCache {
    left: Option<EyeObservation>,
    right: Option<EyeObservation>,
}

impl EyeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: EyeIdentity) -> Option<&EyeObservation> {
        match identity {
            EyeIdentity::Left => self.left.as_ref(),
            EyeIdentity::Right => self.right.as_ref(),
            EyeIdentity::Unknown => None,
        }
    }

    fn get_mut(&mut self, identity: EyeIdentity) -> Option<&mut EyeObservation> {
        match identity {
            EyeIdentity::Left => self.left.as_mut(),
            EyeIdentity::Right => self.right.as_mut(),
            EyeIdentity::Unknown => None,
        }
    }

    /// Store an observation under its identity. UNKNOWN observations are
    /// rejected and `false` is returned.
    pub fn insert(&mut self, observation: EyeObservation) -> bool {
        match observation.identity {
            EyeIdentity::Left => self.left = Some(observation),
            EyeIdentity::Right => self.right = Some(observation),
            EyeIdentity::Unknown => return false,
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn observations(&self) -> impl Iterator<Item = &EyeObservation> {
        self.left.iter().chain(self.right.iter())
    }

    fn close_all(&mut self) {
        for eye in self.left.iter_mut().chain(self.right.iter_mut()) {
            eye.mark_closed();
        }
    }
}

#[derive(Debug, Clone)]
pub struct EyeIdentityResolver {
    polarity: MirrorPolarity,
    match_threshold_px: f64,
    closed_ratio_threshold: f64,
}

impl EyeIdentityResolver {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            polarity: config.polarity,
            match_threshold_px: config.eye_match_threshold_px,
            closed_ratio_threshold: config.closed_ratio_threshold,
        }
    }

    /// Resolve this frame's detections against the cache, updating it.
    ///
    /// Returns the observations for this frame: both eyes when two or more
    /// were detected, the lone eye plus the eye forced closed when one was
    /// detected, and the cached eyes (now closed) when none were.
    pub fn resolve(
        &self,
        detections: &[EyeDetection],
        cache: &mut EyeCache,
    ) -> Vec<EyeObservation> {
        match detections {
            [] => {
                cache.close_all();
                tracing::trace!(
                    cached = cache.observations().count(),
                    "No eyes detected, closing cached eyes"
                );
                cache.observations().cloned().collect()
            }
            [single] => self.resolve_single(single, cache),
            [first, second, ..] => self.resolve_pair(first, second, cache),
        }
    }

    fn resolve_pair(
        &self,
        first: &EyeDetection,
        second: &EyeDetection,
        cache: &mut EyeCache,
    ) -> Vec<EyeObservation> {
        let (smaller, larger) = if first.position().x <= second.position().x {
            (first, second)
        } else {
            (second, first)
        };
        let (smaller_id, larger_id) = self.polarity.order();

        let pair = [
            EyeObservation::new(smaller_id, self.detected_state(smaller), *smaller),
            EyeObservation::new(larger_id, self.detected_state(larger), *larger),
        ];
        for eye in &pair {
            cache.insert(eye.clone());
        }
        pair.into()
    }

    fn resolve_single(&self, detection: &EyeDetection, cache: &mut EyeCache) -> Vec<EyeObservation> {
        let x = detection.position().x;

        let identity = cache
            .observations()
            .map(|cached| (cached.identity, (x - cached.position.x).abs()))
            .filter(|(_, diff)| *diff < self.match_threshold_px)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(identity, _)| identity)
            .unwrap_or(EyeIdentity::Unknown);

        let observation = EyeObservation::new(identity, self.detected_state(detection), *detection);
        let mut out = vec![observation.clone()];

        let Ok(other) = identity.opposite() else {
            tracing::debug!(x, "Single eye did not match any cached eye");
            return out;
        };

        cache.insert(observation);
        // 另一只眼消失，视为闭眼
        if let Some(other_eye) = cache.get_mut(other) {
            other_eye.mark_closed();
            out.push(other_eye.clone());
        }
        out
    }

    fn detected_state(&self, detection: &EyeDetection) -> EyeState {
        match detection.closeness_ratio() {
            Some(ratio) if ratio > self.closed_ratio_threshold => EyeState::Closed,
            _ => EyeState::Open,
        }
    }
}
