use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::tracking::actions::{ActionMap, PointerAction, PressedButtons};
use crate::tracking::combined::{BlinkGesture, CombinedBlinkClassifier};
use crate::tracking::config::{ClickMode, TrackingConfig};
use crate::tracking::debounce::BlinkDebouncer;
use crate::tracking::resolver::{EyeCache, EyeIdentityResolver};
use crate::tracking::types::{
    BoundingBox, DetectionFrame, EyeIdentity, EyeObservation, EyeState, TrackingError,
};
use crate::tracking::window::BlinkEventWindow;

/// Read-only view of the session after a tick, for overlays and logs.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub session_id: Uuid,
    pub frame: u64,
    /// Wall-clock time the last frame went through `tick`.
    pub processed_at: Option<DateTime<Utc>>,
    pub face: Option<BoundingBox>,
    pub eyes: Vec<EyeObservation>,
    pub combined_state: Option<EyeState>,
    pub pending_blinks: usize,
    pub last_action: Option<PointerAction>,
}

#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub actions: Vec<PointerAction>,
    pub snapshot: FrameSnapshot,
}

/// All per-session perceptual state. One tick processes one detection frame.
#[derive(Debug)]
pub struct TrackingSession {
    id: Uuid,
    mode: ClickMode,
    resolver: EyeIdentityResolver,
    cache: EyeCache,
    debouncer: BlinkDebouncer,
    classifier: CombinedBlinkClassifier,
    window: BlinkEventWindow,
    pressed: PressedButtons,
    frame_count: u64,
    processed_at: Option<DateTime<Utc>>,
    face: Option<BoundingBox>,
    eyes: Vec<EyeObservation>,
    last_action: Option<PointerAction>,
}

impl TrackingSession {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode: config.click_mode,
            resolver: EyeIdentityResolver::new(config),
            cache: EyeCache::new(),
            debouncer: BlinkDebouncer::new(config.eye_dwell()),
            classifier: CombinedBlinkClassifier::new(config),
            window: BlinkEventWindow::from_config(config),
            pressed: PressedButtons::default(),
            frame_count: 0,
            processed_at: None,
            face: None,
            eyes: Vec::new(),
            last_action: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> ClickMode {
        self.mode
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn cache(&self) -> &EyeCache {
        &self.cache
    }

    pub fn window(&self) -> &BlinkEventWindow {
        &self.window
    }

    pub fn pressed(&self) -> &PressedButtons {
        &self.pressed
    }

    pub fn tick(&mut self, frame: &DetectionFrame, now: Instant) -> TickOutcome {
        self.frame_count += 1;
        self.processed_at = Some(Utc::now());
        self.face = frame.face;

        let mut actions = Vec::new();

        // 没有检测到人脸时保留眼睛缓存不变
        if frame.face.is_some() {
            self.eyes = self.resolver.resolve(&frame.eyes, &mut self.cache);
            match self.mode {
                ClickMode::Independent => self.debounce_eyes(now, &mut actions),
                ClickMode::Combined | ClickMode::Windowed => {
                    self.classify_pair(now, &mut actions)
                }
            }
        } else {
            self.eyes.clear();
        }

        if self.mode == ClickMode::Windowed {
            if let Some(pattern) = self.window.poll(now) {
                tracing::info!(?pattern, "Blink pattern classified");
                actions.push(ActionMap::from_pattern(pattern));
            }
        }

        for action in &actions {
            self.pressed.track(*action);
            tracing::info!(action = %action, frame = self.frame_count, "Pointer action");
        }
        if let Some(last) = actions.last() {
            self.last_action = Some(*last);
        }

        TickOutcome {
            actions,
            snapshot: self.snapshot(),
        }
    }

    fn debounce_eyes(&mut self, now: Instant, actions: &mut Vec<PointerAction>) {
        for eye in &self.eyes {
            if !eye.identity.is_known() {
                continue;
            }
            if let Some(action) = self
                .debouncer
                .observe(eye, now)
                .and_then(ActionMap::from_dwell)
            {
                actions.push(action);
            }
        }
    }

    fn classify_pair(&mut self, now: Instant, actions: &mut Vec<PointerAction>) {
        let (left, right) = match pair_ratios(&self.eyes) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::trace!(
                    frame = self.frame_count,
                    error = %e,
                    "Skipping combined classification"
                );
                return;
            }
        };

        let Some(gesture) = self.classifier.update(left, right, now) else {
            return;
        };
        tracing::debug!(?gesture, "Combined blink gesture");

        match (self.mode, gesture) {
            (ClickMode::Windowed, BlinkGesture::ShortBlink { .. }) => self.window.record(now),
            _ => actions.push(ActionMap::from_gesture(gesture)),
        }
    }

    /// Release every button still held by a press. Used on shutdown.
    pub fn release_all(&mut self) -> Vec<PointerAction> {
        let releases = self.pressed.release_all();
        if !releases.is_empty() {
            tracing::info!(count = releases.len(), "Releasing held buttons");
            self.last_action = releases.last().copied();
        }
        releases
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            session_id: self.id,
            frame: self.frame_count,
            processed_at: self.processed_at,
            face: self.face,
            eyes: self.eyes.clone(),
            combined_state: self.classifier.state().map(|s| s.state),
            pending_blinks: self.window.blinks().len(),
            last_action: self.last_action,
        }
    }
}

fn pair_ratios(eyes: &[EyeObservation]) -> Result<(f64, f64), TrackingError> {
    let ratio_of = |identity: EyeIdentity| {
        eyes.iter()
            .find(|e| e.identity == identity)
            .and_then(|e| e.closeness_ratio)
            .ok_or(TrackingError::RatioUnavailable(identity))
    };
    Ok((ratio_of(EyeIdentity::Left)?, ratio_of(EyeIdentity::Right)?))
}
