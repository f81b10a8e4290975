//! Single-eye blink debouncer for the independent-eye click mode.
//!
//! Every (eye, state) pair keeps the instant the state was first seen and
//! whether its action already fired. An action fires once the state has
//! dwelt for the minimum time; firing re-arms the opposite state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::tracking::types::{EyeIdentity, EyeObservation, EyeState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlinkDwellRecord {
    pub action_taken: bool,
    pub since: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellAction {
    Press(EyeIdentity),
    Release(EyeIdentity),
}

#[derive(Debug, Clone)]
pub struct BlinkDebouncer {
    min_dwell: Duration,
    records: HashMap<(EyeIdentity, EyeState), BlinkDwellRecord>,
}

impl BlinkDebouncer {
    pub fn new(min_dwell: Duration) -> Self {
        Self {
            min_dwell,
            records: HashMap::new(),
        }
    }

    pub fn record(&self, identity: EyeIdentity, state: EyeState) -> BlinkDwellRecord {
        self.records
            .get(&(identity, state))
            .copied()
            .unwrap_or_default()
    }

    pub fn observe(&mut self, eye: &EyeObservation, now: Instant) -> Option<DwellAction> {
        self.observe_state(eye.identity, eye.state, now)
    }

    pub fn observe_state(
        &mut self,
        identity: EyeIdentity,
        state: EyeState,
        now: Instant,
    ) -> Option<DwellAction> {
        if !identity.is_known() {
            return None;
        }

        let record = self.records.entry((identity, state)).or_default();
        let Some(since) = record.since else {
            record.since = Some(now);
            return None;
        };

        let elapsed = now.saturating_duration_since(since);
        if elapsed < self.min_dwell || record.action_taken {
            return None;
        }

        record.action_taken = true;
        self.records
            .insert((identity, state.opposite()), BlinkDwellRecord::default());

        tracing::debug!(
            eye = %identity,
            state = %state,
            elapsed_ms = elapsed.as_millis() as u64,
            "Eye dwell reached"
        );

        Some(match state {
            EyeState::Closed => DwellAction::Press(identity),
            EyeState::Open => DwellAction::Release(identity),
        })
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }
}
