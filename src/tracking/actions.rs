use std::fmt;

use serde::Serialize;

use crate::tracking::combined::BlinkGesture;
use crate::tracking::debounce::DwellAction;
use crate::tracking::types::EyeIdentity;
use crate::tracking::window::BlinkPattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseButton {
    Left,
    Right,
}

/// Discrete action delivered to the pointing device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "action", content = "button")]
pub enum PointerAction {
    Press(MouseButton),
    Release(MouseButton),
    Click(MouseButton),
    DoubleClick(MouseButton),
}

impl fmt::Display for PointerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (verb, button) = match self {
            Self::Press(b) => ("press", b),
            Self::Release(b) => ("release", b),
            Self::Click(b) => ("click", b),
            Self::DoubleClick(b) => ("double-click", b),
        };
        let button = match button {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
        };
        write!(f, "{verb} {button}")
    }
}

/// Maps classifier outputs to pointer actions.
pub struct ActionMap;

impl ActionMap {
    pub fn button_for(identity: EyeIdentity) -> Option<MouseButton> {
        match identity {
            EyeIdentity::Left => Some(MouseButton::Left),
            EyeIdentity::Right => Some(MouseButton::Right),
            EyeIdentity::Unknown => None,
        }
    }

    pub fn from_dwell(action: DwellAction) -> Option<PointerAction> {
        match action {
            DwellAction::Press(eye) => Self::button_for(eye).map(PointerAction::Press),
            DwellAction::Release(eye) => Self::button_for(eye).map(PointerAction::Release),
        }
    }

    pub fn from_gesture(gesture: BlinkGesture) -> PointerAction {
        match gesture {
            BlinkGesture::ShortBlink { .. } => PointerAction::Click(MouseButton::Left),
            BlinkGesture::LongHold { .. } => PointerAction::Click(MouseButton::Right),
        }
    }

    pub fn from_pattern(pattern: BlinkPattern) -> PointerAction {
        match pattern {
            BlinkPattern::Single => PointerAction::Click(MouseButton::Left),
            BlinkPattern::Double => PointerAction::DoubleClick(MouseButton::Left),
            BlinkPattern::TripleOrMore => PointerAction::Click(MouseButton::Right),
        }
    }
}

/// Buttons currently held down by press actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedButtons {
    left: bool,
    right: bool,
}

impl PressedButtons {
    fn slot(&mut self, button: MouseButton) -> &mut bool {
        match button {
            MouseButton::Left => &mut self.left,
            MouseButton::Right => &mut self.right,
        }
    }

    pub fn track(&mut self, action: PointerAction) {
        match action {
            PointerAction::Press(b) => *self.slot(b) = true,
            PointerAction::Release(b) => *self.slot(b) = false,
            PointerAction::Click(_) | PointerAction::DoubleClick(_) => {}
        }
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
        }
    }

    /// Release actions for every held button, clearing the set.
    pub fn release_all(&mut self) -> Vec<PointerAction> {
        let mut out = Vec::new();
        for button in [MouseButton::Left, MouseButton::Right] {
            let slot = self.slot(button);
            if *slot {
                *slot = false;
                out.push(PointerAction::Release(button));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dwell_actions_map_to_eye_buttons() {
        assert_eq!(
            ActionMap::from_dwell(DwellAction::Press(EyeIdentity::Right)),
            Some(PointerAction::Press(MouseButton::Right))
        );
        assert_eq!(ActionMap::from_dwell(DwellAction::Press(EyeIdentity::Unknown)), None);
    }

    #[test]
    fn release_all_only_releases_held_buttons() {
        let mut pressed = PressedButtons::default();
        pressed.track(PointerAction::Press(MouseButton::Left));
        pressed.track(PointerAction::Press(MouseButton::Right));
        pressed.track(PointerAction::Release(MouseButton::Right));

        assert_eq!(
            pressed.release_all(),
            vec![PointerAction::Release(MouseButton::Left)]
        );
        assert!(pressed.release_all().is_empty());
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(
            PointerAction::DoubleClick(MouseButton::Left).to_string(),
            "double-click left"
        );
    }
}
