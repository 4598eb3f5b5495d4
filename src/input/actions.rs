//! User actions and the global key mapping

use serde::{Deserialize, Serialize};

/// Increment shortcuts offered to the user, in seconds
pub const INCREMENT_STEPS: [i64; 3] = [30, 60, 300];

/// A discrete user action delivered to the timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Action {
    SelectPreset(String),
    StartStop,
    Reset,
    Increment(i64),
    BeginEdit,
    PushDigit(char),
    Backspace,
    Submit,
    CancelEdit,
}

impl Action {
    /// Map a key press to an action.
    ///
    /// `key` uses DOM-style key names (`" "`, `"Enter"`, `"Escape"`,
    /// `"Backspace"`, `"7"`); `"Space"` is accepted as an alias for the space
    /// bar. Keys with no binding in the current mode map to `None`.
    pub fn from_key(key: &str, editing: bool) -> Option<Self> {
        let key = if key.eq_ignore_ascii_case("space") { " " } else { key };

        if !editing {
            return (key == " ").then_some(Action::StartStop);
        }

        match key {
            "Backspace" => Some(Action::Backspace),
            "Enter" | " " => Some(Action::Submit),
            "Escape" => Some(Action::CancelEdit),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(digit), None) if digit.is_ascii_digit() => Some(Action::PushDigit(digit)),
                    _ => None,
                }
            }
        }
    }

    /// Whether this action operates on the edit buffer
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Action::BeginEdit | Action::PushDigit(_) | Action::Backspace | Action::Submit | Action::CancelEdit
        )
    }

    /// Short name for logging and last-action tracking
    pub fn name(&self) -> &'static str {
        match self {
            Action::SelectPreset(_) => "select-preset",
            Action::StartStop => "start-stop",
            Action::Reset => "reset",
            Action::Increment(_) => "increment",
            Action::BeginEdit => "begin-edit",
            Action::PushDigit(_) => "push-digit",
            Action::Backspace => "backspace",
            Action::Submit => "submit",
            Action::CancelEdit => "cancel-edit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_toggles_outside_edit_mode() {
        assert_eq!(Action::from_key(" ", false), Some(Action::StartStop));
        assert_eq!(Action::from_key("Space", false), Some(Action::StartStop));
        assert_eq!(Action::from_key("5", false), None);
        assert_eq!(Action::from_key("Enter", false), None);
        assert_eq!(Action::from_key("Escape", false), None);
    }

    #[test]
    fn edit_mode_bindings() {
        assert_eq!(Action::from_key("7", true), Some(Action::PushDigit('7')));
        assert_eq!(Action::from_key("Backspace", true), Some(Action::Backspace));
        assert_eq!(Action::from_key("Enter", true), Some(Action::Submit));
        assert_eq!(Action::from_key(" ", true), Some(Action::Submit));
        assert_eq!(Action::from_key("Escape", true), Some(Action::CancelEdit));
    }

    #[test]
    fn unbound_keys_are_dropped() {
        for key in ["ArrowLeft", "ArrowUp", "a", "12", ""] {
            assert_eq!(Action::from_key(key, true), None, "key {key:?}");
        }
    }

    #[test]
    fn actions_serialize_tagged() {
        let json = serde_json::to_string(&Action::Increment(30)).unwrap();
        assert_eq!(json, r#"{"action":"increment","value":30}"#);
        let parsed: Action = serde_json::from_str(r#"{"action":"start_stop"}"#).unwrap();
        assert_eq!(parsed, Action::StartStop);
    }
}
