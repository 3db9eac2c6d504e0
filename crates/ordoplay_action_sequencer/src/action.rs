// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authored action references and their result behaviours.

use crate::timeline::MarkerId;
use serde::{Deserialize, Serialize};

/// Playback effect applied after an action has run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResultBehaviour {
    /// Leave playback alone
    #[default]
    None,
    /// Restart playback from a marker's time
    JumpToMarker(MarkerId),
    /// Pause playback
    Pause,
    /// Stop playback
    Stop,
    /// Resume paused playback
    Resume,
}

impl ResultBehaviour {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::JumpToMarker(_) => "Jump To Marker",
            Self::Pause => "Pause",
            Self::Stop => "Stop",
            Self::Resume => "Resume",
        }
    }

    /// Marker targeted by this behaviour, if any
    pub fn jump_target(&self) -> Option<MarkerId> {
        match self {
            Self::JumpToMarker(id) => Some(*id),
            _ => None,
        }
    }
}

/// An action name bound to success and failure behaviours
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionData {
    /// Scoped action name, blank for "do nothing"
    pub action_name: String,
    /// Applied when the action returns `true`
    pub success: ResultBehaviour,
    /// Applied when the action returns `false` or is missing
    pub failure: ResultBehaviour,
}

impl ActionData {
    /// Create an action reference with no result behaviours
    pub fn new(action_name: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            success: ResultBehaviour::None,
            failure: ResultBehaviour::None,
        }
    }

    /// Set the success behaviour
    pub fn on_success(mut self, behaviour: ResultBehaviour) -> Self {
        self.success = behaviour;
        self
    }

    /// Set the failure behaviour
    pub fn on_failure(mut self, behaviour: ResultBehaviour) -> Self {
        self.failure = behaviour;
        self
    }

    /// Whether the name is blank and resolution should be skipped
    pub fn is_blank(&self) -> bool {
        self.action_name.trim().is_empty()
    }

    /// Behaviour to apply for an action result
    pub fn behaviour_for(&self, succeeded: bool) -> ResultBehaviour {
        if succeeded {
            self.success
        } else {
            self.failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_names() {
        assert!(ActionData::default().is_blank());
        assert!(ActionData::new("   \t").is_blank());
        assert!(!ActionData::new("Door/Open").is_blank());
    }

    #[test]
    fn test_behaviour_for_result() {
        let target = MarkerId::new();
        let data = ActionData::new("Door/Open")
            .on_success(ResultBehaviour::JumpToMarker(target))
            .on_failure(ResultBehaviour::Pause);

        assert_eq!(data.behaviour_for(true), ResultBehaviour::JumpToMarker(target));
        assert_eq!(data.behaviour_for(false), ResultBehaviour::Pause);
        assert_eq!(data.success.jump_target(), Some(target));
        assert_eq!(data.failure.jump_target(), None);
    }
}
