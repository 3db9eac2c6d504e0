// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for action registration and scene wiring.

use crate::binding::BehaviourId;

/// Error raised while building action registries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The composed (scoped) action name is already registered
    #[error("Action already registered: {key}")]
    DuplicateAction {
        /// Fully scoped key that collided
        key: String,
    },

    /// A behaviour handle no longer points at a component
    #[error("Behaviour not found: {0:?}")]
    BehaviourNotFound(BehaviourId),

    /// A behaviour group contains itself, directly or through nested groups
    #[error("Behaviour group contains itself: {0:?}")]
    GroupCycle(BehaviourId),
}

/// Result alias for registry operations
pub type ActionResult<T> = Result<T, ActionError>;
