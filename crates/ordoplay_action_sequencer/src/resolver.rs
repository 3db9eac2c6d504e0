// SPDX-License-Identifier: MIT OR Apache-2.0
//! Action resolution: run the named action, then dispatch its result.

use crate::action::ActionData;
use crate::dispatch::{dispatch, Effect, MarkerResolver, PlaybackControl};
use crate::registry::ActionRegistry;

/// How an action reference was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Blank action name, nothing ran
    Skipped,
    /// No behaviour is bound, nothing ran. Counts as a failure.
    Unbound,
    /// The action returned `true`
    Succeeded,
    /// The action returned `false` or was not found
    Failed,
}

/// Result of resolving one action reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Which branch was taken
    pub outcome: Outcome,
    /// What the dispatched behaviour did to playback
    pub effect: Effect,
}

impl Resolution {
    /// A resolution that ran nothing
    pub fn idle(outcome: Outcome) -> Self {
        Self {
            outcome,
            effect: Effect::None,
        }
    }

    /// Whether the action ran at all
    pub fn ran(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded | Outcome::Failed)
    }

    /// Whether the action reported success
    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }

    /// Whether the reference failed, including when no behaviour was bound
    pub fn failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed | Outcome::Unbound)
    }
}

/// Resolve an action reference against a registry.
///
/// Blank names are skipped and a missing registry resolves to nothing.
/// Otherwise the action runs and its success or failure behaviour is
/// dispatched to `controller`.
pub fn resolve(
    registry: Option<&ActionRegistry>,
    data: &ActionData,
    markers: &dyn MarkerResolver,
    controller: &mut dyn PlaybackControl,
) -> Resolution {
    if data.is_blank() {
        return Resolution::idle(Outcome::Skipped);
    }

    let Some(registry) = registry else {
        tracing::warn!("No action behaviour bound for {}", data.action_name);
        return Resolution::idle(Outcome::Unbound);
    };

    let succeeded = registry.invoke(&data.action_name);
    let outcome = if succeeded { Outcome::Succeeded } else { Outcome::Failed };
    tracing::debug!("Action {} resolved: {:?}", data.action_name, outcome);

    Resolution {
        outcome,
        effect: dispatch(data.behaviour_for(succeeded), markers, controller),
    }
}
