// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene handles and track binding resolution.

use crate::scene::{ComponentKind, Scene};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scene object that owns behaviour components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Behaviour component (plain behaviour or group) attached to an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BehaviourId(pub Uuid);

impl BehaviourId {
    /// Create a new random behaviour ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BehaviourId {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Pick the component that should answer actions for an object.
    ///
    /// A group on the object wins over plain behaviours; otherwise the first
    /// behaviour component is used.
    pub fn desired_behaviour(&self, object: ObjectId) -> Option<BehaviourId> {
        let components = self.components_of(object);

        components
            .iter()
            .copied()
            .find(|id| matches!(self.kind(*id), Some(ComponentKind::Group(_))))
            .or_else(|| components.first().copied())
    }

    /// Resolve the component answering a track's actions.
    ///
    /// A bound track retargets to the bound component's owner object. An
    /// unbound track falls back to the director's object only when
    /// `use_global` is set (the global marker track).
    pub fn desired_behaviour_for_track(
        &self,
        director_object: ObjectId,
        binding: Option<BehaviourId>,
        use_global: bool,
    ) -> Option<BehaviourId> {
        let object = match binding.and_then(|id| self.owner(id)) {
            Some(owner) => owner,
            None if use_global => director_object,
            None => return None,
        };

        self.desired_behaviour(object)
    }
}
