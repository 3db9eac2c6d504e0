// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline action dispatch for `OrdoPlay`.
//!
//! This crate lets a timeline drive gameplay code by name:
//! - Behaviours register named, boolean-returning actions
//! - Clips run start/update/end actions, markers run a single action
//! - Each action's success or failure picks a playback effect
//!   (jump to marker, pause, stop, resume)
//!
//! ## Architecture
//!
//! The dispatch core is built on:
//! - Per-component action registries with scoped names
//! - Behaviour groups that merge several registries into one
//! - A resolver that branches on the action result
//! - A dispatcher that applies the effect to the host's playback controller
//! - Clip playables that turn host lifecycle callbacks into resolutions
//!
//! The host timeline engine stays outside: it only has to implement
//! [`PlaybackControl`] and [`PlayableHost`] and forward its callbacks.

pub mod action;
pub mod binding;
pub mod dispatch;
pub mod error;
pub mod playable;
pub mod playback;
pub mod registry;
pub mod resolver;
pub mod scene;
pub mod settings;
pub mod timeline;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{ActionData, ResultBehaviour};
pub use binding::{BehaviourId, ObjectId};
pub use dispatch::{dispatch, Effect, MarkerResolver, PlaybackControl};
pub use error::{ActionError, ActionResult};
pub use playable::{approximately, ActionContext, ClipPlayable, ClipState, FrameInfo, PlayState};
pub use playback::{DirectorId, PlayableHost, PlaybackController, PlaybackState};
pub use registry::{ActionFn, ActionRegistry};
pub use resolver::{resolve, Outcome, Resolution};
pub use scene::{ActionBehaviour, BehaviourGroup, ComponentKind, Scene, SimulationState};
pub use settings::{ActionSettings, SettingsError};
pub use timeline::{ActionClip, ActionMarker, ActionTrack, ClipId, MarkerId, TimelineAsset, TrackId};
pub use validation::{
    action_choices, clip_diagnostic, marker_diagnostic, suggest_similar, verify_action, ClipDiagnostic,
};
