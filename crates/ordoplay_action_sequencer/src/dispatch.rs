// SPDX-License-Identifier: MIT OR Apache-2.0
//! Result behaviour dispatch against the host's playback controller.

use crate::action::ResultBehaviour;
use crate::timeline::MarkerId;

/// Playback primitives the host engine exposes to actions
pub trait PlaybackControl {
    /// Start playback from the current time
    fn play(&mut self);
    /// Pause playback, keeping the current time
    fn pause(&mut self);
    /// Resume paused playback
    fn resume(&mut self);
    /// Stop playback
    fn stop(&mut self);
    /// Move the playhead
    fn set_time(&mut self, time: f64);
    /// Re-evaluate the timeline at the current time
    fn evaluate(&mut self);
    /// Current playhead time in seconds
    fn time(&self) -> f64;
    /// Timeline duration in seconds
    fn duration(&self) -> f64;
    /// Whether playback is running
    fn is_playing(&self) -> bool;
}

/// Resolves marker handles to times at dispatch time
pub trait MarkerResolver {
    /// Time of a marker, or `None` if the handle is dangling
    fn marker_time(&self, id: MarkerId) -> Option<f64>;
}

/// Effect a dispatch had on playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Nothing was done
    None,
    /// Playback restarted from this time
    Jumped(f64),
    /// Jump target could not be resolved; nothing was done
    DanglingJump(MarkerId),
    /// Playback paused
    Paused,
    /// Playback stopped
    Stopped,
    /// Playback resumed
    Resumed,
}

impl Effect {
    /// Whether the playhead was moved
    pub fn moved_playhead(&self) -> bool {
        matches!(self, Self::Jumped(_))
    }
}

/// Apply a result behaviour to a playback controller.
///
/// A jump runs stop, seek, evaluate, play in that order so the timeline
/// state is consistent at the target before playback restarts.
pub fn dispatch(
    behaviour: ResultBehaviour,
    markers: &dyn MarkerResolver,
    controller: &mut dyn PlaybackControl,
) -> Effect {
    match behaviour {
        ResultBehaviour::None => Effect::None,
        ResultBehaviour::JumpToMarker(id) => {
            let Some(time) = markers.marker_time(id) else {
                tracing::warn!("Jump target marker {:?} not found, ignoring jump", id);
                return Effect::DanglingJump(id);
            };
            tracing::debug!("Jumping from {:.3}s to marker at {:.3}s", controller.time(), time);
            controller.stop();
            controller.set_time(time);
            controller.evaluate();
            controller.play();
            Effect::Jumped(time)
        }
        ResultBehaviour::Pause => {
            controller.pause();
            Effect::Paused
        }
        ResultBehaviour::Stop => {
            controller.stop();
            Effect::Stopped
        }
        ResultBehaviour::Resume => {
            controller.resume();
            Effect::Resumed
        }
    }
}
