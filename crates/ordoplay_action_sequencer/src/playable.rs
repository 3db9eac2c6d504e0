// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip playables: host lifecycle callbacks to action resolutions.
//!
//! The host creates one [`ClipPlayable`] per action clip (see
//! [`ActionTrack::create_playables`](crate::timeline::ActionTrack::create_playables))
//! and forwards its clip callbacks. Each playable tracks the occupancy of
//! its clip so the start and end actions run once per stay of the playhead.

use crate::action::ActionData;
use crate::binding::BehaviourId;
use crate::dispatch::MarkerResolver;
use crate::playback::{DirectorId, PlayableHost};
use crate::resolver::{Outcome, Resolution};
use crate::scene::Scene;
use crate::timeline::ActionClip;

/// Play state the host reports for a clip callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    /// The clip is being played
    #[default]
    Playing,
    /// The clip is paused or has been left
    Paused,
}

/// Per-callback timing reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInfo {
    /// Clip-local time
    pub time: f64,
    /// Clip duration
    pub duration: f64,
    /// Time since the previous callback
    pub delta_time: f64,
    /// Effective play state of the clip
    pub effective_play_state: PlayState,
}

/// Occupancy state of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipState {
    /// Never entered
    #[default]
    Idle,
    /// The playhead is inside the clip
    Active,
    /// Left or paused before the end; re-entry continues the occupancy
    Paused,
    /// End reached (or playhead jumped away); re-entry starts a new occupancy
    Finished,
}

/// Everything a clip callback needs to resolve actions
pub struct ActionContext<'a> {
    /// Behaviours and their registries
    pub scene: &'a mut Scene,
    /// Jump target lookup
    pub markers: &'a dyn MarkerResolver,
    /// Directors driving the graph
    pub host: &'a mut dyn PlayableHost,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Start,
    Update,
    End,
}

/// Whether two times are equal within a relative tolerance
pub fn approximately(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
}

/// Runtime instance of an action clip
#[derive(Debug, Clone)]
pub struct ClipPlayable {
    clip: ActionClip,
    behaviour: Option<BehaviourId>,
    state: ClipState,
    director: Option<DirectorId>,
    tolerance: f64,
}

impl ClipPlayable {
    /// Create a playable for a clip bound to `behaviour`
    pub fn new(clip: ActionClip, behaviour: Option<BehaviourId>, tolerance: f64) -> Self {
        Self {
            clip,
            behaviour,
            state: ClipState::Idle,
            director: None,
            tolerance,
        }
    }

    /// Authored clip data
    pub fn clip(&self) -> &ActionClip {
        &self.clip
    }

    /// Bound behaviour
    pub fn behaviour(&self) -> Option<BehaviourId> {
        self.behaviour
    }

    /// Occupancy state
    pub fn state(&self) -> ClipState {
        self.state
    }

    /// Director cached on first resolution
    pub fn director(&self) -> Option<DirectorId> {
        self.director
    }

    /// Forget occupancy and the cached director
    pub fn reset(&mut self) {
        self.state = ClipState::Idle;
        self.director = None;
    }

    /// Whether a pause callback means the clip reached its end.
    ///
    /// Either a paused clip whose next step would overshoot the duration, or
    /// a clip time approximately equal to the duration.
    pub fn reached_end(&self, frame: &FrameInfo) -> bool {
        let overshoot = frame.effective_play_state == PlayState::Paused
            && frame.time + frame.delta_time > frame.duration;
        overshoot || approximately(frame.time, frame.duration, self.tolerance)
    }

    /// The playhead entered the clip
    pub fn on_behaviour_play(&mut self, cx: &mut ActionContext<'_>) -> Option<Resolution> {
        if !cx.scene.is_running() {
            return None;
        }

        match self.state {
            ClipState::Active => None,
            ClipState::Paused => {
                self.state = ClipState::Active;
                None
            }
            ClipState::Idle | ClipState::Finished => {
                self.state = ClipState::Active;
                Some(self.run(cx, Slot::Start))
            }
        }
    }

    /// The clip was paused, left, or reached its end
    pub fn on_behaviour_pause(&mut self, cx: &mut ActionContext<'_>, frame: &FrameInfo) -> Option<Resolution> {
        if !cx.scene.is_running() || self.state != ClipState::Active {
            return None;
        }

        if !self.reached_end(frame) {
            self.state = ClipState::Paused;
            return None;
        }

        self.state = ClipState::Finished;
        tracing::trace!("Clip {:?} done", self.clip.id);
        Some(self.run(cx, Slot::End))
    }

    /// Per-frame update while the clip is active
    pub fn process_frame(&mut self, cx: &mut ActionContext<'_>, _frame: &FrameInfo) -> Option<Resolution> {
        if !cx.scene.is_running() || self.state != ClipState::Active {
            return None;
        }

        Some(self.run(cx, Slot::Update))
    }

    fn action(&self, slot: Slot) -> &ActionData {
        match slot {
            Slot::Start => &self.clip.start_action,
            Slot::Update => &self.clip.update_action,
            Slot::End => &self.clip.end_action,
        }
    }

    fn run(&mut self, cx: &mut ActionContext<'_>, slot: Slot) -> Resolution {
        if self.action(slot).is_blank() {
            return Resolution::idle(Outcome::Skipped);
        }

        if self.director.is_none() {
            self.director = cx.host.resolver();
        }
        let Some(controller) = self.director.and_then(|id| cx.host.director_mut(id)) else {
            tracing::warn!("No director available for clip {:?}", self.clip.id);
            return Resolution::idle(Outcome::Unbound);
        };

        let resolution = cx.scene.resolve(self.behaviour, self.action(slot), cx.markers, controller);

        // A jump leaves the clip; later callbacks this frame belong to no occupancy
        if resolution.effect.moved_playhead() {
            tracing::debug!("{:?} action of clip {:?} jumped, closing occupancy", slot, self.clip.id);
            self.state = ClipState::Finished;
        }
        resolution
    }
}
