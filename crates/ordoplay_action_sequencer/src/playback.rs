// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback directors and a reference playback controller.

use crate::dispatch::PlaybackControl;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a playback director
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectorId(pub Uuid);

impl DirectorId {
    /// Create a new random director ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DirectorId {
    fn default() -> Self {
        Self::new()
    }
}

/// The host's view of the directors driving a playable graph
pub trait PlayableHost {
    /// Director currently resolving the graph
    fn resolver(&self) -> Option<DirectorId>;

    /// Access a director's playback controls
    fn director_mut(&mut self, id: DirectorId) -> Option<&mut dyn PlaybackControl>;
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused
    Paused,
}

/// Single-director playback controller
#[derive(Debug, Clone)]
pub struct PlaybackController {
    /// Director ID
    pub id: DirectorId,
    /// Current playback time
    pub time: f64,
    /// Timeline duration
    pub duration: f64,
    /// Playback state
    pub state: PlaybackState,
    /// Playback speed multiplier
    pub speed: f64,
    /// Whether playback wraps at the end
    pub looping: bool,
    evaluations: u32,
}

impl PlaybackController {
    /// Create a stopped controller for a timeline of `duration` seconds
    pub fn new(duration: f64) -> Self {
        Self {
            id: DirectorId::new(),
            time: 0.0,
            duration,
            state: PlaybackState::Stopped,
            speed: 1.0,
            looping: false,
            evaluations: 0,
        }
    }

    /// Advance playback by `delta_time` seconds
    pub fn update(&mut self, delta_time: f64) {
        if self.state != PlaybackState::Playing {
            return;
        }

        self.time += delta_time * self.speed;
        if self.time >= self.duration {
            if self.looping && self.duration > 0.0 {
                self.time %= self.duration;
            } else {
                self.time = self.duration;
                self.state = PlaybackState::Stopped;
            }
        }
    }

    /// Number of forced evaluations so far
    pub fn evaluations(&self) -> u32 {
        self.evaluations
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl PlaybackControl for PlaybackController {
    fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.time = 0.0;
    }

    fn set_time(&mut self, time: f64) {
        self.time = time.clamp(0.0, self.duration);
    }

    fn evaluate(&mut self) {
        self.evaluations += 1;
        tracing::trace!("Evaluated timeline at {:.3}s", self.time);
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }
}

impl PlayableHost for PlaybackController {
    fn resolver(&self) -> Option<DirectorId> {
        Some(self.id)
    }

    fn director_mut(&mut self, id: DirectorId) -> Option<&mut dyn PlaybackControl> {
        if id == self.id {
            Some(self)
        } else {
            None
        }
    }
}
