// SPDX-License-Identifier: MIT OR Apache-2.0
//! Test doubles shared by the unit tests.

use crate::dispatch::{MarkerResolver, PlaybackControl};
use crate::playback::{DirectorId, PlayableHost};
use crate::timeline::MarkerId;
use std::collections::HashMap;

/// A recorded playback primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    Play,
    Pause,
    Resume,
    Stop,
    SetTime(f64),
    Evaluate,
}

/// Controller that records every primitive in order
#[derive(Debug)]
pub struct RecordingController {
    pub id: DirectorId,
    pub time: f64,
    pub duration: f64,
    pub playing: bool,
    pub calls: Vec<Call>,
}

impl RecordingController {
    pub fn at(time: f64) -> Self {
        Self {
            id: DirectorId::new(),
            time,
            duration: 10.0,
            playing: true,
            calls: Vec::new(),
        }
    }
}

impl PlaybackControl for RecordingController {
    fn play(&mut self) {
        self.playing = true;
        self.calls.push(Call::Play);
    }

    fn pause(&mut self) {
        self.playing = false;
        self.calls.push(Call::Pause);
    }

    fn resume(&mut self) {
        self.playing = true;
        self.calls.push(Call::Resume);
    }

    fn stop(&mut self) {
        self.playing = false;
        self.calls.push(Call::Stop);
    }

    fn set_time(&mut self, time: f64) {
        self.time = time;
        self.calls.push(Call::SetTime(time));
    }

    fn evaluate(&mut self) {
        self.calls.push(Call::Evaluate);
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

impl PlayableHost for RecordingController {
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

/// Marker table keyed by handle
#[derive(Debug, Default)]
pub struct Markers(pub HashMap<MarkerId, f64>);

impl Markers {
    pub fn with(id: MarkerId, time: f64) -> Self {
        Self(HashMap::from([(id, time)]))
    }
}

impl MarkerResolver for Markers {
    fn marker_time(&self, id: MarkerId) -> Option<f64> {
        self.0.get(&id).copied()
    }
}
