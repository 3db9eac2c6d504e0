// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authored timeline data: action tracks, clips and markers.

use crate::action::ActionData;
use crate::binding::{BehaviourId, ObjectId};
use crate::dispatch::MarkerResolver;
use crate::playable::ClipPlayable;
use crate::scene::Scene;
use crate::settings::ActionSettings;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub Uuid);

impl MarkerId {
    /// Create a new random marker ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MarkerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub Uuid);

impl ClipId {
    /// Create a new random clip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time action on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMarker {
    /// Marker ID
    pub id: MarkerId,
    /// Display name, also used in the jump target picker
    pub name: String,
    /// Time of the marker
    pub time: f64,
    /// Action run when the marker fires
    pub action: ActionData,
}

impl ActionMarker {
    /// Create a marker
    pub fn new(name: impl Into<String>, time: f64, action: ActionData) -> Self {
        Self {
            id: MarkerId::new(),
            name: name.into(),
            time,
            action,
        }
    }
}

/// An interval with start, update and end actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionClip {
    /// Clip ID
    pub id: ClipId,
    /// Start time in the timeline
    pub start: f64,
    /// Clip length
    pub duration: f64,
    /// Run when the playhead enters the clip
    pub start_action: ActionData,
    /// Run when the clip reaches its end
    pub end_action: ActionData,
    /// Run every frame while the clip is active
    pub update_action: ActionData,
}

impl ActionClip {
    /// Create a clip without actions
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            id: ClipId::new(),
            start,
            duration,
            start_action: ActionData::default(),
            end_action: ActionData::default(),
            update_action: ActionData::default(),
        }
    }

    /// Set the start action
    pub fn with_start(mut self, action: ActionData) -> Self {
        self.start_action = action;
        self
    }

    /// Set the end action
    pub fn with_end(mut self, action: ActionData) -> Self {
        self.end_action = action;
        self
    }

    /// Set the update action
    pub fn with_update(mut self, action: ActionData) -> Self {
        self.update_action = action;
        self
    }

    /// End time in the timeline
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whether a timeline time falls inside the clip
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end()
    }

    /// Every action reference on the clip
    pub fn actions(&self) -> [&ActionData; 3] {
        [&self.start_action, &self.end_action, &self.update_action]
    }
}

/// A track of action clips and markers bound to a behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTrack {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Bound behaviour component
    pub binding: Option<BehaviourId>,
    /// Whether the track is muted
    pub muted: bool,
    /// Clips, sorted by start time
    pub clips: Vec<ActionClip>,
    /// Markers, sorted by time
    pub markers: Vec<ActionMarker>,
}

impl ActionTrack {
    /// Create a new track
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            binding: None,
            muted: false,
            clips: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Bind the track to a behaviour component
    pub fn bound_to(mut self, behaviour: BehaviourId) -> Self {
        self.binding = Some(behaviour);
        self
    }

    /// Add a clip
    pub fn add_clip(&mut self, clip: ActionClip) -> ClipId {
        let id = clip.id;
        self.clips.push(clip);
        self.clips.sort_by(|a, b| a.start.total_cmp(&b.start));
        id
    }

    /// Add a marker
    pub fn add_marker(&mut self, marker: ActionMarker) -> MarkerId {
        let id = marker.id;
        self.markers.push(marker);
        self.markers.sort_by(|a, b| a.time.total_cmp(&b.time));
        id
    }

    /// Clips covering a time
    pub fn clips_at(&self, time: f64) -> impl Iterator<Item = &ActionClip> {
        self.clips.iter().filter(move |c| c.contains(time))
    }

    /// Markers with `after < time <= until`
    pub fn markers_between(&self, after: f64, until: f64) -> impl Iterator<Item = &ActionMarker> {
        self.markers
            .iter()
            .filter(move |m| m.time > after && m.time <= until)
    }

    /// Time of the last clip end or marker
    pub fn content_duration(&self) -> f64 {
        let clips = self.clips.iter().map(ActionClip::end);
        let markers = self.markers.iter().map(|m| m.time);
        clips.chain(markers).fold(0.0, f64::max)
    }

    /// Resolve the bound behaviour once and create a playable per clip
    pub fn create_playables(
        &self,
        scene: &Scene,
        director_object: ObjectId,
        settings: &ActionSettings,
    ) -> Vec<ClipPlayable> {
        let behaviour = scene.desired_behaviour_for_track(director_object, self.binding, false);
        if behaviour.is_none() && !self.clips.is_empty() {
            tracing::warn!("Track {} has no action behaviour bound", self.name);
        }

        self.clips
            .iter()
            .map(|clip| ClipPlayable::new(clip.clone(), behaviour, settings.end_time_tolerance))
            .collect()
    }
}

/// An authored timeline of action tracks plus a global marker track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineAsset {
    /// Timeline name
    pub name: String,
    /// Timeline duration
    pub duration: f64,
    /// Action tracks
    tracks: IndexMap<TrackId, ActionTrack>,
    /// Markers on the global marker track
    pub markers: Vec<ActionMarker>,
}

impl TimelineAsset {
    /// Create an empty timeline
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            tracks: IndexMap::new(),
            markers: Vec::new(),
        }
    }

    /// Add a track
    pub fn add_track(&mut self, track: ActionTrack) -> TrackId {
        let id = track.id;
        self.tracks.insert(id, track);
        id
    }

    /// Get a track
    pub fn track(&self, track_id: TrackId) -> Option<&ActionTrack> {
        self.tracks.get(&track_id)
    }

    /// Get a mutable track
    pub fn track_mut(&mut self, track_id: TrackId) -> Option<&mut ActionTrack> {
        self.tracks.get_mut(&track_id)
    }

    /// Get all tracks
    pub fn tracks(&self) -> impl Iterator<Item = &ActionTrack> {
        self.tracks.values()
    }

    /// Add a marker to the global marker track
    pub fn add_marker(&mut self, marker: ActionMarker) -> MarkerId {
        let id = marker.id;
        self.markers.push(marker);
        self.markers.sort_by(|a, b| a.time.total_cmp(&b.time));
        id
    }

    /// All markers, global track first
    pub fn all_markers(&self) -> impl Iterator<Item = &ActionMarker> {
        self.markers
            .iter()
            .chain(self.tracks.values().flat_map(|t| t.markers.iter()))
    }

    /// Find a marker on any track
    pub fn marker(&self, id: MarkerId) -> Option<&ActionMarker> {
        self.all_markers().find(|m| m.id == id)
    }

    /// Global markers that can be picked as jump targets
    pub fn jump_targets<'a>(&'a self, settings: &'a ActionSettings) -> impl Iterator<Item = &'a ActionMarker> {
        self.markers
            .iter()
            .filter(move |m| m.name != settings.placeholder_marker_name)
    }

    /// Global markers with `after < time <= until`
    pub fn global_markers_between(&self, after: f64, until: f64) -> impl Iterator<Item = &ActionMarker> {
        self.markers
            .iter()
            .filter(move |m| m.time > after && m.time <= until)
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

impl MarkerResolver for TimelineAsset {
    fn marker_time(&self, id: MarkerId) -> Option<f64> {
        self.marker(id).map(|m| m.time)
    }
}
