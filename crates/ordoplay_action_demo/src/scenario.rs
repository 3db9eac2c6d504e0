// SPDX-License-Identifier: MIT OR Apache-2.0
//! The demo scene: a gate and an alarm on one object, answered through a group.

use ordoplay_action_sequencer::{
    clip_diagnostic, marker_diagnostic, ActionBehaviour, ActionClip, ActionData, ActionMarker, ActionRegistry,
    ActionResult, ActionSettings, ActionTrack, ObjectId, ResultBehaviour, Scene, SimulationState, TimelineAsset,
};
use std::cell::Cell;
use std::rc::Rc;

/// Opens and closes a gate
pub struct GateAction {
    open: Rc<Cell<bool>>,
    opened: Rc<Cell<u32>>,
}

impl ActionBehaviour for GateAction {
    fn register_actions(&self, registry: &mut ActionRegistry) -> ActionResult<()> {
        let open = self.open.clone();
        let opened = self.opened.clone();
        registry.register_infallible("Open", move || {
            open.set(true);
            opened.set(opened.get() + 1);
            tracing::info!("Gate opened");
        })?;

        let open = self.open.clone();
        registry.register("Close", move || {
            tracing::info!("Gate closed");
            open.replace(false)
        })
    }
}

/// An alarm that fails to trigger on its first attempt
pub struct AlarmAction {
    attempts: Rc<Cell<u32>>,
}

impl ActionBehaviour for AlarmAction {
    fn register_actions(&self, registry: &mut ActionRegistry) -> ActionResult<()> {
        let attempts = self.attempts.clone();
        registry.register("Trigger", move || {
            attempts.set(attempts.get() + 1);
            let armed = attempts.get() > 1;
            if armed {
                tracing::info!("Alarm triggered");
            } else {
                tracing::warn!("Alarm not armed yet, rewinding");
            }
            armed
        })?;

        registry.register_infallible("Silence", || tracing::info!("Alarm silenced"))
    }
}

/// Scene, timeline and the observable state of the demo behaviours
pub struct Scenario {
    pub scene: Scene,
    pub timeline: TimelineAsset,
    /// Object carrying the director
    pub director_object: ObjectId,
    pub gate_open: Rc<Cell<bool>>,
    pub gate_opened: Rc<Cell<u32>>,
    pub alarm_attempts: Rc<Cell<u32>>,
}

/// Build the scene and its timeline and enter simulation
pub fn build(settings: &ActionSettings) -> ActionResult<Scenario> {
    let gate_open = Rc::new(Cell::new(false));
    let gate_opened = Rc::new(Cell::new(0));
    let alarm_attempts = Rc::new(Cell::new(0));

    let mut scene = Scene::new(settings.clone());
    let stage = scene.add_object("Stage");
    let group = scene.add_group(stage, Vec::new());
    let gate = scene.add_behaviour(
        stage,
        GateAction {
            open: gate_open.clone(),
            opened: gate_opened.clone(),
        },
    );
    scene.add_behaviour(
        stage,
        AlarmAction {
            attempts: alarm_attempts.clone(),
        },
    );
    scene.resync_group(group)?;

    let mut timeline = TimelineAsset::new("Gate Drill", 8.0);
    let rewind = timeline.add_marker(ActionMarker::new("Rewind", 1.0, ActionData::default()));
    timeline.add_marker(ActionMarker::new(
        "Finale",
        7.5,
        ActionData::new("Alarm/Silence").on_success(ResultBehaviour::Stop),
    ));

    let track_id = timeline.add_track(ActionTrack::new("Gate").bound_to(gate));
    if let Some(track) = timeline.track_mut(track_id) {
        track.add_clip(
            ActionClip::new(2.0, 2.0)
                .with_start(ActionData::new("Gate/Open"))
                .with_end(ActionData::new("Gate/Close")),
        );
        track.add_marker(ActionMarker::new(
            "Alarm",
            5.0,
            ActionData::new("Alarm/Trigger").on_failure(ResultBehaviour::JumpToMarker(rewind)),
        ));
    }

    if let Some(track) = timeline.track(track_id) {
        tracing::info!(
            "Track {} bound to {}: {} clips, {} markers",
            track.name,
            scene.object_name(stage).unwrap_or("<none>"),
            track.clips.len(),
            track.markers.len()
        );
    }

    report_diagnostics(&mut scene, &timeline, stage);
    scene.set_simulation(SimulationState::Running);

    Ok(Scenario {
        scene,
        timeline,
        director_object: stage,
        gate_open,
        gate_opened,
        alarm_attempts,
    })
}

fn report_diagnostics(scene: &mut Scene, timeline: &TimelineAsset, director_object: ObjectId) {
    let global = scene.desired_behaviour_for_track(director_object, None, true);
    for marker in &timeline.markers {
        if let Some(problem) = marker_diagnostic(scene, global, marker) {
            tracing::warn!("Marker {}: {problem}", marker.name);
        }
    }

    for track in timeline.tracks() {
        if track.content_duration() > timeline.duration {
            tracing::warn!(
                "Track {} runs to {:.2}s, past the timeline end at {:.2}s",
                track.name,
                track.content_duration(),
                timeline.duration
            );
        }

        let behaviour = scene.desired_behaviour_for_track(director_object, track.binding, false);
        for clip in &track.clips {
            if let Some(problem) = clip_diagnostic(scene, behaviour, clip) {
                tracing::warn!("Clip at {:.2}s on {}: {problem}", clip.start, track.name);
            }
        }
        for marker in &track.markers {
            tracing::debug!(
                "Marker {} at {:.2}s runs {} (success: {}, failure: {})",
                marker.name,
                marker.time,
                marker.action.action_name,
                marker.action.success.name(),
                marker.action.failure.name()
            );
            if let Some(problem) = marker_diagnostic(scene, behaviour, marker) {
                tracing::warn!("Marker {} on {}: {problem}", marker.name, track.name);
            }
        }
    }
}
