// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed-step playback of the demo timeline.
//!
//! Stands in for the host timeline engine: advances a [`PlaybackController`],
//! fires crossed markers and forwards clip enter/leave callbacks.

use crate::scenario::Scenario;
use ordoplay_action_sequencer::{
    ActionContext, ActionMarker, ClipPlayable, ClipState, FrameInfo, ObjectId, PlayState, PlaybackControl,
    PlaybackController, Resolution,
};

/// Summary of a playback run
#[derive(Debug, Clone, Default)]
pub struct PlaybackReport {
    /// Frames simulated
    pub frames: u32,
    /// Actions that actually ran
    pub actions_run: usize,
    /// References that failed or had no behaviour bound
    pub failures: usize,
    /// Jumps that moved the playhead
    pub jumps: u32,
    /// Whether the run hit the frame cap while still playing
    pub truncated: bool,
}

impl PlaybackReport {
    fn record(&mut self, resolution: &Resolution) {
        if resolution.ran() {
            self.actions_run += 1;
        }
        if resolution.failed() {
            self.failures += 1;
        }
    }
}

/// Play the scenario's timeline from the start at `frame_rate` frames per second
pub fn run(scenario: &mut Scenario, frame_rate: f64, max_frames: u32) -> (PlaybackReport, PlaybackController) {
    let delta_time = 1.0 / frame_rate;
    let mut controller = PlaybackController::new(scenario.timeline.duration);
    let mut playables: Vec<ClipPlayable> = scenario
        .timeline
        .tracks()
        .filter(|track| !track.muted)
        .flat_map(|track| {
            track.create_playables(&scenario.scene, scenario.director_object, scenario.scene.settings())
        })
        .collect();
    let mut report = PlaybackReport::default();

    tracing::info!(
        "Playing {} ({:.1}s, {} clips)",
        scenario.timeline.name,
        scenario.timeline.duration,
        playables.len()
    );
    controller.play();

    while controller.is_playing() {
        if report.frames >= max_frames {
            report.truncated = true;
            tracing::warn!("Stopping after {max_frames} frames");
            break;
        }
        report.frames += 1;

        let previous = controller.time;
        let evaluations = controller.evaluations();
        controller.update(delta_time);
        let now = controller.time;

        let jumped = fire_markers(scenario, &mut controller, previous, now, evaluations, &mut report)
            || step_clips(scenario, &mut controller, &mut playables, previous, now, delta_time, &mut report);

        if jumped {
            report.jumps += 1;
            tracing::debug!("Playhead moved to {:.3}s, rebuilding clip state", controller.time);
            playables.iter_mut().for_each(ClipPlayable::reset);
        }
    }

    (report, controller)
}

/// Markers crossed this frame with the object that receives them, in time order
fn crossed_markers(scenario: &Scenario, previous: f64, now: f64) -> Vec<(ObjectId, ActionMarker)> {
    let timeline = &scenario.timeline;
    let mut crossed: Vec<(ObjectId, ActionMarker)> = timeline
        .global_markers_between(previous, now)
        .map(|marker| (scenario.director_object, marker.clone()))
        .collect();

    for track in timeline.tracks().filter(|track| !track.muted) {
        let Some(object) = track.binding.and_then(|id| scenario.scene.owner(id)) else {
            continue;
        };
        crossed.extend(
            track
                .markers_between(previous, now)
                .map(|marker| (object, marker.clone())),
        );
    }

    crossed.sort_by(|a, b| a.1.time.total_cmp(&b.1.time));
    crossed
}

fn fire_markers(
    scenario: &mut Scenario,
    controller: &mut PlaybackController,
    previous: f64,
    now: f64,
    evaluations: u32,
    report: &mut PlaybackReport,
) -> bool {
    for (object, marker) in crossed_markers(scenario, previous, now) {
        tracing::debug!(
            "Marker {} reached on {}",
            marker.name,
            scenario.scene.object_name(object).unwrap_or("<unnamed>")
        );
        let resolutions = scenario
            .scene
            .broadcast_marker(object, &marker, &scenario.timeline, controller);
        resolutions.iter().for_each(|r| report.record(r));

        if controller.evaluations() != evaluations {
            return true;
        }
        if !controller.is_playing() {
            break;
        }
    }
    false
}

fn step_clips(
    scenario: &mut Scenario,
    controller: &mut PlaybackController,
    playables: &mut [ClipPlayable],
    previous: f64,
    now: f64,
    delta_time: f64,
    report: &mut PlaybackReport,
) -> bool {
    let evaluations = controller.evaluations();
    let playing = controller.is_playing();

    for playable in playables.iter_mut() {
        let (start, duration) = (playable.clip().start, playable.clip().duration);
        let inside = playing && now >= start && now < start + duration;
        let mut cx = ActionContext {
            scene: &mut scenario.scene,
            markers: &scenario.timeline,
            host: &mut *controller,
        };

        let mut resolutions = Vec::new();
        if inside {
            resolutions.extend(playable.on_behaviour_play(&mut cx));
            let frame = FrameInfo {
                time: now - start,
                duration,
                delta_time,
                effective_play_state: PlayState::Playing,
            };
            resolutions.extend(playable.process_frame(&mut cx, &frame));
        } else if playable.state() == ClipState::Active {
            let frame = FrameInfo {
                time: (now.max(previous) - start).clamp(0.0, duration),
                duration,
                delta_time,
                effective_play_state: PlayState::Paused,
            };
            resolutions.extend(playable.on_behaviour_pause(&mut cx, &frame));
        }
        resolutions.iter().for_each(|r| report.record(r));

        if controller.evaluations() != evaluations {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario;
    use ordoplay_action_sequencer::{ActionSettings, SimulationState};

    #[test]
    fn test_drill_rewinds_once_then_stops() {
        let settings = ActionSettings::default();
        let mut scenario = scenario::build(&settings).unwrap();
        let (report, controller) = run(&mut scenario, 30.0, 2000);

        assert!(!report.truncated);
        assert_eq!(report.jumps, 1);
        assert_eq!(report.failures, 1);
        assert_eq!(scenario.alarm_attempts.get(), 2);
        assert_eq!(scenario.gate_opened.get(), 2);
        assert!(!scenario.gate_open.get());
        assert!(!controller.is_playing());
        assert_eq!(controller.time, 0.0);
    }

    #[test]
    fn test_frame_cap_truncates() {
        let settings = ActionSettings::default();
        let mut scenario = scenario::build(&settings).unwrap();
        let (report, controller) = run(&mut scenario, 30.0, 10);

        assert!(report.truncated);
        assert_eq!(report.frames, 10);
        assert!(controller.is_playing());
        assert_eq!(scenario.gate_opened.get(), 0);
    }

    #[test]
    fn test_editing_scene_runs_no_clip_actions() {
        let settings = ActionSettings::default();
        let mut scenario = scenario::build(&settings).unwrap();
        scenario.scene.set_simulation(SimulationState::Editing);
        let (report, _) = run(&mut scenario, 30.0, 2000);

        assert_eq!(scenario.gate_opened.get(), 0);
        assert_eq!(report.jumps, 1);
    }
}
