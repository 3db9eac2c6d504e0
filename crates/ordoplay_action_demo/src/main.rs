// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` action demo
//!
//! Plays a short scripted timeline against a scene of action behaviours:
//! - A clip opens and closes a gate
//! - A marker triggers an alarm and rewinds to an earlier marker on failure
//! - A final marker stops playback
//!
//! Usage: `ordoplay_action_demo [settings.ron]`. Without an argument the
//! settings are read from `actions.ron` in the working directory, falling
//! back to defaults when the file is absent.

mod driver;
mod scenario;

use ordoplay_action_sequencer::settings::SETTINGS_FILE_NAME;
use ordoplay_action_sequencer::ActionSettings;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const FRAME_RATE: f64 = 30.0;
const MAX_FRAMES: u32 = 10_000;

fn main() {
    let settings_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(SETTINGS_FILE_NAME), PathBuf::from);
    let (settings, settings_error) = match ActionSettings::load(&settings_path) {
        Ok(settings) => (settings, None),
        Err(e) => (ActionSettings::default(), Some(e)),
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OrdoPlay action demo v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = settings_error {
        tracing::warn!("Failed to load {}: {e}. Using default settings", settings_path.display());
    }

    let mut scenario = match scenario::build(&settings) {
        Ok(scenario) => scenario,
        Err(e) => {
            tracing::error!("Failed to build scene: {e}");
            std::process::exit(1);
        }
    };

    let (report, controller) = driver::run(&mut scenario, FRAME_RATE, MAX_FRAMES);
    tracing::info!(
        "Finished after {} frames: {} actions run ({} failed), {} jumps, playhead at {:.3}s ({:?})",
        report.frames,
        report.actions_run,
        report.failures,
        report.jumps,
        controller.time,
        controller.state
    );
    tracing::info!(
        "Gate opened {} times (open now: {}), alarm attempts: {}",
        scenario.gate_opened.get(),
        scenario.gate_open.get(),
        scenario.alarm_attempts.get()
    );

    if report.truncated {
        std::process::exit(2);
    }
}
