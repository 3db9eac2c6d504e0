// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authoring-time checks for action names on clips and markers.

use crate::action::ActionData;
use crate::binding::BehaviourId;
use crate::scene::Scene;
use crate::timeline::{ActionClip, ActionMarker};

/// Problem shown on a clip or marker in the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClipDiagnostic {
    /// The track has no behaviour to resolve against
    #[error("No Action Behaviour Found")]
    NoBehaviour,

    /// At least one action name is not registered
    #[error("Contains Invalid Action")]
    InvalidAction,
}

/// Whether an action reference names a registered action. Blank is valid.
pub fn verify_action(scene: &mut Scene, behaviour: BehaviourId, data: &ActionData) -> bool {
    data.is_blank() || scene.contains_action(behaviour, &data.action_name)
}

fn diagnose<'a>(
    scene: &mut Scene,
    behaviour: Option<BehaviourId>,
    mut actions: impl Iterator<Item = &'a ActionData>,
) -> Option<ClipDiagnostic> {
    let Some(behaviour) = behaviour.filter(|id| scene.kind(*id).is_some()) else {
        return Some(ClipDiagnostic::NoBehaviour);
    };

    if actions.all(|data| verify_action(scene, behaviour, data)) {
        None
    } else {
        Some(ClipDiagnostic::InvalidAction)
    }
}

/// Check a clip's start, end and update actions
pub fn clip_diagnostic(scene: &mut Scene, behaviour: Option<BehaviourId>, clip: &ActionClip) -> Option<ClipDiagnostic> {
    diagnose(scene, behaviour, clip.actions().into_iter())
}

/// Check a marker's action
pub fn marker_diagnostic(
    scene: &mut Scene,
    behaviour: Option<BehaviourId>,
    marker: &ActionMarker,
) -> Option<ClipDiagnostic> {
    diagnose(scene, behaviour, std::iter::once(&marker.action))
}

/// Registered action names offered in the action picker
pub fn action_choices(scene: &mut Scene, behaviour: BehaviourId) -> Vec<String> {
    scene.action_names(behaviour)
}

/// First candidate that contains the typed name or is contained by it,
/// ignoring case
pub fn suggest_similar<'a>(candidates: impl IntoIterator<Item = &'a str>, input: &str) -> Option<&'a str> {
    let target = input.trim().to_lowercase();
    if target.is_empty() {
        return None;
    }

    candidates.into_iter().find(|candidate| {
        let lowered = candidate.to_lowercase();
        lowered.contains(&target) || target.contains(&lowered)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ActionRegistry;
    use crate::scene::ActionBehaviour;
    use crate::settings::ActionSettings;
    use crate::ActionResult;

    struct DoorAction;

    impl ActionBehaviour for DoorAction {
        fn register_actions(&self, registry: &mut ActionRegistry) -> ActionResult<()> {
            registry.register("Open", || true)?;
            registry.register("Close", || true)
        }
    }

    fn scene() -> (Scene, BehaviourId) {
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Door");
        let door = scene.add_behaviour(object, DoorAction);
        (scene, door)
    }

    #[test]
    fn test_verify_action() {
        let (mut scene, door) = scene();
        assert!(verify_action(&mut scene, door, &ActionData::default()));
        assert!(verify_action(&mut scene, door, &ActionData::new("Door/Open")));
        assert!(!verify_action(&mut scene, door, &ActionData::new("Door/Slam")));
    }

    #[test]
    fn test_clip_diagnostic() {
        let (mut scene, door) = scene();
        let valid = ActionClip::new(0.0, 1.0).with_start(ActionData::new("Door/Open"));
        let invalid = valid.clone().with_end(ActionData::new("Open"));

        assert_eq!(clip_diagnostic(&mut scene, Some(door), &valid), None);
        assert_eq!(
            clip_diagnostic(&mut scene, Some(door), &invalid),
            Some(ClipDiagnostic::InvalidAction)
        );
        assert_eq!(clip_diagnostic(&mut scene, None, &valid), Some(ClipDiagnostic::NoBehaviour));
        assert_eq!(
            clip_diagnostic(&mut scene, Some(BehaviourId::new()), &valid),
            Some(ClipDiagnostic::NoBehaviour)
        );
        assert_eq!(ClipDiagnostic::InvalidAction.to_string(), "Contains Invalid Action");
    }

    #[test]
    fn test_marker_diagnostic() {
        let (mut scene, door) = scene();
        let marker = ActionMarker::new("Slam", 1.0, ActionData::new("Door/Slam"));
        assert_eq!(
            marker_diagnostic(&mut scene, Some(door), &marker),
            Some(ClipDiagnostic::InvalidAction)
        );
    }

    #[test]
    fn test_action_choices() {
        let (mut scene, door) = scene();
        assert_eq!(action_choices(&mut scene, door), vec!["Door/Open", "Door/Close"]);
        assert!(action_choices(&mut scene, BehaviourId::new()).is_empty());
    }

    #[test]
    fn test_suggest_similar() {
        let names = ["Door/Open", "Door/Close"];
        assert_eq!(suggest_similar(names, "open"), Some("Door/Open"));
        assert_eq!(suggest_similar(names, "Level/Door/Close"), Some("Door/Close"));
        assert_eq!(suggest_similar(names, "Slam"), None);
        assert_eq!(suggest_similar(names, "  "), None);
    }
}
