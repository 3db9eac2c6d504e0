// SPDX-License-Identifier: MIT OR Apache-2.0
//! Behaviour components, groups and their action registries.
//!
//! The scene owns every behaviour component. Groups refer to their members
//! by handle only, so removing a member leaves a dangling handle that is
//! skipped on the next initialization.

use crate::action::ActionData;
use crate::binding::{BehaviourId, ObjectId};
use crate::dispatch::{MarkerResolver, PlaybackControl};
use crate::error::{ActionError, ActionResult};
use crate::registry::{ActionFn, ActionRegistry};
use crate::resolver::{self, Outcome, Resolution};
use crate::settings::ActionSettings;
use crate::timeline::ActionMarker;
use indexmap::IndexMap;
use std::rc::Rc;

/// Gameplay code that exposes named actions to the timeline
pub trait ActionBehaviour {
    /// Type name used to derive the default action scope
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Register every action this behaviour offers.
    ///
    /// Called on each activation with an empty registry.
    fn register_actions(&self, registry: &mut ActionRegistry) -> ActionResult<()>;
}

/// Whether gameplay is running or the scene is being authored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationState {
    /// Authoring: clip actions are not resolved
    #[default]
    Editing,
    /// Gameplay is running
    Running,
}

/// Ordered set of member behaviours presenting one merged registry
#[derive(Debug, Clone, Default)]
pub struct BehaviourGroup {
    /// Member handles, not owned
    pub members: Vec<BehaviourId>,
}

/// What a component contributes to its registry
pub enum ComponentKind {
    /// Plain behaviour with its own registration hook
    Behaviour(Box<dyn ActionBehaviour>),
    /// Group merging its members' registries
    Group(BehaviourGroup),
}

struct Component {
    owner: ObjectId,
    kind: ComponentKind,
    registry: ActionRegistry,
    suppressed: bool,
}

#[derive(Debug, Default)]
struct SceneObject {
    name: String,
    components: Vec<BehaviourId>,
}

/// Scene objects and the behaviour components attached to them
pub struct Scene {
    settings: ActionSettings,
    simulation: SimulationState,
    objects: IndexMap<ObjectId, SceneObject>,
    components: IndexMap<BehaviourId, Component>,
}

impl Scene {
    /// Create an empty scene in editing state
    pub fn new(settings: ActionSettings) -> Self {
        Self {
            settings,
            simulation: SimulationState::Editing,
            objects: IndexMap::new(),
            components: IndexMap::new(),
        }
    }

    /// Runtime settings
    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    /// Current simulation state
    pub fn simulation(&self) -> SimulationState {
        self.simulation
    }

    /// Whether gameplay is running
    pub fn is_running(&self) -> bool {
        self.simulation == SimulationState::Running
    }

    /// Switch simulation state.
    ///
    /// Entering `Running` activates every component so groups suppress their
    /// members before the first marker fires.
    pub fn set_simulation(&mut self, state: SimulationState) {
        if self.simulation == state {
            return;
        }
        self.simulation = state;
        tracing::info!("Simulation state: {:?}", state);

        if state == SimulationState::Running {
            self.initialize_all();
        }
    }

    /// Add a scene object
    pub fn add_object(&mut self, name: impl Into<String>) -> ObjectId {
        let id = ObjectId::new();
        self.objects.insert(
            id,
            SceneObject {
                name: name.into(),
                components: Vec::new(),
            },
        );
        id
    }

    /// Name of a scene object
    pub fn object_name(&self, object: ObjectId) -> Option<&str> {
        self.objects.get(&object).map(|o| o.name.as_str())
    }

    /// Attach a behaviour to an object
    pub fn add_behaviour(&mut self, owner: ObjectId, behaviour: impl ActionBehaviour + 'static) -> BehaviourId {
        let registry = ActionRegistry::new(behaviour.type_name(), &self.settings.scope_suffix);
        self.attach(owner, ComponentKind::Behaviour(Box::new(behaviour)), registry)
    }

    /// Attach a behaviour group to an object
    pub fn add_group(&mut self, owner: ObjectId, members: Vec<BehaviourId>) -> BehaviourId {
        let registry = ActionRegistry::new(std::any::type_name::<BehaviourGroup>(), &self.settings.scope_suffix);
        self.attach(owner, ComponentKind::Group(BehaviourGroup { members }), registry)
    }

    fn attach(&mut self, owner: ObjectId, kind: ComponentKind, registry: ActionRegistry) -> BehaviourId {
        let id = BehaviourId::new();
        self.objects.entry(owner).or_default().components.push(id);
        self.components.insert(
            id,
            Component {
                owner,
                kind,
                registry,
                suppressed: false,
            },
        );
        id
    }

    /// Remove a component. Groups keep the dangling handle.
    pub fn remove_component(&mut self, id: BehaviourId) -> bool {
        let Some(component) = self.components.shift_remove(&id) else {
            return false;
        };
        if let Some(object) = self.objects.get_mut(&component.owner) {
            object.components.retain(|c| *c != id);
        }
        true
    }

    /// Components attached to an object, in attachment order
    pub fn components_of(&self, object: ObjectId) -> &[BehaviourId] {
        self.objects
            .get(&object)
            .map(|o| o.components.as_slice())
            .unwrap_or_default()
    }

    /// Owner object of a component
    pub fn owner(&self, id: BehaviourId) -> Option<ObjectId> {
        self.components.get(&id).map(|c| c.owner)
    }

    /// Kind of a component
    pub fn kind(&self, id: BehaviourId) -> Option<&ComponentKind> {
        self.components.get(&id).map(|c| &c.kind)
    }

    /// Members of a group
    pub fn group_members(&self, group: BehaviourId) -> Option<&[BehaviourId]> {
        match self.kind(group)? {
            ComponentKind::Group(g) => Some(&g.members),
            ComponentKind::Behaviour(_) => None,
        }
    }

    /// Whether a member ignores direct marker notifications
    pub fn is_suppressed(&self, id: BehaviourId) -> bool {
        self.components.get(&id).is_some_and(|c| c.suppressed)
    }

    /// Registry of a component as it currently stands
    pub fn registry(&self, id: BehaviourId) -> Option<&ActionRegistry> {
        self.components.get(&id).map(|c| &c.registry)
    }

    /// Rebuild a component's registry from its registration hook
    pub fn initialize(&mut self, id: BehaviourId) -> ActionResult<()> {
        self.initialize_inner(id, &mut Vec::new())
    }

    /// Initialize every component, logging failures
    pub fn initialize_all(&mut self) {
        let ids: Vec<BehaviourId> = self.components.keys().copied().collect();
        for id in ids {
            if let Err(e) = self.initialize(id) {
                tracing::error!("Failed to initialize actions: {}", e);
            }
        }
    }

    fn initialize_inner(&mut self, id: BehaviourId, stack: &mut Vec<BehaviourId>) -> ActionResult<()> {
        if stack.contains(&id) {
            tracing::error!("Behaviour group {:?} contains itself", id);
            return Err(ActionError::GroupCycle(id));
        }

        let component = self
            .components
            .get_mut(&id)
            .ok_or(ActionError::BehaviourNotFound(id))?;

        let members = match &component.kind {
            ComponentKind::Behaviour(behaviour) => {
                return component.registry.rebuild(|r| behaviour.register_actions(r));
            }
            ComponentKind::Group(group) => group.members.clone(),
        };

        stack.push(id);
        let running = self.is_running();
        let mut entries: Vec<(String, ActionFn)> = Vec::new();
        let mut first_error = None;

        for member in members {
            if !self.components.contains_key(&member) {
                tracing::debug!("Skipping missing group member {:?}", member);
                continue;
            }

            match self.initialize_inner(member, stack) {
                Err(e @ ActionError::GroupCycle(_)) => {
                    first_error.get_or_insert(e);
                    continue;
                }
                Err(e) => {
                    first_error.get_or_insert(e);
                }
                Ok(()) => {}
            }

            if let Some(component) = self.components.get_mut(&member) {
                entries.extend(component.registry.iter().map(|(k, f)| (k.to_string(), Rc::clone(f))));
                component.suppressed = running;
            }
        }
        stack.pop();

        if let Some(group) = self.components.get_mut(&id) {
            group.registry.rebuild(|r| {
                for (key, action) in entries {
                    if let Err(e) = r.insert(key, action, true) {
                        first_error.get_or_insert(e);
                    }
                }
                Ok(())
            })?;
        }

        first_error.map_or(Ok(()), Err)
    }

    fn ensure_initialized(&mut self, id: BehaviourId) {
        let needs_init = self
            .components
            .get(&id)
            .is_some_and(|c| !c.registry.is_initialized());

        if needs_init {
            if let Err(e) = self.initialize(id) {
                tracing::error!("Failed to initialize actions: {}", e);
            }
        }
    }

    /// Replace a group's members with every other component on its object
    pub fn resync_group(&mut self, group: BehaviourId) -> ActionResult<()> {
        let owner = self.owner(group).ok_or(ActionError::BehaviourNotFound(group))?;
        let siblings: Vec<BehaviourId> = self
            .components_of(owner)
            .iter()
            .copied()
            .filter(|id| *id != group)
            .collect();

        self.set_group_members(group, siblings)
    }

    /// Replace a group's members and rebuild its registry
    pub fn set_group_members(&mut self, group: BehaviourId, members: Vec<BehaviourId>) -> ActionResult<()> {
        match self.components.get_mut(&group).map(|c| &mut c.kind) {
            Some(ComponentKind::Group(g)) => g.members = members,
            _ => return Err(ActionError::BehaviourNotFound(group)),
        }
        self.initialize(group)
    }

    /// Find an action, initializing the registry first if needed
    pub fn lookup(&mut self, id: BehaviourId, name: &str) -> Option<ActionFn> {
        self.ensure_initialized(id);
        self.registry(id)?.lookup(name).cloned()
    }

    /// Registered action names, initializing the registry first if needed
    pub fn action_names(&mut self, id: BehaviourId) -> Vec<String> {
        self.ensure_initialized(id);
        self.registry(id)
            .map(|r| r.names().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Whether a component offers an action
    pub fn contains_action(&mut self, id: BehaviourId, name: &str) -> bool {
        self.lookup(id, name).is_some()
    }

    /// Run an action. Unknown names and handles count as failure.
    pub fn invoke(&mut self, id: BehaviourId, name: &str) -> bool {
        self.ensure_initialized(id);
        match self.registry(id) {
            Some(registry) => registry.invoke(name),
            None => {
                tracing::warn!("Behaviour {:?} not found for action {}", id, name);
                false
            }
        }
    }

    /// Resolve an action reference against a (possibly absent) component
    pub fn resolve(
        &mut self,
        behaviour: Option<BehaviourId>,
        data: &ActionData,
        markers: &dyn MarkerResolver,
        controller: &mut dyn PlaybackControl,
    ) -> Resolution {
        if data.is_blank() {
            return Resolution::idle(Outcome::Skipped);
        }
        if let Some(id) = behaviour {
            self.ensure_initialized(id);
        }

        let registry = behaviour.and_then(|id| self.registry(id));
        resolver::resolve(registry, data, markers, controller)
    }

    /// Deliver a marker notification to a component.
    ///
    /// Returns `None` when the recipient is suppressed by a group.
    pub fn notify_marker(
        &mut self,
        recipient: BehaviourId,
        marker: &ActionMarker,
        markers: &dyn MarkerResolver,
        origin: &mut dyn PlaybackControl,
    ) -> Option<Resolution> {
        if self.is_suppressed(recipient) {
            tracing::trace!("Marker {} ignored by grouped behaviour {:?}", marker.name, recipient);
            return None;
        }

        tracing::debug!("Triggering marker {} at {:.3}s", marker.name, marker.time);
        Some(self.resolve(Some(recipient), &marker.action, markers, origin))
    }

    /// Deliver a marker to every component on an object.
    ///
    /// Grouped members are suppressed while running, so only the group
    /// answers for them.
    pub fn broadcast_marker(
        &mut self,
        object: ObjectId,
        marker: &ActionMarker,
        markers: &dyn MarkerResolver,
        origin: &mut dyn PlaybackControl,
    ) -> Vec<Resolution> {
        let recipients = self.components_of(object).to_vec();
        recipients
            .into_iter()
            .filter_map(|id| self.notify_marker(id, marker, markers, origin))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ResultBehaviour;
    use crate::testing::{Call, Markers, RecordingController};
    use std::cell::Cell;

    struct WeaponAction {
        shots: Rc<Cell<u32>>,
    }

    impl ActionBehaviour for WeaponAction {
        fn register_actions(&self, registry: &mut ActionRegistry) -> ActionResult<()> {
            let shots = Rc::clone(&self.shots);
            registry.register_infallible("Fire", move || shots.set(shots.get() + 1))?;
            registry.register("Jam", || false)
        }
    }

    struct JumpAction;

    impl ActionBehaviour for JumpAction {
        fn register_actions(&self, registry: &mut ActionRegistry) -> ActionResult<()> {
            registry.register("Launch", || true)
        }
    }

    /// Offers `Extra` only while its flag is set
    struct ToggleAction {
        extra: Rc<Cell<bool>>,
    }

    impl ActionBehaviour for ToggleAction {
        fn register_actions(&self, registry: &mut ActionRegistry) -> ActionResult<()> {
            registry.register("Base", || true)?;
            if self.extra.get() {
                registry.register("Extra", || true)?;
            }
            Ok(())
        }
    }

    fn weapon() -> (WeaponAction, Rc<Cell<u32>>) {
        let shots = Rc::new(Cell::new(0));
        (WeaponAction { shots: Rc::clone(&shots) }, shots)
    }

    fn marker(name: &str) -> ActionMarker {
        ActionMarker::new(name, 1.0, ActionData::new(name).on_success(ResultBehaviour::Pause))
    }

    #[test]
    fn test_lazy_initialization() {
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Player");
        let jump = scene.add_behaviour(object, JumpAction);

        assert!(!scene.registry(jump).unwrap().is_initialized());
        assert!(scene.contains_action(jump, "Jump/Launch"));
        assert!(scene.registry(jump).unwrap().is_initialized());
    }

    #[test]
    fn test_reinitialize_picks_up_changes() {
        let extra = Rc::new(Cell::new(true));
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Switch");
        let toggle = scene.add_behaviour(object, ToggleAction { extra: Rc::clone(&extra) });

        assert!(scene.contains_action(toggle, "Toggle/Extra"));
        extra.set(false);
        scene.initialize(toggle).unwrap();
        assert!(!scene.contains_action(toggle, "Toggle/Extra"));
        assert!(scene.contains_action(toggle, "Toggle/Base"));
    }

    #[test]
    fn test_group_flattens_member_scopes() {
        let (weapon, shots) = weapon();
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Soldier");
        let weapon = scene.add_behaviour(object, weapon);
        let jump = scene.add_behaviour(object, JumpAction);
        let group = scene.add_group(object, vec![weapon, jump]);

        scene.initialize(group).unwrap();
        let names: Vec<&str> = scene.registry(group).unwrap().names().collect();
        assert_eq!(names, vec!["Weapon/Fire", "Weapon/Jam", "Jump/Launch"]);

        assert!(scene.invoke(group, "Weapon/Fire"));
        assert_eq!(shots.get(), 1);
    }

    #[test]
    fn test_group_suppresses_only_while_running() {
        let (weapon, _) = weapon();
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Soldier");
        let weapon = scene.add_behaviour(object, weapon);
        let group = scene.add_group(object, vec![weapon]);

        scene.initialize(group).unwrap();
        assert!(!scene.is_suppressed(weapon));

        scene.set_simulation(SimulationState::Running);
        assert!(scene.is_suppressed(weapon));
        assert!(!scene.is_suppressed(group));

        scene.set_simulation(SimulationState::Editing);
        scene.initialize(group).unwrap();
        assert!(!scene.is_suppressed(weapon));
    }

    #[test]
    fn test_suppressed_member_ignores_markers() {
        let (weapon, shots) = weapon();
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Soldier");
        let weapon = scene.add_behaviour(object, weapon);
        let jump = scene.add_behaviour(object, JumpAction);
        let group = scene.add_group(object, vec![weapon, jump]);
        scene.set_simulation(SimulationState::Running);

        let fire = marker("Weapon/Fire");
        let markers = Markers::default();
        let mut controller = RecordingController::at(1.0);

        assert!(scene.notify_marker(weapon, &fire, &markers, &mut controller).is_none());
        assert!(scene.notify_marker(jump, &fire, &markers, &mut controller).is_none());
        assert!(controller.calls.is_empty());
        assert_eq!(shots.get(), 0);

        let resolution = scene.notify_marker(group, &fire, &markers, &mut controller).unwrap();
        assert_eq!(resolution.outcome, Outcome::Succeeded);
        assert_eq!(controller.calls, vec![Call::Pause]);
        assert_eq!(shots.get(), 1);
    }

    #[test]
    fn test_broadcast_answered_once() {
        let (weapon, shots) = weapon();
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Soldier");
        let group = scene.add_group(object, Vec::new());
        scene.add_behaviour(object, weapon);
        scene.add_behaviour(object, JumpAction);
        scene.resync_group(group).unwrap();
        scene.set_simulation(SimulationState::Running);

        let mut controller = RecordingController::at(1.0);
        let resolutions = scene.broadcast_marker(object, &marker("Weapon/Fire"), &Markers::default(), &mut controller);

        assert_eq!(resolutions.len(), 1);
        assert_eq!(shots.get(), 1);
        assert_eq!(controller.calls, vec![Call::Pause]);
    }

    #[test]
    fn test_dangling_member_skipped() {
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Soldier");
        let jump = scene.add_behaviour(object, JumpAction);
        let group = scene.add_group(object, vec![BehaviourId::new(), jump]);

        scene.initialize(group).unwrap();
        assert!(scene.contains_action(group, "Jump/Launch"));

        assert!(scene.remove_component(jump));
        scene.initialize(group).unwrap();
        assert!(!scene.contains_action(group, "Jump/Launch"));
    }

    #[test]
    fn test_duplicate_across_members_reported() {
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Twins");
        let first = scene.add_behaviour(object, JumpAction);
        let second = scene.add_behaviour(object, JumpAction);
        let group = scene.add_group(object, vec![first, second]);

        let err = scene.initialize(group).unwrap_err();
        assert_eq!(err, ActionError::DuplicateAction { key: "Jump/Launch".into() });
        // The first registration is kept
        assert!(scene.contains_action(group, "Jump/Launch"));
    }

    #[test]
    fn test_group_cycle_rejected() {
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Loop");
        let jump = scene.add_behaviour(object, JumpAction);
        let outer = scene.add_group(object, vec![jump]);
        let inner = scene.add_group(object, vec![outer]);
        scene.set_group_members(outer, vec![jump, inner]).unwrap_err();

        let err = scene.initialize(outer).unwrap_err();
        assert_eq!(err, ActionError::GroupCycle(outer));
        assert!(scene.contains_action(outer, "Jump/Launch"));
    }

    #[test]
    fn test_nested_group() {
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Squad");
        let jump = scene.add_behaviour(object, JumpAction);
        let inner = scene.add_group(object, vec![jump]);
        let outer = scene.add_group(object, vec![inner]);

        scene.initialize(outer).unwrap();
        assert!(scene.contains_action(outer, "Jump/Launch"));
    }

    #[test]
    fn test_resync_collects_siblings() {
        let (weapon, _) = weapon();
        let mut scene = Scene::new(ActionSettings::default());
        let object = scene.add_object("Soldier");
        let group = scene.add_group(object, Vec::new());
        let weapon = scene.add_behaviour(object, weapon);
        let jump = scene.add_behaviour(object, JumpAction);

        scene.resync_group(group).unwrap();
        assert_eq!(scene.group_members(group).unwrap(), &[weapon, jump]);
        assert!(scene.contains_action(group, "Weapon/Jam"));
        assert!(scene.contains_action(group, "Jump/Launch"));
    }

    #[test]
    fn test_resolve_unknown_handle_fails() {
        let mut scene = Scene::new(ActionSettings::default());
        let mut controller = RecordingController::at(0.0);
        let data = ActionData::new("Jump/Launch").on_failure(ResultBehaviour::Stop);

        let resolution = scene.resolve(Some(BehaviourId::new()), &data, &Markers::default(), &mut controller);
        assert_eq!(resolution.outcome, Outcome::Unbound);
        assert!(!scene.invoke(BehaviourId::new(), "Jump/Launch"));
    }
}
