// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named action registry.
//!
//! Each behaviour component owns one registry. It maps scoped names such as
//! `Door/Open` to callbacks and is rebuilt from scratch on every activation.

use crate::error::{ActionError, ActionResult};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Separator appended to every non-empty scope
pub const SCOPE_SEPARATOR: char = '/';

/// A registered action. Returns `true` on success.
pub type ActionFn = Rc<dyn Fn() -> bool>;

/// Derive the default scope for a behaviour type.
///
/// Module paths and generic arguments are dropped, then everything from the
/// last occurrence of `suffix` on is stripped: `game::DoorAction` becomes
/// `Door`.
pub fn default_scope_for(type_name: &str, suffix: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let short = base.rsplit("::").next().unwrap_or(base);

    match short.rfind(suffix) {
        Some(idx) if !suffix.is_empty() => short[..idx].to_string(),
        _ => short.to_string(),
    }
}

/// Name → callback table with a mutable scope prefix
pub struct ActionRegistry {
    actions: IndexMap<String, ActionFn>,
    scope: Option<String>,
    default_scope: String,
    initialized: bool,
}

impl ActionRegistry {
    /// Create an empty registry whose default scope comes from `type_name`
    pub fn new(type_name: &str, suffix: &str) -> Self {
        Self::with_default_scope(default_scope_for(type_name, suffix))
    }

    /// Create an empty registry with an explicit default scope
    pub fn with_default_scope(default_scope: impl Into<String>) -> Self {
        Self {
            actions: IndexMap::new(),
            scope: None,
            default_scope: default_scope.into(),
            initialized: false,
        }
    }

    /// Set the prefix for subsequent registrations. An empty name clears it.
    pub fn set_scope(&mut self, name: &str) {
        if name.is_empty() {
            self.scope = None;
            return;
        }

        let mut scope = name.to_string();
        if !scope.ends_with(SCOPE_SEPARATOR) {
            scope.push(SCOPE_SEPARATOR);
        }
        self.scope = Some(scope);
    }

    /// Current scope prefix
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Scope applied when none has been set explicitly
    pub fn default_scope(&self) -> &str {
        &self.default_scope
    }

    /// Register an action under the current (or default) scope
    pub fn register(&mut self, name: impl Into<String>, action: impl Fn() -> bool + 'static) -> ActionResult<()> {
        self.insert(name.into(), Rc::new(action), false)
    }

    /// Register an action, optionally skipping default scope derivation.
    ///
    /// With `ignore_scope` an explicitly set scope still prefixes the key.
    pub fn register_with(
        &mut self,
        name: impl Into<String>,
        action: impl Fn() -> bool + 'static,
        ignore_scope: bool,
    ) -> ActionResult<()> {
        self.insert(name.into(), Rc::new(action), ignore_scope)
    }

    /// Register an action that cannot fail
    pub fn register_infallible(&mut self, name: impl Into<String>, action: impl Fn() + 'static) -> ActionResult<()> {
        self.register(name, move || {
            action();
            true
        })
    }

    /// Insert an already shared callback
    pub fn insert(&mut self, name: String, action: ActionFn, ignore_scope: bool) -> ActionResult<()> {
        if !ignore_scope && self.scope.is_none() {
            let scope = self.default_scope.clone();
            self.set_scope(&scope);
        }

        let key = match &self.scope {
            Some(scope) => format!("{scope}{name}"),
            None => name,
        };

        if self.actions.contains_key(&key) {
            tracing::error!("Duplicate action registration: {}", key);
            return Err(ActionError::DuplicateAction { key });
        }

        self.actions.insert(key, action);
        Ok(())
    }

    /// Clear the table and scope, then run `register` to fill it again
    pub fn rebuild(&mut self, register: impl FnOnce(&mut Self) -> ActionResult<()>) -> ActionResult<()> {
        self.clear();
        self.initialized = true;
        let result = register(self);
        tracing::trace!("Registry rebuilt with {} actions", self.actions.len());
        result
    }

    /// Drop every action and the active scope
    pub fn clear(&mut self) {
        self.actions.clear();
        self.scope = None;
    }

    /// Whether `rebuild` has run at least once
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Find an action by its full key
    pub fn lookup(&self, name: &str) -> Option<&ActionFn> {
        self.actions.get(name)
    }

    /// Whether an action is registered
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Run an action. Unknown names log a warning and count as failure.
    pub fn invoke(&self, name: &str) -> bool {
        let Some(action) = self.lookup(name).cloned() else {
            tracing::warn!("Action {} not found.", name);
            return false;
        };
        action()
    }

    /// Iterate registered actions
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionFn)> {
        self.actions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Registered action names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Number of registered actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no actions are registered
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("scope", &self.scope)
            .field("default_scope", &self.default_scope)
            .field("initialized", &self.initialized)
            .finish()
    }
}
