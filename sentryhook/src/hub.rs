//! Hubs and the scopes they hand to transports.
//!
//! A [`Hub`] owns the [`Scope`] that accompanies every event submitted
//! through it. There is no process-wide hub: a hook uses the hub it is given
//! per call, the one set on its builder, or a private one of its own.
use crate::protocol::{Event, Level};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Contextual data merged into events at submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    tags: BTreeMap<String, String>,
    extra: Map<String, Value>,
    level: Option<Level>,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a tag.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Removes a tag.
    pub fn remove_tag(&mut self, key: &str) {
        self.tags.remove(key);
    }

    /// Sets an extra value.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Forces every event's level, or stops doing so with `None`.
    pub fn set_level(&mut self, level: Option<Level>) {
        self.level = level;
    }

    /// Tags set on this scope.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Extras set on this scope.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// The forced level, if any.
    pub fn level(&self) -> Option<Level> {
        self.level
    }

    /// Merges the scope into `event`.
    ///
    /// Tags and extras already on the event are kept; the scope only fills in
    /// missing keys. A forced level replaces the event's level.
    pub fn apply_to_event<'a>(&self, mut event: Event<'a>) -> Event<'a> {
        if let Some(level) = self.level {
            event.level = level;
        }
        if self
            .tags
            .keys()
            .any(|key| !event.tags.contains_key(key))
        {
            let tags = event.tags.to_mut();
            for (key, value) in &self.tags {
                tags.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        if self
            .extra
            .keys()
            .any(|key| !event.extra.contains_key(key))
        {
            let extra = event.extra.to_mut();
            for (key, value) in &self.extra {
                extra.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        event
    }
}

/// Holds the current [`Scope`] for a group of submissions.
#[derive(Debug, Default)]
pub struct Hub {
    scope: RwLock<Arc<Scope>>,
}

impl Hub {
    /// Creates a hub with an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a hub starting out with `scope`.
    pub fn with_scope(scope: Scope) -> Self {
        Hub {
            scope: RwLock::new(Arc::new(scope)),
        }
    }

    /// A snapshot of the current scope.
    pub fn scope(&self) -> Arc<Scope> {
        let scope = self.scope.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&scope)
    }

    /// Modifies the scope. Snapshots taken earlier are unaffected.
    pub fn configure_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Scope) -> R,
    {
        let mut scope = self.scope.write().unwrap_or_else(PoisonError::into_inner);
        f(Arc::make_mut(&mut scope))
    }
}
