//! In-memory host entity
//!
//! Stores attributes in a map behind a lock and records every event it emits,
//! so callers can observe exactly which change notifications fired.

use crate::{change_event, Attribute, Entity, HostEntity, Identity};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

/// Generic event fired after any property change
pub const ANY_CHANGE: &str = "change";

#[derive(Default)]
struct Inner {
    attributes: HashMap<String, Attribute>,
    identity: Option<Identity>,
    events: Vec<String>,
    listeners: HashMap<String, Vec<Listener>>,
}

/// Attribute container with change detection.
///
/// Cloning yields another handle to the same entity.
///
/// `set` materializes `Attribute::Record` values into nested `MemoryEntity`
/// instances, and fires `change:<name>` then `change` only when the stored
/// value differs from the previous one. An absent property compares equal to
/// `Null`, so setting `Null` on a fresh entity fires nothing.
///
/// # Example
///
/// ```rust
/// use model_method_host::{Attribute, HostEntity, MemoryEntity};
/// use serde_json::json;
///
/// let host = MemoryEntity::new();
/// host.set("owner", Attribute::from_json(json!({"name": "ada"})));
///
/// let owner = host.get("owner").unwrap();
/// let owner = owner.as_entity().unwrap();
/// assert_eq!(owner.get("name"), Some(Attribute::from("ada")));
/// ```
#[derive(Clone, Default)]
pub struct MemoryEntity {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryEntity {
    /// Create an empty entity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity seeded with attributes, without firing events
    pub fn with_attributes<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Attribute)>,
        K: Into<String>,
    {
        let entity = Self::new();
        {
            let mut inner = entity.write();
            for (name, value) in attributes {
                inner.attributes.insert(name.into(), value);
            }
        }
        entity
    }

    /// Build an entity from entity-shaped JSON, without firing events
    pub fn from_record(record: Map<String, Value>) -> Self {
        Self::with_attributes(
            record
                .into_iter()
                .map(|(name, value)| (name, Attribute::from_json(value))),
        )
    }

    /// Register `handler` for `event`
    pub fn on<F>(&self, event: impl Into<String>, handler: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.write()
            .listeners
            .entry(event.into())
            .or_default()
            .push(Arc::new(handler));
    }

    /// All events fired so far, in order
    pub fn events(&self) -> Vec<String> {
        self.read().events.clone()
    }

    /// Drain the event log
    pub fn take_events(&self) -> Vec<String> {
        std::mem::take(&mut self.write().events)
    }

    /// How many times `event` has fired
    pub fn count(&self, event: &str) -> usize {
        self.read().events.iter().filter(|e| *e == event).count()
    }

    /// Snapshot of the current attributes
    pub fn attributes(&self) -> HashMap<String, Attribute> {
        self.read().attributes.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn materialize(value: Attribute) -> Attribute {
        match value {
            Attribute::Record(record) => Attribute::Entity(Arc::new(Self::from_record(record))),
            other => other,
        }
    }
}

impl HostEntity for MemoryEntity {
    fn get(&self, name: &str) -> Option<Attribute> {
        self.read().attributes.get(name).cloned()
    }

    fn set(&self, name: &str, value: Attribute) {
        let value = Self::materialize(value);

        let changed = {
            let mut inner = self.write();
            let previous = inner.attributes.insert(name.to_string(), value.clone());
            previous.unwrap_or(Attribute::Null) != value
        };

        trace!(property = name, changed, "attribute set");

        if changed {
            self.trigger(&change_event(name));
            self.trigger(ANY_CHANGE);
        }
    }

    fn trigger(&self, event: &str) {
        // Handlers run without the lock held so they may call back into us
        let handlers = {
            let mut inner = self.write();
            inner.events.push(event.to_string());
            inner.listeners.get(event).cloned().unwrap_or_default()
        };

        for handler in handlers {
            handler(event);
        }
    }
}

impl Entity for MemoryEntity {
    fn identity(&self) -> Option<Identity> {
        self.read().identity.clone()
    }

    fn assign_identity(&self, id: Identity) {
        self.write().identity = Some(id);
    }
}

impl fmt::Debug for MemoryEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("MemoryEntity")
            .field("identity", &inner.identity)
            .field("attributes", &inner.attributes)
            .field("events", &inner.events.len())
            .finish()
    }
}
