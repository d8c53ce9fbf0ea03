//! Model Method Host: the entity side of a computed-attribute binding
//!
//! This crate defines the capability set a host entity must offer so that a
//! computed value fetched from a remote resource can be written onto one of its
//! named properties.
//!
//! # Architecture
//!
//! - **HostEntity**: keyed attribute container with `get`, `set` and `trigger`
//! - **Entity**: a host entity that also carries an object-level identity slot
//! - **Attribute**: the value union stored under a property name
//! - **MemoryEntity**: in-process implementation with change detection and listeners
//!
//! # Example
//!
//! ```rust
//! use model_method_host::{change_event, Attribute, HostEntity, MemoryEntity};
//!
//! let host = MemoryEntity::new();
//! host.set("total", Attribute::from(42));
//!
//! assert_eq!(host.get("total"), Some(Attribute::from(42)));
//! assert_eq!(host.count(&change_event("total")), 1);
//! ```
//!
//! Identity is split in two on purpose: an entity has an identity slot
//! (`Entity::identity`) and may also hold a regular `id` attribute. Lookups in
//! host applications use either one, so writers keep both in step.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

mod memory;

pub use memory::MemoryEntity;

/// Attribute name conventionally mirroring the identity slot
pub const ID_ATTRIBUTE: &str = "id";

/// Name of the event fired when `property` should be considered updated
pub fn change_event(property: &str) -> String {
    format!("change:{}", property)
}

/// Identity of an entity, as assigned by the remote side
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Int(i64),
    Str(String),
}

impl Identity {
    /// JSON form, used when the identity is mirrored into an attribute
    pub fn to_json(&self) -> Value {
        match self {
            Identity::Int(n) => Value::from(*n),
            Identity::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Int(n) => write!(f, "{}", n),
            Identity::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identity {
    fn from(n: i64) -> Self {
        Identity::Int(n)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Identity::Str(s.to_string())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Identity::Str(s)
    }
}

/// Keyed attribute container owned by the surrounding application.
///
/// All methods take `&self`: implementations hold their own interior
/// mutability, and the application decides whether writers are serialized.
pub trait HostEntity: Send + Sync {
    /// Current value of `name`, or `None` when the property was never set
    fn get(&self, name: &str) -> Option<Attribute>;

    /// Store `value` under `name`.
    ///
    /// An implementation may materialize an `Attribute::Record` into a live
    /// nested entity; callers re-read the property to observe the result.
    fn set(&self, name: &str, value: Attribute);

    /// Emit a named event (see [`change_event`])
    fn trigger(&self, event: &str);
}

/// A host entity with an object-level identity slot
pub trait Entity: HostEntity {
    fn identity(&self) -> Option<Identity>;

    fn assign_identity(&self, id: Identity);
}

/// Shared handle to a nested entity
pub type EntityRef = Arc<dyn Entity>;

/// Value stored under a host property
#[derive(Clone)]
pub enum Attribute {
    /// Explicit null
    Null,
    /// Any non-object JSON value (numbers, strings, booleans, arrays)
    Scalar(Value),
    /// Entity-shaped data not yet materialized by the host
    Record(Map<String, Value>),
    /// Live nested entity
    Entity(EntityRef),
}

impl Attribute {
    /// Classify a JSON value: objects become records, null stays null
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Attribute::Null,
            Value::Object(map) => Attribute::Record(map),
            other => Attribute::Scalar(other),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Attribute::Null)
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Attribute::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Attribute::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Attribute::Null, Attribute::Null) => true,
            (Attribute::Scalar(a), Attribute::Scalar(b)) => a == b,
            (Attribute::Record(a), Attribute::Record(b)) => a == b,
            // Entities compare by handle, not by content
            (Attribute::Entity(a), Attribute::Entity(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Null => f.write_str("Null"),
            Attribute::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Attribute::Record(m) => f.debug_tuple("Record").field(m).finish(),
            Attribute::Entity(e) => f
                .debug_struct("Entity")
                .field("identity", &e.identity())
                .finish_non_exhaustive(),
        }
    }
}

impl From<Value> for Attribute {
    fn from(value: Value) -> Self {
        Attribute::from_json(value)
    }
}

impl From<i64> for Attribute {
    fn from(n: i64) -> Self {
        Attribute::Scalar(Value::from(n))
    }
}

impl From<&str> for Attribute {
    fn from(s: &str) -> Self {
        Attribute::Scalar(Value::String(s.to_string()))
    }
}

impl From<bool> for Attribute {
    fn from(b: bool) -> Self {
        Attribute::Scalar(Value::Bool(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_event_name() {
        assert_eq!(change_event("score"), "change:score");
    }

    #[test]
    fn test_attribute_from_json() {
        assert_eq!(Attribute::from_json(Value::Null), Attribute::Null);
        assert_eq!(Attribute::from_json(json!(3)), Attribute::from(3));
        assert_eq!(
            Attribute::from_json(json!([1, 2])),
            Attribute::Scalar(json!([1, 2]))
        );

        match Attribute::from_json(json!({"name": "x"})) {
            Attribute::Record(map) => assert_eq!(map["name"], json!("x")),
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_entities_compare_by_handle() {
        let a: EntityRef = Arc::new(MemoryEntity::new());
        let b: EntityRef = Arc::new(MemoryEntity::new());

        assert_eq!(Attribute::Entity(a.clone()), Attribute::Entity(a.clone()));
        assert_ne!(Attribute::Entity(a), Attribute::Entity(b));
    }

    #[test]
    fn test_identity_serde_untagged() {
        let int: Identity = serde_json::from_value(json!(9)).unwrap();
        let string: Identity = serde_json::from_value(json!("abc")).unwrap();

        assert_eq!(int, Identity::Int(9));
        assert_eq!(string, Identity::from("abc"));
        assert_eq!(int.to_json(), json!(9));
        assert_eq!(string.to_string(), "abc");
    }
}
