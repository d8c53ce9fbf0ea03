//! Response envelope returned by a computed-value resource
//!
//! ```json
//! { "objects": [ { "id": 7, "computed_value": 42, "error": null } ] }
//! ```
//!
//! Only the first element of `objects` is ever consumed.

use model_method_host::{Attribute, Identity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProxyError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub objects: Vec<ComputedObject>,
}

/// One computation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedObject {
    /// Identity of the object that performed (or was produced by) the computation.
    /// Kept raw: it only matters for entity-shaped values (see `identity`).
    #[serde(default)]
    pub id: Value,

    #[serde(default)]
    pub computed_value: Value,

    /// Set by the server when the call was refused or the method is unknown
    #[serde(default)]
    pub error: Option<String>,
}

/// Shape of a computed value
#[derive(Debug, Clone, PartialEq)]
pub enum ComputedValue {
    Null,
    Scalar(Value),
    /// Entity-shaped object; the host may turn it into a nested entity
    Entity(Map<String, Value>),
}

impl From<Value> for ComputedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ComputedValue::Null,
            Value::Object(map) => ComputedValue::Entity(map),
            other => ComputedValue::Scalar(other),
        }
    }
}

impl ComputedValue {
    pub fn is_entity(&self) -> bool {
        matches!(self, ComputedValue::Entity(_))
    }

    /// Host attribute carrying the same data
    pub fn to_attribute(&self) -> Attribute {
        match self {
            ComputedValue::Null => Attribute::Null,
            ComputedValue::Scalar(v) => Attribute::Scalar(v.clone()),
            ComputedValue::Entity(map) => Attribute::Record(map.clone()),
        }
    }
}

impl Envelope {
    /// Decode a response body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| ProxyError::malformed(format!("invalid response envelope: {}", e)))
    }

    /// The element projections read from
    pub fn first(&self) -> Result<&ComputedObject> {
        self.objects
            .first()
            .ok_or_else(|| ProxyError::malformed("response contains no objects"))
    }
}

impl ComputedObject {
    pub fn value(&self) -> ComputedValue {
        ComputedValue::from(self.computed_value.clone())
    }

    /// `id` as an entity identity, when it is an integer or a string
    pub fn identity(&self) -> Option<Identity> {
        match &self.id {
            Value::Number(n) => n.as_i64().map(Identity::Int),
            Value::String(s) => Some(Identity::Str(s.clone())),
            _ => None,
        }
    }
}
