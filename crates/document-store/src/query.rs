use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Result, StoreError};

/// Field name used for soft-delete flags.
pub const ACTIVE_FIELD: &str = "is_active";

/// Builder for document filters.
///
/// A filter is a conjunction of top-level field equalities. An empty filter
/// matches every document in the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Map<String, Value>,
}

impl Filter {
    /// Creates a filter matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter matching documents that have not been soft-deleted.
    pub fn active() -> Self {
        Self::new().eq(ACTIVE_FIELD, true)
    }

    /// Requires `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    /// Requires `field` to hold the given identifier.
    pub fn eq_id(self, field: impl Into<String>, id: impl Into<Uuid>) -> Self {
        let id: Uuid = id.into();
        self.eq(field, id.to_string())
    }

    /// Returns true if the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns true if `body` satisfies every condition.
    pub fn matches(&self, body: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| body.get(field) == Some(expected))
    }

    /// Returns the conditions as a JSON object, suitable for containment checks.
    pub fn to_json(&self) -> Value {
        Value::Object(self.conditions.clone())
    }
}

/// Builder for document modifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Map<String, Value>,
    inc: Vec<(String, i64)>,
}

impl Update {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field` to `value`.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    /// Sets `field` to the given identifier.
    pub fn set_id(self, field: impl Into<String>, id: impl Into<Uuid>) -> Self {
        let id: Uuid = id.into();
        self.set(field, id.to_string())
    }

    /// Adds `delta` to the integer stored in `field` (missing fields count as 0).
    pub fn inc(mut self, field: impl Into<String>, delta: i64) -> Self {
        self.inc.push((field.into(), delta));
        self
    }

    /// Returns true if the update modifies nothing.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.inc.is_empty()
    }

    /// Returns the `set` part as a JSON object.
    pub fn set_json(&self) -> Value {
        Value::Object(self.set.clone())
    }

    /// Returns the increments in the order they were added.
    pub fn increments(&self) -> &[(String, i64)] {
        &self.inc
    }

    /// Applies the update to a document body in place.
    pub fn apply(&self, body: &mut Value) -> Result<()> {
        let object = body.as_object_mut().ok_or_else(|| StoreError::InvalidUpdate {
            field: String::new(),
            reason: "document body is not an object".to_string(),
        })?;

        for (field, value) in &self.set {
            object.insert(field.clone(), value.clone());
        }

        for (field, delta) in &self.inc {
            let current = match object.get(field) {
                None | Some(Value::Null) => 0,
                Some(value) => value.as_i64().ok_or_else(|| StoreError::InvalidUpdate {
                    field: field.clone(),
                    reason: format!("cannot increment non-integer value {value}"),
                })?,
            };
            object.insert(field.clone(), Value::from(current + delta));
        }

        Ok(())
    }
}
