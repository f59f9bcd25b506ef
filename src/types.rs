//! Plan and import results handed back to the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One attribute whose value a plan changes.
///
/// `before` is `None` for an attribute that appears and `after` is `None`
/// for one that goes away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Local attribute name.
    pub path: String,
    /// Value in the prior state.
    pub before: Option<Value>,
    /// Value in the planned state.
    pub after: Option<Value>,
}

impl AttributeChange {
    /// An attribute that gains `value`.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            before: None,
            after: Some(value),
        }
    }

    /// An attribute that loses `value`.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            before: Some(value),
            after: None,
        }
    }

    /// An attribute going from `before` to `after`.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self {
            path: path.into(),
            before: Some(before),
            after: Some(after),
        }
    }
}

/// Outcome of planning a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// State the apply step will start from; `null` for a destroy.
    pub planned_state: Value,
    /// Attributes that differ from the prior state.
    pub changes: Vec<AttributeChange>,
    /// Whether the object must be destroyed and created again.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Nothing to do; `state` stays as it is.
    pub fn no_change(state: Value) -> Self {
        Self::in_place(state, Vec::new())
    }

    /// Apply `changes` to the existing object.
    pub fn in_place(planned_state: Value, changes: Vec<AttributeChange>) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace: false,
        }
    }

    /// Whether any attribute changes.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// State of an object brought under management by import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// Resource type the state belongs to.
    pub resource_type: String,
    /// State as read from the server.
    pub state: Value,
}

impl ImportedResource {
    /// Pair `state` with its resource type.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Resource types the provider manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Sorted resource type names.
    pub resources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("name", json!("App1"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("App1")));

        let removed = AttributeChange::removed("tags", json!(["t1"]));
        assert_eq!(removed.before, Some(json!(["t1"])));
        assert!(removed.after.is_none());

        let modified = AttributeChange::modified("color", json!("black"), json!("red"));
        assert_eq!(modified.before, Some(json!("black")));
        assert_eq!(modified.after, Some(json!("red")));
    }

    #[test]
    fn test_plan_result() {
        let unchanged = PlanResult::no_change(json!({"id": "123"}));
        assert!(!unchanged.has_changes());
        assert!(!unchanged.requires_replace);

        let renamed = PlanResult::in_place(
            json!({"id": "123", "name": "new"}),
            vec![AttributeChange::modified("name", json!("old"), json!("new"))],
        );
        assert!(renamed.has_changes());
        assert!(!renamed.requires_replace);
    }

    #[test]
    fn test_plan_result_serializes_for_the_host() {
        let plan = PlanResult::in_place(
            Value::Null,
            vec![AttributeChange::removed("groups", json!(["g1"]))],
        );
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["changes"][0]["path"], "groups");
        assert!(value["changes"][0]["after"].is_null());
        assert_eq!(value["requires_replace"], false);
    }
}
