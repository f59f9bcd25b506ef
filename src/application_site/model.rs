//! Local configuration and state of an application site.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payload::{member_names, ShowApplicationSite};
use super::schema::DEFAULT_COLOR;
use crate::error::ProviderError;
use crate::field::Field;

/// Application site configuration as supplied by the host.
///
/// Every attribute except `name` keeps its presence, so a payload can tell
/// "not configured" apart from "configured empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSiteConfig {
    /// Object name.
    pub name: String,
    /// Additional category names.
    pub additional_categories: Field<BTreeSet<String>>,
    /// Free-text description.
    pub description: Field<String>,
    /// Primary category name.
    pub primary_category: Field<String>,
    /// Tag names.
    pub tags: Field<BTreeSet<String>>,
    /// URLs that identify the site.
    pub url_list: Field<BTreeSet<String>>,
    /// Signature produced by the Signature Tool.
    pub application_signature: Field<String>,
    /// Whether `url_list` entries are regular expressions.
    pub urls_defined_as_regular_expression: Field<bool>,
    /// Object color.
    pub color: Field<String>,
    /// Comments string.
    pub comments: Field<String>,
    /// Group names.
    pub groups: Field<BTreeSet<String>>,
    /// Request-only: apply ignoring warnings.
    pub ignore_warnings: Field<bool>,
    /// Request-only: apply ignoring errors.
    pub ignore_errors: Field<bool>,
}

impl ApplicationSiteConfig {
    /// Decode a configuration object. Keys outside the schema are ignored.
    pub fn from_value(value: &Value) -> Result<Self, ProviderError> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Fill in what the host should plan for unset attributes.
    ///
    /// Attributes with a schema default get it, and the server-computed
    /// `primary_category` keeps a known prior value. Everything else stays
    /// unset so it is not sent on create.
    pub fn with_defaults(&self, prior: Option<&ApplicationSite>) -> Self {
        let mut planned = self.clone();
        if planned.color.is_unset() {
            planned.color = Field::Set(DEFAULT_COLOR.to_string());
        }
        for flag in [
            &mut planned.urls_defined_as_regular_expression,
            &mut planned.ignore_warnings,
            &mut planned.ignore_errors,
        ] {
            if flag.is_unset() {
                *flag = Field::Set(false);
            }
        }
        if planned.primary_category.is_unset() {
            if let Some(prior) = prior.filter(|p| !p.primary_category.is_empty()) {
                planned.primary_category = Field::Set(prior.primary_category.clone());
            }
        }
        planned
    }

    /// The state this configuration describes once applied on top of `prior`.
    ///
    /// Unset attributes take their schema default or their empty value. The
    /// server-computed `primary_category` keeps its prior value instead, and
    /// `id` always comes from `prior`.
    pub fn resolve(&self, prior: Option<&ApplicationSite>) -> ApplicationSite {
        let primary_category = match &self.primary_category {
            Field::Set(v) => v.clone(),
            Field::Unset => prior.map(|p| p.primary_category.clone()).unwrap_or_default(),
        };
        ApplicationSite {
            id: prior.map(|p| p.id.clone()).unwrap_or_default(),
            name: self.name.clone(),
            additional_categories: self.additional_categories.value_or_default(),
            description: self.description.value_or_default(),
            primary_category,
            tags: self.tags.value_or_default(),
            url_list: self.url_list.value_or_default(),
            application_signature: self.application_signature.value_or_default(),
            urls_defined_as_regular_expression: self
                .urls_defined_as_regular_expression
                .value_or_default(),
            color: self
                .color
                .get()
                .cloned()
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            comments: self.comments.value_or_default(),
            groups: self.groups.value_or_default(),
            ignore_warnings: self.ignore_warnings.value_or_default(),
            ignore_errors: self.ignore_errors.value_or_default(),
        }
    }
}

/// Local state of an application site.
///
/// An empty `id` means the object does not exist on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationSite {
    /// Server-assigned uid.
    pub id: String,
    /// Object name.
    pub name: String,
    /// Additional category names.
    pub additional_categories: BTreeSet<String>,
    /// Free-text description.
    pub description: String,
    /// Primary category name.
    pub primary_category: String,
    /// Tag names.
    pub tags: BTreeSet<String>,
    /// URLs that identify the site.
    pub url_list: BTreeSet<String>,
    /// Signature produced by the Signature Tool.
    pub application_signature: String,
    /// Whether `url_list` entries are regular expressions.
    pub urls_defined_as_regular_expression: bool,
    /// Object color.
    pub color: String,
    /// Comments string.
    pub comments: String,
    /// Group names.
    pub groups: BTreeSet<String>,
    /// Last requested ignore-warnings flag.
    pub ignore_warnings: bool,
    /// Last requested ignore-errors flag.
    pub ignore_errors: bool,
}

impl ApplicationSite {
    /// Decode state handed over by the host.
    ///
    /// Missing attributes take the same values [`ApplicationSiteConfig::resolve`]
    /// would give them.
    pub fn from_value(value: &Value) -> Result<Self, ProviderError> {
        let id = match value.get("id") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(ProviderError::Validation(format!(
                    "state attribute 'id' must be a string, got {}",
                    other
                )))
            },
        };
        let mut state = ApplicationSiteConfig::from_value(value)?.resolve(None);
        state.id = id;
        Ok(state)
    }

    /// Encode the state for the host.
    pub fn to_value(&self) -> Result<Value, ProviderError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Whether the object exists on the server.
    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }

    /// Forget the server identity.
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    /// Merge an object returned by the server into this state.
    ///
    /// Scalars the server omits keep their local value. Set attributes the
    /// server omits are reset to empty.
    pub fn apply_remote(&mut self, remote: ShowApplicationSite) {
        if let Some(v) = remote.name {
            self.name = v;
        }
        self.additional_categories = remote
            .additional_categories
            .map(member_names)
            .unwrap_or_default();
        if let Some(v) = remote.description {
            self.description = v;
        }
        if let Some(v) = remote.primary_category {
            self.primary_category = v;
        }
        self.tags = remote
            .tags
            .map(member_names)
            .unwrap_or_default();
        self.url_list = remote
            .url_list
            .map(member_names)
            .unwrap_or_default();
        if let Some(v) = remote.application_signature {
            self.application_signature = v;
        }
        if let Some(v) = remote.urls_defined_as_regular_expression {
            self.urls_defined_as_regular_expression = v;
        }
        if let Some(v) = remote.color {
            self.color = v;
        }
        if let Some(v) = remote.comments {
            self.comments = v;
        }
        self.groups = remote
            .groups
            .map(member_names)
            .unwrap_or_default();
        if let Some(v) = remote.ignore_warnings {
            self.ignore_warnings = v;
        }
        if let Some(v) = remote.ignore_errors {
            self.ignore_errors = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_keeps_presence() {
        let config = ApplicationSiteConfig::from_value(&json!({
            "id": "ignored",
            "name": "App1",
            "description": "",
            "urls_defined_as_regular_expression": false,
            "tags": ["t2", "t1", "t1"],
            "comments": null,
        }))
        .unwrap();

        assert_eq!(config.name, "App1");
        assert_eq!(config.description, Field::Set(String::new()));
        assert_eq!(config.urls_defined_as_regular_expression, Field::Set(false));
        assert_eq!(config.tags, Field::Set(names(&["t1", "t2"])));
        assert!(config.comments.is_unset());
        assert!(config.color.is_unset());
        assert!(config.groups.is_unset());
    }

    #[test]
    fn test_config_rejects_wrong_types() {
        let err = ApplicationSiteConfig::from_value(&json!({"name": "App1", "tags": "t1"}))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Serialization(_)));
    }

    #[test]
    fn test_with_defaults_fills_schema_defaults_only() {
        let mut prior = ApplicationSiteConfig::default().resolve(None);
        prior.primary_category = "Social".to_string();

        let config =
            ApplicationSiteConfig::from_value(&json!({"name": "App1", "ignore_errors": true}))
                .unwrap();
        let planned = config.with_defaults(Some(&prior));
        assert_eq!(planned.color, Field::Set("black".to_string()));
        assert_eq!(planned.urls_defined_as_regular_expression, Field::Set(false));
        assert_eq!(planned.ignore_warnings, Field::Set(false));
        assert_eq!(planned.ignore_errors, Field::Set(true));
        assert_eq!(planned.primary_category, Field::Set("Social".to_string()));
        assert!(planned.description.is_unset());
        assert!(planned.tags.is_unset());

        assert!(config.with_defaults(None).primary_category.is_unset());
        let value = serde_json::to_value(config.with_defaults(None)).unwrap();
        assert!(value["description"].is_null());
        assert_eq!(value["color"], "black");
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let config = ApplicationSiteConfig::from_value(&json!({"name": "App1"})).unwrap();
        let state = config.resolve(None);

        assert_eq!(state.id, "");
        assert_eq!(state.color, "black");
        assert!(!state.urls_defined_as_regular_expression);
        assert!(state.tags.is_empty());
        assert_eq!(state.primary_category, "");
    }

    #[test]
    fn test_resolve_carries_identity_and_computed_category() {
        let mut prior = ApplicationSiteConfig::from_value(&json!({"name": "App1"}))
            .unwrap()
            .resolve(None);
        prior.id = "123".to_string();
        prior.primary_category = "Social".to_string();
        prior.comments = "old".to_string();

        let planned = ApplicationSiteConfig::from_value(&json!({"name": "App1"})).unwrap();
        let state = planned.resolve(Some(&prior));
        assert_eq!(state.id, "123");
        assert_eq!(state.primary_category, "Social");
        // comments is not computed, so dropping it from the config clears it
        assert_eq!(state.comments, "");
    }

    #[test]
    fn test_state_round_trips_through_host_json() {
        let state = ApplicationSite::from_value(&json!({
            "id": "123",
            "name": "App1",
            "color": "red",
            "tags": ["t1"],
            "primary_category": "Social",
            "groups": null,
        }))
        .unwrap();
        assert!(state.exists());
        assert_eq!(state.primary_category, "Social");
        assert!(state.groups.is_empty());

        let value = state.to_value().unwrap();
        assert_eq!(value["id"], "123");
        assert_eq!(value["tags"], json!(["t1"]));
        assert_eq!(value["groups"], json!([]));
        assert_eq!(ApplicationSite::from_value(&value).unwrap(), state);
    }

    #[test]
    fn test_state_rejects_non_string_id() {
        let err = ApplicationSite::from_value(&json!({"id": 5, "name": "App1"})).unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[test]
    fn test_apply_remote_leaves_missing_scalars_and_resets_sets() {
        let mut state = ApplicationSite::from_value(&json!({
            "id": "123",
            "name": "App1",
            "comments": "keep me",
            "tags": ["t1"],
            "groups": ["g1"],
        }))
        .unwrap();

        let remote: ShowApplicationSite = serde_json::from_value(json!({
            "uid": "123",
            "name": "App1",
            "color": "red",
            "groups": [{"name": "g2", "uid": "aa"}],
        }))
        .unwrap();
        state.apply_remote(remote);

        assert_eq!(state.comments, "keep me");
        assert_eq!(state.color, "red");
        assert!(state.tags.is_empty());
        assert_eq!(state.groups, names(&["g2"]));
    }
}
