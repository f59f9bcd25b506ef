//! Attribute schemas and diagnostics.
//!
//! A [`Schema`] lists the attributes of a resource (or of the provider
//! configuration) together with their type, whether the user or the server
//! supplies them, and their default. Validation, planning and the host's
//! documentation all read from it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A string.
    String,
    /// A boolean.
    Bool,
    /// An unordered collection of unique elements.
    Set(Box<AttributeType>),
}

impl AttributeType {
    /// A set whose elements are `element_type`.
    pub fn set(element_type: AttributeType) -> Self {
        Self::Set(Box::new(element_type))
    }
}

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeMode {
    /// Must be configured.
    Required,
    /// May be configured.
    Optional,
    /// Only the server sets it.
    Computed,
    /// May be configured, otherwise the server picks a value.
    OptionalComputed,
}

impl AttributeMode {
    /// Whether configuration must contain the attribute.
    pub fn is_required(self) -> bool {
        self == Self::Required
    }

    /// Whether configuration may contain the attribute.
    pub fn is_configurable(self) -> bool {
        self != Self::Computed
    }
}

/// One attribute of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Value type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Who supplies the value.
    pub mode: AttributeMode,
    /// Shown in the host's documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value planned when the attribute is not configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Attribute {
    /// An attribute with no description or default.
    pub fn new(attr_type: AttributeType, mode: AttributeMode) -> Self {
        Self {
            attr_type,
            mode,
            description: None,
            default: None,
        }
    }

    /// A required string.
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, AttributeMode::Required)
    }

    /// An optional string.
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, AttributeMode::Optional)
    }

    /// A string only the server sets, such as an object uid.
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, AttributeMode::Computed)
    }

    /// An optional boolean.
    pub fn optional_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeMode::Optional)
    }

    /// An optional set of strings.
    pub fn optional_string_set() -> Self {
        Self::new(AttributeType::set(AttributeType::String), AttributeMode::Optional)
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Let the server fill the attribute when it is not configured.
    pub fn computed(mut self) -> Self {
        self.mode = match self.mode {
            AttributeMode::Required => AttributeMode::Required,
            AttributeMode::Optional | AttributeMode::OptionalComputed => {
                AttributeMode::OptionalComputed
            },
            AttributeMode::Computed => AttributeMode::Computed,
        };
        self
    }
}

/// Attributes of a resource or of the provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Bumped when the stored state layout changes.
    #[serde(default)]
    pub version: u64,
    /// Attributes keyed by local name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, Attribute>,
    /// Shown in the host's documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    /// An empty schema at version 0.
    pub fn v0() -> Self {
        Self {
            version: 0,
            attributes: HashMap::new(),
            description: None,
        }
    }

    /// Add `attr` under `name`.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The attribute called `name`, if any.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::v0()
    }
}

/// Everything the provider exposes to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// Provider configuration.
    #[serde(default)]
    pub provider: Schema,
    /// Resource schemas keyed by resource type.
    #[serde(default)]
    pub resources: HashMap<String, Schema>,
}

impl ProviderSchema {
    /// No provider attributes and no resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the provider configuration schema.
    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    /// Register `schema` for `resource_type`.
    pub fn with_resource(mut self, resource_type: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(resource_type.into(), schema);
        self
    }
}

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// The operation cannot go ahead.
    Error,
    /// Reported, but the operation goes ahead.
    Warning,
}

/// A problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious it is.
    pub severity: DiagnosticSeverity,
    /// One-line description.
    pub summary: String,
    /// Longer explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Path of the offending attribute, such as `tags.1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    fn new(severity: DiagnosticSeverity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// An error.
    pub fn error(summary: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, summary)
    }

    /// A warning.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, summary)
    }

    /// Attach a detail.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach the attribute path.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether the severity is [`DiagnosticSeverity::Error`].
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}
