//! Checks a JSON configuration against a [`Schema`].
//!
//! Runs before a configuration is decoded so that a wrong type is reported
//! as a diagnostic on the attribute rather than as a decode failure.
//!
//! # Example
//!
//! ```
//! use checkpoint_provider::schema::{Attribute, Schema};
//! use checkpoint_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("tags", Attribute::optional_string_set());
//!
//! assert!(validate(&schema, &json!({"name": "App1", "tags": ["t1"]})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "App1", "tags": "t1"}));
//! assert_eq!(diagnostics[0].attribute.as_deref(), Some("tags"));
//! ```

use std::collections::HashSet;

use serde_json::Value;

use crate::schema::{AttributeType, Diagnostic, Schema};

/// All diagnostics for `value`, errors and warnings alike.
///
/// - `null` is accepted as "no configuration".
/// - A required attribute must be present and not `null`.
/// - Server-owned attributes are not checked.
/// - Values must match the attribute type, set elements included.
/// - Duplicate set elements and undeclared keys are warnings.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut checker = Checker::default();
    match value {
        Value::Null => {},
        Value::Object(object) => {
            let mut declared: Vec<_> = schema.attributes.iter().collect();
            declared.sort_by(|a, b| a.0.cmp(b.0));
            for (name, attr) in declared {
                if !attr.mode.is_configurable() {
                    continue;
                }
                match object.get(name.as_str()).filter(|v| !v.is_null()) {
                    Some(v) => checker.check(&attr.attr_type, v, name),
                    None if attr.mode.is_required() => checker.push(
                        Diagnostic::error(format!("Missing required attribute '{}'", name))
                            .with_attribute(name.as_str()),
                    ),
                    None => {},
                }
            }

            let mut undeclared: Vec<&String> = object
                .keys()
                .filter(|key| schema.attribute(key).is_none())
                .collect();
            undeclared.sort();
            for key in undeclared {
                checker.push(
                    Diagnostic::warning(format!("Unknown attribute '{}'", key))
                        .with_detail("The attribute is not part of the schema and will be ignored")
                        .with_attribute(key.as_str()),
                );
            }
        },
        other => checker.push(
            Diagnostic::error("Expected object").with_detail(format!("Got {}", kind(other))),
        ),
    }
    checker.diagnostics
}

/// `Err` with only the error diagnostics when there is at least one.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let errors: Vec<Diagnostic> = validate(schema, value)
        .into_iter()
        .filter(Diagnostic::is_error)
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whether `value` passes with warnings at most.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate_result(schema, value).is_ok()
}

#[derive(Default)]
struct Checker {
    diagnostics: Vec<Diagnostic>,
}

impl Checker {
    fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn check(&mut self, expected: &AttributeType, value: &Value, path: &str) {
        match (expected, value) {
            (AttributeType::String, Value::String(_)) => {},
            (AttributeType::Bool, Value::Bool(_)) => {},
            (AttributeType::Set(element), Value::Array(items)) => {
                let mut seen = HashSet::new();
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}.{}", path, i);
                    self.check(element, item, &item_path);
                    if !seen.insert(item.to_string()) {
                        self.push(
                            Diagnostic::warning(format!("Duplicate element in set '{}'", path))
                                .with_detail(format!("{} appears more than once", item))
                                .with_attribute(item_path),
                        );
                    }
                }
            },
            (expected, got) => {
                let expected = match expected {
                    AttributeType::String => "string",
                    AttributeType::Bool => "bool",
                    AttributeType::Set(_) => "set",
                };
                self.push(
                    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
                        .with_detail(format!("Expected {}, got {}", expected, kind(got)))
                        .with_attribute(path),
                );
            },
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, DiagnosticSeverity};
    use serde_json::json;

    fn site_schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("comments", Attribute::optional_string())
            .with_attribute("ignore_errors", Attribute::optional_bool())
            .with_attribute("groups", Attribute::optional_string_set())
    }

    #[test]
    fn test_name_must_be_a_present_string() {
        let schema = site_schema();
        assert!(validate(&schema, &json!({"name": "App1"})).is_empty());

        for config in [json!({}), json!({"name": null})] {
            let diagnostics = validate(&schema, &config);
            assert_eq!(diagnostics.len(), 1, "{}", config);
            assert_eq!(diagnostics[0].summary, "Missing required attribute 'name'");
        }

        let diagnostics = validate(&schema, &json!({"name": 123}));
        assert_eq!(diagnostics[0].summary, "Invalid type for attribute 'name'");
        assert_eq!(diagnostics[0].detail.as_deref(), Some("Expected string, got number"));
    }

    #[test]
    fn test_optional_attributes_may_be_null() {
        let schema = site_schema();
        assert!(validate(
            &schema,
            &json!({"name": "App1", "comments": null, "ignore_errors": false}),
        )
        .is_empty());

        let diagnostics = validate(&schema, &json!({"name": "App1", "ignore_errors": "yes"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].detail.as_deref(), Some("Expected bool, got string"));
    }

    #[test]
    fn test_server_owned_id_is_not_checked() {
        let schema = site_schema();
        assert!(validate(&schema, &json!({"name": "App1", "id": 7})).is_empty());
    }

    #[test]
    fn test_set_elements() {
        let schema = site_schema();
        assert!(validate(&schema, &json!({"name": "App1", "groups": []})).is_empty());

        let diagnostics = validate(&schema, &json!({"name": "App1", "groups": ["a", 1]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("groups.1"));

        let duplicates = json!({"name": "App1", "groups": ["a", "a"]});
        let diagnostics = validate(&schema, &duplicates);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Warning);
        assert!(is_valid(&schema, &duplicates));

        let diagnostics = validate(&schema, &json!({"name": "App1", "groups": "g1"}));
        assert_eq!(diagnostics[0].detail.as_deref(), Some("Expected set, got string"));
    }

    #[test]
    fn test_unknown_attribute_is_warning() {
        let schema = site_schema();
        let diagnostics = validate(&schema, &json!({"name": "App1", "colour": "red"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Warning);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("colour"));
    }

    #[test]
    fn test_validate_result_keeps_errors_only() {
        let schema = site_schema();
        assert!(validate_result(&schema, &json!({"name": "App1", "extra": 1})).is_ok());

        let errors = validate_result(&schema, &json!({"comments": 1})).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(Diagnostic::is_error));
    }

    #[test]
    fn test_root_must_be_object_or_null() {
        let schema = site_schema();
        assert!(validate(&schema, &Value::Null).is_empty());

        let diagnostics = validate(&schema, &json!("not an object"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].detail.as_deref(), Some("Got string"));
    }
}
