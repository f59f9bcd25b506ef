//! Declarative schema of the application site resource.

use serde_json::json;

use crate::schema::{Attribute, Schema};

/// Resource type name exposed to the host.
pub const RESOURCE_TYPE: &str = "checkpoint_management_application_site";

/// Color assigned when none is configured.
pub const DEFAULT_COLOR: &str = "black";

/// The local attribute names, in declaration order.
pub const ATTRIBUTES: [&str; 13] = [
    "name",
    "additional_categories",
    "description",
    "primary_category",
    "tags",
    "url_list",
    "application_signature",
    "urls_defined_as_regular_expression",
    "color",
    "comments",
    "groups",
    "ignore_warnings",
    "ignore_errors",
];

/// Build the resource schema.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description(
            "Custom application or URL-defined site used by Application and URL Filtering.",
        )
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("Object unique identifier."),
        )
        .with_attribute(
            "name",
            Attribute::required_string().with_description("Object name."),
        )
        .with_attribute(
            "additional_categories",
            Attribute::optional_string_set().with_description(
                "Used to configure or edit the additional categories of a custom application / \
                 site used in the Application and URL Filtering or Threat Prevention.",
            ),
        )
        .with_attribute(
            "description",
            Attribute::optional_string().with_description("A description for the application."),
        )
        .with_attribute(
            "primary_category",
            Attribute::optional_string().computed().with_description(
                "Each application is assigned to one primary category based on its most \
                 defining aspect.",
            ),
        )
        .with_attribute(
            "tags",
            Attribute::optional_string_set().with_description("Collection of tag identifiers."),
        )
        .with_attribute(
            "url_list",
            Attribute::optional_string_set()
                .with_description("URLs that determine this particular application."),
        )
        .with_attribute(
            "application_signature",
            Attribute::optional_string().with_description(
                "Application signature generated by \
                 <a href=\"https://supportcenter.checkpoint.com/supportcenter/portal?\
                 eventSubmit_doGoviewsolutiondetails=&solutionid=sk103051\">Signature Tool</a>.",
            ),
        )
        .with_attribute(
            "urls_defined_as_regular_expression",
            Attribute::optional_bool()
                .with_description(
                    "States whether the URL is defined as a Regular Expression or not.",
                )
                .with_default(json!(false)),
        )
        .with_attribute(
            "color",
            Attribute::optional_string()
                .with_description("Color of the object. Should be one of existing colors.")
                .with_default(json!(DEFAULT_COLOR)),
        )
        .with_attribute(
            "comments",
            Attribute::optional_string().with_description("Comments string."),
        )
        .with_attribute(
            "groups",
            Attribute::optional_string_set().with_description("Collection of group identifiers."),
        )
        .with_attribute(
            "ignore_warnings",
            Attribute::optional_bool()
                .with_description("Apply changes ignoring warnings.")
                .with_default(json!(false)),
        )
        .with_attribute(
            "ignore_errors",
            Attribute::optional_bool()
                .with_description(
                    "Apply changes ignoring errors. You won't be able to publish such a changes. \
                     If ignore-warnings flag was omitted - warnings will also be ignored.",
                )
                .with_default(json!(false)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeMode, AttributeType};

    #[test]
    fn test_declares_every_attribute() {
        let schema = schema();
        for name in ATTRIBUTES {
            let attr = schema
                .attribute(name)
                .unwrap_or_else(|| panic!("missing attribute {}", name));
            assert!(attr.description.is_some(), "{} has no description", name);
        }
        // the 13 configurable attributes plus the computed id
        assert_eq!(schema.attributes.len(), ATTRIBUTES.len() + 1);
    }

    #[test]
    fn test_only_name_is_required() {
        let schema = schema();
        let required: Vec<&String> = schema
            .attributes
            .iter()
            .filter(|(_, attr)| attr.mode.is_required())
            .map(|(name, _)| name)
            .collect();
        assert_eq!(required, vec!["name"]);
        assert_eq!(schema.attribute("id").unwrap().mode, AttributeMode::Computed);
        assert_eq!(
            schema.attribute("primary_category").unwrap().mode,
            AttributeMode::OptionalComputed
        );
    }

    #[test]
    fn test_types_and_defaults() {
        let schema = schema();
        assert_eq!(
            schema.attribute("tags").unwrap().attr_type,
            AttributeType::set(AttributeType::String)
        );
        assert_eq!(
            schema.attribute("ignore_errors").unwrap().attr_type,
            AttributeType::Bool
        );
        assert_eq!(
            schema.attribute("color").unwrap().default,
            Some(json!("black"))
        );
        assert_eq!(
            schema
                .attribute("urls_defined_as_regular_expression")
                .unwrap()
                .default,
            Some(json!(false))
        );
        assert!(schema.attribute("comments").unwrap().default.is_none());
    }
}
