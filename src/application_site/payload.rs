//! Wire payloads of the application site commands.
//!
//! Requests are typed structs whose unset fields are never serialized, and
//! responses go through a validating decode so that an unexpected body is a
//! [`ProviderError::MalformedResponse`] rather than a panic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::{ApplicationSite, ApplicationSiteConfig};
use crate::error::ProviderError;
use crate::field::Field;

/// Creates an application site.
pub const ADD_COMMAND: &str = "add-application-site";
/// Fetches an application site by uid.
pub const SHOW_COMMAND: &str = "show-application-site";
/// Modifies an application site.
pub const SET_COMMAND: &str = "set-application-site";
/// Deletes an application site by uid.
pub const DELETE_COMMAND: &str = "delete-application-site";

/// Body of `add-application-site`: only the configured attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AddApplicationSite {
    name: String,
    #[serde(skip_serializing_if = "Field::is_unset")]
    additional_categories: Field<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    description: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    primary_category: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    tags: Field<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    url_list: Field<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    application_signature: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    urls_defined_as_regular_expression: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    color: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    comments: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    groups: Field<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    ignore_warnings: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    ignore_errors: Field<bool>,
}

impl From<&ApplicationSiteConfig> for AddApplicationSite {
    fn from(config: &ApplicationSiteConfig) -> Self {
        Self {
            name: config.name.clone(),
            additional_categories: config.additional_categories.clone(),
            description: config.description.clone(),
            primary_category: config.primary_category.clone(),
            tags: config.tags.clone(),
            url_list: config.url_list.clone(),
            application_signature: config.application_signature.clone(),
            urls_defined_as_regular_expression: config.urls_defined_as_regular_expression.clone(),
            color: config.color.clone(),
            comments: config.comments.clone(),
            groups: config.groups.clone(),
            ignore_warnings: config.ignore_warnings.clone(),
            ignore_errors: config.ignore_errors.clone(),
        }
    }
}

/// New value of a set attribute in `set-application-site`.
///
/// The API does not treat an empty list as "remove everything", so clearing a
/// set enumerates the members to remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SetMembers {
    /// Replace the members with these names.
    Assign(BTreeSet<String>),
    /// Remove these members.
    Remove {
        /// Names to remove.
        remove: BTreeSet<String>,
    },
}

impl SetMembers {
    fn diff(prior: &BTreeSet<String>, desired: &BTreeSet<String>) -> Field<Self> {
        if prior == desired {
            Field::Unset
        } else if desired.is_empty() {
            Field::Set(Self::Remove {
                remove: prior.clone(),
            })
        } else {
            Field::Set(Self::Assign(desired.clone()))
        }
    }
}

/// Body of `set-application-site`: the object name plus changed attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SetApplicationSite {
    name: String,
    #[serde(skip_serializing_if = "Field::is_unset")]
    new_name: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    additional_categories: Field<SetMembers>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    description: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    primary_category: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    tags: Field<SetMembers>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    url_list: Field<SetMembers>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    application_signature: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    urls_defined_as_regular_expression: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    color: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    comments: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    groups: Field<SetMembers>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    ignore_warnings: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    ignore_errors: Field<bool>,
}

impl SetApplicationSite {
    /// Compute the update from `prior` state to the `planned` configuration.
    ///
    /// The object is addressed by its prior name; a rename adds `new-name`.
    /// The request-only flags are sent whenever they are configured. A planned
    /// state always configures them (as `false` by default), so an update
    /// applied from a plan carries `ignore-warnings` and `ignore-errors` on
    /// top of the changed attributes. Only a configuration that leaves them
    /// unset produces a payload of just `name` and the changes.
    pub fn diff(prior: &ApplicationSite, planned: &ApplicationSiteConfig) -> Self {
        let desired = planned.resolve(Some(prior));
        Self {
            name: prior.name.clone(),
            new_name: changed(&prior.name, &desired.name),
            additional_categories: SetMembers::diff(
                &prior.additional_categories,
                &desired.additional_categories,
            ),
            description: changed(&prior.description, &desired.description),
            primary_category: changed(&prior.primary_category, &desired.primary_category),
            tags: SetMembers::diff(&prior.tags, &desired.tags),
            url_list: SetMembers::diff(&prior.url_list, &desired.url_list),
            application_signature: changed(
                &prior.application_signature,
                &desired.application_signature,
            ),
            urls_defined_as_regular_expression: changed(
                &prior.urls_defined_as_regular_expression,
                &desired.urls_defined_as_regular_expression,
            ),
            color: changed(&prior.color, &desired.color),
            comments: changed(&prior.comments, &desired.comments),
            groups: SetMembers::diff(&prior.groups, &desired.groups),
            ignore_warnings: planned.ignore_warnings.clone(),
            ignore_errors: planned.ignore_errors.clone(),
        }
    }
}

fn changed<T: PartialEq + Clone>(prior: &T, desired: &T) -> Field<T> {
    if prior == desired {
        Field::Unset
    } else {
        Field::Set(desired.clone())
    }
}

/// Body of `show-application-site` and `delete-application-site`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UidPayload<'a> {
    /// Object uid.
    pub uid: &'a str,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    uid: String,
}

/// Extract the uid the server assigned in an `add-application-site` response.
///
/// An empty uid is malformed: locally it would mean the object was never
/// created.
pub fn decode_uid(data: Value) -> Result<String, ProviderError> {
    let response = serde_json::from_value::<AddResponse>(data)
        .map_err(|e| ProviderError::malformed(ADD_COMMAND, e.to_string()))?;
    if response.uid.is_empty() {
        return Err(ProviderError::malformed(ADD_COMMAND, "empty uid"));
    }
    Ok(response.uid)
}

/// An application site as returned by `show-application-site`.
///
/// Every attribute is optional; `null` and absent are the same.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShowApplicationSite {
    /// Object uid.
    pub uid: Option<String>,
    /// Object name.
    pub name: Option<String>,
    /// Additional categories.
    #[serde(alias = "additional_categories")]
    pub additional_categories: Option<Vec<MemberRef>>,
    /// Description.
    pub description: Option<String>,
    /// Primary category.
    pub primary_category: Option<String>,
    /// Tags.
    pub tags: Option<Vec<MemberRef>>,
    /// URL list.
    #[serde(alias = "url_list")]
    pub url_list: Option<Vec<MemberRef>>,
    /// Application signature.
    pub application_signature: Option<String>,
    /// Whether the URLs are regular expressions.
    pub urls_defined_as_regular_expression: Option<bool>,
    /// Color.
    pub color: Option<String>,
    /// Comments.
    pub comments: Option<String>,
    /// Groups.
    pub groups: Option<Vec<MemberRef>>,
    /// Ignore-warnings flag, if echoed.
    pub ignore_warnings: Option<bool>,
    /// Ignore-errors flag, if echoed.
    pub ignore_errors: Option<bool>,
}

impl ShowApplicationSite {
    /// Decode a `show-application-site` body.
    pub fn decode(data: Value) -> Result<Self, ProviderError> {
        serde_json::from_value(data)
            .map_err(|e| ProviderError::malformed(SHOW_COMMAND, e.to_string()))
    }
}

/// A member of a set attribute in a server response.
///
/// Members are usually objects such as `{"name": "t1", "uid": "..."}`; some
/// attributes list bare names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MemberRef {
    /// A referenced object.
    Object {
        /// The object's name.
        name: String,
    },
    /// A bare name.
    Name(String),
}

impl MemberRef {
    /// The member's name.
    pub fn into_name(self) -> String {
        match self {
            Self::Object { name } | Self::Name(name) => name,
        }
    }
}

/// Collect the names of a member list.
pub fn member_names(members: Vec<MemberRef>) -> BTreeSet<String> {
    members.into_iter().map(MemberRef::into_name).collect()
}
