//! The `checkpoint_management_application_site` resource.
//!
//! An application site is a custom application or URL-defined site used by
//! Application and URL Filtering. Locally it is a flat set of attributes;
//! remotely it is managed through the `add-`, `show-`, `set-` and
//! `delete-application-site` commands, whose keys are kebab-case and whose
//! set members are `{name, uid, ...}` objects.

pub mod model;
pub mod payload;
pub mod plan;
pub mod resource;
pub mod schema;

pub use model::{ApplicationSite, ApplicationSiteConfig};
pub use resource::ApplicationSiteResource;
pub use schema::RESOURCE_TYPE;
