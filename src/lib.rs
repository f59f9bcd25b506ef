//! Check Point Management provider
//!
//! This crate implements the `checkpoint_management_application_site`
//! resource for a Terraform-style host: a declared application site is
//! created, read back, updated in place and deleted through the Check Point
//! Management API.
//!
//! # Overview
//!
//! - **ProviderService trait**: The schema/validate/plan/CRUD surface a host drives
//! - **ApiClient trait**: The seam to an authenticated management session
//! - **Application site resource**: Field mapping, update diffs and response decoding
//! - **Schema & validation**: Attribute schemas and diagnostics for configurations
//! - **Error types**: A single [`ProviderError`] for every failure
//! - **Logging**: Integration with `tracing` for structured logging
//! - **Testing**: An in-memory management server and a lifecycle tester
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use checkpoint_provider::{CheckpointProvider, ProviderError, ProviderService};
//! use serde_json::json;
//!
//! async fn apply(client: Arc<MyManagementClient>) -> Result<(), ProviderError> {
//!     checkpoint_provider::init_logging();
//!     let provider = CheckpointProvider::new(client);
//!
//!     let plan = provider
//!         .plan("checkpoint_management_application_site", None, json!({
//!             "name": "New Application Site",
//!             "primary_category": "Social Networking",
//!             "url_list": ["www.cnet.com", "www.stackoverflow.com"],
//!         }))
//!         .await?;
//!     let state = provider
//!         .create("checkpoint_management_application_site", plan.planned_state)
//!         .await?;
//!     tracing::info!(id = %state["id"], "created");
//!     Ok(())
//! }
//! ```
//!
//! # Sessions
//!
//! The provider never logs in. The [`ApiClient`] handed to
//! [`CheckpointProvider::new`] owns the session and reports its identifier,
//! and every command runs synchronously (wait for task, no proxy).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application_site;
pub mod client;
pub mod error;
pub mod field;
pub mod logging;
pub mod provider;
pub mod schema;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::{ApiClient, ApiResponse, CallOptions};
pub use error::ProviderError;
pub use field::Field;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{CheckpointProvider, ProviderService};
pub use schema::ProviderSchema;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
