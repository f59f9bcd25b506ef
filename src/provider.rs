//! The provider surface the host drives.
//!
//! [`ProviderService`] is the trait a host calls with JSON configuration and
//! state. [`CheckpointProvider`] implements it for the Check Point resources,
//! holding the [`ApiClient`] it was constructed with.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::application_site::{
    self, ApplicationSite, ApplicationSiteConfig, ApplicationSiteResource,
};
use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema, Schema};
use crate::types::{ImportedResource, PlanResult, ProviderMetadata};
use crate::validation;

/// Trait that provider implementations must implement.
///
/// States and configurations travel as `serde_json::Value` objects keyed by
/// local attribute names.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata.
    /// By default, this is derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let mut resources: Vec<String> = self.schema().resources.keys().cloned().collect();
        resources.sort();
        ProviderMetadata { resources }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    /// Returns diagnostics (errors and warnings).
    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validation::validate(&self.schema().provider, &config))
    }

    /// Configure the provider.
    /// Returns diagnostics (errors and warnings).
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Plan changes for a resource.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a new resource.
    ///
    /// A resource created remotely whose state could not be completed is
    /// reported as [`ProviderError::Incomplete`]; the host should record its
    /// `partial_state` so the object is not orphaned.
    async fn create(&self, resource_type: &str, planned_state: Value)
        -> Result<Value, ProviderError>;

    /// Read the current state of a resource.
    ///
    /// A resource that no longer exists comes back with an empty `id`.
    async fn read(&self, resource_type: &str, current_state: Value)
        -> Result<Value, ProviderError>;

    /// Update an existing resource.
    ///
    /// As with [`create`](Self::create), [`ProviderError::Incomplete`]
    /// carries the state to record after a partial failure.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value)
        -> Result<(), ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::Unimplemented(format!(
            "Import not supported for resource type: {}",
            resource_type
        )))
    }
}

/// Check Point management provider.
pub struct CheckpointProvider<C: ?Sized> {
    application_sites: ApplicationSiteResource<C>,
}

impl<C: ApiClient + ?Sized> CheckpointProvider<C> {
    /// Create a provider that sends every command through `client`.
    pub fn new(client: Arc<C>) -> Self {
        Self {
            application_sites: ApplicationSiteResource::new(client),
        }
    }

    fn check_resource_type(&self, resource_type: &str) -> Result<(), ProviderError> {
        if resource_type == application_site::RESOURCE_TYPE {
            Ok(())
        } else {
            Err(ProviderError::UnknownResource(resource_type.to_string()))
        }
    }

    fn decode_config(&self, config: &Value) -> Result<ApplicationSiteConfig, ProviderError> {
        let schema = application_site::schema::schema();
        if let Err(errors) = validation::validate_result(&schema, config) {
            let summary = errors
                .iter()
                .map(|d| match &d.detail {
                    Some(detail) => format!("{}: {}", d.summary, detail),
                    None => d.summary.clone(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ProviderError::Validation(summary));
        }
        ApplicationSiteConfig::from_value(config)
    }
}

#[async_trait::async_trait]
impl<C: ApiClient + ?Sized> ProviderService for CheckpointProvider<C> {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(Schema::v0())
            .with_resource(application_site::RESOURCE_TYPE, application_site::schema::schema())
    }

    #[instrument(skip_all, name = "provider.configure")]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let diagnostics = self.validate_provider_config(config).await?;
        if diagnostics
            .iter()
            .any(|d| matches!(d.severity, DiagnosticSeverity::Error))
        {
            warn!(diagnostics = diagnostics.len(), "Configure completed with errors");
        } else {
            info!("Configure completed successfully");
        }
        Ok(diagnostics)
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        self.check_resource_type(resource_type)?;
        Ok(validation::validate(&application_site::schema::schema(), &config))
    }

    #[instrument(skip_all, name = "provider.plan", fields(resource_type = %resource_type))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.check_resource_type(resource_type)?;
        let prior = prior_state
            .as_ref()
            .filter(|v| !v.is_null())
            .map(ApplicationSite::from_value)
            .transpose()?;
        if !proposed_state.is_null() {
            self.decode_config(&proposed_state)?;
        }
        let result = application_site::plan::plan(prior.as_ref(), &proposed_state)?;
        debug!(
            changes = result.changes.len(),
            requires_replace = result.requires_replace,
            "Plan completed"
        );
        Ok(result)
    }

    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.check_resource_type(resource_type)?;
        let config = self.decode_config(&planned_state)?;
        self.application_sites.create(&config).await?.to_value()
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.check_resource_type(resource_type)?;
        let mut state = ApplicationSite::from_value(&current_state)?;
        self.application_sites.read(&mut state).await?;
        state.to_value()
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.check_resource_type(resource_type)?;
        let prior = ApplicationSite::from_value(&prior_state)?;
        if !prior.exists() {
            return Err(ProviderError::Validation(
                "cannot update an application site without an id".to_string(),
            ));
        }
        let planned = self.decode_config(&planned_state)?;
        self.application_sites.update(&prior, &planned).await?.to_value()
    }

    async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.check_resource_type(resource_type)?;
        let mut state = ApplicationSite::from_value(&current_state)?;
        self.application_sites.delete(&mut state).await
    }

    #[instrument(
        skip_all,
        name = "provider.import",
        fields(resource_type = %resource_type, uid = %id)
    )]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.check_resource_type(resource_type)?;
        let mut state = ApplicationSiteConfig::default().resolve(None);
        state.id = id.to_string();
        self.application_sites.read(&mut state).await?;
        if !state.exists() {
            return Err(ProviderError::NotFound(id.to_string()));
        }
        info!("Imported application site");
        Ok(vec![ImportedResource::new(resource_type, state.to_value()?)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_site::payload::{SET_COMMAND, SHOW_COMMAND};
    use crate::client::ApiResponse;
    use crate::testing::MockManagementServer;
    use serde_json::json;

    type Harness = (Arc<MockManagementServer>, CheckpointProvider<MockManagementServer>);

    fn provider() -> Harness {
        let server = Arc::new(MockManagementServer::new());
        (Arc::clone(&server), CheckpointProvider::new(server))
    }

    #[tokio::test]
    async fn test_schema_and_metadata() {
        let (_, provider) = provider();
        assert!(provider
            .schema()
            .resources
            .contains_key("checkpoint_management_application_site"));
        assert_eq!(
            provider.metadata().resources,
            vec!["checkpoint_management_application_site".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let (_, provider) = provider();
        let err = provider
            .create("checkpoint_management_host", json!({"name": "h1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_configure_warns_on_unknown_keys() {
        let (_, provider) = provider();
        let diagnostics = provider.configure(json!({"server": "10.0.0.1"})).await.unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Warning);
        assert!(provider.configure(json!({})).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_validates_before_calling() {
        let (server, provider) = provider();
        let err = provider
            .create(application_site::RESOURCE_TYPE, json!({"color": 3}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(err.to_string().contains("Missing required attribute 'name'"));
        assert!(server.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_read_reports_removal_with_empty_id() {
        let (server, provider) = provider();
        let state = provider
            .create(application_site::RESOURCE_TYPE, json!({"name": "App1"}))
            .await
            .unwrap();
        server.remove_object(state["id"].as_str().unwrap()).await;

        let state = provider
            .read(application_site::RESOURCE_TYPE, state)
            .await
            .unwrap();
        assert_eq!(state["id"], "");
        assert_eq!(state["name"], "App1");
    }

    #[tokio::test]
    async fn test_create_hands_back_state_when_read_back_fails() {
        let (server, provider) = provider();
        server
            .respond_to(
                SHOW_COMMAND,
                ApiResponse::failure("generic_err_wrong_session_id", "Session expired"),
            )
            .await;

        let err = provider
            .create(application_site::RESOURCE_TYPE, json!({"name": "App1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Incomplete { .. }));
        let partial = err.partial_state().unwrap().clone();
        let uid = partial["id"].as_str().unwrap();
        assert!(server.objects().await.contains_key(uid));

        let state = provider
            .read(application_site::RESOURCE_TYPE, partial.clone())
            .await
            .unwrap();
        assert_eq!(state["id"], partial["id"]);
        assert_eq!(state["name"], "App1");
    }

    #[tokio::test]
    async fn test_planned_description_update_sends_request_flags() {
        let (server, provider) = provider();
        let prior = provider
            .create(application_site::RESOURCE_TYPE, json!({"name": "App1"}))
            .await
            .unwrap();
        let plan = provider
            .plan(
                application_site::RESOURCE_TYPE,
                Some(prior.clone()),
                json!({"name": "App1", "description": "hello"}),
            )
            .await
            .unwrap();
        server.clear_calls().await;

        let state = provider
            .update(application_site::RESOURCE_TYPE, prior, plan.planned_state)
            .await
            .unwrap();

        let calls = server.calls().await;
        assert_eq!(calls[0].command, SET_COMMAND);
        assert_eq!(
            calls[0].payload,
            json!({
                "name": "App1",
                "description": "hello",
                "ignore-warnings": false,
                "ignore-errors": false,
            })
        );
        assert_eq!(state["description"], "hello");
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let (_, provider) = provider();
        let err = provider
            .update(
                application_site::RESOURCE_TYPE,
                json!({"name": "App1"}),
                json!({"name": "App2"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_import_existing_and_missing() {
        let (_, provider) = provider();
        let created = provider
            .create(
                application_site::RESOURCE_TYPE,
                json!({"name": "App1", "tags": ["t1"]}),
            )
            .await
            .unwrap();
        let uid = created["id"].as_str().unwrap();

        let imported = provider
            .import_resource(application_site::RESOURCE_TYPE, uid)
            .await
            .unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].state["name"], "App1");
        assert_eq!(imported[0].state["tags"], json!(["t1"]));

        let err = provider
            .import_resource(application_site::RESOURCE_TYPE, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }
}
