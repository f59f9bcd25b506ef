//! Create, read, update and delete handlers for application sites.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::model::{ApplicationSite, ApplicationSiteConfig};
use super::payload::{
    decode_uid, AddApplicationSite, SetApplicationSite, ShowApplicationSite, UidPayload,
    ADD_COMMAND, DELETE_COMMAND, SET_COMMAND, SHOW_COMMAND,
};
use crate::client::{self, ApiClient, ApiResponse, CallOptions};
use crate::error::ProviderError;

/// Manages application sites through an [`ApiClient`].
///
/// Every handler issues its commands one at a time and returns on the first
/// failure. Create and Update finish with a Read so the returned state
/// reflects what the server stored.
pub struct ApplicationSiteResource<C: ?Sized> {
    client: Arc<C>,
    options: CallOptions,
}

impl<C: ?Sized> Clone for ApplicationSiteResource<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            options: self.options,
        }
    }
}

impl<C: ApiClient + ?Sized> ApplicationSiteResource<C> {
    /// Create a handler set that runs commands synchronously through `client`.
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            options: CallOptions::SYNC,
        }
    }

    /// Create the object described by `config` and return its hydrated state.
    ///
    /// If the object is created but cannot be read back, the error is
    /// [`ProviderError::Incomplete`] holding the state with the new uid.
    #[instrument(skip_all, name = "application_site.create", fields(name = %config.name))]
    pub async fn create(
        &self,
        config: &ApplicationSiteConfig,
    ) -> Result<ApplicationSite, ProviderError> {
        let payload = encode(&AddApplicationSite::from(config))?;
        debug!(payload = %payload, "Create ApplicationSite");

        let data = client::call(self.client.as_ref(), ADD_COMMAND, payload, self.options).await?;
        let uid = decode_uid(data)?;
        info!(uid = %uid, "ApplicationSite created");

        let mut state = config.resolve(None);
        state.id = uid;
        self.read_back(state).await
    }

    /// Refresh `state` from the server.
    ///
    /// When the server no longer knows the object, the id is cleared and the
    /// call succeeds.
    #[instrument(skip_all, name = "application_site.read", fields(uid = %state.id))]
    pub async fn read(&self, state: &mut ApplicationSite) -> Result<(), ProviderError> {
        if !state.exists() {
            debug!("ApplicationSite has no uid, nothing to read");
            return Ok(());
        }

        let payload = encode(&UidPayload { uid: &state.id })?;
        let response = self.send(SHOW_COMMAND, payload).await?;
        if !response.success {
            if response.is_not_found() {
                warn!("ApplicationSite no longer exists, clearing id");
                state.clear_id();
                return Ok(());
            }
            return Err(response.into_error(SHOW_COMMAND));
        }

        debug!(body = %response.data, "Read ApplicationSite");
        let remote = ShowApplicationSite::decode(response.data)?;
        state.apply_remote(remote);
        Ok(())
    }

    /// Apply the difference between `prior` and `planned` and return the
    /// refreshed state.
    ///
    /// A failed read after a successful `set` is reported as
    /// [`ProviderError::Incomplete`] holding the updated state.
    #[instrument(skip_all, name = "application_site.update", fields(uid = %prior.id))]
    pub async fn update(
        &self,
        prior: &ApplicationSite,
        planned: &ApplicationSiteConfig,
    ) -> Result<ApplicationSite, ProviderError> {
        let payload = encode(&SetApplicationSite::diff(prior, planned))?;
        debug!(payload = %payload, "Update ApplicationSite");

        client::call(self.client.as_ref(), SET_COMMAND, payload, self.options).await?;
        info!("ApplicationSite updated");

        let state = planned.resolve(Some(prior));
        self.read_back(state).await
    }

    /// Delete the object and clear the id of `state`.
    #[instrument(skip_all, name = "application_site.delete", fields(uid = %state.id))]
    pub async fn delete(&self, state: &mut ApplicationSite) -> Result<(), ProviderError> {
        let payload = encode(&UidPayload { uid: &state.id })?;
        debug!("Delete ApplicationSite");

        client::call(self.client.as_ref(), DELETE_COMMAND, payload, self.options).await?;
        info!("ApplicationSite deleted");

        state.clear_id();
        Ok(())
    }

    /// Refresh `state` after a successful write. On failure the error keeps
    /// `state` so the change made on the server is not lost.
    async fn read_back(
        &self,
        mut state: ApplicationSite,
    ) -> Result<ApplicationSite, ProviderError> {
        match self.read(&mut state).await {
            Ok(()) => Ok(state),
            Err(err) => {
                warn!(error = %err, "ApplicationSite changed but could not be read back");
                Err(ProviderError::incomplete(state.to_value()?, err))
            },
        }
    }

    async fn send(&self, command: &str, payload: Value) -> Result<ApiResponse, ProviderError> {
        self.client
            .api_call(
                command,
                payload,
                &self.client.session_id(),
                self.options.wait_for_task,
                self.options.use_proxy,
            )
            .await
    }
}

fn encode<T: Serialize>(payload: &T) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(payload)?)
}
