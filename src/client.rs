//! The management API client seam.
//!
//! Sessions, HTTP and authentication belong to the host. Resources only see an
//! [`ApiClient`] that executes one named command with a JSON payload and hands
//! back an [`ApiResponse`]. Handlers receive the client explicitly, which keeps
//! them testable against [`crate::testing::MockManagementServer`].

use serde_json::Value;

use crate::error::ProviderError;

/// Error code the management server uses for unknown objects.
pub const OBJECT_NOT_FOUND_CODE: &str = "generic_err_object_not_found";

/// Returns `true` when `code` means the requested object does not exist.
pub fn is_object_not_found(code: &str) -> bool {
    code == OBJECT_NOT_FOUND_CODE
}

/// Flags passed with every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Block until the server-side task finishes.
    pub wait_for_task: bool,
    /// Route the call through the management proxy in the background.
    pub use_proxy: bool,
}

impl CallOptions {
    /// Synchronous, non-background execution.
    pub const SYNC: CallOptions = CallOptions {
        wait_for_task: true,
        use_proxy: false,
    };
}

impl Default for CallOptions {
    fn default() -> Self {
        Self::SYNC
    }
}

/// The outcome of a command that reached the management server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Whether the server accepted the command.
    pub success: bool,
    /// The server's error message, when it rejected the command.
    pub error_message: Option<String>,
    /// The response body.
    pub data: Value,
}

impl ApiResponse {
    /// A successful response carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            error_message: None,
            data,
        }
    }

    /// A rejected command with the server's `code` and `message`.
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: serde_json::json!({ "code": code.into(), "message": message }),
            error_message: Some(message),
        }
    }

    /// The structured error code in the body, if present.
    pub fn code(&self) -> Option<&str> {
        self.data.get("code").and_then(Value::as_str)
    }

    /// Whether the server reported the target object as missing.
    pub fn is_not_found(&self) -> bool {
        !self.success && self.code().is_some_and(is_object_not_found)
    }

    /// Convert a rejected response into an error for `command`.
    ///
    /// The server's message is used verbatim; without one the error names the
    /// failed command.
    pub fn into_error(self, command: &str) -> ProviderError {
        let code = self.code().map(str::to_string);
        match self.error_message.filter(|m| !m.is_empty()) {
            Some(message) => ProviderError::api(code, message),
            None => ProviderError::api(code, format!("{} failed", command)),
        }
    }
}

/// Executes management API commands on behalf of a resource.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync + 'static {
    /// Execute `command` with `payload` in the given session.
    ///
    /// An `Err` means the call did not complete (transport failure). A server
    /// rejection is an `Ok` response with `success == false`.
    async fn api_call(
        &self,
        command: &str,
        payload: Value,
        session_id: &str,
        wait_for_task: bool,
        use_proxy: bool,
    ) -> Result<ApiResponse, ProviderError>;

    /// The identifier of the session calls run in.
    fn session_id(&self) -> String;
}

/// Execute `command` in the client's session with `options`.
///
/// Returns the response body on success. Transport errors are returned as is;
/// rejected commands become [`ProviderError::Api`].
pub async fn call<C: ApiClient + ?Sized>(
    client: &C,
    command: &str,
    payload: Value,
    options: CallOptions,
) -> Result<Value, ProviderError> {
    let response = client
        .api_call(
            command,
            payload,
            &client.session_id(),
            options.wait_for_task,
            options.use_proxy,
        )
        .await?;
    if response.success {
        Ok(response.data)
    } else {
        Err(response.into_error(command))
    }
}
