//! Error types for the Check Point provider.

use thiserror::Error;

/// Errors that can occur while managing Check Point objects.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The management API reported a failed call.
    ///
    /// The message is the one returned by the API and is displayed verbatim.
    #[error("{message}")]
    Api {
        /// Structured error code from the response body, if any.
        code: Option<String>,
        /// Human-readable message from the response.
        message: String,
    },

    /// The remote call itself failed (network, session, encoding).
    #[error("{0}")]
    Transport(String),

    /// The API answered with a body that does not have the expected shape.
    #[error("Malformed response from {command}: {detail}")]
    MalformedResponse {
        /// The API command whose response could not be decoded.
        command: String,
        /// What was wrong with the body.
        detail: String,
    },

    /// The server applied a change but the follow-up read failed.
    ///
    /// `state` is what the host must record, server uid included, alongside
    /// the failure.
    #[error("{source}")]
    Incomplete {
        /// State to record despite the failure.
        state: serde_json::Value,
        /// The failure that interrupted the operation.
        source: Box<ProviderError>,
    },

    /// No object with this uid exists on the server.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The configuration or state handed in by the host is unusable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The host asked for a resource type this provider does not manage.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// JSON encoding or decoding of a local value failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation exists on the host surface but not for this resource.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),
}

impl ProviderError {
    /// Build an API error from a response's message and code.
    pub fn api(code: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Build a malformed-response error for the given command.
    pub fn malformed(command: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            command: command.into(),
            detail: detail.into(),
        }
    }

    /// Wrap `source` so that `state` still reaches the host.
    pub fn incomplete(state: serde_json::Value, source: ProviderError) -> Self {
        Self::Incomplete {
            state,
            source: Box::new(source),
        }
    }

    /// The state to record despite the failure, for [`Self::Incomplete`].
    pub fn partial_state(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Incomplete { state, .. } => Some(state),
            _ => None,
        }
    }

    /// The message without the variant's prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Api { message, .. } => message,
            Self::MalformedResponse { detail, .. } => detail,
            Self::Incomplete { source, .. } => source.message(),
            Self::Transport(text)
            | Self::NotFound(text)
            | Self::Validation(text)
            | Self::UnknownResource(text)
            | Self::Unimplemented(text) => text,
            Self::Serialization(_) => "serialization error (see Debug output)",
        }
    }

    /// The API error code, when the management server supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            Self::Incomplete { source, .. } => source.code(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_and_transport_display_verbatim() {
        let err = ProviderError::api(
            Some("err_validation_failed".to_string()),
            "More than one object named 'App1' exists.",
        );
        assert_eq!(
            format!("{}", err),
            "More than one object named 'App1' exists."
        );
        assert_eq!(err.code(), Some("err_validation_failed"));

        let err = ProviderError::Transport("connection refused".to_string());
        assert_eq!(format!("{}", err), "connection refused");
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_incomplete_reports_source_and_keeps_state() {
        let source = ProviderError::api(
            Some("generic_err_wrong_session_id".to_string()),
            "Session expired",
        );
        let err = ProviderError::incomplete(serde_json::json!({"id": "uid-1"}), source);

        assert_eq!(format!("{}", err), "Session expired");
        assert_eq!(err.message(), "Session expired");
        assert_eq!(err.code(), Some("generic_err_wrong_session_id"));
        assert_eq!(err.partial_state().unwrap()["id"], "uid-1");
        assert!(std::error::Error::source(&err).is_some());

        assert!(ProviderError::Transport("reset".to_string()).partial_state().is_none());
    }

    #[test]
    fn test_prefixed_display() {
        let err = ProviderError::NotFound("uid-123".to_string());
        assert_eq!(format!("{}", err), "Resource not found: uid-123");

        let err = ProviderError::UnknownResource("custom_resource".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: custom_resource");

        let err = ProviderError::malformed("show-application-site", "missing uid");
        assert_eq!(
            format!("{}", err),
            "Malformed response from show-application-site: missing uid"
        );
    }

    #[test]
    fn test_message_strips_prefix() {
        let err = ProviderError::api(None, "Requested object not found");
        assert_eq!(err.message(), "Requested object not found");

        let err = ProviderError::Validation("name must not be empty".to_string());
        assert_eq!(err.message(), "name must not be empty");
        assert_eq!(format!("{}", err), "Validation error: name must not be empty");

        let err = ProviderError::malformed("add-application-site", "uid is not a string");
        assert_eq!(err.message(), "uid is not a string");
    }

    #[test]
    fn test_serde_errors_convert() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ProviderError = source.into();
        assert!(matches!(err, ProviderError::Serialization(_)));
        assert!(format!("{}", err).starts_with("Serialization error:"));
    }
}
