//! Error types for the windlass client

use std::time::Duration;

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while driving the dispatch pipeline
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed at the transport level
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The provider rejected the device-code request itself
    #[error("device authorization rejected: {0}")]
    DeviceCodeRejected(String),

    /// The device code reached its TTL before the operator approved
    #[error("device code expired - run the CLI again to restart authentication")]
    DeviceCodeExpired,

    /// The token endpoint returned an unexpected error code
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// The user endpoint rejected the freshly issued token
    #[error("identity lookup failed (status {status}): {message}")]
    IdentityRejected {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The provider refused the workflow-dispatch request
    #[error("workflow dispatch rejected (status {status}): {message}")]
    DispatchRejected {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// No acceptably fresh run appeared within the attempt budget
    #[error("failed to locate the dispatched workflow run after {attempts} attempts")]
    RunNotFound {
        /// Number of list polls performed
        attempts: u32,
    },

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse a response body
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The downloaded archive could not be opened or its entry decoded
    #[error("artifact unreadable: {0}")]
    ArtifactUnreadable(String),

    /// The run did not complete within the configured ceiling
    #[error("workflow run did not complete within {waited:?}")]
    WatchTimeout {
        /// Total time spent waiting
        waited: Duration,
    },
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether the overall invocation can still end in success
    ///
    /// Only artifact decoding errors are recoverable: the remote run itself
    /// completed and its result stands even if the archive is unreadable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ArtifactUnreadable(_))
    }

    /// Whether this error came from the authentication phase
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::DeviceCodeRejected(_)
                | Self::DeviceCodeExpired
                | Self::AuthorizationFailed(_)
                | Self::IdentityRejected { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_errors_are_the_only_recoverable_kind() {
        assert!(ClientError::ArtifactUnreadable("bad zip".into()).is_recoverable());

        assert!(!ClientError::DeviceCodeExpired.is_recoverable());
        assert!(!ClientError::RunNotFound { attempts: 10 }.is_recoverable());
        assert!(!ClientError::api_error(500, "boom").is_recoverable());
    }

    #[test]
    fn auth_errors_are_grouped() {
        assert!(ClientError::DeviceCodeExpired.is_auth_error());
        assert!(ClientError::AuthorizationFailed("denied".into()).is_auth_error());
        assert!(
            ClientError::IdentityRejected {
                status: 401,
                message: "bad credentials".into()
            }
            .is_auth_error()
        );

        assert!(
            !ClientError::DispatchRejected {
                status: 404,
                message: "not found".into()
            }
            .is_auth_error()
        );
    }

    #[test]
    fn messages_carry_provider_descriptions() {
        let err = ClientError::DeviceCodeRejected("client_id mismatch".into());
        assert!(err.to_string().contains("client_id mismatch"));

        let err = ClientError::RunNotFound { attempts: 10 };
        assert!(err.to_string().contains("10 attempts"));
    }
}
