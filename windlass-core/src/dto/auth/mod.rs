//! Auth endpoint wire shapes
//!
//! Both OAuth endpoints answer HTTP 200 whether the request succeeded or
//! not, putting `{error, error_description}` in the body on failure. The
//! untagged enums below split the two cases at deserialization time.

use serde::Deserialize;

use crate::domain::auth::{AccessToken, DeviceAuthorization};

/// Response from the device-code endpoint
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DeviceCodeResponse {
    Granted(DeviceAuthorization),
    Rejected(OauthErrorBody),
}

/// Response from the token endpoint
///
/// A deferred response carries one of the transient or fatal OAuth error
/// codes (`authorization_pending`, `slow_down`, `expired_token`, ...); the
/// caller decides which are loop-continuation signals.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TokenResponse {
    Granted(AccessToken),
    Deferred(OauthErrorBody),
}

/// OAuth error body shared by both endpoints
#[derive(Debug, Deserialize)]
pub struct OauthErrorBody {
    pub error: String,
    pub error_description: Option<String>,
}

impl OauthErrorBody {
    /// Human-readable description, falling back to the error code
    pub fn description(&self) -> &str {
        self.error_description.as_deref().unwrap_or(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_splits_granted_from_deferred() {
        let granted: TokenResponse =
            serde_json::from_str(r#"{"access_token": "gho_abc", "token_type": "bearer"}"#).unwrap();
        assert!(matches!(granted, TokenResponse::Granted(t) if t.access_token == "gho_abc"));

        let deferred: TokenResponse = serde_json::from_str(
            r#"{"error": "authorization_pending", "error_description": "Pending user approval"}"#,
        )
        .unwrap();
        match deferred {
            TokenResponse::Deferred(body) => {
                assert_eq!(body.error, "authorization_pending");
                assert_eq!(body.description(), "Pending user approval");
            }
            TokenResponse::Granted(_) => panic!("expected deferred"),
        }
    }

    #[test]
    fn device_code_response_splits_granted_from_rejected() {
        let rejected: DeviceCodeResponse =
            serde_json::from_str(r#"{"error": "unauthorized_client"}"#).unwrap();
        match rejected {
            DeviceCodeResponse::Rejected(body) => {
                // Falls back to the error code when no description is present
                assert_eq!(body.description(), "unauthorized_client");
            }
            DeviceCodeResponse::Granted(_) => panic!("expected rejected"),
        }
    }
}
