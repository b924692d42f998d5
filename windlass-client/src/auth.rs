//! OAuth device-authorization flow
//!
//! Implements the GitHub Device Authorization Grant: request a device code,
//! show the user code to the operator, then poll the token endpoint until
//! the operator approves out-of-band.
//!
//! The token endpoint answers every poll with HTTP 200; the body decides
//! whether the exchange succeeded, is still pending, or failed for good.
//! `slow_down` is a mandatory compliance signal: the poll interval grows by
//! a fixed increment and never shrinks again.

use std::time::Duration;

use tracing::{debug, info};

use windlass_core::domain::auth::{AccessToken, ActorProfile, DeviceAuthorization};
use windlass_core::dto::auth::{DeviceCodeResponse, TokenResponse};

use crate::error::{ClientError, Result};
use crate::GitHubClient;

/// Fixed interval increase applied on every `slow_down` response
const SLOW_DOWN_INCREMENT: Duration = Duration::from_secs(5);

/// Outcome of a single token-exchange poll
#[derive(Debug)]
pub enum TokenExchange {
    /// The operator approved; the credential is ready
    Granted(AccessToken),
    /// The operator has not finished approving yet
    Pending,
    /// The provider asked for a slower cadence
    SlowDown,
}

/// Poll cadence for the token exchange
///
/// Starts at the provider-supplied interval and only ever grows, by
/// [`SLOW_DOWN_INCREMENT`] per `slow_down` response. Pending responses
/// leave the cadence untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    interval: Duration,
}

impl PollSchedule {
    /// Create a schedule from the interval the provider granted
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Current minimum spacing between polls
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a `slow_down` response; the interval grows and stays grown
    pub fn note_slow_down(&mut self) {
        self.interval += SLOW_DOWN_INCREMENT;
    }
}

/// Classify one token-endpoint response body
///
/// Pure: the body alone decides between a granted credential, a transient
/// continue signal, and a fatal auth error. `authorization_pending` and
/// `slow_down` keep the poll loop alive; everything else ends it.
fn classify_token_response(body: TokenResponse) -> Result<TokenExchange> {
    match body {
        TokenResponse::Granted(token) => Ok(TokenExchange::Granted(token)),
        TokenResponse::Deferred(err) => match err.error.as_str() {
            "authorization_pending" => Ok(TokenExchange::Pending),
            "slow_down" => Ok(TokenExchange::SlowDown),
            "expired_token" => Err(ClientError::DeviceCodeExpired),
            _ => Err(ClientError::AuthorizationFailed(
                err.description().to_string(),
            )),
        },
    }
}

impl GitHubClient {
    /// Request a device code to begin the authorization flow
    ///
    /// The returned grant carries the user code and verification URI that
    /// must be shown to the operator before polling starts. A provider
    /// rejection here is not a timing issue and is never retried.
    pub async fn request_device_code(
        &self,
        client_id: &str,
        scope: &str,
    ) -> Result<DeviceAuthorization> {
        let params = [("client_id", client_id), ("scope", scope)];

        let response = self
            .oauth_post("/login/device/code")
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let (_, message) = Self::error_parts(response).await;
            return Err(ClientError::DeviceCodeRejected(message));
        }

        let body: DeviceCodeResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("failed to parse device code response: {e}")))?;
        match body {
            DeviceCodeResponse::Granted(grant) => Ok(grant),
            DeviceCodeResponse::Rejected(err) => {
                Err(ClientError::DeviceCodeRejected(err.description().to_string()))
            }
        }
    }

    /// Perform one token-exchange poll
    ///
    /// Transient states come back as [`TokenExchange`] variants; terminal
    /// failures (`expired_token`, anything unrecognized) are errors.
    pub async fn exchange_device_code(
        &self,
        client_id: &str,
        device_code: &str,
    ) -> Result<TokenExchange> {
        let params = [
            ("client_id", client_id),
            ("device_code", device_code),
            ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
        ];

        let response = self
            .oauth_post("/login/oauth/access_token")
            .form(&params)
            .send()
            .await?;

        let body: TokenResponse = self.handle_response(response).await?;
        classify_token_response(body)
    }

    /// Poll the token endpoint until the operator approves
    ///
    /// Sleeps for the current interval before every exchange, so the
    /// provider-granted cadence is honored from the first request on.
    /// Loops indefinitely while the authorization is pending; the only
    /// exits are a granted token or a fatal auth error.
    pub async fn poll_for_token(
        &self,
        client_id: &str,
        grant: &DeviceAuthorization,
    ) -> Result<AccessToken> {
        let mut schedule = PollSchedule::new(grant.interval);

        loop {
            tokio::time::sleep(schedule.interval()).await;

            match self.exchange_device_code(client_id, &grant.device_code).await? {
                TokenExchange::Granted(token) => return Ok(token),
                TokenExchange::Pending => {
                    debug!("authorization still pending");
                }
                TokenExchange::SlowDown => {
                    schedule.note_slow_down();
                    info!(
                        interval_secs = schedule.interval().as_secs(),
                        "provider requested slower polling"
                    );
                }
            }
        }
    }

    /// Resolve the authenticated actor behind a token
    ///
    /// The token was just issued, so any rejection here is a provider or
    /// token inconsistency, not a timing race; it is always fatal.
    pub async fn current_user(&self, token: &AccessToken) -> Result<ActorProfile> {
        let url = format!("{}/user", self.api_base());
        let response = self.api_get(&url, &token.access_token).send().await?;

        if !response.status().is_success() {
            let (status, message) = Self::error_parts(response).await;
            return Err(ClientError::IdentityRejected { status, message });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("failed to parse user response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_starts_at_granted_interval() {
        let schedule = PollSchedule::new(5);
        assert_eq!(schedule.interval(), Duration::from_secs(5));
    }

    #[test]
    fn slow_down_adds_fixed_increment_each_time() {
        let mut schedule = PollSchedule::new(5);

        schedule.note_slow_down();
        assert_eq!(schedule.interval(), Duration::from_secs(10));

        schedule.note_slow_down();
        schedule.note_slow_down();
        assert_eq!(schedule.interval(), Duration::from_secs(20));
    }

    #[test]
    fn schedule_never_shrinks() {
        let mut schedule = PollSchedule::new(5);
        let mut previous = schedule.interval();

        for _ in 0..8 {
            schedule.note_slow_down();
            assert!(schedule.interval() >= previous);
            previous = schedule.interval();
        }
    }

    fn classify(raw: &str) -> Result<TokenExchange> {
        classify_token_response(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn granted_body_yields_the_credential() {
        let exchange = classify(r#"{"access_token": "gho_abc"}"#).unwrap();
        assert!(matches!(exchange, TokenExchange::Granted(t) if t.access_token == "gho_abc"));
    }

    #[test]
    fn pending_and_slow_down_keep_the_loop_alive() {
        assert!(matches!(
            classify(r#"{"error": "authorization_pending"}"#).unwrap(),
            TokenExchange::Pending
        ));
        assert!(matches!(
            classify(r#"{"error": "slow_down"}"#).unwrap(),
            TokenExchange::SlowDown
        ));
    }

    #[test]
    fn expired_device_code_is_fatal() {
        let err = classify(r#"{"error": "expired_token"}"#).unwrap_err();
        assert!(matches!(err, ClientError::DeviceCodeExpired));
    }

    #[test]
    fn unrecognized_error_codes_fail_with_the_description() {
        let err = classify(
            r#"{"error": "access_denied", "error_description": "The user denied the request"}"#,
        )
        .unwrap_err();
        match err {
            ClientError::AuthorizationFailed(description) => {
                assert_eq!(description, "The user denied the request");
            }
            other => panic!("expected authorization failure, got {other:?}"),
        }
    }

    #[test]
    fn pending_polls_continue_at_the_same_cadence_until_granted() {
        let mut schedule = PollSchedule::new(5);
        let bodies = [
            r#"{"error": "authorization_pending"}"#,
            r#"{"error": "authorization_pending"}"#,
            r#"{"access_token": "gho_abc"}"#,
        ];

        let mut granted = None;
        for raw in bodies {
            match classify(raw).unwrap() {
                TokenExchange::Granted(token) => {
                    granted = Some(token);
                    break;
                }
                TokenExchange::Pending => {
                    // Pending never shortens (or lengthens) the cadence
                    assert_eq!(schedule.interval(), Duration::from_secs(5));
                }
                TokenExchange::SlowDown => schedule.note_slow_down(),
            }
        }

        assert_eq!(granted.unwrap().access_token, "gho_abc");
    }
}
