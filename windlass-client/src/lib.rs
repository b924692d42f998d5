//! Windlass GitHub Client
//!
//! A typed HTTP client for the fixed set of GitHub endpoints windlass needs:
//! the OAuth device-authorization endpoints, the authenticated-user lookup,
//! and the Actions workflow dispatch/run/artifact endpoints.
//!
//! The client is stateless with respect to authentication: the OAuth
//! endpoints are unauthenticated, and every later call borrows the access
//! token obtained by the device flow. Nothing is persisted between calls.
//!
//! # Example
//!
//! ```no_run
//! use windlass_client::GitHubClient;
//!
//! #[tokio::main]
//! async fn main() -> windlass_client::Result<()> {
//!     let client = GitHubClient::new();
//!     let grant = client.request_device_code("my_client_id", "repo").await?;
//!
//!     println!("Visit {} and enter {}", grant.verification_uri, grant.user_code);
//!     let token = client.poll_for_token("my_client_id", &grant).await?;
//!
//!     let actor = client.current_user(&token).await?;
//!     println!("Authenticated as: {}", actor.login);
//!     Ok(())
//! }
//! ```

mod artifacts;
mod auth;
pub mod correlate;
pub mod error;
mod runs;

// Re-export commonly used types
pub use artifacts::{extract_json_entry, select_artifact};
pub use auth::{PollSchedule, TokenExchange};
pub use correlate::{FreshnessWindow, LocatePlan, RunMatcher};
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// Default GitHub REST API host
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Default GitHub OAuth host
pub const GITHUB_AUTH_BASE: &str = "https://github.com";

/// GitHub rejects requests without a User-Agent
const USER_AGENT: &str = "windlass-cli";

/// REST API version header value
const API_VERSION: &str = "2022-11-28";

/// Coordinates of the workflow this client dispatches and tracks
#[derive(Debug, Clone)]
pub struct WorkflowTarget {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Workflow file name (e.g. "trigger.yml")
    pub workflow_file: String,
}

/// HTTP client for the GitHub endpoints windlass uses
///
/// Methods are organized into logical groups:
/// - Device authorization and token polling
/// - Workflow dispatch and run tracking
/// - Artifact listing and download
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// Base URL of the REST API (e.g. "https://api.github.com")
    api_base: String,
    /// Base URL of the OAuth endpoints (e.g. "https://github.com")
    auth_base: String,
    /// HTTP client instance
    client: Client,
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubClient {
    /// Create a client pointing at the public GitHub hosts
    pub fn new() -> Self {
        Self::with_base_urls(GITHUB_API_BASE, GITHUB_AUTH_BASE)
    }

    /// Create a client with custom base URLs
    ///
    /// Used to point the client at a local test double.
    pub fn with_base_urls(api_base: impl Into<String>, auth_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            auth_base: auth_base.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Base URL of the REST API
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Base URL of the OAuth endpoints
    pub fn auth_base(&self) -> &str {
        &self.auth_base
    }

    // =============================================================================
    // Request Builders
    // =============================================================================

    /// GET against the REST API with bearer auth
    pub(crate) fn api_get(&self, url: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
    }

    /// POST against the REST API with bearer auth
    pub(crate) fn api_post(&self, url: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
    }

    /// POST against the OAuth endpoints (unauthenticated, form-encoded)
    pub(crate) fn oauth_post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.auth_base, path))
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the
    /// request failed, or deserializes the response body if successful.
    pub(crate) async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("failed to parse JSON response: {e}")))
    }

    /// Read the status and body of a failed response
    pub(crate) async fn error_parts(response: reqwest::Response) -> (u16, String) {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        (status, message)
    }
}
