//! CLI configuration
//!
//! All coordinates of the remote workflow (client id, repository, workflow
//! file, branch) plus the polling knobs, assembled once at startup and
//! passed into the pipeline. Validation happens before the first network
//! call.

use std::time::Duration;

use windlass_client::WorkflowTarget;

/// OAuth scope required to dispatch workflows and read run artifacts
pub const OAUTH_SCOPE: &str = "repo";

/// Placeholder value used by unconfigured builds
const PLACEHOLDER_CLIENT_ID: &str = "YOUR_OAUTH_APP_CLIENT_ID";

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth application client id
    pub client_id: String,

    /// Workflow being dispatched and tracked
    pub target: WorkflowTarget,

    /// Git ref the workflow runs on
    pub git_ref: String,

    /// Value of the workflow's `message` input
    pub message: String,

    /// Name of the artifact holding the result payload
    pub artifact_name: String,

    /// Entry inside the artifact archive to parse as JSON
    pub entry_name: String,

    /// Maximum run-list polls while locating the dispatched run
    pub locate_attempts: u32,

    /// Spacing between run-list polls
    pub locate_spacing: Duration,

    /// Maximum age of a run accepted as the one just dispatched
    pub freshness_window: Duration,

    /// Spacing between run-status polls while the run executes
    pub watch_spacing: Duration,

    /// Optional ceiling on the total watch time; unset polls forever
    pub watch_timeout: Option<Duration>,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.client_id.is_empty() || self.client_id == PLACEHOLDER_CLIENT_ID {
            anyhow::bail!("client id is not configured; set --client-id or GITHUB_CLIENT_ID");
        }

        if self.target.owner.is_empty() || self.target.repo.is_empty() {
            anyhow::bail!("repository owner and name cannot be empty");
        }

        if self.target.workflow_file.is_empty() {
            anyhow::bail!("workflow file cannot be empty");
        }

        if self.git_ref.is_empty() {
            anyhow::bail!("git ref cannot be empty");
        }

        if self.locate_attempts == 0 {
            anyhow::bail!("locate attempts must be greater than 0");
        }

        if self.locate_spacing.is_zero() || self.watch_spacing.is_zero() {
            anyhow::bail!("poll spacings must be greater than 0");
        }

        if self.freshness_window.is_zero() {
            anyhow::bail!("freshness window must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: "Ov23lixh0Jo1iw0PIVRw".to_string(),
            target: WorkflowTarget {
                owner: "liberocks".to_string(),
                repo: "github-action-cli-poc".to_string(),
                workflow_file: "trigger.yml".to_string(),
            },
            git_ref: "main".to_string(),
            message: "Triggered securely via OAuth Device Flow CLI".to_string(),
            artifact_name: "workflow-output".to_string(),
            entry_name: "output.json".to_string(),
            locate_attempts: 10,
            locate_spacing: Duration::from_secs(2),
            freshness_window: Duration::from_secs(300),
            watch_spacing: Duration::from_secs(5),
            watch_timeout: None,
        }
    }
}
