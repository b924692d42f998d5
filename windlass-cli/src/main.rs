//! Windlass CLI
//!
//! Authenticates the operator against GitHub via the OAuth device flow,
//! dispatches a workflow, tracks the resulting run to completion, and
//! prints the JSON payload from its output artifact.

mod config;
mod pipeline;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use windlass_client::WorkflowTarget;

use crate::config::Config;
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "windlass")]
#[command(about = "Dispatch a GitHub Actions workflow and retrieve its JSON output", long_about = None)]
struct Cli {
    /// OAuth application client id
    #[arg(long, env = "GITHUB_CLIENT_ID", default_value = "Ov23lixh0Jo1iw0PIVRw")]
    client_id: String,

    /// Repository owner
    #[arg(long, env = "WINDLASS_OWNER", default_value = "liberocks")]
    owner: String,

    /// Repository name
    #[arg(long, env = "WINDLASS_REPO", default_value = "github-action-cli-poc")]
    repo: String,

    /// Workflow file to dispatch
    #[arg(long, env = "WINDLASS_WORKFLOW", default_value = "trigger.yml")]
    workflow: String,

    /// Git ref to run the workflow on
    #[arg(long, env = "WINDLASS_REF", default_value = "main")]
    git_ref: String,

    /// Value passed as the workflow's `message` input
    #[arg(long, default_value = "Triggered securely via OAuth Device Flow CLI")]
    message: String,

    /// Abort watching if the run has not completed after this many seconds
    #[arg(long)]
    watch_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "windlass_cli=info,windlass_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        client_id: cli.client_id,
        target: WorkflowTarget {
            owner: cli.owner,
            repo: cli.repo,
            workflow_file: cli.workflow,
        },
        git_ref: cli.git_ref,
        message: cli.message,
        watch_timeout: cli.watch_timeout_secs.map(Duration::from_secs),
        ..Config::default()
    };
    config.validate()?;

    Pipeline::new(config).run().await
}
