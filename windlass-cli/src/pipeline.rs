//! The dispatch pipeline
//!
//! Drives the whole flow end to end: device authorization, token polling,
//! actor resolution, workflow dispatch, run location, completion watching,
//! and artifact retrieval. Strictly sequential; every stage's output feeds
//! the next and nothing is retained across stages beyond the access token.

use anyhow::{Context, Result};
use colored::*;

use windlass_client::{
    FreshnessWindow, GitHubClient, LocatePlan, extract_json_entry, select_artifact,
};
use windlass_core::domain::auth::AccessToken;
use windlass_core::domain::run::{RunConclusion, WorkflowRun};
use windlass_core::dto::run::{DispatchInputs, DispatchRequest};

use crate::config::{Config, OAUTH_SCOPE};

/// End-to-end workflow dispatch pipeline
pub struct Pipeline {
    config: Config,
    client: GitHubClient,
}

impl Pipeline {
    /// Creates a pipeline against the public GitHub hosts
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: GitHubClient::new(),
        }
    }

    /// Runs the pipeline to completion
    ///
    /// Fatal errors propagate and terminate the process non-zero. A missing
    /// or unreadable artifact is reported but does not fail the invocation:
    /// the remote run itself completed.
    pub async fn run(&self) -> Result<()> {
        let token = self.authenticate().await?;

        let actor = self
            .client
            .current_user(&token)
            .await
            .context("failed to resolve the authenticated user")?;
        println!("Authenticated as: {}", actor.login.cyan());

        self.dispatch(&token).await?;

        let run = self.locate(&token, &actor.login).await?;
        println!(
            "Found run {} at {}",
            run.id.to_string().cyan(),
            run.html_url.dimmed()
        );

        println!("Waiting for workflow run {} to complete...", run.id);
        let completed = self
            .client
            .await_completion(
                &token,
                &self.config.target,
                run.id,
                self.config.watch_spacing,
                self.config.watch_timeout,
            )
            .await
            .context("failed while waiting for the run to complete")?;
        print_conclusion(&completed);

        self.retrieve_artifact(&token, completed.id).await
    }

    /// Device authorization and token polling
    async fn authenticate(&self) -> Result<AccessToken> {
        println!("Requesting device code from GitHub...");
        let grant = self
            .client
            .request_device_code(&self.config.client_id, OAUTH_SCOPE)
            .await
            .context("failed to start device authorization")?;

        // The operator must see these before polling starts
        println!();
        println!("{}", "--- GITHUB AUTHENTICATION ---".bold());
        println!("Please visit: {}", grant.verification_uri.cyan());
        println!("And enter the code: {}", grant.user_code.bold().cyan());
        println!(
            "{}",
            format!("The code expires in {} minutes.", grant.expires_in / 60).dimmed()
        );
        println!("{}", "-----------------------------".bold());
        println!();

        println!("Waiting for authentication to complete...");
        let token = self
            .client
            .poll_for_token(&self.config.client_id, &grant)
            .await
            .context("device authorization did not complete")?;
        println!("{}", "Authentication successful!".green());

        Ok(token)
    }

    /// Workflow dispatch
    async fn dispatch(&self, token: &AccessToken) -> Result<()> {
        println!("Triggering the workflow...");
        let request = DispatchRequest {
            git_ref: self.config.git_ref.clone(),
            inputs: DispatchInputs {
                message: self.config.message.clone(),
            },
        };

        self.client
            .dispatch_workflow(token, &self.config.target, &request)
            .await
            .context("workflow dispatch was rejected")?;

        println!("{}", "Workflow dispatched successfully.".green());
        Ok(())
    }

    /// Run location via the freshness-window heuristic
    async fn locate(&self, token: &AccessToken, actor: &str) -> Result<WorkflowRun> {
        println!("Locating the workflow run...");
        let plan = LocatePlan {
            max_attempts: self.config.locate_attempts,
            poll_spacing: self.config.locate_spacing,
        };
        let matcher = FreshnessWindow::new(self.config.freshness_window);

        self.client
            .locate_run(token, &self.config.target, actor, &plan, &matcher)
            .await
            .context("could not identify the dispatched run")
    }

    /// Artifact retrieval; failures here never fail the invocation
    async fn retrieve_artifact(&self, token: &AccessToken, run_id: u64) -> Result<()> {
        let artifacts = self
            .client
            .list_artifacts(token, &self.config.target, run_id)
            .await
            .context("failed to list run artifacts")?;

        let Some(artifact) = select_artifact(&artifacts, &self.config.artifact_name) else {
            println!(
                "{}",
                format!(
                    "Could not find the '{}' artifact.",
                    self.config.artifact_name
                )
                .yellow()
            );
            return Ok(());
        };

        println!("Downloading artifact...");
        let bytes = self
            .client
            .download_artifact(token, artifact)
            .await
            .context("failed to download the artifact archive")?;

        println!("Parsing JSON output...");
        match extract_json_entry(&bytes, &self.config.entry_name) {
            Ok(payload) => {
                println!();
                println!("{}", "--- WORKFLOW JSON OUTPUT ---".bold());
                println!(
                    "{}",
                    serde_json::to_string_pretty(&payload)
                        .unwrap_or_else(|_| payload.to_string())
                );
                println!("{}", "----------------------------".bold());
                println!();
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                println!(
                    "{}",
                    format!("Error extracting or parsing artifact: {e}").red()
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Print the terminal state of the completed run
fn print_conclusion(run: &WorkflowRun) {
    let conclusion = match run.conclusion {
        Some(RunConclusion::Success) => "success".green(),
        Some(RunConclusion::Failure) => "failure".red(),
        Some(RunConclusion::Cancelled) => "cancelled".dimmed(),
        Some(RunConclusion::Other) => "other".yellow(),
        None => "unknown".yellow(),
    };
    println!("Workflow run completed with conclusion: {conclusion}");
}
