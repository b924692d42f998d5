//! Workflow dispatch and run tracking

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use windlass_core::domain::auth::AccessToken;
use windlass_core::domain::run::WorkflowRun;
use windlass_core::dto::run::{DispatchRequest, RunListPage};

use crate::correlate::{LocateOutcome, LocatePlan, RunLocator, RunMatcher};
use crate::error::{ClientError, Result};
use crate::{GitHubClient, WorkflowTarget};

impl GitHubClient {
    // =============================================================================
    // Dispatch
    // =============================================================================

    /// Fire the workflow-dispatch request
    ///
    /// Acceptance only means the provider queued the dispatch; the run does
    /// not exist in the run list yet. [`GitHubClient::locate_run`] bridges
    /// that gap.
    pub async fn dispatch_workflow(
        &self,
        token: &AccessToken,
        target: &WorkflowTarget,
        request: &DispatchRequest,
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.api_base(),
            target.owner,
            target.repo,
            target.workflow_file
        );

        let response = self
            .api_post(&url, &token.access_token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = Self::error_parts(response).await;
            return Err(ClientError::DispatchRejected { status, message });
        }

        Ok(())
    }

    // =============================================================================
    // Run Tracking
    // =============================================================================

    /// Fetch the most-recent run of the target workflow for an actor
    pub async fn latest_run_for_actor(
        &self,
        token: &AccessToken,
        target: &WorkflowTarget,
        actor: &str,
    ) -> Result<Option<WorkflowRun>> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/runs",
            self.api_base(),
            target.owner,
            target.repo,
            target.workflow_file
        );

        let response = self
            .api_get(&url, &token.access_token)
            .query(&[("actor", actor), ("per_page", "1")])
            .send()
            .await?;

        let page: RunListPage = self.handle_response(response).await?;
        Ok(page.workflow_runs.into_iter().next())
    }

    /// Fetch a run snapshot by id
    pub async fn get_run(
        &self,
        token: &AccessToken,
        target: &WorkflowTarget,
        run_id: u64,
    ) -> Result<WorkflowRun> {
        let url = format!(
            "{}/repos/{}/{}/actions/runs/{}",
            self.api_base(),
            target.owner,
            target.repo,
            run_id
        );

        let response = self.api_get(&url, &token.access_token).send().await?;
        self.handle_response(response).await
    }

    /// Find the run caused by the dispatch this invocation just fired
    ///
    /// Polls the run list up to `plan.max_attempts` times, sleeping
    /// `plan.poll_spacing` before each poll to give the provider time to
    /// register the run. A candidate is only trusted if the matcher accepts
    /// it; stale runs from earlier invocations are silently skipped within
    /// the budget.
    pub async fn locate_run(
        &self,
        token: &AccessToken,
        target: &WorkflowTarget,
        actor: &str,
        plan: &LocatePlan,
        matcher: &dyn RunMatcher,
    ) -> Result<WorkflowRun> {
        let mut locator = RunLocator::new(matcher, plan.max_attempts);

        loop {
            tokio::time::sleep(plan.poll_spacing).await;

            let candidate = self.latest_run_for_actor(token, target, actor).await?;

            match locator.observe(candidate, Utc::now()) {
                LocateOutcome::Accepted(run) => {
                    info!(run_id = run.id, "located dispatched run");
                    return Ok(run);
                }
                LocateOutcome::Retry => {
                    debug!(
                        attempt = locator.attempts(),
                        max = plan.max_attempts,
                        "dispatched run not visible yet"
                    );
                }
                LocateOutcome::Exhausted { attempts } => {
                    return Err(ClientError::RunNotFound { attempts });
                }
            }
        }
    }

    /// Poll a run until it reaches the terminal `completed` status
    ///
    /// The returned snapshot carries the conclusion as the provider reported
    /// it; a failed or cancelled conclusion is the caller's to interpret.
    /// With `max_wait` unset the loop polls forever, matching the baseline
    /// behavior; a ceiling turns an indefinitely stuck run into
    /// [`ClientError::WatchTimeout`].
    pub async fn await_completion(
        &self,
        token: &AccessToken,
        target: &WorkflowTarget,
        run_id: u64,
        poll_spacing: Duration,
        max_wait: Option<Duration>,
    ) -> Result<WorkflowRun> {
        let started = tokio::time::Instant::now();

        loop {
            tokio::time::sleep(poll_spacing).await;

            let run = self.get_run(token, target, run_id).await?;
            if run.is_completed() {
                return Ok(run);
            }

            if let Some(limit) = max_wait {
                if started.elapsed() >= limit {
                    return Err(ClientError::WatchTimeout {
                        waited: started.elapsed(),
                    });
                }
            }

            info!(run_id, status = %run.status, "run not yet complete");
        }
    }
}
