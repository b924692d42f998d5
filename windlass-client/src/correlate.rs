//! Dispatch-to-run correlation
//!
//! The dispatch endpoint returns nothing that identifies the run it caused,
//! and the run list is eventually consistent, so the locator has to decide
//! heuristically whether the most-recent run for the actor is ours. The
//! decision sits behind [`RunMatcher`] so a provider that does expose a
//! correlation token could swap the heuristic out without touching the
//! polling loop.
//!
//! Known imprecision: if another run for the same actor starts inside the
//! freshness window before ours is listed, the locator can pick the wrong
//! one. That is inherent to the time-window heuristic.

use std::time::Duration;

use chrono::{DateTime, Utc};

use windlass_core::domain::run::WorkflowRun;

/// Decides whether a candidate run is the one this invocation dispatched
pub trait RunMatcher {
    fn matches(&self, run: &WorkflowRun, now: DateTime<Utc>) -> bool;
}

/// Accepts runs created strictly less than `window` ago
///
/// A run aged exactly the window is rejected; only `now - created_at <
/// window` passes.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessWindow {
    window: chrono::Duration,
}

impl FreshnessWindow {
    /// Default window: five minutes
    pub const DEFAULT_SECS: u64 = 300;

    pub fn new(window: Duration) -> Self {
        Self {
            window: chrono::Duration::from_std(window)
                .unwrap_or_else(|_| chrono::Duration::seconds(Self::DEFAULT_SECS as i64)),
        }
    }
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self::new(Duration::from_secs(Self::DEFAULT_SECS))
    }
}

impl RunMatcher for FreshnessWindow {
    fn matches(&self, run: &WorkflowRun, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(run.created_at) < self.window
    }
}

/// Budget for the locate loop
#[derive(Debug, Clone, Copy)]
pub struct LocatePlan {
    /// Maximum number of list polls before giving up
    pub max_attempts: u32,
    /// Spacing between polls
    pub poll_spacing: Duration,
}

impl Default for LocatePlan {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            poll_spacing: Duration::from_secs(2),
        }
    }
}

/// Result of feeding one observation to the locator
#[derive(Debug)]
pub enum LocateOutcome {
    /// The candidate is acceptably ours
    Accepted(WorkflowRun),
    /// Nothing acceptable yet; poll again after the spacing
    Retry,
    /// The attempt budget is spent
    Exhausted {
        /// Number of observations made
        attempts: u32,
    },
}

/// Attempt accounting for the locate loop
///
/// Pure state machine: the network loop feeds it one observation per poll
/// and it decides whether to accept, retry, or give up. Exhaustion happens
/// after exactly `max_attempts` observations, never more, never fewer.
pub struct RunLocator<'a> {
    matcher: &'a dyn RunMatcher,
    max_attempts: u32,
    attempts: u32,
}

impl<'a> RunLocator<'a> {
    pub fn new(matcher: &'a dyn RunMatcher, max_attempts: u32) -> Self {
        Self {
            matcher,
            max_attempts,
            attempts: 0,
        }
    }

    /// Number of observations made so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Feed the most-recent run (if any) observed by one poll
    pub fn observe(&mut self, candidate: Option<WorkflowRun>, now: DateTime<Utc>) -> LocateOutcome {
        self.attempts += 1;

        if let Some(run) = candidate {
            if self.matcher.matches(&run, now) {
                return LocateOutcome::Accepted(run);
            }
        }

        if self.attempts >= self.max_attempts {
            LocateOutcome::Exhausted {
                attempts: self.attempts,
            }
        } else {
            LocateOutcome::Retry
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use windlass_core::domain::run::{RunStatus, WorkflowRun};

    fn run_created_at(created_at: DateTime<Utc>) -> WorkflowRun {
        WorkflowRun {
            id: 42,
            html_url: "https://github.com/o/r/actions/runs/42".to_string(),
            created_at,
            status: RunStatus::Queued,
            conclusion: None,
        }
    }

    #[test]
    fn freshness_accepts_run_inside_window() {
        let now = Utc::now();
        let matcher = FreshnessWindow::default();

        let fresh = run_created_at(now - chrono::Duration::seconds(10));
        assert!(matcher.matches(&fresh, now));

        let nearly_stale = run_created_at(now - chrono::Duration::seconds(299));
        assert!(matcher.matches(&nearly_stale, now));
    }

    #[test]
    fn freshness_rejects_at_exactly_the_window_edge() {
        let now = Utc::now();
        let matcher = FreshnessWindow::default();

        let at_edge = run_created_at(now - chrono::Duration::seconds(300));
        assert!(!matcher.matches(&at_edge, now));

        let stale = run_created_at(now - chrono::Duration::seconds(600));
        assert!(!matcher.matches(&stale, now));
    }

    #[test]
    fn locator_accepts_first_fresh_candidate() {
        let now = Utc::now();
        let matcher = FreshnessWindow::default();
        let mut locator = RunLocator::new(&matcher, 10);

        let outcome = locator.observe(Some(run_created_at(now - chrono::Duration::seconds(10))), now);
        assert!(matches!(outcome, LocateOutcome::Accepted(run) if run.id == 42));
        assert_eq!(locator.attempts(), 1);
    }

    #[test]
    fn locator_retries_on_empty_and_stale_observations() {
        let now = Utc::now();
        let matcher = FreshnessWindow::default();
        let mut locator = RunLocator::new(&matcher, 10);

        assert!(matches!(locator.observe(None, now), LocateOutcome::Retry));

        let stale = run_created_at(now - chrono::Duration::seconds(400));
        assert!(matches!(locator.observe(Some(stale), now), LocateOutcome::Retry));
    }

    #[test]
    fn locator_exhausts_after_exactly_max_attempts() {
        let now = Utc::now();
        let matcher = FreshnessWindow::default();
        let mut locator = RunLocator::new(&matcher, 3);

        assert!(matches!(locator.observe(None, now), LocateOutcome::Retry));
        assert!(matches!(locator.observe(None, now), LocateOutcome::Retry));

        match locator.observe(None, now) {
            LocateOutcome::Exhausted { attempts } => assert_eq!(attempts, 3),
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn locator_can_accept_on_the_final_attempt() {
        let now = Utc::now();
        let matcher = FreshnessWindow::default();
        let mut locator = RunLocator::new(&matcher, 2);

        assert!(matches!(locator.observe(None, now), LocateOutcome::Retry));

        let fresh = run_created_at(now - chrono::Duration::seconds(5));
        assert!(matches!(
            locator.observe(Some(fresh), now),
            LocateOutcome::Accepted(_)
        ));
    }
}
