//! Workflow run domain types

use serde::{Deserialize, Serialize};

/// Snapshot of a workflow run as reported by the provider
///
/// The run is created and mutated on the provider side; windlass only
/// observes snapshots of it while locating and watching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub html_url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub status: RunStatus,
    pub conclusion: Option<RunConclusion>,
}

impl WorkflowRun {
    /// Whether the run has reached a terminal state
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Provider-reported run status
///
/// GitHub defines more statuses than windlass cares about (waiting,
/// requested, pending); anything unrecognized lands in `Other` and is
/// treated as non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Queued => write!(f, "queued"),
            RunStatus::InProgress => write!(f, "in_progress"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Other => write!(f, "other"),
        }
    }
}

/// Conclusion of a completed run
///
/// Absent until the run completes. A failed or cancelled conclusion is
/// still a successfully observed terminal state, not a polling error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for RunConclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunConclusion::Success => write!(f, "success"),
            RunConclusion::Failure => write!(f, "failure"),
            RunConclusion::Cancelled => write!(f, "cancelled"),
            RunConclusion::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_deserializes_from_provider_shape() {
        let json = r#"{
            "id": 30433642,
            "html_url": "https://github.com/octo-org/octo-repo/actions/runs/30433642",
            "created_at": "2026-01-10T14:59:22Z",
            "status": "in_progress",
            "conclusion": null,
            "event": "workflow_dispatch",
            "run_number": 562
        }"#;

        let run: WorkflowRun = serde_json::from_str(json).unwrap();
        assert_eq!(run.id, 30433642);
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(run.conclusion.is_none());
        assert!(!run.is_completed());
    }

    #[test]
    fn completed_run_carries_conclusion() {
        let json = r#"{
            "id": 30433642,
            "html_url": "https://github.com/octo-org/octo-repo/actions/runs/30433642",
            "created_at": "2026-01-10T14:59:22Z",
            "status": "completed",
            "conclusion": "success"
        }"#;

        let run: WorkflowRun = serde_json::from_str(json).unwrap();
        assert!(run.is_completed());
        assert_eq!(run.conclusion, Some(RunConclusion::Success));
    }

    #[test]
    fn unknown_status_maps_to_other() {
        let json = r#"{
            "id": 1,
            "html_url": "https://example.invalid/runs/1",
            "created_at": "2026-01-10T14:59:22Z",
            "status": "waiting",
            "conclusion": "action_required"
        }"#;

        let run: WorkflowRun = serde_json::from_str(json).unwrap();
        assert_eq!(run.status, RunStatus::Other);
        assert_eq!(run.conclusion, Some(RunConclusion::Other));
        assert!(!run.is_completed());
    }
}
