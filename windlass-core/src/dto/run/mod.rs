//! Workflow run wire shapes

use serde::{Deserialize, Serialize};

use crate::domain::run::WorkflowRun;

/// Body of a workflow-dispatch request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Git ref (branch or tag) to run the workflow on
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Workflow inputs
    pub inputs: DispatchInputs,
}

/// Inputs accepted by the target workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchInputs {
    pub message: String,
}

/// One page of the run-list endpoint
#[derive(Debug, Deserialize)]
pub struct RunListPage {
    pub total_count: u64,
    pub workflow_runs: Vec<WorkflowRun>,
}
