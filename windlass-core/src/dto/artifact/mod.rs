//! Artifact wire shapes

use serde::Deserialize;

use crate::domain::artifact::Artifact;

/// Response of the run-artifacts endpoint
#[derive(Debug, Deserialize)]
pub struct ArtifactListPage {
    pub artifacts: Vec<Artifact>,
}
