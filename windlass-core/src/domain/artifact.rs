//! Artifact domain types

use serde::{Deserialize, Serialize};

/// A named output bundle produced by a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact name as declared by the workflow
    pub name: String,

    /// URL of the zip archive containing the artifact files
    pub archive_download_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_deserializes_from_provider_shape() {
        let json = r#"{
            "id": 11,
            "name": "workflow-output",
            "size_in_bytes": 453,
            "archive_download_url": "https://api.github.com/repos/o/r/actions/artifacts/11/zip",
            "expired": false
        }"#;

        let artifact: Artifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact.name, "workflow-output");
        assert!(artifact.archive_download_url.ends_with("/zip"));
    }
}
