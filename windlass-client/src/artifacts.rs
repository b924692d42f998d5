//! Artifact listing, download, and archive decoding

use std::io::Read;

use tracing::debug;
use zip::ZipArchive;

use windlass_core::domain::artifact::Artifact;
use windlass_core::domain::auth::AccessToken;
use windlass_core::dto::artifact::ArtifactListPage;

use crate::error::{ClientError, Result};
use crate::{GitHubClient, WorkflowTarget};

impl GitHubClient {
    /// List the artifacts produced by a run
    pub async fn list_artifacts(
        &self,
        token: &AccessToken,
        target: &WorkflowTarget,
        run_id: u64,
    ) -> Result<Vec<Artifact>> {
        let url = format!(
            "{}/repos/{}/{}/actions/runs/{}/artifacts",
            self.api_base(),
            target.owner,
            target.repo,
            run_id
        );

        let response = self.api_get(&url, &token.access_token).send().await?;
        let page: ArtifactListPage = self.handle_response(response).await?;
        Ok(page.artifacts)
    }

    /// Download an artifact's zip archive
    ///
    /// The provider answers with a redirect to short-lived storage; reqwest
    /// follows it transparently.
    pub async fn download_artifact(
        &self,
        token: &AccessToken,
        artifact: &Artifact,
    ) -> Result<Vec<u8>> {
        let response = self
            .api_get(&artifact.archive_download_url, &token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = Self::error_parts(response).await;
            return Err(ClientError::api_error(status, message));
        }

        let bytes = response.bytes().await?;
        debug!(artifact = %artifact.name, size = bytes.len(), "downloaded artifact archive");
        Ok(bytes.to_vec())
    }
}

/// Select an artifact by exact name equality
pub fn select_artifact<'a>(artifacts: &'a [Artifact], name: &str) -> Option<&'a Artifact> {
    artifacts.iter().find(|artifact| artifact.name == name)
}

/// Extract one JSON entry from a downloaded zip archive
///
/// Every failure mode (malformed archive, missing entry, invalid JSON) maps
/// to [`ClientError::ArtifactUnreadable`], which the caller treats as
/// recoverable: the remote run completed regardless of whether its output
/// can be read.
pub fn extract_json_entry(bytes: &[u8], entry_name: &str) -> Result<serde_json::Value> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = ZipArchive::new(cursor)
        .map_err(|e| ClientError::ArtifactUnreadable(format!("failed to open archive: {e}")))?;

    let mut entry = archive.by_name(entry_name).map_err(|e| {
        ClientError::ArtifactUnreadable(format!("entry '{entry_name}' not found: {e}"))
    })?;

    let mut raw = String::new();
    entry.read_to_string(&mut raw).map_err(|e| {
        ClientError::ArtifactUnreadable(format!("failed to read entry '{entry_name}': {e}"))
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        ClientError::ArtifactUnreadable(format!("entry '{entry_name}' is not valid JSON: {e}"))
    })
}
