//! Source-control access for the review hook.
//!
//! Reads the unified diff of a merge request from GitLab. Failures keep their
//! sub-cause (unauthorized, not found, server, network...) for diagnostics;
//! callers decide how much of it to surface.

pub mod errors;
pub mod git_providers;
pub mod parser;

use tracing::{debug, info};

pub use errors::{GitContextEngineError, GitContextEngineResult};
pub use git_providers::{ChangeRequestId, DiffDocument, ProviderClient, ProviderConfig};

/// Fetches the diff for a single merge request with a freshly built client.
pub async fn fetch_merge_request_diff(
    cfg: ProviderConfig,
    id: &ChangeRequestId,
) -> GitContextEngineResult<DiffDocument> {
    debug!(project = %id.project, iid = id.iid, "fetch_merge_request_diff started");

    let client = ProviderClient::from_config(cfg)?;
    let diff = client.fetch_raw_diff(id).await?;

    let stats = diff.stats();
    info!(
        project = %id.project,
        iid = id.iid,
        bytes = diff.len(),
        files = stats.files,
        additions = stats.additions,
        deletions = stats.deletions,
        "merge request diff fetched"
    );

    Ok(diff)
}
