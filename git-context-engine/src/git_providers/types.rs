//! Data model for merge request references and diff documents.

use serde::{Deserialize, Serialize};

use crate::parser::{DiffStats, diff_stats};

/// A unique reference to a merge request inside GitLab.
///
/// * `project` – numeric ID or "group/project" (URL-encoded on the wire).
/// * `iid`     – project-scoped merge request IID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequestId {
    pub project: String,
    pub iid: u64,
}

impl ChangeRequestId {
    pub fn new(project: impl Into<String>, iid: u64) -> Self {
        Self {
            project: project.into(),
            iid,
        }
    }
}

/// Unified-diff text of a merge request, owned by one invocation.
///
/// The text is opaque to the pipeline and forwarded verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct DiffDocument(String);

impl DiffDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Number of file sections in the diff.
    pub fn file_count(&self) -> usize {
        self.stats().files
    }

    pub fn stats(&self) -> DiffStats {
        diff_stats(&self.0)
    }
}

// Diff bodies can be huge; keep `Debug` output to a summary.
impl std::fmt::Debug for DiffDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffDocument")
            .field("bytes", &self.0.len())
            .finish()
    }
}
