//! Prompt contract for the review summary.
//!
//! The system turn is a fixed, versioned constant; the human turn is the raw
//! diff, verbatim. Nothing from the event reaches the system turn.

use ai_llm_service::OutputChannel;

/// Bumped whenever [`SYSTEM_PROMPT`] changes meaning.
pub const PROMPT_VERSION: &str = "mr-summary/3";

pub const SYSTEM_PROMPT: &str = "\
You are reviewing a GitLab merge request. The user message is the unified diff of the merge request.

Write a summary in GitHub-flavored markdown with exactly two parts:
1. One overview paragraph describing what the merge request changes and why it matters.
2. A level-two heading `## Reviewed Changes` followed by a two-column table with the header \
`| File | Description |`, one row per changed file, each description a single short sentence.

Do not quote the diff. Do not add other sections. If the diff is empty, say that no changes were found.";

/// The only output channel requested from the model.
pub const SUMMARY: OutputChannel = OutputChannel::new(
    "summary",
    "Markdown review summary: an overview paragraph and a 'Reviewed Changes' table with File and Description columns.",
);

/// The two turns sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair<'a> {
    pub system: &'static str,
    pub human: &'a str,
}

impl<'a> PromptPair<'a> {
    /// The human turn is `diff` unchanged; no truncation or chunking.
    pub fn for_diff(diff: &'a str) -> Self {
        Self {
            system: SYSTEM_PROMPT,
            human: diff,
        }
    }
}
