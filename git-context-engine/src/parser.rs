//! Lightweight inspection of unified diffs for diagnostics.
//!
//! Nothing here alters the diff text: the document is forwarded verbatim to
//! the model. Stats only feed log lines.

/// Aggregate counts over a unified diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    /// Number of `diff --git` sections (or `+++` headers for plain unified diffs).
    pub files: usize,
    pub additions: usize,
    pub deletions: usize,
    /// Sections that carry a binary patch instead of text hunks.
    pub binary_files: usize,
}

/// Heuristic to detect whether a unified diff section represents a binary patch.
///
/// This checks for common markers like `GIT binary patch`, `Binary files differ`
/// and the presence of NUL bytes.
pub fn looks_like_binary_patch(diff: &str) -> bool {
    if diff.contains("GIT binary patch") {
        return true;
    }
    if diff.contains("Binary files") && diff.contains(" differ") {
        return true;
    }
    diff.bytes().any(|b| b == 0)
}

/// Counts files and changed lines.
///
/// `+++`/`---` file headers are not counted as changes; lines outside hunks
/// are ignored.
pub fn diff_stats(diff: &str) -> DiffStats {
    let sections = split_sections(diff);
    let mut stats = DiffStats {
        files: sections.len(),
        ..DiffStats::default()
    };

    for section in sections {
        if looks_like_binary_patch(section) {
            stats.binary_files += 1;
            continue;
        }

        let mut in_hunk = false;
        for line in section.lines() {
            if line.starts_with("@@") {
                in_hunk = true;
            } else if !in_hunk {
                continue;
            } else if line.starts_with('+') {
                stats.additions += 1;
            } else if line.starts_with('-') {
                stats.deletions += 1;
            } else if !(line.starts_with(' ') || line.starts_with('\\') || line.is_empty()) {
                in_hunk = false;
            }
        }
    }

    stats
}

/// Splits on `diff --git` headers; falls back to `--- ` headers when the
/// text has no git extended headers.
fn split_sections(diff: &str) -> Vec<&str> {
    let marker = if diff.starts_with("diff --git ") || diff.contains("\ndiff --git ") {
        "diff --git "
    } else {
        "--- "
    };

    let mut starts: Vec<usize> = Vec::new();
    let mut offset = 0;
    let mut in_hunk = false;
    for line in diff.split_inclusive('\n') {
        if line.starts_with("@@") {
            in_hunk = true;
        } else if line.starts_with(marker) {
            // A removed line that happens to start with "-- " must not open a section.
            if marker == "diff --git " || !in_hunk {
                starts.push(offset);
                in_hunk = false;
            }
        } else if marker == "--- " && !(line.starts_with([' ', '+', '-', '\\'])) {
            in_hunk = false;
        }
        offset += line.len();
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(diff.len());
            &diff[start..end]
        })
        .collect()
}
