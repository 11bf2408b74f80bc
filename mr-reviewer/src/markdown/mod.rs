//! Markdown normalization of model output.
//!
//! [`format`] parses with `pulldown-cmark` (GFM tables, strikethrough and task
//! lists enabled) and serializes back through `pulldown-cmark-to-cmark`. In
//! between, [`wrap`] rewrites the event stream so that:
//! - paragraphs are re-wrapped at [`FormatOptions::wrap_width`] and a wrapped
//!   line never starts with a word that would open a block;
//! - indented code becomes fenced code, with a fence longer than any backtick
//!   run inside it.
//!
//! The serializer emits ATX headings, `-` bullets, ordered lists renumbered
//! from their first number with `.`, and one blank line between blocks. Code
//! spans, code blocks and HTML blocks are kept verbatim. The result has a
//! single trailing newline and `format(format(x)) == format(x)`.

mod wrap;

use pulldown_cmark::{Event, Options, Parser};
use pulldown_cmark_to_cmark::{Options as CmarkOptions, cmark_with_options};
use tracing::warn;

/// Wrap width used when nothing else is configured.
pub const DEFAULT_WRAP_WIDTH: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Maximum paragraph line width in characters; `0` disables wrapping.
    /// Words longer than the width are never split.
    pub wrap_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}

fn parse_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Normalizes `raw` into canonical markdown. Whitespace-only input yields "".
pub fn format(raw: &str, opts: &FormatOptions) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let events: Vec<Event<'_>> = Parser::new_ext(raw, parse_options()).collect();
    let events = wrap::normalize(events, opts.wrap_width);
    let options = CmarkOptions {
        list_token: '-',
        ordered_list_token: '.',
        increment_ordered_list_bullets: true,
        code_block_token: '`',
        code_block_token_count: wrap::fence_len(&events),
        ..CmarkOptions::default()
    };

    let mut out = String::with_capacity(raw.len() + raw.len() / 8);
    if let Err(e) = cmark_with_options(events.iter(), &mut out, options) {
        warn!(error = ?e, "markdown serialization failed; keeping trimmed input");
        out = raw.trim().to_string();
    }

    out.truncate(out.trim_end().len());
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(raw: &str) -> String {
        format(raw, &FormatOptions::default())
    }

    fn fmt_width(raw: &str, wrap_width: usize) -> String {
        format(raw, &FormatOptions { wrap_width })
    }

    fn assert_idempotent(raw: &str, opts: &FormatOptions) {
        let once = format(raw, opts);
        let twice = format(&once, opts);
        assert_eq!(once, twice, "not idempotent for input:\n{raw}");
    }

    const MODEL_OUTPUT: &str = "This merge request   introduces a retry-free diff fetcher and\nwires it into the\npipeline.\n\nReviewed Changes\n----------------\n\n|File|Description|\n|---|---|\n|git-context-engine/src/git_providers/gitlab.rs|New raw diff client|\n|mr-reviewer/src/pipeline.rs|Orchestration of the hook stages\n|README.md\n";

    #[test]
    fn plain_sentence_gets_single_trailing_newline() {
        assert_eq!(fmt("No issues found."), "No issues found.\n");
        assert_eq!(fmt("  No issues found.  \n\n\n"), "No issues found.\n");
    }

    #[test]
    fn whitespace_only_input_is_empty() {
        assert_eq!(fmt(""), "");
        assert_eq!(fmt(" \n\t\n  \n"), "");
    }

    #[test]
    fn setext_heading_becomes_atx_and_paragraph_is_reflowed() {
        let out = fmt("Title\n=====\nSome   text\nhere.");
        assert!(out.starts_with("# Title\n\n"), "{out}");
        assert!(out.ends_with("Some text here.\n"), "{out}");
    }

    #[test]
    fn ordered_list_is_renumbered_from_first_number() {
        let out = fmt("3) a\n7) b\n1) c");
        assert_eq!(out.lines().collect::<Vec<_>>(), ["3. a", "4. b", "5. c"]);
    }

    #[test]
    fn bullets_are_unified() {
        let out = fmt("* a\n+ b\n\n- c");
        assert!(out.lines().filter(|l| !l.is_empty()).all(|l| l.starts_with("- ")), "{out}");
        assert_eq!(fmt("* a\n* b").lines().collect::<Vec<_>>(), ["- a", "- b"]);
    }

    #[test]
    fn code_span_keeps_inner_whitespace() {
        let out = fmt("text `code   with   spaces` end");
        assert!(out.contains("`code   with   spaces`"), "{out}");
    }

    #[test]
    fn html_block_is_verbatim() {
        let out = fmt("<div>\nhtml\n</div>");
        assert_eq!(out, "<div>\nhtml\n</div>\n");
    }

    #[test]
    fn table_rows_stay_a_table() {
        let raw = "| File | Description |\n|:--|--:|\n| src/a.rs | adds x |\n| b | c | extra";
        let out = fmt(raw);
        let rows: Vec<&str> = out.lines().filter(|l| l.starts_with('|')).collect();
        assert_eq!(rows.len(), 4, "{out}");
        assert!(rows[0].contains("File") && rows[0].contains("Description"));
        assert!(rows[1].contains(':'), "alignment lost: {out}");
        assert!(rows[2].contains("src/a.rs"));
        assert!(!out.contains("extra"));
    }

    #[test]
    fn indented_code_becomes_fenced() {
        let out = fmt("    let x = 1;\n    let y = 2;");
        assert!(out.starts_with("```"), "{out}");
        assert!(out.contains("let x = 1;\nlet y = 2;"), "{out}");
        assert!(out.ends_with("```\n"), "{out}");
    }

    #[test]
    fn fence_outgrows_backticks_in_code() {
        let out = fmt("    let fence = \"```\";");
        assert!(out.starts_with("````"), "{out}");
        assert_idempotent("    let fence = \"```\";", &FormatOptions::default());
    }

    #[test]
    fn unterminated_fence_is_closed() {
        let out = fmt("```rust\nfn main() {}");
        assert!(out.starts_with("```rust\nfn main() {}"), "{out}");
        assert!(out.ends_with("```\n"), "{out}");
    }

    #[test]
    fn fenced_code_is_verbatim() {
        let out = fmt("```\n  keep   spacing\n\n# not a heading\n```");
        assert!(out.contains("  keep   spacing\n\n# not a heading\n"), "{out}");
    }

    #[test]
    fn thematic_breaks_are_canonical() {
        let out = fmt("a\n\n---\n\nb");
        assert!(out.contains("\n***\n"), "{out}");
        assert!(!out.contains("---"));
    }

    #[test]
    fn closing_hashes_are_dropped() {
        assert_eq!(fmt("## Reviewed Changes ##"), "## Reviewed Changes\n");
    }

    #[test]
    fn wraps_at_configured_width() {
        assert_eq!(
            fmt_width("one two three four five six seven eight", 20),
            "one two three four\nfive six seven eight\n"
        );
    }

    #[test]
    fn zero_width_keeps_paragraph_on_one_line() {
        let raw = "one\ntwo\nthree four five six seven eight nine ten";
        assert_eq!(fmt_width(raw, 0).lines().count(), 1);
    }

    #[test]
    fn wrapped_list_items_stay_inside_item() {
        let out = fmt_width("- alpha beta gamma delta epsilon zeta eta theta", 20);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.len() > 1, "{out}");
        assert!(lines[0].starts_with("- alpha"));
        assert!(lines[1..].iter().all(|l| l.starts_with("  ")), "{out}");
        assert!(lines.iter().all(|l| l.chars().count() <= 20), "{out}");
    }

    #[test]
    fn wrapped_line_never_opens_a_block() {
        let out = fmt_width("some words - then # more and 1. last", 10);
        for line in out.lines().skip(1) {
            let first = line.split_whitespace().next().unwrap_or_default();
            assert!(!["-", "#", "1."].contains(&first), "{out}");
        }
    }

    #[test]
    fn model_summary_is_normalized() {
        let out = fmt(MODEL_OUTPUT);
        assert!(out.starts_with(
            "This merge request introduces a retry-free diff fetcher and wires it into the pipeline.\n\n## Reviewed Changes\n\n|"
        ), "{out}");
        assert!(out.contains("README.md"));
        assert!(out.ends_with("|\n"));
    }

    #[test]
    fn formatting_is_idempotent() {
        let samples = [
            MODEL_OUTPUT,
            "No issues found.",
            "Title\n===\n\ntext  \nmore",
            "- a\n- b\n\n  para in b\n- c\n  1. x\n  2. y",
            "> # quoted heading\n> - item\n>\n> para\nlazy",
            "- > quote in item\n  continued\n- next",
            "1. ```\n   code\n   ```\n   after code\n2. two",
            "    indented\n\n    code\n\nafter",
            "a | b\n:-:|--\nx\ny | z | w",
            "#hashtag is not a heading and neither is 1.5 or -dash",
            "## C# ##\n\n# issue #",
            "* * *\n- - -\n___",
            "text with `code | pipe` and | pipes | around\n\nmore",
            "- [ ] open task\n- [x] done task",
            "<div>\nhtml\n</div>\n\nafter *emphasis* and **strong** and ~~gone~~",
            "a [link with words](https://example.com/x \"title\") and ![img](i.png)",
            "\tindented with tab\n\n-\ttab item",
        ];
        for sample in samples {
            assert_idempotent(sample, &FormatOptions::default());
            assert_idempotent(sample, &FormatOptions { wrap_width: 24 });
            assert_idempotent(sample, &FormatOptions { wrap_width: 6 });
        }
    }

    #[test]
    fn guarded_wrap_is_idempotent_on_tricky_words() {
        let raw = "see - this and 1. that # here > there | pipe === eq --- dash ``` tick";
        for width in [1, 4, 8, 12, 30] {
            let opts = FormatOptions { wrap_width: width };
            let once = format(raw, &opts);
            assert_eq!(format(&once, &opts), once, "width {width}");
            assert!(once.starts_with("see -"));
        }
    }
}
