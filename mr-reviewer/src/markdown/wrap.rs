//! Event-level rewrites applied between parsing and serialization.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};

/// Narrowest paragraph width nested containers may squeeze a paragraph to.
const MIN_NESTED_WIDTH: usize = 20;

/// Fence length that is longer than any backtick run inside a code block.
pub(super) fn fence_len(events: &[Event<'_>]) -> usize {
    let mut in_code = false;
    let mut longest = 0;
    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code = true,
            Event::End(TagEnd::CodeBlock) => in_code = false,
            Event::Text(text) if in_code => longest = longest.max(backtick_run(text)),
            _ => {}
        }
    }
    (longest + 1).max(3)
}

fn backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Converts indented code to fences and re-wraps paragraphs at `width`
/// (`0` keeps every paragraph on one line). Inline content sitting directly in
/// a tight list item is wrapped like a paragraph.
pub(super) fn normalize<'a>(events: Vec<Event<'a>>, width: usize) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut frames: Vec<Frame> = Vec::new();
    let mut paragraph: Option<Paragraph<'a>> = None;

    for event in events {
        if let Some(para) = paragraph.as_mut() {
            let closes = if para.implicit {
                ends_item_text(&event)
            } else {
                matches!(event, Event::End(TagEnd::Paragraph))
            };
            if !closes {
                para.push(event);
                continue;
            }
            let indent: usize = frames.iter().map(|f| f.indent).sum();
            if let Some(para) = paragraph.take() {
                let implicit = para.implicit;
                para.emit(&mut out, available(width, indent));
                if !implicit {
                    frames.pop();
                    out.push(event);
                    continue;
                }
            }
        }

        if frames.last().is_some_and(|f| f.item) && is_inline(&event) {
            let mut para = Paragraph {
                implicit: true,
                ..Paragraph::default()
            };
            para.push(event);
            paragraph = Some(para);
            continue;
        }

        match event {
            Event::Start(tag) => {
                let indent = match &tag {
                    Tag::BlockQuote(..) => 2,
                    Tag::Item => item_marker_width(&mut frames),
                    _ => 0,
                };
                let list = match &tag {
                    Tag::List(start) => Some(*start),
                    _ => None,
                };
                let item = matches!(tag, Tag::Item);
                frames.push(Frame { indent, list, item });
                match tag {
                    Tag::Paragraph => paragraph = Some(Paragraph::default()),
                    Tag::CodeBlock(CodeBlockKind::Indented) => {
                        out.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(
                            CowStr::Borrowed(""),
                        ))));
                        continue;
                    }
                    _ => {}
                }
                out.push(Event::Start(tag));
            }
            Event::End(end) => {
                frames.pop();
                out.push(Event::End(end));
            }
            other => out.push(other),
        }
    }
    out
}

fn is_inline_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn is_inline(event: &Event<'_>) -> bool {
    match event {
        Event::Text(_)
        | Event::Code(_)
        | Event::InlineHtml(_)
        | Event::SoftBreak
        | Event::HardBreak
        | Event::FootnoteReference(_)
        | Event::TaskListMarker(_) => true,
        Event::Start(tag) => is_inline_tag(tag),
        _ => false,
    }
}

/// Whether `event` ends the bare text run of a tight list item.
fn ends_item_text(event: &Event<'_>) -> bool {
    match event {
        Event::End(TagEnd::Item) | Event::Rule | Event::Html(_) => true,
        Event::Start(tag) => !is_inline_tag(tag),
        _ => false,
    }
}

fn available(width: usize, indent: usize) -> usize {
    if width == 0 {
        return 0;
    }
    width.saturating_sub(indent).max(width.min(MIN_NESTED_WIDTH))
}

struct Frame {
    indent: usize,
    /// `Some` for list frames: the next ordered number, or `None` for bullets.
    list: Option<Option<u64>>,
    item: bool,
}

fn item_marker_width(frames: &mut [Frame]) -> usize {
    let Some(list) = frames.iter_mut().rev().find_map(|f| f.list.as_mut()) else {
        return 2;
    };
    match list {
        Some(n) => {
            let width = n.to_string().len() + 2;
            *n += 1;
            width
        }
        None => 2,
    }
}

/// A run of inline events with no break opportunity inside it.
struct Word<'a> {
    events: Vec<Event<'a>>,
    width: usize,
    opens_block: bool,
}

enum Piece<'a> {
    Word(Word<'a>),
    HardBreak(Event<'a>),
}

#[derive(Default)]
struct Paragraph<'a> {
    pieces: Vec<Piece<'a>>,
    gap: bool,
    link_tails: Vec<usize>,
    /// Bare item text rather than a `Paragraph` tag.
    implicit: bool,
}

impl<'a> Paragraph<'a> {
    fn push(&mut self, event: Event<'a>) {
        match event {
            Event::Text(text) => self.push_text(&text),
            Event::SoftBreak => self.gap = true,
            Event::HardBreak => {
                self.pieces.push(Piece::HardBreak(event));
                self.gap = false;
            }
            Event::Code(ref code) => {
                let width = code.chars().count() + 2 * (backtick_run(code) + 1);
                self.append(event, width, false);
            }
            Event::InlineHtml(ref html) => {
                let width = html.chars().count();
                self.append(event, width, true);
            }
            Event::TaskListMarker(_) => {
                self.append(event, 4, false);
                self.gap = false;
            }
            Event::Start(ref tag) => {
                let width = match tag {
                    Tag::Emphasis => 1,
                    Tag::Strong | Tag::Strikethrough => 2,
                    Tag::Link { dest_url, title, .. } | Tag::Image { dest_url, title, .. } => {
                        self.link_tails.push(dest_url.chars().count() + title.chars().count() + 3);
                        if matches!(tag, Tag::Image { .. }) { 2 } else { 1 }
                    }
                    _ => 0,
                };
                self.append(event, width, false);
            }
            Event::End(ref end) => {
                let width = match end {
                    TagEnd::Emphasis => 1,
                    TagEnd::Strong | TagEnd::Strikethrough => 2,
                    TagEnd::Link | TagEnd::Image => self.link_tails.pop().unwrap_or(3),
                    _ => 0,
                };
                self.append(event, width, false);
            }
            other => self.append(other, 1, false),
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.starts_with(char::is_whitespace) {
            self.gap = true;
        }
        for (i, word) in text.split_whitespace().enumerate() {
            if i > 0 {
                self.gap = true;
            }
            let opens_block = opens_block(word);
            self.append(
                Event::Text(CowStr::from(word.to_string())),
                word.chars().count(),
                opens_block,
            );
        }
        if text.ends_with(char::is_whitespace) {
            self.gap = true;
        }
    }

    fn append(&mut self, event: Event<'a>, width: usize, opens_block: bool) {
        match self.pieces.last_mut() {
            Some(Piece::Word(word)) if !self.gap => {
                word.events.push(event);
                word.width += width;
            }
            _ => self.pieces.push(Piece::Word(Word {
                events: vec![event],
                width,
                opens_block,
            })),
        }
        self.gap = false;
    }

    fn emit(self, out: &mut Vec<Event<'a>>, width: usize) {
        let mut column = 0;
        let mut line_start = true;
        for piece in self.pieces {
            match piece {
                Piece::HardBreak(event) => {
                    out.push(event);
                    column = 0;
                    line_start = true;
                }
                Piece::Word(word) => {
                    if !line_start {
                        if width > 0 && column + 1 + word.width > width && !word.opens_block {
                            out.push(Event::SoftBreak);
                            column = 0;
                        } else {
                            out.push(Event::Text(CowStr::Borrowed(" ")));
                            column += 1;
                        }
                    }
                    column += word.width;
                    line_start = false;
                    out.extend(word.events);
                }
            }
        }
    }
}

/// Whether `word` would start a block if it began a continuation line.
fn opens_block(word: &str) -> bool {
    let Some(first) = word.chars().next() else {
        return false;
    };
    if matches!(first, '#' | '>' | '-' | '+' | '*' | '=' | '|' | '`' | '~' | '<' | '_') {
        return true;
    }
    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && matches!(word.as_bytes().get(digits), Some(b'.' | b')'))
}
