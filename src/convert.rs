//! Plain text <-> HTML conversion for the source view and paste fallback

use crate::dom::{Document, NodeId, NodeKind};

/// Escape `& < > " '` for embedding text in markup
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_html`]; other entities are left alone
pub fn unescape_html(text: &str) -> String {
    const ENTITIES: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#039;", '\''),
    ];
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Split on blank lines (two or more newlines)
fn paragraphs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' && bytes.get(i + 1) == Some(&b'\n') {
            out.push(&text[start..i]);
            while i < bytes.len() && bytes[i] == b'\n' {
                i += 1;
            }
            start = i;
        } else {
            i += 1;
        }
    }
    out.push(&text[start..]);
    out
}

/// Plain text to paragraph markup: blank lines separate paragraphs, single
/// newlines become `<br>`. Empty text gives an empty document.
pub fn text_to_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = text.replace("\r\n", "\n");
    paragraphs(&text)
        .into_iter()
        .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
        .collect()
}

/// Line breaks owed before a block's content and after it
fn block_breaks(tag: &str) -> Option<usize> {
    match tag {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some(2),
        "address" | "article" | "aside" | "blockquote" | "dd" | "div" | "dl" | "dt"
        | "fieldset" | "figcaption" | "figure" | "footer" | "form" | "header" | "hr" | "li"
        | "main" | "nav" | "ol" | "pre" | "section" | "table" | "tbody" | "tfoot" | "thead"
        | "tr" | "ul" | "caption" => Some(1),
        _ => None,
    }
}

const SKIPPED: &[&str] = &["script", "style", "head", "title", "template", "xml"];
const CELLS: &[&str] = &["td", "th"];

/// Accumulates rendered text with CSS-like whitespace collapsing
#[derive(Default)]
struct TextWriter {
    out: String,
    pending_breaks: usize,
    pending_space: bool,
}

impl TextWriter {
    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.out.trim_end_matches(' ').len();
        self.out.truncate(trimmed);
    }

    fn flush_breaks(&mut self) {
        if self.pending_breaks > 0 && !self.out.is_empty() {
            self.trim_trailing_spaces();
            for _ in 0..self.pending_breaks {
                self.out.push('\n');
            }
            self.pending_space = false;
        }
        self.pending_breaks = 0;
    }

    fn require_breaks(&mut self, count: usize) {
        self.pending_breaks = self.pending_breaks.max(count);
        self.pending_space = false;
    }

    fn line_break(&mut self) {
        self.flush_breaks();
        self.trim_trailing_spaces();
        self.out.push('\n');
        self.pending_space = false;
    }

    fn tab(&mut self) {
        self.flush_breaks();
        self.trim_trailing_spaces();
        self.out.push('\t');
        self.pending_space = false;
    }

    fn text(&mut self, text: &str, preformatted: bool) {
        if preformatted {
            if !text.is_empty() {
                self.flush_breaks();
                self.out.push_str(&text.replace('\u{a0}', " "));
            }
            return;
        }
        for ch in text.chars() {
            if ch.is_ascii_whitespace() {
                self.pending_space = true;
                continue;
            }
            self.flush_breaks();
            if self.pending_space && !self.out.is_empty() && !self.out.ends_with(['\n', '\t', ' '])
            {
                self.out.push(' ');
            }
            self.pending_space = false;
            self.out.push(if ch == '\u{a0}' { ' ' } else { ch });
        }
    }
}

enum Visit {
    Enter(NodeId, bool),
    Leave(usize),
}

fn render(doc: &Document, node: NodeId, writer: &mut TextWriter) {
    let mut stack = vec![Visit::Enter(node, false)];
    while let Some(visit) = stack.pop() {
        let (node, preformatted) = match visit {
            Visit::Enter(node, pre) => (node, pre),
            Visit::Leave(count) => {
                writer.require_breaks(count);
                continue;
            }
        };
        match doc.node(node) {
            Some(NodeKind::Text(text)) => writer.text(text, preformatted),
            Some(NodeKind::Root) => {
                stack.extend(
                    doc.children(node)
                        .iter()
                        .rev()
                        .map(|&c| Visit::Enter(c, preformatted)),
                );
            }
            Some(NodeKind::Element(el)) => {
                if el.is_any(SKIPPED) {
                    continue;
                }
                if el.is("br") {
                    writer.line_break();
                    continue;
                }
                if el.is_any(CELLS) {
                    let follows_cell = doc.parent(node).is_some_and(|row| {
                        doc.children(row)
                            .iter()
                            .take_while(|&&c| c != node)
                            .any(|&c| doc.element(c).is_some_and(|e| e.is_any(CELLS)))
                    });
                    if follows_cell {
                        writer.tab();
                    }
                }
                let breaks = block_breaks(&el.name);
                if let Some(count) = breaks {
                    writer.require_breaks(count);
                    stack.push(Visit::Leave(count));
                }
                let pre = preformatted || el.is_any(&["pre", "textarea"]);
                stack.extend(doc.children(node).iter().rev().map(|&c| Visit::Enter(c, pre)));
            }
            Some(NodeKind::Comment(_)) | None => {}
        }
    }
}

/// Plain-text projection of the markup, like the browser's `innerText`:
/// blocks and `br` break lines, table cells are tab separated, entities are
/// decoded and runs of three or more newlines collapse to one blank line.
pub fn html_to_text(html: &str) -> String {
    document_to_text(&Document::parse(html))
}

pub fn document_to_text(doc: &Document) -> String {
    let mut writer = TextWriter::default();
    render(doc, doc.root(), &mut writer);
    collapse_blank_lines(&writer.out)
}

/// Collapse three or more consecutive newlines into two
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(ch);
    }
    out
}
