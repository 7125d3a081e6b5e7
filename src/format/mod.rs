//! Formatting commands applied to the current selection.
//!
//! Every command works the same way: clamp the selection against the live
//! tree, split text nodes at the range boundaries so the selected content is
//! made of whole nodes, restructure, then normalize (merge identical
//! adjacent wrappers, drop wrappers left empty). The selection is rewritten
//! to cover the same content afterwards.

mod block;
mod inline;
mod insert;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeId};
use crate::outcome::{EditOutcome, IgnoreReason};
use crate::selection::{compare_points, DomPoint, Selection};

pub use block::FORMAT_BLOCK_TAGS;
pub(crate) use inline::{has_style, InlineStyle};
pub(crate) use insert::insert_fragment;

/// Inline wrappers that are merged when adjacent and removed when empty
pub(crate) const INLINE_TAGS: &[&str] = &[
    "b", "strong", "i", "em", "u", "s", "strike", "del", "font", "span", "a", "sub", "sup",
];

/// Parents under which whitespace-only text is layout noise, not content
const STRUCTURAL_PARENTS: &[&str] = &["table", "thead", "tbody", "tfoot", "tr", "ul", "ol"];

/// A toolbar command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "snake_case")]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    /// Font family; empty resets to the default font
    FontName(String),
    /// Legacy `font size`, 1 to 7
    FontSize(u8),
    ForeColor(String),
    /// Block tag, either `h1` or `<h1>`
    FormatBlock(String),
    InsertUnorderedList,
    InsertOrderedList,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    JustifyFull,
    CreateLink(String),
    InsertHtml(String),
    Unlink,
    RemoveFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ul" => Some(ListKind::Unordered),
            "ol" => Some(ListKind::Ordered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Full,
}

impl Alignment {
    /// Value of the CSS `text-align` property
    pub fn css_value(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Full => "justify",
        }
    }

    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "justify" => Some(Alignment::Full),
            _ => None,
        }
    }
}

/// Apply `command` to the selection, updating it to cover the result
pub fn execute(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    command: &FormatCommand,
) -> EditOutcome {
    match command {
        FormatCommand::Bold => inline::toggle(doc, selection, InlineStyle::Bold),
        FormatCommand::Italic => inline::toggle(doc, selection, InlineStyle::Italic),
        FormatCommand::Underline => inline::toggle(doc, selection, InlineStyle::Underline),
        FormatCommand::StrikeThrough => inline::toggle(doc, selection, InlineStyle::StrikeThrough),
        FormatCommand::FontName(face) => inline::set_font_attr(doc, selection, "face", face.trim()),
        FormatCommand::FontSize(size) => {
            if !(1..=7).contains(size) {
                return EditOutcome::Ignored(IgnoreReason::InvalidFontSize);
            }
            inline::set_font_attr(doc, selection, "size", &size.to_string())
        }
        FormatCommand::ForeColor(color) => {
            inline::set_font_attr(doc, selection, "color", color.trim())
        }
        FormatCommand::FormatBlock(tag) => block::format_block(doc, selection, tag),
        FormatCommand::InsertUnorderedList => {
            block::toggle_list(doc, selection, ListKind::Unordered)
        }
        FormatCommand::InsertOrderedList => block::toggle_list(doc, selection, ListKind::Ordered),
        FormatCommand::JustifyLeft => block::justify(doc, selection, Alignment::Left),
        FormatCommand::JustifyCenter => block::justify(doc, selection, Alignment::Center),
        FormatCommand::JustifyRight => block::justify(doc, selection, Alignment::Right),
        FormatCommand::JustifyFull => block::justify(doc, selection, Alignment::Full),
        FormatCommand::CreateLink(url) => inline::create_link(doc, selection, url),
        FormatCommand::InsertHtml(html) => insert::insert_html(doc, selection, html),
        FormatCommand::Unlink => inline::unlink(doc, selection),
        FormatCommand::RemoveFormat => inline::remove_format(doc, selection),
    }
}

/// Prefix `http://` unless the URL already names an http(s) scheme
pub fn normalize_link_url(url: &str) -> String {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// The selection clamped against `doc`, if it still addresses live nodes
pub(crate) fn live_selection(doc: &Document, selection: &Option<Selection>) -> Option<Selection> {
    selection.as_ref().and_then(|s| s.clamped(doc))
}

/// Order the range and split text nodes so both ends fall on node edges.
/// Returns the adjusted `(start, end)`.
pub(crate) fn split_range(doc: &mut Document, selection: &Selection) -> (DomPoint, DomPoint) {
    let (mut start, mut end) = selection.ordered(doc);
    if selection.is_collapsed() {
        return (start, end);
    }

    // End first, so the start offset stays meaningful in a shared node
    if doc.text(end.node).is_some() {
        doc.split_text(end.node, end.offset);
    }
    if doc.text(start.node).is_some() {
        if let Some(rest) = doc.split_text(start.node, start.offset) {
            if end.node == start.node {
                end = DomPoint::new(rest, end.offset - start.offset);
            }
            start = DomPoint::new(rest, 0);
        }
    }
    (start, end)
}

fn is_layout_whitespace(doc: &Document, text_node: NodeId) -> bool {
    let Some(text) = doc.text(text_node) else {
        return false;
    };
    if !text.trim().is_empty() {
        return false;
    }
    match doc.parent(text_node) {
        Some(p) if p == doc.root() => true,
        Some(p) => doc.element(p).is_some_and(|el| el.is_any(STRUCTURAL_PARENTS)),
        None => true,
    }
}

/// Text nodes lying entirely inside `[start, end]`, in document order.
/// Call after [`split_range`].
pub(crate) fn selected_texts(doc: &Document, start: &DomPoint, end: &DomPoint) -> Vec<NodeId> {
    doc.text_nodes(doc.root())
        .into_iter()
        .filter(|&t| {
            let len = doc.text(t).map_or(0, str::len);
            len > 0
                && !is_layout_whitespace(doc, t)
                && compare_points(doc, &DomPoint::new(t, 0), start) != Ordering::Less
                && compare_points(doc, &DomPoint::new(t, len), end) != Ordering::Greater
        })
        .collect()
}

/// Leaves touched by a range without splitting anything: every text node
/// overlapping it, or the node at the caret when collapsed.
pub(crate) fn touched_leaves(doc: &Document, start: &DomPoint, end: &DomPoint) -> Vec<NodeId> {
    if start == end {
        if doc.is_text(start.node) {
            return vec![start.node];
        }
        let children = doc.children(start.node);
        let leaf = children
            .get(start.offset)
            .or_else(|| start.offset.checked_sub(1).and_then(|i| children.get(i)))
            .copied()
            .unwrap_or(start.node);
        return vec![leaf];
    }

    let leaves: Vec<NodeId> = doc
        .descendants(doc.root())
        .into_iter()
        .filter(|&n| {
            let len = match (doc.text(n), doc.tag(n)) {
                (Some(text), _) => {
                    if is_layout_whitespace(doc, n) {
                        return false;
                    }
                    text.len()
                }
                (None, Some(tag)) if crate::dom::is_void(tag) => 0,
                _ => return false,
            };
            let (first, last) = if doc.is_text(n) {
                (DomPoint::new(n, 0), DomPoint::new(n, len))
            } else {
                match (DomPoint::before(doc, n), DomPoint::after(doc, n)) {
                    (Some(b), Some(a)) => (b, a),
                    _ => return false,
                }
            };
            compare_points(doc, &last, start) == Ordering::Greater
                && compare_points(doc, &first, end) == Ordering::Less
        })
        .collect();

    if leaves.is_empty() {
        vec![start.node]
    } else {
        leaves
    }
}

fn prev_within(doc: &Document, node: NodeId, within: NodeId) -> bool {
    let mut cur = node;
    while cur != within {
        if doc.prev_sibling(cur).is_some() {
            return true;
        }
        match doc.parent(cur) {
            Some(p) => cur = p,
            None => return false,
        }
    }
    false
}

fn next_within(doc: &Document, node: NodeId, within: NodeId) -> Option<NodeId> {
    let mut cur = node;
    while cur != within {
        if let Some(next) = doc.next_sibling(cur) {
            return Some(next);
        }
        cur = doc.parent(cur)?;
    }
    None
}

/// Split `ancestor` around `node` so the returned piece (an element with
/// the same tag and attributes) contains only the path down to `node`.
pub(crate) fn isolate(doc: &mut Document, ancestor: NodeId, node: NodeId) -> NodeId {
    let piece = if prev_within(doc, node, ancestor) {
        doc.split_before(ancestor, node).unwrap_or(ancestor)
    } else {
        ancestor
    };
    if let Some(next) = next_within(doc, node, piece) {
        doc.split_before(piece, next);
    }
    piece
}

/// Merge identical adjacent inline wrappers and drop empty ones
pub(crate) fn normalize(doc: &mut Document) {
    let root = doc.root();
    doc.merge_adjacent(root, INLINE_TAGS);
    for node in doc.descendants(root) {
        if doc.element(node).is_some() {
            doc.merge_adjacent(node, INLINE_TAGS);
        }
    }
    doc.prune_empty(root, INLINE_TAGS);
}

/// Selection spanning from the first run's start to the last run's end
pub(crate) fn runs_selection(doc: &Document, runs: &[NodeId]) -> Option<Selection> {
    let first = *runs.first()?;
    let last = *runs.last()?;
    let len = doc.text(last).map_or(0, str::len);
    Some(Selection::new(DomPoint::new(first, 0), DomPoint::new(last, len)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::find_text;

    fn select(doc: &Document, needle: &str) -> Option<Selection> {
        find_text(doc, needle, 0)
    }

    fn run(html: &str, needle: &str, command: FormatCommand) -> (String, EditOutcome) {
        let mut doc = Document::parse(html);
        let mut selection = select(&doc, needle);
        let outcome = execute(&mut doc, &mut selection, &command);
        (doc.to_html(), outcome)
    }

    #[test]
    fn test_normalize_link_url() {
        assert_eq!(normalize_link_url("example.com"), "http://example.com");
        assert_eq!(normalize_link_url("HTTPS://x.test"), "HTTPS://x.test");
        assert_eq!(normalize_link_url(" http://x.test "), "http://x.test");
        assert_eq!(normalize_link_url("ftp://x.test"), "http://ftp://x.test");
    }

    #[test]
    fn test_split_range_same_node() {
        let mut doc = Document::parse("<p>abcdef</p>");
        let sel = select(&doc, "cd").unwrap();
        let (start, end) = split_range(&mut doc, &sel);
        assert_eq!(doc.text(start.node), Some("cd"));
        assert_eq!(start.node, end.node);
        assert_eq!(end.offset, 2);
        assert_eq!(selected_texts(&doc, &start, &end), vec![start.node]);
        assert_eq!(doc.to_html(), "<p>abcdef</p>");
    }

    #[test]
    fn test_isolate_middle() {
        let mut doc = Document::parse("<p><b>abc</b></p>");
        let sel = select(&doc, "b").unwrap();
        let (start, _) = split_range(&mut doc, &sel);
        let b = doc.parent(start.node).unwrap();
        let piece = isolate(&mut doc, b, start.node);
        assert_eq!(doc.outer_html(piece), "<b>b</b>");
        assert_eq!(doc.to_html(), "<p><b>a</b><b>b</b><b>c</b></p>");
    }

    #[test]
    fn test_isolate_whole_is_noop() {
        let mut doc = Document::parse("<p><b>abc</b></p>");
        let sel = select(&doc, "abc").unwrap();
        let (start, _) = split_range(&mut doc, &sel);
        let b = doc.parent(start.node).unwrap();
        assert_eq!(isolate(&mut doc, b, start.node), b);
        assert_eq!(doc.to_html(), "<p><b>abc</b></p>");
    }

    #[test]
    fn test_bold_wraps_and_unwraps() {
        let (html, outcome) = run("<p>A</p>", "A", FormatCommand::Bold);
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(html, "<p><b>A</b></p>");

        let (html, _) = run("<p><b>ABC</b></p>", "B", FormatCommand::Bold);
        assert_eq!(html, "<p><b>A</b>B<b>C</b></p>");
    }

    #[test]
    fn test_bold_mixed_selection_wraps_missing_runs() {
        let (html, _) = run("<p>one <b>two</b> three</p>", "one two", FormatCommand::Bold);
        assert_eq!(html, "<p><b>one two</b> three</p>");
    }

    #[test]
    fn test_strong_counts_as_bold() {
        let (html, _) = run("<p><strong>x</strong></p>", "x", FormatCommand::Bold);
        assert_eq!(html, "<p>x</p>");
    }

    #[test]
    fn test_inline_commands_need_a_range() {
        let mut doc = Document::parse("<p>abc</p>");
        let caret = select(&doc, "b").map(|s| Selection::caret(s.anchor));
        let mut selection = caret;
        assert_eq!(
            execute(&mut doc, &mut selection, &FormatCommand::Italic),
            EditOutcome::Ignored(IgnoreReason::CollapsedSelection)
        );
        let mut none = None;
        assert_eq!(
            execute(&mut doc, &mut none, &FormatCommand::Italic),
            EditOutcome::Ignored(IgnoreReason::NoSelection)
        );
        assert_eq!(doc.to_html(), "<p>abc</p>");
    }

    #[test]
    fn test_selection_follows_formatted_runs() {
        let mut doc = Document::parse("<p>hello world</p>");
        let mut selection = select(&doc, "world");
        let _ = execute(&mut doc, &mut selection, &FormatCommand::Underline);
        let sel = selection.unwrap();
        assert_eq!(doc.text(sel.anchor.node), Some("world"));
        assert_eq!(doc.to_html(), "<p>hello <u>world</u></p>");
    }

    #[test]
    fn test_font_size_range() {
        let (html, outcome) = run("<p>x</p>", "x", FormatCommand::FontSize(9));
        assert_eq!(outcome, EditOutcome::Ignored(IgnoreReason::InvalidFontSize));
        assert_eq!(html, "<p>x</p>");

        let (html, _) = run("<p>x</p>", "x", FormatCommand::FontSize(5));
        assert_eq!(html, r#"<p><font size="5">x</font></p>"#);
    }

    #[test]
    fn test_font_attributes_share_one_wrapper() {
        let mut doc = Document::parse("<p>x</p>");
        let mut selection = select(&doc, "x");
        let _ = execute(&mut doc, &mut selection, &FormatCommand::ForeColor("#ff0000".into()));
        let _ = execute(&mut doc, &mut selection, &FormatCommand::FontName("Georgia, serif".into()));
        assert_eq!(
            doc.to_html(),
            r##"<p><font color="#ff0000" face="Georgia, serif">x</font></p>"##
        );

        let _ = execute(&mut doc, &mut selection, &FormatCommand::FontName(String::new()));
        assert_eq!(doc.to_html(), r##"<p><font color="#ff0000">x</font></p>"##);
    }

    #[test]
    fn test_empty_font_name_unwraps_bare_font() {
        let (html, _) = run(
            r#"<p><font face="Arial">abc</font></p>"#,
            "b",
            FormatCommand::FontName(String::new()),
        );
        assert_eq!(html, r#"<p><font face="Arial">a</font>b<font face="Arial">c</font></p>"#);
    }

    #[test]
    fn test_create_link_wraps_selection() {
        let (html, outcome) = run(
            "<p>see docs here</p>",
            "docs",
            FormatCommand::CreateLink("example.com/docs".into()),
        );
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(
            html,
            r#"<p>see <a href="http://example.com/docs">docs</a> here</p>"#
        );
    }

    #[test]
    fn test_create_link_rejects_empty_url() {
        let (html, outcome) = run("<p>x</p>", "x", FormatCommand::CreateLink("  ".into()));
        assert_eq!(outcome, EditOutcome::Ignored(IgnoreReason::EmptyUrl));
        assert_eq!(html, "<p>x</p>");
    }

    #[test]
    fn test_create_link_at_caret_inserts_url_text() {
        let mut doc = Document::parse("<p>ab</p>");
        let mut selection = select(&doc, "a").map(|s| Selection::caret(s.focus));
        let outcome = execute(
            &mut doc,
            &mut selection,
            &FormatCommand::CreateLink("https://x.test".into()),
        );
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(
            doc.to_html(),
            r#"<p>a<a href="https://x.test">https://x.test</a>b</p>"#
        );
    }

    #[test]
    fn test_create_link_updates_existing_link() {
        let (html, _) = run(
            r#"<p><a href="http://old.test">link</a></p>"#,
            "link",
            FormatCommand::CreateLink("new.test".into()),
        );
        assert_eq!(html, r#"<p><a href="http://new.test">link</a></p>"#);
    }

    #[test]
    fn test_unlink() {
        let (html, _) = run(
            r#"<p><a href="http://x.test">a link</a> after</p>"#,
            "link",
            FormatCommand::Unlink,
        );
        assert_eq!(html, r#"<p><a href="http://x.test">a </a>link after</p>"#);
    }

    #[test]
    fn test_remove_format_keeps_links() {
        let (html, _) = run(
            r#"<p><b><i>x</i></b> <a href="http://y.test"><u>y</u></a></p>"#,
            "x y",
            FormatCommand::RemoveFormat,
        );
        assert_eq!(html, r#"<p>x <a href="http://y.test">y</a></p>"#);
    }
}
