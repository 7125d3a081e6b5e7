//! Toolbar state derived from the document and selection

use serde::Serialize;

use crate::dom::{Document, Element, NodeId};
use crate::format::{
    has_style, touched_leaves, Alignment, InlineStyle, ListKind, FORMAT_BLOCK_TAGS,
};
use crate::selection::Selection;

/// What the toolbar shows as active at the caret or selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFormatState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike_through: bool,
    pub list: Option<ListKind>,
    pub alignment: Alignment,
    /// Enclosing block tag, lowercase
    pub block: String,
    /// Font family without quotes, empty for the default font
    pub font_name: String,
    /// Legacy font size 1 to 7, empty when unset
    pub font_size: String,
    /// `#rrggbb`
    pub fore_color: String,
}

impl Default for ActiveFormatState {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            strike_through: false,
            list: None,
            alignment: Alignment::Left,
            block: "p".to_string(),
            font_name: String::new(),
            font_size: String::new(),
            fore_color: "#000000".to_string(),
        }
    }
}

/// Normalize a CSS color to `#rrggbb`. Hex passes through, `rgb(r, g, b)`
/// is converted, anything else reads as black.
pub fn rgb_to_hex(color: &str) -> String {
    let color = color.trim();
    if color.starts_with('#') {
        return color.to_string();
    }
    let channels: Option<Vec<u8>> = color
        .strip_prefix("rgb(")
        .or_else(|| color.strip_prefix("rgba("))
        .and_then(|rest| rest.strip_suffix(')'))
        .and_then(|body| {
            body.split(',')
                .take(3)
                .map(|c| c.trim().parse::<u8>().ok())
                .collect::<Option<Vec<u8>>>()
        });
    match channels.as_deref() {
        Some([r, g, b]) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        _ => "#000000".to_string(),
    }
}

fn strip_quotes(value: &str) -> String {
    value.chars().filter(|&c| c != '"' && c != '\'').collect()
}

/// Nearest value found walking up from `node`
fn inherited<T>(doc: &Document, node: NodeId, read: impl Fn(&Element) -> Option<T>) -> Option<T> {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .filter_map(|n| doc.element(n))
        .find_map(read)
}

fn has_inline_style(doc: &Document, leaves: &[NodeId], style: InlineStyle) -> bool {
    !leaves.is_empty() && leaves.iter().all(|&n| has_style(doc, n, style))
}

/// Compute the toolbar state. Without a selection inside the document the
/// default state is returned.
pub fn derive_state(doc: &Document, selection: Option<&Selection>) -> ActiveFormatState {
    let Some(sel) = selection.and_then(|s| s.clamped(doc)) else {
        return ActiveFormatState::default();
    };
    let (start, end) = sel.ordered(doc);
    let mut leaves = touched_leaves(doc, &start, &end);
    let texts: Vec<NodeId> = leaves.iter().copied().filter(|&n| doc.is_text(n)).collect();
    if !texts.is_empty() {
        leaves = texts;
    }
    let focus = leaves.first().copied().unwrap_or(start.node);

    let mut state = ActiveFormatState {
        bold: has_inline_style(doc, &leaves, InlineStyle::Bold),
        italic: has_inline_style(doc, &leaves, InlineStyle::Italic),
        underline: has_inline_style(doc, &leaves, InlineStyle::Underline),
        strike_through: has_inline_style(doc, &leaves, InlineStyle::StrikeThrough),
        list: doc
            .closest(focus, |el| el.is_any(&["ul", "ol"]))
            .and_then(|list| doc.tag(list))
            .and_then(ListKind::from_tag),
        ..ActiveFormatState::default()
    };

    if let Some(alignment) = inherited(doc, focus, |el| {
        el.style_property("text-align")
            .or_else(|| el.attr("align").map(str::to_string))
            .and_then(|v| Alignment::from_css(&v))
    }) {
        state.alignment = alignment;
    }
    if let Some(block) = doc.closest(focus, |el| el.is_any(FORMAT_BLOCK_TAGS)) {
        if let Some(tag) = doc.tag(block) {
            state.block = tag.to_string();
        }
    }
    if let Some(face) = inherited(doc, focus, |el| {
        el.style_property("font-family")
            .or_else(|| el.attr("face").filter(|_| el.is("font")).map(str::to_string))
    }) {
        state.font_name = strip_quotes(&face);
    }
    if let Some(size) = inherited(doc, focus, |el| {
        el.attr("size").filter(|_| el.is("font")).map(str::to_string)
    }) {
        state.font_size = size;
    }
    if let Some(color) = inherited(doc, focus, |el| {
        el.style_property("color")
            .or_else(|| el.attr("color").filter(|_| el.is("font")).map(str::to_string))
    }) {
        state.fore_color = rgb_to_hex(&color);
    }
    state
}
