//! Block-level commands: block tag, alignment and lists

use std::collections::HashSet;

use tracing::debug;

use crate::dom::{is_block, Document, Element, NodeId};
use crate::outcome::{EditOutcome, IgnoreReason};
use crate::selection::Selection;

use super::{live_selection, touched_leaves, Alignment, ListKind};

/// Tags accepted by "format block"
pub const FORMAT_BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "div",
];

/// Containers that hold a line (or lines) of text directly
const TEXT_BLOCKS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "div", "address", "li", "dd",
    "dt", "td", "th",
];

/// Containers whose content is wrapped rather than the container renamed
const CELL_LIKE: &[&str] = &["li", "dd", "dt", "td", "th"];

/// Blocks whose content moves into a list item (the block itself is dropped)
const LIST_ABSORBED: &[&str] = &["p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "address"];

/// The unit a block command works on
#[derive(Debug, Clone, PartialEq, Eq)]
enum BlockItem {
    Element(NodeId),
    /// Consecutive inline nodes with no block container of their own
    Loose(Vec<NodeId>),
    List(NodeId),
}

impl BlockItem {
    fn first(&self) -> NodeId {
        match self {
            BlockItem::Element(id) | BlockItem::List(id) => *id,
            BlockItem::Loose(nodes) => nodes[0],
        }
    }

    fn last(&self) -> NodeId {
        match self {
            BlockItem::Element(id) | BlockItem::List(id) => *id,
            BlockItem::Loose(nodes) => nodes[nodes.len() - 1],
        }
    }
}

/// Run of inline siblings around `node` within its parent, stopping at
/// block elements and `br`
fn loose_run(doc: &Document, node: NodeId) -> Vec<NodeId> {
    let Some(parent) = doc.parent(node) else {
        return vec![node];
    };
    let siblings = doc.children(parent);
    let Some(idx) = siblings.iter().position(|&c| c == node) else {
        return vec![node];
    };
    let breaks = |n: NodeId| doc.tag(n).is_some_and(|t| is_block(t) || t == "br");

    let mut first = idx;
    while first > 0 && !breaks(siblings[first - 1]) {
        first -= 1;
    }
    let mut last = idx;
    while last + 1 < siblings.len() && !breaks(siblings[last + 1]) {
        last += 1;
    }
    siblings[first..=last].to_vec()
}

fn block_of(doc: &Document, leaf: NodeId) -> Option<BlockItem> {
    let root = doc.root();
    if leaf == root {
        return None;
    }
    if let Some(block) = doc.closest(leaf, |el| el.is_any(TEXT_BLOCKS)) {
        return Some(BlockItem::Element(block));
    }
    // Loose content directly under the root
    let top = std::iter::once(leaf)
        .chain(doc.ancestors(leaf))
        .find(|&n| doc.parent(n) == Some(root))?;
    if doc.tag(top).is_some_and(|t| is_block(t) || t == "br") {
        return None;
    }
    Some(BlockItem::Loose(loose_run(doc, top)))
}

fn collect_items(
    doc: &Document,
    leaves: &[NodeId],
    item_of: impl Fn(NodeId) -> Option<BlockItem>,
) -> Vec<BlockItem> {
    let mut seen = HashSet::new();
    leaves
        .iter()
        .filter_map(|&leaf| item_of(leaf))
        .filter(|item| seen.insert(item.first()))
        .filter(|item| match item {
            BlockItem::Loose(nodes) => nodes.iter().all(|&n| doc.is_attached(n)),
            _ => true,
        })
        .collect()
}

fn selected_blocks(doc: &Document, selection: &Selection) -> Vec<BlockItem> {
    let (start, end) = selection.ordered(doc);
    let leaves = touched_leaves(doc, &start, &end);
    collect_items(doc, &leaves, |leaf| block_of(doc, leaf))
}

/// Move all children of `from` to the end of `to`
fn move_children(doc: &mut Document, from: NodeId, to: NodeId) {
    for child in doc.children(from).to_vec() {
        doc.append_child(to, child);
    }
}

/// Wrap a run of siblings in a new element placed where the run starts
fn wrap_run(doc: &mut Document, nodes: &[NodeId], element: Element) -> NodeId {
    let wrapper = doc.create_element(element);
    if let Some(&first) = nodes.first() {
        doc.insert_before(first, wrapper);
    }
    for &node in nodes {
        doc.append_child(wrapper, node);
    }
    wrapper
}

/// `"<H1>"` and `"h1"` both name `h1`
fn parse_block_tag(tag: &str) -> Option<String> {
    let name = tag
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim()
        .to_ascii_lowercase();
    FORMAT_BLOCK_TAGS.contains(&name.as_str()).then_some(name)
}

pub(super) fn format_block(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    tag: &str,
) -> EditOutcome {
    let Some(tag) = parse_block_tag(tag) else {
        debug!(tag, "Unsupported block tag");
        return IgnoreReason::UnsupportedBlock.into();
    };
    let Some(sel) = live_selection(doc, selection) else {
        return IgnoreReason::NoSelection.into();
    };

    for item in selected_blocks(doc, &sel) {
        match item {
            BlockItem::Element(block) => {
                let cell_like = doc.element(block).is_some_and(|el| el.is_any(CELL_LIKE));
                if cell_like {
                    let inner = doc.create_element(Element::new(tag.as_str()));
                    move_children(doc, block, inner);
                    doc.append_child(block, inner);
                } else if let Some(el) = doc.element_mut(block) {
                    el.name = tag.clone();
                }
            }
            BlockItem::Loose(nodes) => {
                wrap_run(doc, &nodes, Element::new(tag.as_str()));
            }
            BlockItem::List(_) => {}
        }
    }

    *selection = selection.and_then(|s| s.clamped(doc));
    EditOutcome::Applied
}

pub(super) fn justify(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    alignment: Alignment,
) -> EditOutcome {
    let Some(sel) = live_selection(doc, selection) else {
        return IgnoreReason::NoSelection.into();
    };

    for item in selected_blocks(doc, &sel) {
        match item {
            BlockItem::Element(block) => {
                if let Some(el) = doc.element_mut(block) {
                    if alignment == Alignment::Left {
                        el.remove_style_property("text-align");
                    } else {
                        el.set_style_property("text-align", alignment.css_value());
                    }
                }
            }
            BlockItem::Loose(nodes) => {
                if alignment != Alignment::Left {
                    let style = format!("text-align: {};", alignment.css_value());
                    wrap_run(doc, &nodes, Element::new("div").with_attr("style", style));
                }
            }
            BlockItem::List(_) => {}
        }
    }

    *selection = selection.and_then(|s| s.clamped(doc));
    EditOutcome::Applied
}

/// Replace a list with one paragraph per item
fn unwrap_list(doc: &mut Document, list: NodeId) {
    for child in doc.children(list).to_vec() {
        if !doc.is_tag(child, "li") {
            if doc.text(child).is_some_and(|t| t.trim().is_empty()) {
                continue;
            }
            doc.insert_before(list, child);
            continue;
        }
        let holds_blocks = doc
            .children(child)
            .iter()
            .any(|&c| doc.tag(c).is_some_and(is_block));
        if holds_blocks {
            for grandchild in doc.children(child).to_vec() {
                doc.insert_before(list, grandchild);
            }
        } else {
            let p = doc.create_element(Element::new("p"));
            move_children(doc, child, p);
            doc.insert_before(list, p);
        }
    }
    doc.remove(list);
}

/// Whether `b` directly follows `a` under the same parent, ignoring
/// whitespace-only text in between
fn adjacent(doc: &Document, a: NodeId, b: NodeId) -> bool {
    let (Some(pa), Some(pb)) = (doc.parent(a), doc.parent(b)) else {
        return false;
    };
    if pa != pb {
        return false;
    }
    let (Some(ia), Some(ib)) = (doc.child_index(a), doc.child_index(b)) else {
        return false;
    };
    ib > ia
        && doc.children(pa)[ia + 1..ib]
            .iter()
            .all(|&n| doc.text(n).is_some_and(|t| t.trim().is_empty()))
}

pub(super) fn toggle_list(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    kind: ListKind,
) -> EditOutcome {
    let Some(sel) = live_selection(doc, selection) else {
        return IgnoreReason::NoSelection.into();
    };
    let (start, end) = sel.ordered(doc);
    let leaves = touched_leaves(doc, &start, &end);
    let items = collect_items(doc, &leaves, |leaf| {
        match doc.closest(leaf, |el| el.is_any(&["ul", "ol"])) {
            Some(list) => Some(BlockItem::List(list)),
            None => block_of(doc, leaf),
        }
    });
    if items.is_empty() {
        return IgnoreReason::NoSelection.into();
    }

    let all_same_kind = items.iter().all(|item| match item {
        BlockItem::List(list) => doc.is_tag(*list, kind.tag()),
        _ => false,
    });
    debug!(?kind, items = items.len(), unwrap = all_same_kind, "Toggling list");

    if all_same_kind {
        for item in &items {
            unwrap_list(doc, item.first());
        }
        *selection = selection.and_then(|s| s.clamped(doc));
        return EditOutcome::Applied;
    }

    let mut groups: Vec<Vec<BlockItem>> = Vec::new();
    for item in items {
        match item {
            BlockItem::List(list) => {
                if let Some(el) = doc.element_mut(list) {
                    el.name = kind.tag().to_string();
                }
            }
            BlockItem::Element(cell) if doc.element(cell).is_some_and(|el| el.is_any(CELL_LIKE)) => {
                let list = doc.create_element(Element::new(kind.tag()));
                let li = doc.create_element(Element::new("li"));
                move_children(doc, cell, li);
                doc.append_child(list, li);
                doc.append_child(cell, list);
            }
            item => {
                let joins = groups
                    .last()
                    .and_then(|g| g.last())
                    .is_some_and(|prev| adjacent(doc, prev.last(), item.first()));
                if joins {
                    if let Some(group) = groups.last_mut() {
                        group.push(item);
                    }
                } else {
                    groups.push(vec![item]);
                }
            }
        }
    }

    for group in groups {
        let list = doc.create_element(Element::new(kind.tag()));
        doc.insert_before(group[0].first(), list);
        for item in group {
            let li = doc.create_element(Element::new("li"));
            doc.append_child(list, li);
            match item {
                BlockItem::Element(block) => {
                    let absorbed = doc.element(block).is_some_and(|el| el.is_any(LIST_ABSORBED));
                    if absorbed {
                        move_children(doc, block, li);
                        doc.remove(block);
                    } else {
                        doc.append_child(li, block);
                    }
                }
                BlockItem::Loose(nodes) => {
                    for node in nodes {
                        doc.append_child(li, node);
                    }
                }
                BlockItem::List(_) => {}
            }
        }
    }

    *selection = selection.and_then(|s| s.clamped(doc));
    EditOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{execute, FormatCommand};
    use crate::selection::{find_text, select_all};

    fn caret_in(doc: &Document, needle: &str) -> Option<Selection> {
        find_text(doc, needle, 0).map(|s| Selection::caret(s.anchor))
    }

    #[test]
    fn test_parse_block_tag() {
        assert_eq!(parse_block_tag("<H2>").as_deref(), Some("h2"));
        assert_eq!(parse_block_tag("blockquote").as_deref(), Some("blockquote"));
        assert_eq!(parse_block_tag("<table>"), None);
    }

    #[test]
    fn test_format_block_renames_paragraph() {
        let mut doc = Document::parse(r#"<p class="x">title</p><p>body</p>"#);
        let mut selection = caret_in(&doc, "tit");
        let outcome = execute(&mut doc, &mut selection, &FormatCommand::FormatBlock("<h1>".into()));
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(doc.to_html(), r#"<h1 class="x">title</h1><p>body</p>"#);
    }

    #[test]
    fn test_format_block_wraps_loose_text() {
        let mut doc = Document::parse("plain <b>text</b><br>next");
        let mut selection = caret_in(&doc, "plain");
        let _ = execute(&mut doc, &mut selection, &FormatCommand::FormatBlock("h3".into()));
        assert_eq!(doc.to_html(), "<h3>plain <b>text</b></h3><br>next");
    }

    #[test]
    fn test_format_block_inside_cell_wraps_content() {
        let mut doc = Document::parse("<table><tr><td>cell</td></tr></table>");
        let mut selection = caret_in(&doc, "cell");
        let _ = execute(&mut doc, &mut selection, &FormatCommand::FormatBlock("pre".into()));
        assert_eq!(
            doc.to_html(),
            "<table><tr><td><pre>cell</pre></td></tr></table>"
        );
    }

    #[test]
    fn test_justify_sets_and_clears_alignment() {
        let mut doc = Document::parse("<p>a</p><p>b</p>");
        let mut selection = Some(select_all(&doc));
        let _ = execute(&mut doc, &mut selection, &FormatCommand::JustifyCenter);
        assert_eq!(
            doc.to_html(),
            r#"<p style="text-align: center;">a</p><p style="text-align: center;">b</p>"#
        );

        let mut selection = caret_in(&doc, "b");
        let _ = execute(&mut doc, &mut selection, &FormatCommand::JustifyLeft);
        assert_eq!(
            doc.to_html(),
            r#"<p style="text-align: center;">a</p><p>b</p>"#
        );
    }

    #[test]
    fn test_justify_loose_text_wraps_in_div() {
        let mut doc = Document::parse("hello");
        let mut selection = caret_in(&doc, "he");
        let _ = execute(&mut doc, &mut selection, &FormatCommand::JustifyRight);
        assert_eq!(doc.to_html(), r#"<div style="text-align: right;">hello</div>"#);
    }

    #[test]
    fn test_list_from_paragraphs_and_back() {
        let mut doc = Document::parse("<p>one</p><p>two</p>");
        let mut selection = Some(select_all(&doc));
        let _ = execute(&mut doc, &mut selection, &FormatCommand::InsertUnorderedList);
        assert_eq!(doc.to_html(), "<ul><li>one</li><li>two</li></ul>");

        let mut selection = Some(select_all(&doc));
        let _ = execute(&mut doc, &mut selection, &FormatCommand::InsertUnorderedList);
        assert_eq!(doc.to_html(), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_list_switches_kind() {
        let mut doc = Document::parse("<ul><li>a</li><li>b</li></ul>");
        let mut selection = caret_in(&doc, "a");
        let _ = execute(&mut doc, &mut selection, &FormatCommand::InsertOrderedList);
        assert_eq!(doc.to_html(), "<ol><li>a</li><li>b</li></ol>");
    }

    #[test]
    fn test_list_only_touched_paragraphs() {
        let mut doc = Document::parse("<p>keep</p><p>item</p>");
        let mut selection = caret_in(&doc, "item");
        let _ = execute(&mut doc, &mut selection, &FormatCommand::InsertOrderedList);
        assert_eq!(doc.to_html(), "<p>keep</p><ol><li>item</li></ol>");
    }

    #[test]
    fn test_list_from_loose_text() {
        let mut doc = Document::parse("just text");
        let mut selection = caret_in(&doc, "just");
        let _ = execute(&mut doc, &mut selection, &FormatCommand::InsertUnorderedList);
        assert_eq!(doc.to_html(), "<ul><li>just text</li></ul>");
    }
}
