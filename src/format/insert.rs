//! Replacing the selection with a parsed fragment

use std::cmp::Ordering;

use crate::dom::{is_block, Document, NodeId};
use crate::outcome::EditOutcome;
use crate::selection::{compare_points, DomPoint, Selection};

use super::{live_selection, split_range, INLINE_TAGS};

/// Blocks that are split in two when block content lands inside them
const SPLITTABLE: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "pre"];

pub(super) fn insert_html(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    html: &str,
) -> EditOutcome {
    let fragment = Document::parse(html);
    let live = live_selection(doc, selection);
    let caret = insert_fragment(doc, live.as_ref(), &fragment);
    *selection = Some(Selection::caret(caret));
    EditOutcome::Applied
}

/// Place an empty text node at `point` to survive the surgery that follows
fn place_marker(doc: &mut Document, point: DomPoint) -> NodeId {
    let marker = doc.create_text("");
    match doc.text(point.node).map(str::len) {
        Some(len) => {
            if point.offset == 0 {
                doc.insert_before(point.node, marker);
            } else if point.offset >= len {
                doc.insert_after(point.node, marker);
            } else {
                doc.split_text(point.node, point.offset);
                doc.insert_after(point.node, marker);
            }
        }
        None => doc.insert_child(point.node, point.offset, marker),
    }
    marker
}

/// Topmost nodes lying entirely inside `[start, end]`
fn nodes_within(doc: &Document, start: &DomPoint, end: &DomPoint) -> Vec<NodeId> {
    let mut chosen: Vec<NodeId> = Vec::new();
    for node in doc.descendants(doc.root()) {
        if chosen.last().is_some_and(|&c| doc.is_ancestor_of(c, node)) {
            continue;
        }
        let bounds = match doc.text(node) {
            Some(text) => Some((DomPoint::new(node, 0), DomPoint::new(node, text.len()))),
            None => DomPoint::before(doc, node).zip(DomPoint::after(doc, node)),
        };
        let Some((first, last)) = bounds else {
            continue;
        };
        if compare_points(doc, &first, start) != Ordering::Less
            && compare_points(doc, &last, end) != Ordering::Greater
        {
            chosen.push(node);
        }
    }
    chosen
}

/// Delete the selected content, leaving a marker where it started
fn delete_contents(doc: &mut Document, selection: &Selection) -> NodeId {
    let (start, end) = split_range(doc, selection);
    if selection.is_collapsed() {
        return place_marker(doc, start);
    }

    let removed = nodes_within(doc, &start, &end);
    let position = removed
        .iter()
        .find(|&&r| r == start.node || doc.is_ancestor_of(r, start.node))
        .and_then(|&r| DomPoint::before(doc, r))
        .unwrap_or(start);
    let marker = place_marker(doc, position);
    for node in removed {
        doc.remove(node);
    }
    let root = doc.root();
    doc.prune_empty(root, INLINE_TAGS);
    marker
}

/// Replace the selection with the children of `fragment`, or append them
/// when there is no selection. Block content inside a paragraph or heading
/// splits it, and halves left empty are dropped. Returns the caret after the
/// inserted content.
pub(crate) fn insert_fragment(
    doc: &mut Document,
    selection: Option<&Selection>,
    fragment: &Document,
) -> DomPoint {
    let root = doc.root();
    let marker = match selection {
        Some(sel) => delete_contents(doc, sel),
        None => {
            let marker = doc.create_text("");
            doc.append_child(root, marker);
            marker
        }
    };

    let inserted: Vec<NodeId> = fragment
        .children(fragment.root())
        .iter()
        .map(|&child| doc.import(fragment, child))
        .collect();
    let has_block = inserted
        .iter()
        .any(|&n| doc.tag(n).is_some_and(is_block));
    let host = if has_block {
        doc.closest(marker, |el| el.is_any(SPLITTABLE))
    } else {
        None
    };

    match host.and_then(|block| doc.split_before(block, marker).map(|tail| (block, tail))) {
        Some((head, tail)) => {
            for &node in &inserted {
                doc.insert_before(tail, node);
            }
            doc.remove(marker);
            for half in [head, tail] {
                doc.prune_empty(half, INLINE_TAGS);
                if doc.children(half).is_empty() || doc.is_visually_empty(half) {
                    doc.remove(half);
                }
            }
        }
        None => {
            for &node in &inserted {
                doc.insert_before(marker, node);
            }
        }
    }

    let caret = match inserted.last() {
        Some(&last) => {
            let open_element = doc
                .tag(last)
                .is_some_and(|t| !crate::dom::is_void(t))
                && doc.children(last).is_empty();
            if open_element {
                Some(DomPoint::new(last, 0))
            } else {
                DomPoint::after(doc, last)
            }
        }
        None => DomPoint::before(doc, marker),
    };
    let caret = caret.unwrap_or_else(|| crate::selection::end_of_document(doc));
    doc.remove(marker);
    caret
}
