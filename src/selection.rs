//! Caret and range selection over a [`Document`]

use std::cmp::Ordering;

use crate::dom::{Document, NodeId};

/// A position in the tree.
///
/// Inside a text node `offset` is a byte offset into the text, inside an
/// element (or the root) it is a child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl DomPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    /// Position right before `node` inside its parent
    pub fn before(doc: &Document, node: NodeId) -> Option<Self> {
        Some(Self::new(doc.parent(node)?, doc.child_index(node)?))
    }

    /// Position right after `node` inside its parent
    pub fn after(doc: &Document, node: NodeId) -> Option<Self> {
        Some(Self::new(doc.parent(node)?, doc.child_index(node)? + 1))
    }

    /// Sort key: the node's path followed by the offset
    fn key(&self, doc: &Document) -> Vec<usize> {
        let mut key = doc.path(self.node);
        key.push(self.offset);
        key
    }
}

/// Document-order comparison of two points
pub fn compare_points(doc: &Document, a: &DomPoint, b: &DomPoint) -> Ordering {
    if a.node == b.node {
        return a.offset.cmp(&b.offset);
    }
    a.key(doc).cmp(&b.key(doc))
}

/// Anchor is where the selection started, focus where it ends; the focus may
/// come first in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: DomPoint,
    pub focus: DomPoint,
}

impl Selection {
    pub fn new(anchor: DomPoint, focus: DomPoint) -> Self {
        Self { anchor, focus }
    }

    /// Collapsed selection at `point`
    pub fn caret(point: DomPoint) -> Self {
        Self::new(point, point)
    }

    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// `(start, end)` in document order
    pub fn ordered(&self, doc: &Document) -> (DomPoint, DomPoint) {
        if compare_points(doc, &self.anchor, &self.focus) == Ordering::Greater {
            (self.focus, self.anchor)
        } else {
            (self.anchor, self.focus)
        }
    }

    /// Whether both ends still address attached nodes with in-range offsets
    pub fn is_valid(&self, doc: &Document) -> bool {
        point_is_valid(doc, &self.anchor) && point_is_valid(doc, &self.focus)
    }

    /// Clamp both ends into the document; `None` if either node is detached
    pub fn clamped(&self, doc: &Document) -> Option<Self> {
        Some(Self::new(
            clamp_point(doc, &self.anchor)?,
            clamp_point(doc, &self.focus)?,
        ))
    }
}

pub fn point_is_valid(doc: &Document, point: &DomPoint) -> bool {
    if !doc.is_attached(point.node) {
        return false;
    }
    match doc.text(point.node) {
        Some(text) => point.offset <= text.len() && text.is_char_boundary(point.offset),
        None => point.offset <= doc.children(point.node).len(),
    }
}

pub fn clamp_point(doc: &Document, point: &DomPoint) -> Option<DomPoint> {
    if !doc.is_attached(point.node) {
        return None;
    }
    let offset = match doc.text(point.node) {
        Some(text) => {
            let mut offset = point.offset.min(text.len());
            while !text.is_char_boundary(offset) {
                offset -= 1;
            }
            offset
        }
        None => point.offset.min(doc.children(point.node).len()),
    };
    Some(DomPoint::new(point.node, offset))
}

/// Everything inside the root
pub fn select_all(doc: &Document) -> Selection {
    select_contents(doc, doc.root())
}

/// The whole content of one node
pub fn select_contents(doc: &Document, id: NodeId) -> Selection {
    let end = match doc.text(id) {
        Some(text) => text.len(),
        None => doc.children(id).len(),
    };
    Selection::new(DomPoint::new(id, 0), DomPoint::new(id, end))
}

pub fn end_of_document(doc: &Document) -> DomPoint {
    DomPoint::new(doc.root(), doc.children(doc.root()).len())
}

/// Select the `nth` (zero-based) occurrence of `needle` in the document's
/// text, which may span several text nodes.
pub fn find_text(doc: &Document, needle: &str, nth: usize) -> Option<Selection> {
    if needle.is_empty() {
        return None;
    }
    let nodes = doc.text_nodes(doc.root());
    let mut flat = String::new();
    let mut starts = Vec::with_capacity(nodes.len());
    for &node in &nodes {
        starts.push(flat.len());
        flat.push_str(doc.text(node).unwrap_or_default());
    }

    let (start, _) = flat.match_indices(needle).nth(nth)?;
    let end = start + needle.len();

    // Start lands in the node where it is strictly before that node's end,
    // end lands in the node where it is strictly after that node's start.
    let locate = |pos: usize, prefer_next: bool| -> Option<DomPoint> {
        nodes.iter().zip(&starts).find_map(|(&node, &node_start)| {
            let len = doc.text(node).map_or(0, str::len);
            let node_end = node_start + len;
            let inside = if prefer_next {
                pos >= node_start && pos < node_end
            } else {
                pos > node_start && pos <= node_end
            };
            inside.then(|| DomPoint::new(node, pos - node_start))
        })
    };

    Some(Selection::new(locate(start, true)?, locate(end, false)?))
}
