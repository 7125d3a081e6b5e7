//! Arena-backed HTML document tree.
//!
//! The editing session never holds references into the tree. Every node is
//! addressed by a [`NodeId`], an index into the document's arena, and a
//! document carries a process-unique `generation` so ids issued against a
//! replaced document can be told apart from ids of the live one.
//!
//! Nodes are never freed while a document lives. Detaching a node only
//! unlinks it from its parent, so an id stays safe to look up; callers ask
//! [`Document::is_attached`] whether it is still part of the visible tree.

use std::sync::atomic::{AtomicU64, Ordering};

mod parser;
mod serialize;

pub use parser::MAX_NESTING_DEPTH;
pub use serialize::{escape_attribute, escape_text};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Elements that never have children or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements laid out as blocks when rendering or converting to text
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

/// Identifies a node inside one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Tag name plus attributes, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn is_any(&self, names: &[&str]) -> bool {
        names.contains(&self.name.as_str())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute::new(name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(idx).value)
    }

    /// Value of one inline `style` declaration, property matched case-insensitively
    pub fn style_property(&self, property: &str) -> Option<String> {
        let style = self.attr("style")?;
        style_declarations(style)
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    pub fn set_style_property(&mut self, property: &str, value: &str) {
        let mut decls = self.attr("style").map(style_declarations).unwrap_or_default();
        match decls
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
        {
            Some(decl) => decl.1 = value.to_string(),
            None => decls.push((property.to_string(), value.to_string())),
        }
        self.set_attr("style", format_declarations(&decls));
    }

    /// Removes a style declaration, dropping the attribute once it is empty.
    /// Returns whether anything was removed.
    pub fn remove_style_property(&mut self, property: &str) -> bool {
        let Some(style) = self.attr("style") else {
            return false;
        };
        let mut decls = style_declarations(style);
        let before = decls.len();
        decls.retain(|(name, _)| !name.eq_ignore_ascii_case(property));
        if decls.len() == before {
            return false;
        }
        if decls.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", format_declarations(&decls));
        }
        true
    }
}

/// Splits a `style` attribute into `(property, value)` pairs, lowercasing
/// property names and skipping malformed declarations.
pub fn style_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// Inverse of [`style_declarations`]
pub fn format_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(name, value)| format!("{}: {};", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The fragment container; never serialized itself
    Root,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An HTML fragment as a mutable tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    generation: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Parse an HTML fragment. Never fails; malformed markup is repaired.
    pub fn parse(html: &str) -> Self {
        parser::parse_fragment(html)
    }

    /// Serialize the fragment (the root's children)
    pub fn to_html(&self) -> String {
        serialize::serialize_children(self, self.root())
    }

    /// Serialize one node including its own tags
    pub fn outer_html(&self, id: NodeId) -> String {
        serialize::serialize_node(self, id)
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `id` was allocated by this document
    #[inline]
    pub fn contains_id(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.index()).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.node(id)? {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.kind)? {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.node(id)? {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.kind)? {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    pub fn is_tag(&self, id: NodeId, name: &str) -> bool {
        self.tag(id) == Some(name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.child_index(id)?;
        self.children(parent).get(idx + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.child_index(id)?;
        idx.checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Iterate over the ancestors of `id`, nearest first, ending at the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Nearest element at or above `id` (below the root) matching `pred`
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.element(n).is_some_and(&pred))
    }

    /// All nodes below `id` in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Whether `id` is still reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        if !self.contains_id(id) {
            return false;
        }
        if id == self.root() {
            return true;
        }
        self.ancestors(id).any(|a| a == self.root())
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Child indices leading from the root to `id`
    pub fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut cur = id;
        while let Some(idx) = self.child_index(cur) {
            path.push(idx);
            match self.parent(cur) {
                Some(p) => cur = p,
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Concatenated text of all text nodes below (or at) `id`
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Text nodes at or below `id` in document order
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        if self.is_text(id) {
            return vec![id];
        }
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_text(n))
            .collect()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(NodeKind::Element(element))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(text.into()))
    }

    /// Shallow copy of an element (or text/comment) as a new detached node
    pub fn shallow_clone(&mut self, id: NodeId) -> NodeId {
        let kind = match self.node(id) {
            Some(NodeKind::Root) | None => NodeKind::Element(Element::new("div")),
            Some(kind) => kind.clone(),
        };
        self.alloc(kind)
    }

    /// Deep-copy `id` from `other` into this document, detached
    pub fn import(&mut self, other: &Document, id: NodeId) -> NodeId {
        let kind = match other.node(id) {
            Some(NodeKind::Root) | None => NodeKind::Element(Element::new("div")),
            Some(kind) => kind.clone(),
        };
        let copy = self.alloc(kind);
        let mut pending = vec![(id, copy)];
        while let Some((source, target)) = pending.pop() {
            for &child in other.children(source) {
                let Some(kind) = other.node(child).cloned() else {
                    continue;
                };
                let child_copy = self.alloc(kind);
                self.nodes[target.index()].children.push(child_copy);
                self.nodes[child_copy.index()].parent = Some(target);
                pending.push((child, child_copy));
            }
        }
        copy
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Unlink `id` from its parent. The node and its subtree stay addressable.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.index()].children.retain(|&c| c != id);
        self.nodes[id.index()].parent = None;
    }

    /// Alias of [`detach`](Self::detach), reads better at call sites that delete
    #[inline]
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Insert `child` at `index` (clamped) among `parent`'s children
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert!(parent != child && !self.is_ancestor_of(child, parent));
        self.detach(child);
        let children = &mut self.nodes[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Returns false when `reference` has no parent
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> bool {
        self.detach(node);
        let (Some(parent), Some(idx)) = (self.parent(reference), self.child_index(reference))
        else {
            return false;
        };
        self.insert_child(parent, idx, node);
        true
    }

    /// Returns false when `reference` has no parent
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> bool {
        self.detach(node);
        let (Some(parent), Some(idx)) = (self.parent(reference), self.child_index(reference))
        else {
            return false;
        };
        self.insert_child(parent, idx + 1, node);
        true
    }

    /// Replace `id` with its children
    pub fn unwrap(&mut self, id: NodeId) {
        let (Some(parent), Some(idx)) = (self.parent(id), self.child_index(id)) else {
            return;
        };
        let children = self.children(id).to_vec();
        for (offset, child) in children.into_iter().enumerate() {
            self.insert_child(parent, idx + offset, child);
        }
        self.detach(id);
    }

    /// Wrap `id` in a new element placed where `id` was
    pub fn wrap(&mut self, id: NodeId, element: Element) -> NodeId {
        let wrapper = self.create_element(element);
        if self.insert_before(id, wrapper) {
            self.append_child(wrapper, id);
        }
        wrapper
    }

    /// Split a text node at a byte offset. The original keeps `[..offset]`,
    /// the returned new sibling holds the rest. Returns `None` if the offset
    /// is not strictly inside the text or not on a char boundary.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Option<NodeId> {
        let text = self.text_mut(id)?;
        if offset == 0 || offset >= text.len() || !text.is_char_boundary(offset) {
            return None;
        }
        let rest = text.split_off(offset);
        let new = self.create_text(rest);
        self.insert_after(id, new);
        Some(new)
    }

    /// Split `ancestor` so that `node` and everything after it (in document
    /// order, inside `ancestor`) moves into a shallow clone of `ancestor`
    /// inserted right after it. Every element between the two is cloned the
    /// same way. Returns the clone, or `None` when `node` is not a strict
    /// descendant of `ancestor` or `ancestor` is the root.
    pub fn split_before(&mut self, ancestor: NodeId, node: NodeId) -> Option<NodeId> {
        if ancestor == self.root() || !self.is_ancestor_of(ancestor, node) {
            return None;
        }
        let mut cur = node;
        loop {
            let parent = self.parent(cur)?;
            let idx = self.child_index(cur)?;
            let clone = self.shallow_clone(parent);
            let moving = self.children(parent)[idx..].to_vec();
            for child in moving {
                self.append_child(clone, child);
            }
            self.insert_after(parent, clone);
            if parent == ancestor {
                return Some(clone);
            }
            cur = clone;
        }
    }

    /// Merge adjacent sibling elements under `parent` that have the same tag
    /// and attributes and are in `tags`
    pub fn merge_adjacent(&mut self, parent: NodeId, tags: &[&str]) {
        let mut i = 0;
        while i + 1 < self.children(parent).len() {
            let left = self.children(parent)[i];
            let right = self.children(parent)[i + 1];
            let mergeable = match (self.element(left), self.element(right)) {
                (Some(a), Some(b)) => a == b && a.is_any(tags),
                _ => false,
            };
            if mergeable {
                for child in self.children(right).to_vec() {
                    self.append_child(left, child);
                }
                self.detach(right);
            } else {
                i += 1;
            }
        }
    }

    /// Remove elements under `id` in `tags` that ended up with no children,
    /// innermost first so emptiness cascades upwards
    pub fn prune_empty(&mut self, id: NodeId, tags: &[&str]) {
        for node in self.descendants(id).into_iter().rev() {
            let empty = self.children(node).is_empty()
                && self.element(node).is_some_and(|el| el.is_any(tags));
            if empty {
                self.detach(node);
            }
        }
    }

    /// Whether the subtree has nothing visible: no non-whitespace text and
    /// no void/replaced elements like `img`, `br` or tables
    pub fn is_visually_empty(&self, id: NodeId) -> bool {
        std::iter::once(id)
            .chain(self.descendants(id))
            .all(|n| match self.node(n) {
                Some(NodeKind::Text(t)) => t.trim().is_empty(),
                Some(NodeKind::Element(el)) => !(is_void(&el.name) || el.is("table")),
                _ => true,
            })
    }
}

/// Iterator returned by [`Document::ancestors`]
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.doc.parent(cur);
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_child(doc: &Document, id: NodeId) -> NodeId {
        doc.children(id)[0]
    }

    #[test]
    fn test_generations_are_unique() {
        let a = Document::new();
        let b = Document::new();
        assert_ne!(a.generation(), b.generation());
    }

    #[test]
    fn test_split_text_keeps_original_prefix() {
        let mut doc = Document::parse("<p>Hello world</p>");
        let p = first_child(&doc, doc.root());
        let text = first_child(&doc, p);

        let rest = doc.split_text(text, 5).unwrap();
        assert_eq!(doc.text(text), Some("Hello"));
        assert_eq!(doc.text(rest), Some(" world"));
        assert_eq!(doc.to_html(), "<p>Hello world</p>");
        assert_eq!(doc.children(p).len(), 2);
    }

    #[test]
    fn test_split_text_rejects_edges_and_non_boundaries() {
        let mut doc = Document::parse("<p>héllo</p>");
        let p = first_child(&doc, doc.root());
        let text = first_child(&doc, p);
        assert!(doc.split_text(text, 0).is_none());
        assert!(doc.split_text(text, 6).is_none());
        // Inside the two-byte 'é'
        assert!(doc.split_text(text, 2).is_none());
    }

    #[test]
    fn test_split_before_clones_each_level() {
        let mut doc = Document::parse("<p><b>one<i>two</i>three</b></p>");
        let p = first_child(&doc, doc.root());
        let b = first_child(&doc, p);
        let i = doc.children(b)[1];
        let two = first_child(&doc, i);

        let clone = doc.split_before(b, two).unwrap();
        assert_eq!(doc.tag(clone), Some("b"));
        assert_eq!(
            doc.to_html(),
            "<p><b>one<i></i></b><b><i>two</i>three</b></p>"
        );
    }

    #[test]
    fn test_split_before_refuses_root() {
        let mut doc = Document::parse("<p>x</p>");
        let p = first_child(&doc, doc.root());
        assert!(doc.split_before(doc.root(), p).is_none());
    }

    #[test]
    fn test_unwrap_hoists_children_in_place() {
        let mut doc = Document::parse("<p>a<span>b<b>c</b></span>d</p>");
        let p = first_child(&doc, doc.root());
        let span = doc.children(p)[1];
        doc.unwrap(span);
        assert_eq!(doc.to_html(), "<p>ab<b>c</b>d</p>");
        assert!(!doc.is_attached(span));
    }

    #[test]
    fn test_wrap_and_merge_adjacent() {
        let mut doc = Document::parse("<p>ab</p>");
        let p = first_child(&doc, doc.root());
        let text = first_child(&doc, p);
        let b_text = doc.split_text(text, 1).unwrap();
        doc.wrap(text, Element::new("b"));
        doc.wrap(b_text, Element::new("b"));
        assert_eq!(doc.to_html(), "<p><b>a</b><b>b</b></p>");

        doc.merge_adjacent(p, &["b"]);
        assert_eq!(doc.to_html(), "<p><b>ab</b></p>");
    }

    #[test]
    fn test_detached_node_is_not_attached() {
        let mut doc = Document::parse("<p><span>x</span></p>");
        let p = first_child(&doc, doc.root());
        let span = first_child(&doc, p);
        let x = first_child(&doc, span);
        doc.remove(span);
        assert!(!doc.is_attached(span));
        assert!(!doc.is_attached(x));
        assert!(doc.is_attached(p));
    }

    #[test]
    fn test_style_property_roundtrip() {
        let mut el = Element::new("p").with_attr("style", "color:red; TEXT-ALIGN : left");
        assert_eq!(el.style_property("text-align").as_deref(), Some("left"));

        el.set_style_property("text-align", "center");
        assert_eq!(el.attr("style"), Some("color: red; text-align: center;"));

        assert!(el.remove_style_property("color"));
        assert!(el.remove_style_property("text-align"));
        assert!(!el.has_attr("style"));
    }

    #[test]
    fn test_prune_empty_cascades() {
        let mut doc = Document::parse("<p><b><i></i></b>x</p>");
        doc.prune_empty(doc.root(), &["b", "i"]);
        assert_eq!(doc.to_html(), "<p>x</p>");
    }

    #[test]
    fn test_import_deep_copies() {
        let source = Document::parse("<ul><li>a</li><li>b</li></ul>");
        let mut doc = Document::parse("<p>x</p>");
        let list = first_child(&source, source.root());
        let copy = doc.import(&source, list);
        let root = doc.root();
        doc.append_child(root, copy);
        assert_eq!(doc.to_html(), "<p>x</p><ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_is_visually_empty() {
        let doc = Document::parse("<p> <span>\n</span></p><p><br></p>");
        let root = doc.root();
        assert!(doc.is_visually_empty(doc.children(root)[0]));
        assert!(!doc.is_visually_empty(doc.children(root)[1]));
    }
}
