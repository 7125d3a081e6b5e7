//! Clipboard cleanup for pasted word-processor markup

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::convert::text_to_html;
use crate::dom::{format_declarations, style_declarations, Document, NodeId, NodeKind};

/// Elements dropped together with their content
const DROPPED_ELEMENTS: &[&str] = &[
    "head", "style", "script", "meta", "link", "title", "xml", "template",
];

/// Document wrappers whose children are kept
const WRAPPER_ELEMENTS: &[&str] = &["html", "body"];

const VENDOR_TAG_PREFIXES: &[&str] = &["o:", "w:", "v:", "st1:", "mso-"];
const VENDOR_ATTR_PREFIXES: &[&str] = &["mso-", "w:", "v:"];
const VENDOR_STYLE_PROPERTIES: &[&str] = &["tab-stops", "text-indent"];

/// Elements removed when left holding only whitespace
const EMPTY_REMOVABLE: &[&str] = &["p", "span"];

/// What a paste event carried
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastePayload {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl PastePayload {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            text: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            html: None,
            text: Some(text.into()),
        }
    }
}

fn is_vendor_tag(name: &str) -> bool {
    VENDOR_TAG_PREFIXES.iter().any(|p| name.starts_with(p))
}

fn is_vendor_attr(name: &str, value: &str) -> bool {
    VENDOR_ATTR_PREFIXES.iter().any(|p| name.starts_with(p))
        || (name == "class" && value.contains("Mso"))
}

fn clean_style(style: &str) -> String {
    let kept: Vec<(String, String)> = style_declarations(style)
        .into_iter()
        .filter(|(name, _)| {
            !name.starts_with("mso-") && !VENDOR_STYLE_PROPERTIES.contains(&name.as_str())
        })
        .collect();
    format_declarations(&kept)
}

fn clean_attributes(doc: &mut Document, node: NodeId) {
    let Some(el) = doc.element_mut(node) else {
        return;
    };
    el.attrs.retain(|a| !is_vendor_attr(&a.name, &a.value));
    if let Some(cleaned) = el.attr("style").map(clean_style) {
        if cleaned.is_empty() {
            el.remove_attr("style");
        } else {
            el.set_attr("style", cleaned);
        }
    }
}

fn is_blank(doc: &Document, node: NodeId) -> bool {
    doc.children(node)
        .iter()
        .all(|&c| doc.text(c).is_some_and(|t| t.trim_matches(|c: char| c.is_ascii_whitespace()).is_empty()))
}

/// Strip word-processor residue from clipboard HTML: vendor attributes and
/// style properties go, vendor elements are unwrapped, and paragraphs or
/// spans left blank are removed. Never fails; anything the parser cannot
/// make sense of is kept as text.
pub fn sanitize(html: &str) -> String {
    let mut doc = Document::parse(html);
    sanitize_document(&mut doc);
    doc.to_html()
}

pub fn sanitize_document(doc: &mut Document) {
    let root = doc.root();
    let mut unwrapped = 0usize;
    let mut dropped = 0usize;

    // Nodes inside dropped subtrees. A dropped root keeps its children
    // linked, so membership follows the parent pointer.
    let mut removed: HashSet<NodeId> = HashSet::new();

    for node in doc.descendants(root) {
        if doc.parent(node).is_some_and(|p| removed.contains(&p)) {
            removed.insert(node);
            continue;
        }
        let (drop, unwrap) = match doc.node(node) {
            Some(NodeKind::Comment(_)) => (true, false),
            Some(NodeKind::Element(el)) => (
                el.is_any(DROPPED_ELEMENTS),
                el.is_any(WRAPPER_ELEMENTS) || is_vendor_tag(&el.name),
            ),
            _ => (false, false),
        };
        if drop {
            doc.remove(node);
            removed.insert(node);
            dropped += 1;
        } else if unwrap {
            doc.unwrap(node);
            unwrapped += 1;
        } else {
            clean_attributes(doc, node);
        }
    }

    // Innermost first so a span emptied out takes its paragraph with it
    for node in doc.descendants(root).into_iter().rev() {
        let removable = doc.element(node).is_some_and(|el| el.is_any(EMPTY_REMOVABLE));
        if removable && is_blank(doc, node) {
            doc.remove(node);
        }
    }

    debug!(dropped, unwrapped, "Sanitized pasted markup");
}

/// Markup to insert for a paste: sanitized HTML when present, otherwise the
/// text as paragraphs. `None` when there is nothing to paste.
pub fn paste_markup(payload: &PastePayload) -> Option<String> {
    let text = payload.text.as_deref().filter(|t| !t.is_empty());

    if let Some(html) = payload.html.as_deref().filter(|h| !h.trim().is_empty()) {
        let mut doc = Document::parse(html);
        sanitize_document(&mut doc);
        let root = doc.root();
        if !doc.is_visually_empty(root) {
            return Some(doc.to_html());
        }
        if text.is_none() {
            return None;
        }
        debug!("Sanitized HTML was empty, pasting plain text instead");
    }

    text.map(text_to_html)
}
