//! innerHTML-style serialization

use super::{is_void, Document, NodeId, NodeKind};

pub(crate) fn serialize_children(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let raw = doc.tag(id).is_some_and(|t| t == "script" || t == "style");
    for &child in doc.children(id) {
        write_node(doc, child, raw, &mut out);
    }
    out
}

pub(crate) fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let raw = doc
        .parent(id)
        .and_then(|p| doc.tag(p))
        .is_some_and(|t| t == "script" || t == "style");
    write_node(doc, id, raw, &mut out);
    out
}

enum Step {
    Enter(NodeId, bool),
    Close(NodeId),
}

fn write_node(doc: &Document, id: NodeId, raw_parent: bool, out: &mut String) {
    let mut stack = vec![Step::Enter(id, raw_parent)];
    while let Some(step) = stack.pop() {
        let (id, raw_parent) = match step {
            Step::Enter(id, raw) => (id, raw),
            Step::Close(id) => {
                if let Some(el) = doc.element(id) {
                    out.push_str("</");
                    out.push_str(&el.name);
                    out.push('>');
                }
                continue;
            }
        };
        match doc.node(id) {
            None => {}
            Some(NodeKind::Root) => {
                stack.extend(doc.children(id).iter().rev().map(|&c| Step::Enter(c, false)));
            }
            Some(NodeKind::Text(text)) => {
                if raw_parent {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            Some(NodeKind::Comment(text)) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Some(NodeKind::Element(el)) => {
                out.push('<');
                out.push_str(&el.name);
                for attr in &el.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(&attr.value));
                    out.push('"');
                }
                out.push('>');
                if is_void(&el.name) {
                    continue;
                }
                let raw = el.is_any(&["script", "style"]);
                stack.push(Step::Close(id));
                stack.extend(doc.children(id).iter().rev().map(|&c| Step::Enter(c, raw)));
            }
        }
    }
}

/// Escape text content the way `innerHTML` does
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}
