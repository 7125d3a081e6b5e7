//! Inline formatting: style toggles, legacy `font` attributes and links

use tracing::debug;

use crate::dom::{is_block, Document, Element, NodeId};
use crate::outcome::{EditOutcome, IgnoreReason};
use crate::selection::Selection;

use super::{
    insert_fragment, isolate, live_selection, normalize, normalize_link_url, runs_selection,
    selected_texts, split_range,
};

/// Wrappers stripped by "remove format"; links survive
const REMOVABLE_TAGS: &[&str] = &[
    "b", "strong", "i", "em", "u", "s", "strike", "del", "font", "span", "sub", "sup",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InlineStyle {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
}

impl InlineStyle {
    /// Element used when applying the style
    fn wrapper_tag(self) -> &'static str {
        match self {
            InlineStyle::Bold => "b",
            InlineStyle::Italic => "i",
            InlineStyle::Underline => "u",
            InlineStyle::StrikeThrough => "strike",
        }
    }

    fn tags(self) -> &'static [&'static str] {
        match self {
            InlineStyle::Bold => &["b", "strong"],
            InlineStyle::Italic => &["i", "em"],
            InlineStyle::Underline => &["u"],
            InlineStyle::StrikeThrough => &["s", "strike", "del"],
        }
    }

    fn properties(self) -> &'static [&'static str] {
        match self {
            InlineStyle::Bold => &["font-weight"],
            InlineStyle::Italic => &["font-style"],
            InlineStyle::Underline | InlineStyle::StrikeThrough => {
                &["text-decoration", "text-decoration-line"]
            }
        }
    }

    fn style_matches(self, el: &Element) -> bool {
        self.properties().iter().any(|prop| {
            let Some(value) = el.style_property(prop) else {
                return false;
            };
            let value = value.to_ascii_lowercase();
            match self {
                InlineStyle::Bold => {
                    value == "bold"
                        || value == "bolder"
                        || value.parse::<u16>().is_ok_and(|w| w >= 600)
                }
                InlineStyle::Italic => value == "italic" || value == "oblique",
                InlineStyle::Underline => value.contains("underline"),
                InlineStyle::StrikeThrough => value.contains("line-through"),
            }
        })
    }

    /// Whether the element carries this style by tag or inline CSS
    pub(crate) fn matches(self, el: &Element) -> bool {
        el.is_any(self.tags()) || self.style_matches(el)
    }
}

pub(crate) fn has_style(doc: &Document, node: NodeId, style: InlineStyle) -> bool {
    doc.closest(node, |el| style.matches(el)).is_some()
}

fn remove_style(doc: &mut Document, text: NodeId, style: InlineStyle) {
    while let Some(holder) = doc.closest(text, |el| style.matches(el)) {
        let by_tag = doc.element(holder).is_some_and(|el| el.is_any(style.tags()));
        let block = doc.tag(holder).is_some_and(is_block);

        // Styled blocks lose the property as a whole
        let target = if by_tag || !block {
            isolate(doc, holder, text)
        } else {
            holder
        };

        if by_tag {
            doc.unwrap(target);
            continue;
        }
        let Some(el) = doc.element_mut(target) else {
            break;
        };
        let mut removed = false;
        for prop in style.properties() {
            removed |= el.remove_style_property(prop);
        }
        let bare = el.attrs.is_empty() && el.is_any(&["span", "font"]);
        if bare {
            doc.unwrap(target);
        }
        if !removed {
            break;
        }
    }
}

pub(super) fn toggle(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    style: InlineStyle,
) -> EditOutcome {
    let Some(sel) = live_selection(doc, selection) else {
        return IgnoreReason::NoSelection.into();
    };
    if sel.is_collapsed() {
        return IgnoreReason::CollapsedSelection.into();
    }
    let (start, end) = split_range(doc, &sel);
    let runs = selected_texts(doc, &start, &end);
    if runs.is_empty() {
        return IgnoreReason::CollapsedSelection.into();
    }

    let all_styled = runs.iter().all(|&t| has_style(doc, t, style));
    debug!(?style, runs = runs.len(), remove = all_styled, "Toggling inline style");
    for &text in &runs {
        if all_styled {
            remove_style(doc, text, style);
        } else if !has_style(doc, text, style) {
            doc.wrap(text, Element::new(style.wrapper_tag()));
        }
    }

    normalize(doc);
    *selection = runs_selection(doc, &runs);
    EditOutcome::Applied
}

/// Set (or with an empty value, remove) an attribute of `font` wrappers
pub(super) fn set_font_attr(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    attr: &str,
    value: &str,
) -> EditOutcome {
    let Some(sel) = live_selection(doc, selection) else {
        return IgnoreReason::NoSelection.into();
    };
    if sel.is_collapsed() {
        return IgnoreReason::CollapsedSelection.into();
    }
    let (start, end) = split_range(doc, &sel);
    let runs = selected_texts(doc, &start, &end);
    if runs.is_empty() {
        return IgnoreReason::CollapsedSelection.into();
    }

    for &text in &runs {
        if value.is_empty() {
            while let Some(font) = doc.closest(text, |el| el.is("font") && el.has_attr(attr)) {
                let piece = isolate(doc, font, text);
                let bare = match doc.element_mut(piece) {
                    Some(el) => {
                        el.remove_attr(attr);
                        el.attrs.is_empty()
                    }
                    None => break,
                };
                if bare {
                    doc.unwrap(piece);
                }
            }
            continue;
        }

        let exclusive = doc
            .parent(text)
            .filter(|&p| doc.is_tag(p, "font") && doc.children(p).len() == 1);
        match exclusive.and_then(|font| doc.element_mut(font)) {
            Some(font) => font.set_attr(attr, value),
            None => {
                doc.wrap(text, Element::new("font").with_attr(attr, value));
            }
        }
    }

    normalize(doc);
    *selection = runs_selection(doc, &runs);
    EditOutcome::Applied
}

pub(super) fn create_link(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    url: &str,
) -> EditOutcome {
    if url.trim().is_empty() {
        return IgnoreReason::EmptyUrl.into();
    }
    let href = normalize_link_url(url);
    let Some(sel) = live_selection(doc, selection) else {
        return IgnoreReason::NoSelection.into();
    };

    if sel.is_collapsed() {
        let mut fragment = Document::new();
        let link = fragment.create_element(Element::new("a").with_attr("href", href.as_str()));
        let text = fragment.create_text(href.as_str());
        fragment.append_child(link, text);
        let root = fragment.root();
        fragment.append_child(root, link);

        let caret = insert_fragment(doc, Some(&sel), &fragment);
        *selection = Some(Selection::caret(caret));
        return EditOutcome::Applied;
    }

    let (start, end) = split_range(doc, &sel);
    let runs = selected_texts(doc, &start, &end);
    if runs.is_empty() {
        return IgnoreReason::CollapsedSelection.into();
    }
    for &text in &runs {
        match doc.closest(text, |el| el.is("a")) {
            Some(link) => {
                let piece = isolate(doc, link, text);
                if let Some(el) = doc.element_mut(piece) {
                    el.set_attr("href", href.as_str());
                }
            }
            None => {
                doc.wrap(text, Element::new("a").with_attr("href", href.as_str()));
            }
        }
    }

    normalize(doc);
    *selection = runs_selection(doc, &runs);
    EditOutcome::Applied
}

pub(super) fn unlink(doc: &mut Document, selection: &mut Option<Selection>) -> EditOutcome {
    let Some(sel) = live_selection(doc, selection) else {
        return IgnoreReason::NoSelection.into();
    };

    if sel.is_collapsed() {
        // A caret inside a link removes the whole link
        return match doc.closest(sel.anchor.node, |el| el.is("a")) {
            Some(link) => {
                doc.unwrap(link);
                EditOutcome::Applied
            }
            None => IgnoreReason::CollapsedSelection.into(),
        };
    }

    let (start, end) = split_range(doc, &sel);
    let runs = selected_texts(doc, &start, &end);
    for &text in &runs {
        while let Some(link) = doc.closest(text, |el| el.is("a")) {
            let piece = isolate(doc, link, text);
            doc.unwrap(piece);
        }
    }

    normalize(doc);
    *selection = runs_selection(doc, &runs).or(Some(sel));
    EditOutcome::Applied
}

pub(super) fn remove_format(doc: &mut Document, selection: &mut Option<Selection>) -> EditOutcome {
    let Some(sel) = live_selection(doc, selection) else {
        return IgnoreReason::NoSelection.into();
    };
    if sel.is_collapsed() {
        return IgnoreReason::CollapsedSelection.into();
    }

    let (start, end) = split_range(doc, &sel);
    let runs = selected_texts(doc, &start, &end);
    for &text in &runs {
        while let Some(wrapper) = doc.closest(text, |el| el.is_any(REMOVABLE_TAGS)) {
            let piece = isolate(doc, wrapper, text);
            doc.unwrap(piece);
        }
    }

    normalize(doc);
    *selection = runs_selection(doc, &runs).or(Some(sel));
    EditOutcome::Applied
}
