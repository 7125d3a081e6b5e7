//! Table insertion and structure editing anchored to a selected cell

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{Document, Element, NodeId};
use crate::format::insert_fragment;
use crate::outcome::{EditOutcome, IgnoreReason};
use crate::selection::{DomPoint, Selection};

pub const MIN_DIMENSION: u32 = 1;
pub const MAX_DIMENSION: u32 = 9;

/// Table dialog input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSpec {
    pub rows: u32,
    pub cols: u32,
    pub border_color: String,
    pub cell_color: String,
}

impl Default for TableSpec {
    fn default() -> Self {
        Self {
            rows: 2,
            cols: 2,
            border_color: "#000000".to_string(),
            cell_color: "#ffffff".to_string(),
        }
    }
}

/// Insert-table request as the dialog submits it. Fields left out take the
/// configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDialog {
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub border_color: Option<String>,
    pub cell_color: Option<String>,
}

impl TableDialog {
    pub fn resolve(&self, defaults: &TableSpec) -> TableSpec {
        TableSpec {
            rows: self.rows.unwrap_or(defaults.rows),
            cols: self.cols.unwrap_or(defaults.cols),
            border_color: self
                .border_color
                .clone()
                .unwrap_or_else(|| defaults.border_color.clone()),
            cell_color: self
                .cell_color
                .clone()
                .unwrap_or_else(|| defaults.cell_color.clone()),
        }
    }
}

impl TableSpec {
    /// Rows and columns forced into `1..=9`
    pub fn clamped(&self) -> Self {
        Self {
            rows: self.rows.clamp(MIN_DIMENSION, MAX_DIMENSION),
            cols: self.cols.clamp(MIN_DIMENSION, MAX_DIMENSION),
            ..self.clone()
        }
    }

    /// Markup for the table: one header row, `rows - 1` body rows and a
    /// trailing empty paragraph to keep typing below the table
    pub fn to_html(&self) -> String {
        let spec = self.clamped();
        let border = &spec.border_color;
        let background = &spec.cell_color;
        let cell_style = format!(
            "padding:6px; border:1px solid {}; background:{};",
            border, background
        );

        let mut html = format!(
            r#"<table style="width: 100%; border-spacing:0; border: 1px solid {};">"#,
            border
        );
        html.push_str("<thead><tr>");
        for c in 1..=spec.cols {
            html.push_str(&format!(r#"<th style="{}">Header {}</th>"#, cell_style, c));
        }
        html.push_str("</tr></thead><tbody>");
        for _ in 1..spec.rows {
            html.push_str("<tr>");
            for _ in 0..spec.cols {
                html.push_str(&format!(r#"<td style="{}">&nbsp;</td>"#, cell_style));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table><p></p>");
        html
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPosition {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPosition {
    Left,
    Right,
}

/// Weak handle to a table cell: valid only against the document it was
/// taken from, and only while that cell stays attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    generation: u64,
    node: NodeId,
}

impl CellRef {
    /// `None` unless `node` is an attached `td`/`th`
    pub fn new(doc: &Document, node: NodeId) -> Option<Self> {
        is_cell(doc, node).then(|| Self {
            generation: doc.generation(),
            node,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn resolve(&self, doc: &Document) -> Result<NodeId, IgnoreReason> {
        if self.generation == doc.generation() && is_cell(doc, self.node) {
            Ok(self.node)
        } else {
            Err(IgnoreReason::CellDetached)
        }
    }
}

fn is_cell(doc: &Document, node: NodeId) -> bool {
    doc.element(node).is_some_and(|el| el.is_any(&["td", "th"])) && doc.is_attached(node)
}

/// The cell containing `point`, as when clicking inside a table
pub fn cell_at(doc: &Document, point: &DomPoint) -> Option<NodeId> {
    let node = match doc.text(point.node) {
        Some(_) => point.node,
        None => doc
            .children(point.node)
            .get(point.offset)
            .copied()
            .unwrap_or(point.node),
    };
    doc.closest(node, |el| el.is_any(&["td", "th"]))
        .filter(|&cell| doc.is_attached(cell))
}

/// Cell by coordinates: the `table`-th table in document order, then row
/// and column among that table's own rows
pub fn cell_by_position(doc: &Document, table: usize, row: usize, col: usize) -> Option<NodeId> {
    let table = doc
        .descendants(doc.root())
        .into_iter()
        .filter(|&n| doc.is_tag(n, "table"))
        .nth(table)?;
    let row = *table_rows(doc, table).get(row)?;
    row_cells(doc, row).get(col).copied()
}

/// Rows belonging to `table` itself, skipping rows of nested tables
pub fn table_rows(doc: &Document, table: NodeId) -> Vec<NodeId> {
    doc.descendants(table)
        .into_iter()
        .filter(|&n| {
            doc.is_tag(n, "tr")
                && doc
                    .ancestors(n)
                    .find(|&a| doc.is_tag(a, "table"))
                    .is_some_and(|owner| owner == table)
        })
        .collect()
}

pub fn row_cells(doc: &Document, row: NodeId) -> Vec<NodeId> {
    doc.children(row)
        .iter()
        .copied()
        .filter(|&c| doc.element(c).is_some_and(|el| el.is_any(&["td", "th"])))
        .collect()
}

fn cell_index(doc: &Document, cell: NodeId) -> Option<usize> {
    let row = doc.parent(cell)?;
    row_cells(doc, row).iter().position(|&c| c == cell)
}

fn owning_table(doc: &Document, cell: NodeId) -> Option<NodeId> {
    doc.ancestors(cell).find(|&a| doc.is_tag(a, "table"))
}

/// Empty cell copying the tag and attributes of `template`
fn empty_cell_like(doc: &mut Document, template: Option<NodeId>) -> NodeId {
    let element = template
        .and_then(|t| doc.element(t).cloned())
        .unwrap_or_else(|| Element::new("td"));
    let cell = doc.create_element(element);
    let filler = doc.create_text("\u{a0}");
    doc.append_child(cell, filler);
    cell
}

/// Insert a table at the caret, or at the end without a selection
pub fn insert_table(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    spec: &TableSpec,
) -> EditOutcome {
    let spec = spec.clamped();
    let fragment = Document::parse(&spec.to_html());
    let live = selection.as_ref().and_then(|s| s.clamped(doc));
    debug!(rows = spec.rows, cols = spec.cols, at_caret = live.is_some(), "Inserting table");
    let caret = insert_fragment(doc, live.as_ref(), &fragment);
    *selection = Some(Selection::caret(caret));
    EditOutcome::Applied
}

pub fn add_row(doc: &mut Document, cell: NodeId, position: RowPosition) -> EditOutcome {
    let Some(row) = doc.parent(cell).filter(|&r| doc.is_tag(r, "tr")) else {
        return IgnoreReason::CellDetached.into();
    };
    let templates = row_cells(doc, row);
    let new_row = doc.shallow_clone(row);
    for template in templates {
        let new_cell = empty_cell_like(doc, Some(template));
        doc.append_child(new_row, new_cell);
    }
    match position {
        RowPosition::Above => doc.insert_before(row, new_row),
        RowPosition::Below => doc.insert_after(row, new_row),
    };
    EditOutcome::Applied
}

pub fn add_column(doc: &mut Document, cell: NodeId, position: ColumnPosition) -> EditOutcome {
    let (Some(table), Some(index)) = (owning_table(doc, cell), cell_index(doc, cell)) else {
        return IgnoreReason::CellDetached.into();
    };
    let target = match position {
        ColumnPosition::Left => index,
        ColumnPosition::Right => index + 1,
    };

    for row in table_rows(doc, table) {
        let cells = row_cells(doc, row);
        let template = cells.get(index).or_else(|| cells.last()).copied();
        let new_cell = empty_cell_like(doc, template);
        match cells.get(target) {
            Some(&before) => {
                doc.insert_before(before, new_cell);
            }
            None => doc.append_child(row, new_cell),
        }
    }
    EditOutcome::Applied
}

pub fn delete_row(doc: &mut Document, cell: NodeId) -> EditOutcome {
    let (Some(table), Some(row)) = (owning_table(doc, cell), doc.parent(cell)) else {
        return IgnoreReason::CellDetached.into();
    };
    if table_rows(doc, table).len() <= 1 {
        return IgnoreReason::OnlyRow.into();
    }
    doc.remove(row);
    EditOutcome::Applied
}

pub fn delete_column(doc: &mut Document, cell: NodeId) -> EditOutcome {
    let (Some(table), Some(index)) = (owning_table(doc, cell), cell_index(doc, cell)) else {
        return IgnoreReason::CellDetached.into();
    };
    let rows = table_rows(doc, table);
    let first_row_cells = rows.first().map_or(0, |&r| row_cells(doc, r).len());
    if first_row_cells <= 1 {
        return IgnoreReason::OnlyColumn.into();
    }
    for row in rows {
        if let Some(&target) = row_cells(doc, row).get(index) {
            doc.remove(target);
        }
    }
    EditOutcome::Applied
}

pub fn set_cell_background(doc: &mut Document, cell: NodeId, color: &str) -> EditOutcome {
    match doc.element_mut(cell) {
        Some(el) => {
            el.set_style_property("background-color", color.trim());
            EditOutcome::Applied
        }
        None => IgnoreReason::CellDetached.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_table(doc: &Document) -> NodeId {
        doc.descendants(doc.root())
            .into_iter()
            .find(|&n| doc.is_tag(n, "table"))
            .unwrap()
    }

    fn shape(doc: &Document) -> Vec<usize> {
        table_rows(doc, first_table(doc))
            .into_iter()
            .map(|r| row_cells(doc, r).len())
            .collect()
    }

    #[test]
    fn test_table_spec_clamps() {
        let spec = TableSpec {
            rows: 0,
            cols: 40,
            ..TableSpec::default()
        };
        let clamped = spec.clamped();
        assert_eq!((clamped.rows, clamped.cols), (1, 9));
    }

    #[test]
    fn test_table_markup() {
        let spec = TableSpec {
            rows: 2,
            cols: 1,
            border_color: "#123456".into(),
            cell_color: "#eeeeee".into(),
        };
        assert_eq!(
            spec.to_html(),
            concat!(
                r#"<table style="width: 100%; border-spacing:0; border: 1px solid #123456;">"#,
                r#"<thead><tr><th style="padding:6px; border:1px solid #123456; background:#eeeeee;">Header 1</th></tr></thead>"#,
                r#"<tbody><tr><td style="padding:6px; border:1px solid #123456; background:#eeeeee;">&nbsp;</td></tr></tbody>"#,
                "</table><p></p>"
            )
        );
    }

    #[test]
    fn test_insert_table_shape() {
        let mut doc = Document::new();
        let mut selection = None;
        let spec = TableSpec {
            rows: 2,
            cols: 3,
            ..TableSpec::default()
        };
        let _ = insert_table(&mut doc, &mut selection, &spec);
        assert_eq!(shape(&doc), vec![3, 3]);

        let table = first_table(&doc);
        let rows = table_rows(&doc, table);
        assert!(row_cells(&doc, rows[0]).iter().all(|&c| doc.is_tag(c, "th")));
        assert!(row_cells(&doc, rows[1]).iter().all(|&c| doc.is_tag(c, "td")));
        assert!(doc.to_html().ends_with("</table><p></p>"));

        // Caret lands in the trailing paragraph
        let caret = selection.unwrap().anchor;
        assert_eq!(doc.tag(caret.node), Some("p"));
    }

    #[test]
    fn test_add_row_copies_cell_shape() {
        let mut doc = Document::parse(r#"<table><tr><td class="a">1</td><th>2</th></tr></table>"#);
        let cell = cell_by_position(&doc, 0, 0, 0).unwrap();
        assert!(add_row(&mut doc, cell, RowPosition::Below).is_applied());
        assert_eq!(
            doc.to_html(),
            r#"<table><tr><td class="a">1</td><th>2</th></tr><tr><td class="a">&nbsp;</td><th>&nbsp;</th></tr></table>"#
        );

        let cell = cell_by_position(&doc, 0, 0, 1).unwrap();
        let _ = add_row(&mut doc, cell, RowPosition::Above);
        assert_eq!(shape(&doc), vec![2, 2, 2]);
        let first = table_rows(&doc, first_table(&doc))[0];
        assert_eq!(doc.text_content(first), "\u{a0}\u{a0}");
    }

    #[test]
    fn test_add_column_right_of_index() {
        let mut doc = Document::parse(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>",
        );
        let cell = cell_by_position(&doc, 0, 1, 0).unwrap();
        let _ = add_column(&mut doc, cell, ColumnPosition::Right);
        assert_eq!(shape(&doc), vec![3, 3]);
        assert_eq!(
            doc.to_html(),
            "<table><tr><td>a</td><td>&nbsp;</td><td>b</td></tr><tr><td>c</td><td>&nbsp;</td><td>d</td></tr></table>"
        );
    }

    #[test]
    fn test_add_column_appends_to_short_rows() {
        let mut doc =
            Document::parse("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>");
        let cell = cell_by_position(&doc, 0, 0, 1).unwrap();
        let _ = add_column(&mut doc, cell, ColumnPosition::Right);
        assert_eq!(shape(&doc), vec![3, 2]);
        assert_eq!(
            doc.to_html(),
            "<table><tr><td>a</td><td>b</td><td>&nbsp;</td></tr><tr><td>c</td><td>&nbsp;</td></tr></table>"
        );
    }

    #[test]
    fn test_delete_only_row_and_column_refused() {
        let mut doc = Document::parse("<table><tr><td>x</td></tr></table>");
        let cell = cell_by_position(&doc, 0, 0, 0).unwrap();
        assert_eq!(delete_row(&mut doc, cell), EditOutcome::Ignored(IgnoreReason::OnlyRow));
        assert_eq!(
            delete_column(&mut doc, cell),
            EditOutcome::Ignored(IgnoreReason::OnlyColumn)
        );
        assert_eq!(doc.to_html(), "<table><tr><td>x</td></tr></table>");
    }

    #[test]
    fn test_delete_row_and_column() {
        let mut doc = Document::parse(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>",
        );
        let cell = cell_by_position(&doc, 0, 0, 1).unwrap();
        assert!(delete_column(&mut doc, cell).is_applied());
        assert_eq!(shape(&doc), vec![1, 1]);

        let cell = cell_by_position(&doc, 0, 1, 0).unwrap();
        assert!(delete_row(&mut doc, cell).is_applied());
        assert_eq!(doc.to_html(), "<table><tr><td>a</td></tr></table>");
    }

    #[test]
    fn test_nested_table_rows_untouched() {
        let html = "<table><tr><td>outer<table><tr><td>inner</td></tr></table></td><td>b</td></tr></table>";
        let mut doc = Document::parse(html);
        let outer = first_table(&doc);
        assert_eq!(table_rows(&doc, outer).len(), 1);

        let cell = cell_by_position(&doc, 0, 0, 1).unwrap();
        let _ = add_column(&mut doc, cell, ColumnPosition::Left);
        let inner = cell_by_position(&doc, 1, 0, 0).unwrap();
        let inner_row = doc.parent(inner).unwrap();
        assert_eq!(row_cells(&doc, inner_row).len(), 1);
        assert_eq!(row_cells(&doc, table_rows(&doc, outer)[0]).len(), 3);
    }

    #[test]
    fn test_cell_ref_detects_detach_and_replacement() {
        let mut doc = Document::parse("<table><tr><td>a</td></tr><tr><td>b</td></tr></table>");
        let cell = cell_by_position(&doc, 0, 1, 0).unwrap();
        let handle = CellRef::new(&doc, cell).unwrap();
        assert_eq!(handle.resolve(&doc), Ok(cell));

        let _ = delete_row(&mut doc, cell);
        assert_eq!(handle.resolve(&doc), Err(IgnoreReason::CellDetached));

        let other = Document::parse("<table><tr><td>a</td></tr></table>");
        let first = cell_by_position(&other, 0, 0, 0).unwrap();
        let stale = CellRef::new(&doc, cell_by_position(&doc, 0, 0, 0).unwrap()).unwrap();
        assert_eq!(stale.node(), first);
        assert_eq!(stale.resolve(&other), Err(IgnoreReason::CellDetached));
    }

    #[test]
    fn test_cell_at_point() {
        let doc = Document::parse("<p>x</p><table><tr><td><b>in</b></td></tr></table>");
        let text = doc
            .text_nodes(doc.root())
            .into_iter()
            .find(|&t| doc.text(t) == Some("in"))
            .unwrap();
        let cell = cell_at(&doc, &DomPoint::new(text, 1)).unwrap();
        assert!(doc.is_tag(cell, "td"));

        let p_text = doc.text_nodes(doc.root())[0];
        assert!(cell_at(&doc, &DomPoint::new(p_text, 0)).is_none());
    }

    #[test]
    fn test_set_cell_background() {
        let mut doc = Document::parse(r#"<table><tr><td style="padding:6px">x</td></tr></table>"#);
        let cell = cell_by_position(&doc, 0, 0, 0).unwrap();
        let _ = set_cell_background(&mut doc, cell, "#ff0000");
        assert_eq!(
            doc.to_html(),
            r#"<table><tr><td style="padding: 6px; background-color: #ff0000;">x</td></tr></table>"#
        );
    }
}
