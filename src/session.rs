//! The rich text editing session: document, history, selection and the
//! commit pipeline that reports every change to the host

use tracing::debug;

use crate::convert::{document_to_text, escape_html, text_to_html, unescape_html};
use crate::dom::{Document, NodeId};
use crate::format::{self, FormatCommand};
use crate::history::{History, DEFAULT_MAX_SIZE};
use crate::outcome::{EditOutcome, IgnoreReason};
use crate::sanitize::{paste_markup, PastePayload};
use crate::selection::{find_text, select_all, DomPoint, Selection};
use crate::state::{derive_state, ActiveFormatState};
use crate::table::{self, CellRef, ColumnPosition, RowPosition, TableSpec};

/// Called with the new HTML after every committed change
pub type ChangeListener = Box<dyn FnMut(&str) + Send>;

/// Which surface is showing: the rendered document or its markup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Rich,
    Source,
}

pub struct EditorSession {
    doc: Document,
    /// Last committed markup. In source view this is the raw source text.
    html: String,
    history: History,
    selection: Option<Selection>,
    selected_cell: Option<CellRef>,
    state: ActiveFormatState,
    view_mode: ViewMode,
    has_focus: bool,
    listener: Option<ChangeListener>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("html", &self.html)
            .field("history_index", &self.history.index())
            .field("history_len", &self.history.len())
            .field("selection", &self.selection)
            .field("selected_cell", &self.selected_cell)
            .field("view_mode", &self.view_mode)
            .field("has_focus", &self.has_focus)
            .finish()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_MAX_SIZE)
    }

    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            doc: Document::new(),
            html: String::new(),
            history: History::with_max_size(limit),
            selection: None,
            selected_cell: None,
            state: ActiveFormatState::default(),
            view_mode: ViewMode::Rich,
            has_focus: false,
            listener: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn active_state(&self) -> &ActiveFormatState {
        &self.state
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// The selected cell, if it still resolves against the live document
    pub fn selected_cell(&self) -> Option<NodeId> {
        self.selected_cell.and_then(|c| c.resolve(&self.doc).ok())
    }

    /// Plain-text projection of the current document
    pub fn text(&self) -> String {
        document_to_text(&self.doc)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ------------------------------------------------------------------
    // Host boundary
    // ------------------------------------------------------------------

    pub fn set_change_listener(&mut self, listener: impl FnMut(&str) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_change_listener(&mut self) {
        self.listener = None;
    }

    /// Replace the content wholesale, e.g. when loading a draft. History is
    /// reset to this document and the listener is not called.
    pub fn set_document(&mut self, html: &str) {
        self.doc = Document::parse(html);
        self.html = html.to_string();
        self.history.reset(html);
        self.selection = None;
        self.selected_cell = None;
        self.refresh_state();
        debug!(len = html.len(), "Document replaced");
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.history.set_max_size(limit);
    }

    // ------------------------------------------------------------------
    // Selection and focus
    // ------------------------------------------------------------------

    /// Move the selection. Points outside the document leave the caret
    /// outside the editing surface.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.and_then(|s| s.clamped(&self.doc));
        if self.selection.is_some() {
            self.has_focus = true;
        }
        self.refresh_state();
    }

    /// Select the `nth` occurrence of `needle`. Returns false when absent.
    pub fn select_text(&mut self, needle: &str, nth: usize) -> bool {
        let found = find_text(&self.doc, needle, nth);
        let hit = found.is_some();
        if hit {
            self.set_selection(found);
        }
        hit
    }

    /// Place a collapsed caret before or after the `nth` occurrence of `needle`
    pub fn place_caret(&mut self, needle: &str, nth: usize, after: bool) -> bool {
        let Some(found) = find_text(&self.doc, needle, nth) else {
            return false;
        };
        let (start, end) = found.ordered(&self.doc);
        self.set_selection(Some(Selection::caret(if after { end } else { start })));
        true
    }

    pub fn select_all(&mut self) {
        let all = select_all(&self.doc);
        self.set_selection(Some(all));
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    /// Focus left the editing surface
    pub fn blur(&mut self) {
        self.has_focus = false;
        self.selected_cell = None;
    }

    // ------------------------------------------------------------------
    // Format commands
    // ------------------------------------------------------------------

    pub fn execute(&mut self, command: &FormatCommand) -> EditOutcome {
        self.has_focus = true;
        let outcome = format::execute(&mut self.doc, &mut self.selection, command);
        let outcome = self.finish(outcome);
        debug!(?command, ?outcome, "Executed format command");
        outcome
    }

    /// Insert sanitized clipboard content at the caret
    pub fn paste(&mut self, payload: &PastePayload) -> EditOutcome {
        let Some(markup) = paste_markup(payload) else {
            debug!("Paste ignored: clipboard empty");
            return IgnoreReason::EmptyClipboard.into();
        };
        self.execute(&FormatCommand::InsertHtml(markup))
    }

    // ------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------

    pub fn insert_table(&mut self, spec: &TableSpec) -> EditOutcome {
        self.has_focus = true;
        let outcome = table::insert_table(&mut self.doc, &mut self.selection, spec);
        self.finish(outcome)
    }

    /// Select the cell under `point`, as a click inside a table does
    pub fn select_cell_at(&mut self, point: &DomPoint) -> bool {
        let cell = table::cell_at(&self.doc, point).and_then(|c| CellRef::new(&self.doc, c));
        self.selected_cell = cell;
        cell.is_some()
    }

    /// Select a cell by position: the `table`-th table, then row and column
    pub fn select_cell(&mut self, table: usize, row: usize, col: usize) -> bool {
        let cell = table::cell_by_position(&self.doc, table, row, col)
            .and_then(|c| CellRef::new(&self.doc, c));
        self.selected_cell = cell;
        cell.is_some()
    }

    /// Hide the cell tooltip
    pub fn clear_cell_selection(&mut self) {
        self.selected_cell = None;
    }

    pub fn add_row(&mut self, position: RowPosition) -> EditOutcome {
        self.edit_selected_cell(|doc, cell| table::add_row(doc, cell, position))
    }

    pub fn add_column(&mut self, position: ColumnPosition) -> EditOutcome {
        self.edit_selected_cell(|doc, cell| table::add_column(doc, cell, position))
    }

    pub fn delete_row(&mut self) -> EditOutcome {
        self.edit_selected_cell(table::delete_row)
    }

    pub fn delete_column(&mut self) -> EditOutcome {
        self.edit_selected_cell(table::delete_column)
    }

    /// Set the background of the cell holding the caret, or of the
    /// selected cell when the caret is elsewhere
    pub fn set_cell_background(&mut self, color: &str) -> EditOutcome {
        let at_caret = self
            .selection
            .as_ref()
            .and_then(|s| table::cell_at(&self.doc, &s.focus));
        let cell = match at_caret {
            Some(cell) => cell,
            None => match self.resolve_selected_cell() {
                Ok(cell) => cell,
                Err(reason) => return reason.into(),
            },
        };
        self.has_focus = true;
        let outcome = table::set_cell_background(&mut self.doc, cell, color);
        self.finish(outcome)
    }

    fn resolve_selected_cell(&mut self) -> Result<NodeId, IgnoreReason> {
        let cell = self.selected_cell.ok_or(IgnoreReason::NoCellSelected)?;
        cell.resolve(&self.doc).inspect_err(|_| {
            self.selected_cell = None;
        })
    }

    fn edit_selected_cell(
        &mut self,
        edit: impl FnOnce(&mut Document, NodeId) -> EditOutcome,
    ) -> EditOutcome {
        let cell = match self.resolve_selected_cell() {
            Ok(cell) => cell,
            Err(reason) => {
                debug!(%reason, "Table edit ignored");
                return reason.into();
            }
        };
        let outcome = edit(&mut self.doc, cell);
        self.selected_cell = None;
        self.selection = self.selection.and_then(|s| s.clamped(&self.doc));
        self.finish(outcome)
    }

    // ------------------------------------------------------------------
    // Source view and text conversion
    // ------------------------------------------------------------------

    /// Flip between rich and source view. Leaving source view re-renders
    /// the document from the source text.
    pub fn toggle_source(&mut self) -> ViewMode {
        self.view_mode = match self.view_mode {
            ViewMode::Rich => ViewMode::Source,
            ViewMode::Source => {
                self.doc = Document::parse(&self.html);
                self.selection = None;
                self.selected_cell = None;
                self.refresh_state();
                ViewMode::Rich
            }
        };
        self.view_mode
    }

    /// The source text was edited by hand
    pub fn source_changed(&mut self, source: &str) -> EditOutcome {
        self.replace_content(source.to_string())
    }

    /// Replace the document with its escaped plain-text projection and show
    /// the source view
    pub fn convert_to_text(&mut self) -> EditOutcome {
        let text = document_to_text(&self.doc);
        self.view_mode = ViewMode::Source;
        self.replace_content(escape_html(&text))
    }

    /// Rebuild paragraph markup from the plain text and show the rich view
    pub fn convert_to_html(&mut self) -> EditOutcome {
        let text = match self.view_mode {
            ViewMode::Source => unescape_html(&self.html),
            ViewMode::Rich => document_to_text(&self.doc),
        };
        self.view_mode = ViewMode::Rich;
        self.replace_content(text_to_html(&text))
    }

    pub fn clear(&mut self) -> EditOutcome {
        self.replace_content(String::new())
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> EditOutcome {
        match self.history.undo().map(str::to_owned) {
            Some(snapshot) => self.restore(snapshot),
            None => IgnoreReason::NothingToUndo.into(),
        }
    }

    pub fn redo(&mut self) -> EditOutcome {
        match self.history.redo().map(str::to_owned) {
            Some(snapshot) => self.restore(snapshot),
            None => IgnoreReason::NothingToRedo.into(),
        }
    }

    fn restore(&mut self, snapshot: String) -> EditOutcome {
        self.doc = Document::parse(&snapshot);
        self.html = snapshot;
        self.selection = None;
        self.selected_cell = None;
        self.refresh_state();
        self.notify();
        debug!(index = self.history.index(), "Restored history snapshot");
        EditOutcome::Applied
    }

    // ------------------------------------------------------------------
    // Commit pipeline
    // ------------------------------------------------------------------

    /// Serialize the live tree and record it. Returns whether the markup
    /// changed; only then are history and the listener touched.
    pub fn commit(&mut self) -> bool {
        let html = self.doc.to_html();
        if html == self.html {
            return false;
        }
        self.html = html;
        self.history.push(self.html.clone());
        self.notify();
        true
    }

    fn finish(&mut self, outcome: EditOutcome) -> EditOutcome {
        let outcome = match outcome {
            EditOutcome::Applied if !self.commit() => IgnoreReason::Unchanged.into(),
            other => other,
        };
        self.refresh_state();
        outcome
    }

    fn replace_content(&mut self, html: String) -> EditOutcome {
        self.doc = Document::parse(&html);
        self.selection = None;
        self.selected_cell = None;
        self.refresh_state();
        if html == self.html {
            return IgnoreReason::Unchanged.into();
        }
        self.html = html;
        self.history.push(self.html.clone());
        self.notify();
        EditOutcome::Applied
    }

    fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.html);
        }
    }

    fn refresh_state(&mut self) {
        self.state = derive_state(&self.doc, self.selection.as_ref());
    }
}
