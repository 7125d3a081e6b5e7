//! Update function for the Elm-style architecture
//!
//! All state transformations flow through [`update`].

#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

use crate::commands::Cmd;
use crate::config::EditorConfig;
use crate::export::export_named;
use crate::format::FormatCommand;
use crate::keymap::{parse_key_string, KeyAction};
use crate::messages::{CaretEdge, Msg};
use crate::model::AppModel;
use crate::outcome::EditOutcome;

/// Main update function
///
/// In debug builds, this wraps with tracing instrumentation.
#[inline]
pub fn update(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(model, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(model, msg)
    }
}

/// Run every message in order, batching the resulting commands
pub fn update_all(model: &mut AppModel, msgs: impl IntoIterator<Item = Msg>) -> Option<Cmd> {
    let cmds: Vec<Cmd> = msgs
        .into_iter()
        .filter_map(|msg| update(model, msg))
        .collect();
    match Cmd::batch(cmds) {
        Cmd::None => None,
        cmd => Some(cmd),
    }
}

fn outcome(outcome: EditOutcome) -> Option<Cmd> {
    match Cmd::from(outcome) {
        Cmd::None => None,
        cmd => Some(cmd),
    }
}

fn update_inner(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    let session = &mut model.session;
    match msg {
        Msg::SetDocument { html } => {
            session.set_document(&html);
            None
        }
        Msg::Export => Some(Cmd::SaveFile(export_named(
            session.html(),
            &model.config.export_filename,
        ))),

        Msg::SelectText { text, nth } => {
            if !session.select_text(&text, nth) {
                tracing::warn!("Text {:?} (occurrence {}) not found", text, nth);
            }
            None
        }
        Msg::PlaceCaret { text, nth, edge } => {
            if !session.place_caret(&text, nth, edge == CaretEdge::End) {
                tracing::warn!("Text {:?} (occurrence {}) not found", text, nth);
            }
            None
        }
        Msg::SelectAll => {
            session.select_all();
            None
        }
        Msg::ClearSelection => {
            session.clear_selection();
            None
        }
        Msg::Blur => {
            session.blur();
            None
        }

        Msg::Format(command) => {
            let command = with_font_preset(&model.config, command);
            outcome(session.execute(&command))
        }
        Msg::Paste(payload) => outcome(session.paste(&payload)),
        Msg::Key { key } => handle_key(model, &key),
        Msg::Undo => outcome(session.undo()),
        Msg::Redo => outcome(session.redo()),

        Msg::InsertTable(dialog) => {
            outcome(session.insert_table(&dialog.resolve(&model.config.table)))
        }
        Msg::SelectCell { table, row, col } => {
            if !session.select_cell(table, row, col) {
                tracing::warn!("No cell at table {} row {} column {}", table, row, col);
            }
            None
        }
        Msg::ClearCellSelection => {
            session.clear_cell_selection();
            None
        }
        Msg::AddRow { position } => outcome(session.add_row(position)),
        Msg::AddColumn { position } => outcome(session.add_column(position)),
        Msg::DeleteRow => outcome(session.delete_row()),
        Msg::DeleteColumn => outcome(session.delete_column()),
        Msg::SetCellBackground { color } => outcome(session.set_cell_background(&color)),

        Msg::ToggleSource => {
            session.toggle_source();
            None
        }
        Msg::SourceChanged { html } => outcome(session.source_changed(&html)),
        Msg::ConvertToText => outcome(session.convert_to_text()),
        Msg::ConvertToHtml => outcome(session.convert_to_html()),
        Msg::Clear => outcome(session.clear()),
    }
}

/// A font name matching a toolbar preset label becomes the preset's family
fn with_font_preset(config: &EditorConfig, command: FormatCommand) -> FormatCommand {
    match command {
        FormatCommand::FontName(face) => match config.font_value(face.trim()) {
            Some(family) => FormatCommand::FontName(family.to_string()),
            None => FormatCommand::FontName(face),
        },
        other => other,
    }
}

/// Bound keys run their command; any other key hides the cell tooltip
fn handle_key(model: &mut AppModel, key: &str) -> Option<Cmd> {
    let keystroke = match parse_key_string(key) {
        Ok(keystroke) => keystroke,
        Err(e) => {
            tracing::warn!("Ignoring keystroke: {}", e);
            model.session.clear_cell_selection();
            return None;
        }
    };

    match model.keymap.handle_keystroke(keystroke) {
        KeyAction::Execute(command) => update_all(model, command.to_msgs()),
        KeyAction::NoMatch => {
            model.session.clear_cell_selection();
            None
        }
    }
}

/// Traced update wrapper (debug builds only)
///
/// Logs the message and any movement of the history index.
#[cfg(debug_assertions)]
fn update_traced(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    let msg_name = format!("{:?}", msg);
    let _span = span!(Level::DEBUG, "update", msg = %msg_name).entered();
    debug!(target: "message", msg = %msg_name, "processing");

    let before = model.session.history().index();
    let result = update_inner(model, msg);
    let history = model.session.history();
    if history.index() != before {
        debug!(
            target: "history",
            before,
            after = history.index(),
            len = history.len(),
            "history moved"
        );
    }
    debug_assert!(history.index() < history.len());

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::format::FormatCommand;
    use crate::keymap::{default_bindings, Keymap};

    fn model(html: &str) -> AppModel {
        let mut model =
            AppModel::with_keymap(EditorConfig::default(), Keymap::with_bindings(default_bindings()));
        model.session.set_document(html);
        model
    }

    #[test]
    fn test_keys_drive_history() {
        let mut model = model("<p>A</p>");
        update(&mut model, Msg::SelectText { text: "A".into(), nth: 0 });
        update(&mut model, Msg::Key { key: "ctrl+b".into() });
        assert_eq!(model.session.html(), "<p><b>A</b></p>");
        update(&mut model, Msg::Key { key: "ctrl+z".into() });
        assert_eq!(model.session.html(), "<p>A</p>");
        update(&mut model, Msg::Key { key: "ctrl+y".into() });
        assert_eq!(model.session.html(), "<p><b>A</b></p>");
        update(&mut model, Msg::Key { key: "ctrl+shift+z".into() });
        assert_eq!(model.session.html(), "<p><b>A</b></p>");
        update(&mut model, Msg::Undo);
        update(&mut model, Msg::Key { key: "ctrl+r".into() });
        assert_eq!(model.session.html(), "<p><b>A</b></p>");
    }

    #[test]
    fn test_other_key_hides_cell_tooltip() {
        let mut model = model("<table><tr><td>a</td></tr></table>");
        update(&mut model, Msg::SelectCell { table: 0, row: 0, col: 0 });
        assert!(model.session.selected_cell().is_some());
        update(&mut model, Msg::Key { key: "x".into() });
        assert!(model.session.selected_cell().is_none());
    }

    #[test]
    fn test_notices() {
        let mut model = model("<p>A</p>");
        let cmd = update(&mut model, Msg::DeleteRow).unwrap();
        assert_eq!(cmd.notices()[0].message, "Please select a table cell first");

        update(&mut model, Msg::SelectText { text: "A".into(), nth: 0 });
        let cmd = update(&mut model, Msg::Format(FormatCommand::CreateLink(String::new())));
        assert_eq!(cmd.unwrap().notices()[0].message, "Please enter a link URL");
    }

    #[test]
    fn test_export_uses_configured_name() {
        let mut model = model("<p>A</p>");
        model.config.export_filename = "mail.html".into();
        match update(&mut model, Msg::Export) {
            Some(Cmd::SaveFile(file)) => {
                assert_eq!(file.filename, "mail.html");
                assert!(String::from_utf8(file.bytes).unwrap().contains("<body><p>A</p></body>"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
