//! Message types for the Elm-style architecture
//!
//! Every state change of the editor flows through [`Msg`]. Messages are
//! serde-tagged by `cmd` so scripts can be written as plain YAML:
//!
//! ```yaml
//! - cmd: select_text
//!   text: Hello
//! - cmd: format
//!   name: bold
//! - cmd: undo
//! ```

use serde::{Deserialize, Serialize};

use crate::format::FormatCommand;
use crate::sanitize::PastePayload;
use crate::table::{ColumnPosition, RowPosition, TableDialog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Msg {
    // === Host ===
    /// Replace the content and reset history
    SetDocument { html: String },
    /// Save the document as a standalone HTML file
    Export,

    // === Selection ===
    /// Select the `nth` occurrence of `text`
    SelectText {
        text: String,
        #[serde(default)]
        nth: usize,
    },
    /// Collapsed caret at the start or end of the `nth` occurrence of `text`
    PlaceCaret {
        text: String,
        #[serde(default)]
        nth: usize,
        #[serde(default)]
        edge: CaretEdge,
    },
    SelectAll,
    /// Move the caret out of the editing surface
    ClearSelection,
    Blur,

    // === Commands ===
    Format(FormatCommand),
    Paste(PastePayload),
    /// A keystroke such as `ctrl+shift+z`
    Key { key: String },
    Undo,
    Redo,

    // === Tables ===
    InsertTable(TableDialog),
    /// Select a cell by position, like clicking into it
    SelectCell {
        #[serde(default)]
        table: usize,
        row: usize,
        col: usize,
    },
    ClearCellSelection,
    AddRow { position: RowPosition },
    AddColumn { position: ColumnPosition },
    DeleteRow,
    DeleteColumn,
    SetCellBackground { color: String },

    // === Source view ===
    ToggleSource,
    SourceChanged { html: String },
    ConvertToText,
    ConvertToHtml,
    Clear,
}

/// Which end of a text match a placed caret sits at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaretEdge {
    Start,
    #[default]
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_yaml_parses() {
        let yaml = r##"
- cmd: set_document
  html: "<p>Hi</p>"
- cmd: select_text
  text: Hi
- cmd: format
  name: bold
- cmd: format
  name: font_size
  value: 5
- cmd: place_caret
  text: Hi
  edge: start
- cmd: insert_table
  rows: 3
- cmd: select_cell
  row: 1
  col: 0
- cmd: add_row
  position: below
- cmd: paste
  text: plain
- cmd: key
  key: ctrl+z
- cmd: undo
"##;
        let msgs: Vec<Msg> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(msgs.len(), 11);
        assert_eq!(msgs[2], Msg::Format(FormatCommand::Bold));
        assert_eq!(msgs[3], Msg::Format(FormatCommand::FontSize(5)));
        assert_eq!(
            msgs[4],
            Msg::PlaceCaret {
                text: "Hi".into(),
                nth: 0,
                edge: CaretEdge::Start
            }
        );
        match &msgs[5] {
            Msg::InsertTable(dialog) => {
                assert_eq!(dialog.rows, Some(3));
                assert_eq!(dialog.cols, None);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            msgs[6],
            Msg::SelectCell {
                table: 0,
                row: 1,
                col: 0
            }
        );
        assert_eq!(
            msgs[7],
            Msg::AddRow {
                position: RowPosition::Below
            }
        );
        assert_eq!(msgs[8], Msg::Paste(PastePayload::text("plain")));
        assert_eq!(msgs[10], Msg::Undo);
    }
}
