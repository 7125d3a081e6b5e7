//! Command enum representing the editor actions that can be bound to keys
//!
//! Commands are the bridge between keybindings and the message system.
//! Each command maps to one or more `Msg` values for the update loop.

use std::str::FromStr;

use crate::format::FormatCommand;
use crate::messages::Msg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // History
    Undo,
    Redo,

    // Inline formatting
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    RemoveFormat,
    Unlink,

    // Lists and alignment
    InsertUnorderedList,
    InsertOrderedList,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    JustifyFull,

    // Selection
    SelectAll,
    ClearCellSelection,

    // Views and output
    ToggleSource,
    ConvertToText,
    ConvertToHtml,
    Export,

    /// Removes a default binding when used in a user keymap
    Unbound,
}

impl Command {
    /// Messages to dispatch for this command
    pub fn to_msgs(self) -> Vec<Msg> {
        use Command::*;

        let format = |command: FormatCommand| vec![Msg::Format(command)];
        match self {
            Undo => vec![Msg::Undo],
            Redo => vec![Msg::Redo],

            Bold => format(FormatCommand::Bold),
            Italic => format(FormatCommand::Italic),
            Underline => format(FormatCommand::Underline),
            StrikeThrough => format(FormatCommand::StrikeThrough),
            RemoveFormat => format(FormatCommand::RemoveFormat),
            Unlink => format(FormatCommand::Unlink),

            InsertUnorderedList => format(FormatCommand::InsertUnorderedList),
            InsertOrderedList => format(FormatCommand::InsertOrderedList),
            JustifyLeft => format(FormatCommand::JustifyLeft),
            JustifyCenter => format(FormatCommand::JustifyCenter),
            JustifyRight => format(FormatCommand::JustifyRight),
            JustifyFull => format(FormatCommand::JustifyFull),

            SelectAll => vec![Msg::SelectAll],
            ClearCellSelection => vec![Msg::ClearCellSelection],

            ToggleSource => vec![Msg::ToggleSource],
            ConvertToText => vec![Msg::ConvertToText],
            ConvertToHtml => vec![Msg::ConvertToHtml],
            Export => vec![Msg::Export],

            Unbound => vec![],
        }
    }

    /// Human-readable name for menus and tooltips
    pub fn display_name(self) -> &'static str {
        match self {
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::Bold => "Bold",
            Command::Italic => "Italic",
            Command::Underline => "Underline",
            Command::StrikeThrough => "Strikethrough",
            Command::RemoveFormat => "Clear Formatting",
            Command::Unlink => "Remove Link",
            Command::InsertUnorderedList => "Bullet List",
            Command::InsertOrderedList => "Numbered List",
            Command::JustifyLeft => "Align Left",
            Command::JustifyCenter => "Align Center",
            Command::JustifyRight => "Align Right",
            Command::JustifyFull => "Justify",
            Command::SelectAll => "Select All",
            Command::ClearCellSelection => "Hide Table Tools",
            Command::ToggleSource => "Toggle HTML Source",
            Command::ConvertToText => "Convert to Plain Text",
            Command::ConvertToHtml => "Convert to HTML",
            Command::Export => "Download as HTML",
            Command::Unbound => "Unbound",
        }
    }
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Undo" => Ok(Command::Undo),
            "Redo" => Ok(Command::Redo),
            "Bold" => Ok(Command::Bold),
            "Italic" => Ok(Command::Italic),
            "Underline" => Ok(Command::Underline),
            "StrikeThrough" => Ok(Command::StrikeThrough),
            "RemoveFormat" => Ok(Command::RemoveFormat),
            "Unlink" => Ok(Command::Unlink),
            "InsertUnorderedList" => Ok(Command::InsertUnorderedList),
            "InsertOrderedList" => Ok(Command::InsertOrderedList),
            "JustifyLeft" => Ok(Command::JustifyLeft),
            "JustifyCenter" => Ok(Command::JustifyCenter),
            "JustifyRight" => Ok(Command::JustifyRight),
            "JustifyFull" => Ok(Command::JustifyFull),
            "SelectAll" => Ok(Command::SelectAll),
            "ClearCellSelection" => Ok(Command::ClearCellSelection),
            "ToggleSource" => Ok(Command::ToggleSource),
            "ConvertToText" => Ok(Command::ConvertToText),
            "ConvertToHtml" => Ok(Command::ConvertToHtml),
            "Export" => Ok(Command::Export),
            "Unbound" => Ok(Command::Unbound),
            _ => Err(()),
        }
    }
}
