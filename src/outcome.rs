//! Results of editor operations

use std::fmt;

/// Why an operation left the document untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The caret is not inside the editing surface
    NoSelection,
    /// An inline command needs a non-empty range
    CollapsedSelection,
    NoCellSelected,
    /// The selected cell was removed or the document replaced
    CellDetached,
    OnlyRow,
    OnlyColumn,
    EmptyUrl,
    InvalidFontSize,
    /// "format block" with a tag outside the toolbar's list
    UnsupportedBlock,
    NothingToUndo,
    NothingToRedo,
    /// The paste payload had neither HTML nor text
    EmptyClipboard,
    /// The command ran but the serialized document did not change
    Unchanged,
}

impl IgnoreReason {
    /// Message shown to the user, for the reasons the toolbar surfaces
    pub fn notice(self) -> Option<&'static str> {
        match self {
            IgnoreReason::NoCellSelected | IgnoreReason::CellDetached => {
                Some("Please select a table cell first")
            }
            IgnoreReason::EmptyUrl => Some("Please enter a link URL"),
            _ => None,
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IgnoreReason::NoSelection => "no selection in the editor",
            IgnoreReason::CollapsedSelection => "selection is collapsed",
            IgnoreReason::NoCellSelected => "no table cell selected",
            IgnoreReason::CellDetached => "selected table cell is no longer in the document",
            IgnoreReason::OnlyRow => "cannot delete the only row",
            IgnoreReason::OnlyColumn => "cannot delete the only column",
            IgnoreReason::EmptyUrl => "link URL is empty",
            IgnoreReason::InvalidFontSize => "font size must be 1 to 7",
            IgnoreReason::UnsupportedBlock => "unsupported block tag",
            IgnoreReason::NothingToUndo => "nothing to undo",
            IgnoreReason::NothingToRedo => "nothing to redo",
            IgnoreReason::EmptyClipboard => "clipboard is empty",
            IgnoreReason::Unchanged => "document unchanged",
        };
        f.write_str(text)
    }
}

/// Whether an operation changed the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum EditOutcome {
    Applied,
    Ignored(IgnoreReason),
}

impl EditOutcome {
    #[inline]
    pub fn is_applied(self) -> bool {
        matches!(self, EditOutcome::Applied)
    }

    pub fn ignore_reason(self) -> Option<IgnoreReason> {
        match self {
            EditOutcome::Applied => None,
            EditOutcome::Ignored(reason) => Some(reason),
        }
    }
}

impl From<IgnoreReason> for EditOutcome {
    fn from(reason: IgnoreReason) -> Self {
        EditOutcome::Ignored(reason)
    }
}
