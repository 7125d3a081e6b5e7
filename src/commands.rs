//! Command types for the Elm-style architecture
//!
//! Commands represent side effects the host performs after an update.

use crate::export::ExportedFile;
use crate::outcome::{EditOutcome, IgnoreReason};

/// User-facing guidance for a refused operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub reason: IgnoreReason,
    pub message: &'static str,
}

impl Notice {
    /// A notice for outcomes the toolbar surfaces; other refusals stay silent
    pub fn for_outcome(outcome: EditOutcome) -> Option<Self> {
        let reason = outcome.ignore_reason()?;
        reason.notice().map(|message| Self { reason, message })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Show a message to the user
    Notify(Notice),
    /// Hand a file to the host to save
    SaveFile(ExportedFile),
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands, flattening away `None`
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Cmd::None)
    }

    /// Notices carried by this command, batches included
    pub fn notices(&self) -> Vec<&Notice> {
        match self {
            Cmd::Notify(notice) => vec![notice],
            Cmd::Batch(cmds) => cmds.iter().flat_map(|c| c.notices()).collect(),
            Cmd::None | Cmd::SaveFile(_) => Vec::new(),
        }
    }
}

impl From<EditOutcome> for Cmd {
    fn from(outcome: EditOutcome) -> Self {
        Notice::for_outcome(outcome).map_or(Cmd::None, Cmd::Notify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_to_cmd() {
        assert_eq!(Cmd::from(EditOutcome::Applied), Cmd::None);
        assert_eq!(
            Cmd::from(EditOutcome::Ignored(IgnoreReason::OnlyRow)),
            Cmd::None
        );
        let cmd = Cmd::from(EditOutcome::Ignored(IgnoreReason::CellDetached));
        assert_eq!(
            cmd.notices()[0].message,
            "Please select a table cell first"
        );
    }

    #[test]
    fn test_batch_flattens() {
        assert_eq!(Cmd::batch(vec![Cmd::None, Cmd::None]), Cmd::None);
        let notice = Cmd::from(EditOutcome::Ignored(IgnoreReason::EmptyUrl));
        assert_eq!(Cmd::batch(vec![Cmd::None, notice.clone()]), notice);
        let both = Cmd::batch(vec![notice.clone(), notice]);
        assert_eq!(both.notices().len(), 2);
    }
}
