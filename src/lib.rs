//! Compose Editor - headless rich-text editing for HTML email bodies
//!
//! The editing surface is an arena DOM with explicit selections. Format
//! commands, paste sanitization, table editing and a bounded undo history
//! all operate on it. Hosts drive it either directly through
//! [`EditorSession`] or through the Elm-style [`Msg`] / [`update`] loop.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod convert;
pub mod dom;
pub mod export;
pub mod format;
pub mod history;
pub mod keymap;
pub mod messages;
pub mod model;
pub mod outcome;
pub mod sanitize;
pub mod selection;
pub mod session;
pub mod state;
pub mod table;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::EditorConfig;
pub use format::FormatCommand;
pub use messages::Msg;
pub use model::AppModel;
pub use outcome::{EditOutcome, IgnoreReason};
pub use session::EditorSession;
pub use update::update;
