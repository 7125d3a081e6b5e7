//! Configurable keyboard mapping system
//!
//! Maps keystrokes to editor commands and lets users customize them via
//! YAML config files.
//!
//! # Architecture
//!
//! ```text
//! "ctrl+b" → Keystroke → Keymap::handle_keystroke() → Command → Vec<Msg>
//! ```
//!
//! # Loading Keymaps
//!
//! ```ignore
//! // Hardcoded defaults
//! let keymap = Keymap::with_bindings(default_bindings());
//!
//! // Embedded keymap.yaml merged with the user's overrides
//! let keymap = Keymap::with_bindings(load_default_keymap());
//! ```

mod binding;
mod command;
mod config;
mod defaults;
#[allow(clippy::module_inception)]
mod keymap;
mod types;

pub use binding::Keybinding;
pub use command::Command;
pub use config::{load_keymap_file, parse_key_string, parse_keymap_yaml, KeymapError};
pub use defaults::{
    default_bindings, get_default_keymap_yaml, load_default_keymap, merge_bindings,
};
pub use keymap::{KeyAction, Keymap};
pub use types::{KeyCode, Keystroke, Modifiers};

#[cfg(test)]
mod tests;
