//! Default keybindings for the editor
//!
//! The shipped bindings live in keymap.yaml at the project root and are
//! embedded at compile time. A hardcoded copy covers a broken embed.

use super::binding::Keybinding;
use super::command::Command;
use super::config::{load_keymap_file, parse_keymap_yaml};
use super::types::{KeyCode, Keystroke, Modifiers};
use crate::config_paths;

/// Default keymap YAML embedded at compile time
const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

pub fn get_default_keymap_yaml() -> &'static str {
    DEFAULT_KEYMAP_YAML
}

/// Load and merge keymaps: embedded defaults, then the user's keymap.yaml
///
/// User bindings with `command: Unbound` remove the matching default.
pub fn load_default_keymap() -> Vec<Keybinding> {
    let mut bindings = match parse_keymap_yaml(DEFAULT_KEYMAP_YAML) {
        Ok(b) => {
            tracing::info!("Loaded embedded default keymap ({} bindings)", b.len());
            b
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded keymap: {}, using hardcoded defaults",
                e
            );
            default_bindings()
        }
    };

    if let Some(user_path) = config_paths::keymap_file() {
        if user_path.exists() {
            match load_keymap_file(&user_path) {
                Ok(user_bindings) => {
                    tracing::info!(
                        "Merging user keymap from {} ({} bindings)",
                        user_path.display(),
                        user_bindings.len()
                    );
                    bindings = merge_bindings(bindings, user_bindings);
                }
                Err(e) => {
                    tracing::warn!("Failed to load user keymap from {}: {}", user_path.display(), e);
                }
            }
        }
    }

    bindings
}

/// Merge user bindings into base bindings
///
/// A user binding replaces the base binding for the same keystroke.
/// `Unbound` removes it instead.
pub fn merge_bindings(base: Vec<Keybinding>, user: Vec<Keybinding>) -> Vec<Keybinding> {
    let mut result = base;

    for user_binding in user {
        if user_binding.command == Command::Unbound {
            result.retain(|b| b.keystroke != user_binding.keystroke);
            continue;
        }

        match result
            .iter()
            .position(|b| b.keystroke == user_binding.keystroke)
        {
            Some(idx) => result[idx] = user_binding,
            None => result.push(user_binding),
        }
    }

    result
}

/// Hardcoded bindings matching the embedded keymap.yaml
pub fn default_bindings() -> Vec<Keybinding> {
    let ctrl = Modifiers::CTRL;
    let ctrl_shift = Modifiers::CTRL | Modifiers::SHIFT;

    vec![
        // History
        Keybinding::new(Keystroke::char_with_mods('z', ctrl), Command::Undo),
        Keybinding::new(Keystroke::char_with_mods('y', ctrl), Command::Redo),
        Keybinding::new(Keystroke::char_with_mods('z', ctrl_shift), Command::Redo),
        Keybinding::new(Keystroke::char_with_mods('r', ctrl), Command::Redo),
        // Inline formatting
        Keybinding::new(Keystroke::char_with_mods('b', ctrl), Command::Bold),
        Keybinding::new(Keystroke::char_with_mods('i', ctrl), Command::Italic),
        Keybinding::new(Keystroke::char_with_mods('u', ctrl), Command::Underline),
        // Selection
        Keybinding::new(Keystroke::char_with_mods('a', ctrl), Command::SelectAll),
        Keybinding::new(Keystroke::key(KeyCode::Escape), Command::ClearCellSelection),
    ]
}
