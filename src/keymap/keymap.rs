//! Keymap struct for storing and looking up keybindings

use std::collections::HashMap;

use super::binding::Keybinding;
use super::command::Command;
use super::types::Keystroke;

/// Result of handling a keystroke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Execute this command
    Execute(Command),
    /// No binding matches this keystroke
    NoMatch,
}

/// The keymap stores all keybindings and handles lookup
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: Vec<Keybinding>,
    /// Index into `bindings` by keystroke; later bindings win
    lookup: HashMap<Keystroke, usize>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: Vec<Keybinding>) -> Self {
        let mut keymap = Self::new();
        for binding in bindings {
            keymap.add_binding(binding);
        }
        keymap
    }

    /// Add a binding, shadowing any earlier binding for the same keystroke
    pub fn add_binding(&mut self, binding: Keybinding) {
        let idx = self.bindings.len();
        self.lookup.insert(binding.keystroke, idx);
        self.bindings.push(binding);
    }

    pub fn lookup(&self, keystroke: &Keystroke) -> Option<Command> {
        self.lookup
            .get(keystroke)
            .map(|&idx| self.bindings[idx].command)
            .filter(|command| *command != Command::Unbound)
    }

    /// Handle a keystroke and return the action to take
    pub fn handle_keystroke(&mut self, keystroke: Keystroke) -> KeyAction {
        match self.lookup(&keystroke) {
            Some(command) => {
                tracing::trace!("{} -> {:?}", keystroke, command);
                KeyAction::Execute(command)
            }
            None => KeyAction::NoMatch,
        }
    }

    pub fn bindings(&self) -> &[Keybinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Active binding for a command, for display in menus and tooltips
    pub fn binding_for(&self, command: Command) -> Option<&Keybinding> {
        self.bindings
            .iter()
            .enumerate()
            .find(|(idx, b)| b.command == command && self.lookup.get(&b.keystroke) == Some(idx))
            .map(|(_, b)| b)
    }
}
