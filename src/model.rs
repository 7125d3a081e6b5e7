//! Application model - the complete state behind the update loop

use crate::config::EditorConfig;
use crate::keymap::{load_default_keymap, Keymap};
use crate::session::EditorSession;

/// Session plus the configuration and key bindings that drive it
#[derive(Debug)]
pub struct AppModel {
    pub session: EditorSession,
    pub keymap: Keymap,
    /// Persisted editor configuration
    pub config: EditorConfig,
}

impl AppModel {
    /// Model with the given config and the default keymap merged with the
    /// user's overrides
    pub fn new(config: EditorConfig) -> Self {
        Self::with_keymap(config, Keymap::with_bindings(load_default_keymap()))
    }

    pub fn with_keymap(config: EditorConfig, keymap: Keymap) -> Self {
        Self {
            session: EditorSession::with_history_limit(config.history_limit),
            keymap,
            config,
        }
    }

    /// What the empty editor shows, `None` once there is content
    pub fn placeholder(&self) -> Option<&str> {
        self.session
            .document()
            .is_visually_empty(self.session.document().root())
            .then_some(self.config.placeholder.as_str())
    }
}
