//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use compose_editor::config::EditorConfig;
use compose_editor::keymap::{default_bindings, Keymap};
use compose_editor::model::AppModel;
use compose_editor::session::EditorSession;

/// Every HTML string the change listener has been called with
pub type Changes = Arc<Mutex<Vec<String>>>;

/// Create a session holding `html` with nothing selected
pub fn test_session(html: &str) -> EditorSession {
    let mut session = EditorSession::new();
    session.set_document(html);
    session
}

/// Create a session whose change notifications are recorded
pub fn recording_session(html: &str) -> (EditorSession, Changes) {
    let mut session = test_session(html);
    let changes = Changes::default();
    let sink = Arc::clone(&changes);
    session.set_change_listener(move |html| sink.lock().unwrap().push(html.to_string()));
    (session, changes)
}

/// Create a model with default config and hardcoded keybindings, so user
/// keymap files on the test machine do not leak in
pub fn test_model(html: &str) -> AppModel {
    let mut model = AppModel::with_keymap(
        EditorConfig::default(),
        Keymap::with_bindings(default_bindings()),
    );
    model.session.set_document(html);
    model
}

/// Number of committed changes seen so far
pub fn change_count(changes: &Changes) -> usize {
    changes.lock().unwrap().len()
}

pub fn last_change(changes: &Changes) -> Option<String> {
    changes.lock().unwrap().last().cloned()
}

/// Rows of the first table, as cell counts per row
pub fn row_shape(html: &str) -> Vec<usize> {
    html.split("<tr")
        .skip(1)
        .map(|row| {
            let row = row.split("</tr>").next().unwrap_or("");
            row.matches("<td").count() + row.matches("<th").count()
        })
        .collect()
}
