//! Integration tests for the keymap system

use super::*;

#[test]
fn test_embedded_yaml_parses() {
    let bindings = parse_keymap_yaml(get_default_keymap_yaml())
        .expect("Embedded keymap.yaml should parse successfully");

    assert!(!bindings.is_empty(), "Should have bindings");
    assert!(bindings.iter().any(|b| b.command == Command::Undo));
    assert!(bindings.iter().any(|b| b.command == Command::Redo));
    assert!(bindings.iter().any(|b| b.command == Command::Bold));
}

#[test]
fn test_embedded_yaml_matches_hardcoded_defaults() {
    let embedded = parse_keymap_yaml(get_default_keymap_yaml()).unwrap();
    assert_eq!(embedded, default_bindings());
}

#[test]
fn test_redo_has_three_bindings() {
    let keymap = Keymap::with_bindings(default_bindings());

    for key in ["ctrl+y", "ctrl+shift+z", "ctrl+r"] {
        let stroke = parse_key_string(key).unwrap();
        assert_eq!(keymap.lookup(&stroke), Some(Command::Redo), "{}", key);
    }
}

#[test]
fn test_undo_is_ctrl_z_only() {
    let keymap = Keymap::with_bindings(default_bindings());

    let undo = Keystroke::new(KeyCode::Char('z'), Modifiers::CTRL);
    assert_eq!(keymap.lookup(&undo), Some(Command::Undo));

    let plain = Keystroke::key(KeyCode::Char('z'));
    assert_eq!(keymap.lookup(&plain), None);
}

#[test]
fn test_parsed_key_dispatches_messages() {
    let mut keymap = Keymap::with_bindings(default_bindings());
    let stroke = parse_key_string("Ctrl+I").unwrap();

    match keymap.handle_keystroke(stroke) {
        KeyAction::Execute(command) => {
            assert_eq!(command, Command::Italic);
            assert_eq!(command.to_msgs().len(), 1);
        }
        KeyAction::NoMatch => panic!("ctrl+i should be bound"),
    }
}

#[test]
fn test_user_override_unbinds_redo_alias() {
    let user = parse_keymap_yaml(
        r#"
bindings:
  - key: "ctrl+r"
    command: Unbound
  - key: "ctrl+k"
    command: Unlink
"#,
    )
    .unwrap();

    let keymap = Keymap::with_bindings(merge_bindings(default_bindings(), user));
    assert_eq!(keymap.lookup(&parse_key_string("ctrl+r").unwrap()), None);
    assert_eq!(
        keymap.lookup(&parse_key_string("ctrl+k").unwrap()),
        Some(Command::Unlink)
    );
    assert_eq!(
        keymap.lookup(&parse_key_string("ctrl+y").unwrap()),
        Some(Command::Redo)
    );
}
