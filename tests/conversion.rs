//! Plain-text conversion, source view and HTML export

mod common;

use common::{change_count, recording_session, test_model, test_session};
use compose_editor::commands::Cmd;
use compose_editor::convert::{html_to_text, text_to_html};
use compose_editor::export::{export_as_file, html_page, HTML_MIME_TYPE};
use compose_editor::messages::Msg;
use compose_editor::session::ViewMode;
use compose_editor::update::update;

#[test]
fn test_text_projection_of_mail_body() {
    let text = html_to_text(
        "<h1>Hello</h1><p>Line one<br>Line two</p><ul><li>alpha</li><li>beta</li></ul>",
    );
    assert!(text.starts_with("Hello\n\nLine one\nLine two\n"));
    assert!(text.contains("alpha\nbeta"));
    assert!(!text.contains("\n\n\n"));
}

#[test]
fn test_text_to_html_paragraphs() {
    assert_eq!(text_to_html(""), "");
    assert_eq!(
        text_to_html("a & b\r\nstill a\r\n\r\n\r\nnext"),
        "<p>a &amp; b<br>still a</p><p>next</p>"
    );
}

#[test]
fn test_convert_to_text_shows_source() {
    let (mut session, changes) = recording_session("<p>Hi <b>there</b></p><p>Bye</p>");
    assert!(session.convert_to_text().is_applied());
    assert_eq!(session.view_mode(), ViewMode::Source);
    assert_eq!(session.html(), "Hi there\n\nBye");
    assert_eq!(change_count(&changes), 1);

    assert!(session.convert_to_html().is_applied());
    assert_eq!(session.view_mode(), ViewMode::Rich);
    assert_eq!(session.html(), "<p>Hi there</p><p>Bye</p>");

    // Both conversions are undoable
    assert!(session.undo().is_applied());
    assert!(session.undo().is_applied());
    assert_eq!(session.html(), "<p>Hi <b>there</b></p><p>Bye</p>");
}

#[test]
fn test_convert_to_html_from_rich_view_flattens() {
    let mut session = test_session("<h2>Title</h2><p><i>body</i></p>");
    assert!(session.convert_to_html().is_applied());
    assert_eq!(session.html(), "<p>Title</p><p>body</p>");
}

#[test]
fn test_source_edits_apply_on_toggle() {
    let mut session = test_session("<p>rich</p>");
    assert_eq!(session.toggle_source(), ViewMode::Source);
    assert!(session.source_changed("<p>edited <u>source</u></p>").is_applied());
    assert_eq!(session.toggle_source(), ViewMode::Rich);

    session.select_text("source", 0);
    assert!(session.active_state().underline);
}

#[test]
fn test_clear_then_placeholder() {
    let mut model = test_model("<p>draft</p>");
    assert_eq!(model.placeholder(), None);
    update(&mut model, Msg::Clear);
    assert_eq!(model.session.html(), "");
    assert_eq!(model.placeholder(), Some("Write something..."));
}

#[test]
fn test_export_file_contents() {
    let file = export_as_file("<p>x</p>");
    assert_eq!(file.filename, "document.html");
    assert_eq!(file.mime_type, HTML_MIME_TYPE);
    assert_eq!(file.bytes, html_page("<p>x</p>").into_bytes());

    let dir = tempfile::tempdir().unwrap();
    let path = file.write_to_dir(dir.path()).unwrap();
    let written = std::fs::read_to_string(path).unwrap();
    assert!(written.starts_with("<!doctype html>"));
    assert!(written.ends_with("<body><p>x</p></body></html>"));
}

#[test]
fn test_export_message_leaves_document_alone() {
    let mut model = test_model("<p>keep</p>");
    let cmd = update(&mut model, Msg::Export);
    assert!(matches!(cmd, Some(Cmd::SaveFile(_))));
    assert_eq!(model.session.html(), "<p>keep</p>");
    assert!(!model.session.can_undo());
}
