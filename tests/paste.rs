//! Clipboard paste: sanitization of office markup and the plain-text path

mod common;

use common::{change_count, recording_session, test_session};
use compose_editor::dom::MAX_NESTING_DEPTH;
use compose_editor::sanitize::{sanitize, PastePayload};
use compose_editor::{EditOutcome, IgnoreReason};

const WORD_CLIPBOARD: &str = concat!(
    "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\">",
    "<head><meta name=Generator content=\"Microsoft Word 15\">",
    "<style><!-- p.MsoNormal {margin:0cm;} --></style></head>",
    "<body lang=EN-US>",
    "<!--StartFragment-->",
    "<p class=MsoNormal style='mso-margin-top-alt:auto;color:navy'>",
    "<span style='mso-bidi-font-weight:bold'>Quarterly</span> report<o:p></o:p></p>",
    "<p class=MsoNormal><o:p>&nbsp;</o:p></p>",
    "<!--EndFragment-->",
    "</body></html>"
);

#[test]
fn test_sanitize_word_clipboard() {
    assert_eq!(
        sanitize(WORD_CLIPBOARD),
        r#"<p style="color: navy;"><span>Quarterly</span> report</p><p>&nbsp;</p>"#
    );
}

#[test]
fn test_paste_word_html_after_paragraph() {
    let (mut session, changes) = recording_session("<p>Dear team,</p>");
    session.place_caret("team,", 0, true);

    let payload = PastePayload {
        html: Some(WORD_CLIPBOARD.to_string()),
        text: Some("Quarterly report".to_string()),
    };
    assert!(session.paste(&payload).is_applied());
    assert_eq!(
        session.html(),
        r#"<p>Dear team,</p><p style="color: navy;"><span>Quarterly</span> report</p><p>&nbsp;</p>"#
    );
    assert_eq!(change_count(&changes), 1);
}

#[test]
fn test_paste_plain_text_replaces_selection() {
    let mut session = test_session("<p>old</p>");
    session.select_all();
    assert!(session
        .paste(&PastePayload::text("first <line>\n\nsecond"))
        .is_applied());
    assert_eq!(
        session.html(),
        "<p>first &lt;line&gt;</p><p>second</p>"
    );
}

#[test]
fn test_paste_blank_html_falls_back_to_text() {
    let mut session = test_session("<p>x</p>");
    session.select_all();
    let payload = PastePayload {
        html: Some("<p class=MsoNormal><o:p></o:p></p><p> </p>".to_string()),
        text: Some("fallback".to_string()),
    };
    assert!(session.paste(&payload).is_applied());
    assert_eq!(session.html(), "<p>fallback</p>");
}

#[test]
fn test_paste_empty_clipboard_is_ignored() {
    let (mut session, changes) = recording_session("<p>x</p>");
    session.select_all();
    assert_eq!(
        session.paste(&PastePayload::default()),
        EditOutcome::Ignored(IgnoreReason::EmptyClipboard)
    );
    assert_eq!(session.html(), "<p>x</p>");
    assert_eq!(change_count(&changes), 0);
}

#[test]
fn test_malformed_html_still_pastes() {
    let mut session = test_session("<p>x</p>");
    session.select_all();
    assert!(session
        .paste(&PastePayload::html("<p><b>unclosed <i>tags"))
        .is_applied());
    assert!(session.text().contains("unclosed tags"));
}

#[test]
fn test_deeply_nested_clipboard_html_pastes() {
    let depth = 100_000;
    let html = format!("{}deep{}", "<span>".repeat(depth), "</span>".repeat(depth));

    let mut session = test_session("<p>a</p>");
    assert!(session.paste(&PastePayload::html(html)).is_applied());
    assert!(session.text().contains("deep"));
    assert!(session.html().matches("<span>").count() <= MAX_NESTING_DEPTH);

    let cleaned = sanitize(&format!("<div>{}</div>", "<o:p>".repeat(depth)));
    assert_eq!(cleaned, "<div></div>");
}

#[test]
fn test_paste_without_selection_appends() {
    let mut session = test_session("<p>a</p>");
    assert!(session.paste(&PastePayload::text("b")).is_applied());
    assert_eq!(session.html(), "<p>a</p><p>b</p>");
}
