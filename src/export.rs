//! "Download as HTML" export

use std::path::Path;

pub const DEFAULT_FILENAME: &str = "document.html";
pub const HTML_MIME_TYPE: &str = "text/html";

/// A file handed to the host for saving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Write the file into `dir` under its own name
    pub fn write_to_dir(&self, dir: &Path) -> std::io::Result<std::path::PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Wrap the document body in a standalone UTF-8 HTML page
pub fn html_page(body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"></head><body>{}</body></html>",
        body
    )
}

pub fn export_as_file(html: &str) -> ExportedFile {
    export_named(html, DEFAULT_FILENAME)
}

/// Like [`export_as_file`] with a caller-chosen filename; an empty name
/// falls back to the default
pub fn export_named(html: &str, filename: &str) -> ExportedFile {
    let filename = match filename.trim() {
        "" => DEFAULT_FILENAME,
        name => name,
    };
    ExportedFile {
        filename: filename.to_string(),
        mime_type: HTML_MIME_TYPE.to_string(),
        bytes: html_page(html).into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_wraps_document() {
        let file = export_as_file("<p>Hi</p>");
        assert_eq!(file.filename, "document.html");
        assert_eq!(file.mime_type, "text/html");
        assert_eq!(
            String::from_utf8(file.bytes).unwrap(),
            "<!doctype html><html><head><meta charset=\"utf-8\"></head><body><p>Hi</p></body></html>"
        );
    }

    #[test]
    fn test_export_named() {
        assert_eq!(export_named("", "mail.html").filename, "mail.html");
        assert_eq!(export_named("", "  ").filename, DEFAULT_FILENAME);
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = export_named("<p>x</p>", "out.html");
        let path = file.write_to_dir(dir.path()).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), file.bytes);
    }
}
