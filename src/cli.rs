//! Command-line argument parsing for the editor
//!
//! Supports:
//! - Loading an HTML body from a file or stdin
//! - Replaying a YAML script of editor messages
//! - Emitting markup, plain text, an export page or the active format state

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::messages::Msg;

/// Headless rich-text session for composing HTML email bodies
#[derive(Parser, Debug)]
#[command(name = "compose-editor", version, about = "Headless rich-text editing for HTML email bodies")]
pub struct CliArgs {
    /// HTML file to load (stdin when `-`)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// YAML list of editor messages to replay
    #[arg(short = 's', long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit the plain-text projection
    #[arg(long, group = "emit")]
    pub text: bool,

    /// Emit a standalone HTML page
    #[arg(long, group = "emit")]
    pub export: bool,

    /// Emit the active format state as JSON
    #[arg(long, group = "emit")]
    pub state: bool,

    /// Paste the clipboard text before replaying the script
    #[arg(long)]
    pub from_clipboard: bool,
}

/// What the binary writes once the script has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Html,
    Text,
    Export,
    State,
}

impl CliArgs {
    pub fn output_mode(&self) -> OutputMode {
        if self.text {
            OutputMode::Text
        } else if self.export {
            OutputMode::Export
        } else if self.state {
            OutputMode::State
        } else {
            OutputMode::Html
        }
    }

    /// Read the input document; `None` starts from an empty body
    pub fn read_input(&self) -> Result<Option<String>> {
        let Some(path) = &self.input else {
            return Ok(None);
        };
        if path.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
                .context("Failed to read stdin")?;
            return Ok(Some(buf));
        }
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .map(Some)
    }

    pub fn read_script(&self) -> Result<Vec<Msg>> {
        let Some(path) = &self.script else {
            return Ok(Vec::new());
        };
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        parse_script(&yaml).with_context(|| format!("Invalid script {}", path.display()))
    }
}

/// Parse a YAML sequence of messages; an empty document is an empty script
pub fn parse_script(yaml: &str) -> Result<Vec<Msg>> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str(yaml)?)
}
