use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use compose_editor::cli::{CliArgs, OutputMode};
use compose_editor::commands::Cmd;
use compose_editor::config::EditorConfig;
use compose_editor::export::export_named;
use compose_editor::messages::Msg;
use compose_editor::model::AppModel;
use compose_editor::sanitize::PastePayload;
use compose_editor::update::update_all;

fn main() -> Result<()> {
    compose_editor::tracing::init();

    let args = CliArgs::parse();
    let mut model = AppModel::new(EditorConfig::load());

    let mut msgs = Vec::new();
    if let Some(html) = args.read_input()? {
        msgs.push(Msg::SetDocument { html });
    }
    if args.from_clipboard {
        let text = arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.get_text())
            .context("Failed to read clipboard text")?;
        msgs.push(Msg::SelectAll);
        msgs.push(Msg::Paste(PastePayload::text(text)));
    }
    msgs.extend(args.read_script()?);

    tracing::debug!("Replaying {} messages", msgs.len());
    if let Some(cmd) = update_all(&mut model, msgs) {
        run_cmd(cmd, args.output.as_deref())?;
    }

    let session = &model.session;
    let output = match args.output_mode() {
        OutputMode::Html => session.html().to_string(),
        OutputMode::Text => session.text(),
        OutputMode::Export => {
            let file = export_named(session.html(), &model.config.export_filename);
            String::from_utf8(file.bytes).context("Export is not valid UTF-8")?
        }
        OutputMode::State => serde_json::to_string_pretty(&serde_json::json!({
            "view_mode": session.view_mode(),
            "can_undo": session.can_undo(),
            "can_redo": session.can_redo(),
            "cell_selected": session.selected_cell().is_some(),
            "active": session.active_state(),
        }))?,
    };

    match &args.output {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", output),
    }

    Ok(())
}

/// Perform the side effects requested by the replayed messages
fn run_cmd(cmd: Cmd, output: Option<&Path>) -> Result<()> {
    match cmd {
        Cmd::None => {}
        Cmd::Notify(notice) => eprintln!("{}", notice.message),
        Cmd::SaveFile(file) => {
            let dir = output
                .and_then(Path::parent)
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let path = file
                .write_to_dir(dir)
                .with_context(|| format!("Failed to save {}", file.filename))?;
            tracing::info!("Exported {}", path.display());
        }
        Cmd::Batch(cmds) => {
            for cmd in cmds {
                run_cmd(cmd, output)?;
            }
        }
    }
    Ok(())
}
