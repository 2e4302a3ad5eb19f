//! Palette command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::palette::ColorPalette;

use super::{open_editor, resolve_config, EditorArgs, EXIT_ERROR, EXIT_SUCCESS};

/// Plain listing, one `index  #RRGGBB` line per entry.
fn format_palette(palette: &ColorPalette) -> String {
    palette
        .iter()
        .enumerate()
        .map(|(i, color)| format!("  {:>3}  {}", i, color))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Execute the palette command
pub fn run_palette(config_path: Option<&Path>, args: &EditorArgs, json: bool) -> ExitCode {
    let config = match resolve_config(config_path, &args.overrides()) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let editor = match open_editor(args.input.as_deref(), &config) {
        Ok(editor) => editor,
        Err(code) => return code,
    };
    let palette = editor.palette();

    if json {
        let report = serde_json::json!({
            "source": editor.source_path().display().to_string(),
            "block_size": editor.block_size(),
            "color_count": editor.color_count(),
            "colors": palette.to_hex(),
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!(
            "Palette: {} (block {}, {} colors)",
            editor.source_path().display(),
            editor.block_size(),
            palette.len()
        );
        println!();
        println!("{}", format_palette(palette));
    }

    ExitCode::from(EXIT_SUCCESS)
}
