//! Render command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::editor::PixelEditor;
use crate::export::ExportKind;

use super::{open_editor, resolve_config, EditorArgs, EXIT_ERROR, EXIT_SUCCESS};
use crate::config::{CliOverrides, PxeConfig};

/// Export `editor` as an opaque or colour-keyed PNG and report the path.
pub(crate) fn export_png(
    editor: &PixelEditor,
    config: &PxeConfig,
    output: Option<&Path>,
    transparent: bool,
) -> ExitCode {
    let kind = if transparent {
        ExportKind::Transparent { tolerance: config.export.key_tolerance }
    } else {
        ExportKind::Opaque
    };

    match editor.export(kind, output, &config.export.out_dir) {
        Ok(path) => {
            println!("Saved: {}", path.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the render command
pub fn run_render(
    config_path: Option<&Path>,
    args: &EditorArgs,
    output: Option<&Path>,
    transparent: bool,
    tolerance: Option<u8>,
) -> ExitCode {
    let overrides = CliOverrides { key_tolerance: tolerance, ..args.overrides() };
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let editor = match open_editor(args.input.as_deref(), &config) {
        Ok(editor) => editor,
        Err(code) => return code,
    };

    export_png(&editor, &config, output, transparent)
}
