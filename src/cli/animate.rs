//! Animate command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::export::ExportKind;

use super::{open_editor, resolve_config, EditorArgs, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the animate command
pub fn run_animate(
    config_path: Option<&Path>,
    args: &EditorArgs,
    output: Option<&Path>,
    frames: Option<usize>,
    pause: Option<usize>,
    duration: Option<u32>,
    mirror: bool,
) -> ExitCode {
    let overrides = CliOverrides {
        frames,
        pause_frames: pause,
        frame_duration_ms: duration,
        // --mirror only ever turns mirroring on; the file decides otherwise
        mirror: mirror.then_some(true),
        ..args.overrides()
    };
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let editor = match open_editor(args.input.as_deref(), &config) {
        Ok(editor) => editor,
        Err(code) => return code,
    };

    match editor.export(ExportKind::Animated(config.animation), output, &config.export.out_dir) {
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
