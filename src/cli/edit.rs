//! Edit command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::ops::EditOp;

use super::render::export_png;
use super::{open_editor, resolve_config, EditorArgs, EXIT_ERROR, EXIT_INVALID_ARGS};

/// Parse every operation up front so a typo fails before any work is done.
fn parse_ops(ops: &[String]) -> Result<Vec<EditOp>, String> {
    ops.iter()
        .enumerate()
        .map(|(i, op)| op.parse::<EditOp>().map_err(|e| format!("--op #{}: {}", i + 1, e)))
        .collect()
}

/// Execute the edit command
pub fn run_edit(
    config_path: Option<&Path>,
    args: &EditorArgs,
    ops: &[String],
    output: Option<&Path>,
    transparent: bool,
    tolerance: Option<u8>,
) -> ExitCode {
    let ops = match parse_ops(ops) {
        Ok(ops) => ops,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let overrides = CliOverrides { key_tolerance: tolerance, ..args.overrides() };
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let mut editor = match open_editor(args.input.as_deref(), &config) {
        Ok(editor) => editor,
        Err(code) => return code,
    };

    for op in &ops {
        if let Err(e) = editor.apply(op) {
            eprintln!("Error: {:?} failed: {}", op, e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    export_png(&editor, &config, output, transparent)
}
