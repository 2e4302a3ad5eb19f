//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod animate;
mod edit;
mod palette;
mod render;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, PxeConfig};
use crate::dither::Dither;
use crate::editor::PixelEditor;

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// First `*.png` in `dir`, in glob order.
///
/// Stands in for an interactive file picker when no input is given.
pub fn find_first_png(dir: &Path) -> Option<PathBuf> {
    let pattern = format!("{}/*.png", glob::Pattern::escape(&dir.display().to_string()));
    glob(&pattern).ok()?.filter_map(Result::ok).find(|p| p.is_file())
}

/// pxe - turn images into pixel art and edit them block by block
#[derive(Parser)]
#[command(name = "pxe")]
#[command(about = "Pixelate images, repaint blocks, and export PNG or animated GIF")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of discovering pxe.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Pixelation parameters shared by every command
#[derive(Args, Debug, Default, Clone)]
pub struct EditorArgs {
    /// Input image. If omitted, the first .png in the current directory
    pub input: Option<PathBuf>,

    /// Pixel block size (default from pxe.toml, else 6)
    #[arg(short, long)]
    pub block_size: Option<u32>,

    /// Number of palette colors (1-256, default from pxe.toml, else 4)
    #[arg(short = 'n', long)]
    pub colors: Option<usize>,

    /// Dithering used when reducing colors
    #[arg(long, value_enum)]
    pub dither: Option<Dither>,

    /// Directory for timestamp-named output
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

impl EditorArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            block_size: self.block_size,
            color_count: self.colors,
            dither: self.dither,
            out_dir: self.out_dir.clone(),
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pixelate an image and save it as PNG
    Render {
        #[command(flatten)]
        editor: EditorArgs,

        /// Output file or directory.
        /// If omitted: {out_dir}/{timestamp}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Key out the brightest palette color as transparency
        #[arg(long)]
        transparent: bool,

        /// Color-key tolerance per channel for --transparent (default 20)
        #[arg(long)]
        tolerance: Option<u8>,
    },

    /// Render the block-size sweep as an animated GIF
    Animate {
        #[command(flatten)]
        editor: EditorArgs,

        /// Output file. If omitted: {out_dir}/{timestamp}.gif
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frames in the forward sweep
        #[arg(long)]
        frames: Option<usize>,

        /// Copies of the last frame used as a pause
        #[arg(long)]
        pause: Option<usize>,

        /// Display time of each frame in milliseconds
        #[arg(long)]
        duration: Option<u32>,

        /// Sweep back down after the pause
        #[arg(long)]
        mirror: bool,
    },

    /// Print the palette of the pixelated image
    Palette {
        #[command(flatten)]
        editor: EditorArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply a sequence of edits, then save the result
    Edit {
        #[command(flatten)]
        editor: EditorArgs,

        /// Edit operation, repeatable and applied in order
        /// (paint:X,Y  color:I|#RRGGBB  size:N  colors:N  undo  reset  load:PATH)
        #[arg(long = "op", value_name = "OP")]
        ops: Vec<String>,

        /// Output file or directory. If omitted: {out_dir}/{timestamp}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Key out the brightest palette color as transparency
        #[arg(long)]
        transparent: bool,

        /// Color-key tolerance per channel for --transparent (default 20)
        #[arg(long)]
        tolerance: Option<u8>,
    },
}

/// Load pxe.toml (explicit path or discovered) and apply flag overrides.
///
/// Prints the problem and returns the exit code on failure.
pub(crate) fn resolve_config(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<PxeConfig, ExitCode> {
    let mut config = load_config(config_path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })?;
    merge_cli_overrides(&mut config, overrides).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })?;
    Ok(config)
}

/// Open the input image, falling back to the first PNG in the working directory.
pub(crate) fn open_editor(input: Option<&Path>, config: &PxeConfig) -> Result<PixelEditor, ExitCode> {
    let picker = || std::env::current_dir().ok().and_then(|cwd| find_first_png(&cwd));
    PixelEditor::open_or_pick(input, config.editor_settings(), picker).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> ExitCode {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Render { editor, output, transparent, tolerance } => {
            render::run_render(config_path, &editor, output.as_deref(), transparent, tolerance)
        }
        Commands::Animate { editor, output, frames, pause, duration, mirror } => {
            animate::run_animate(
                config_path,
                &editor,
                output.as_deref(),
                frames,
                pause,
                duration,
                mirror,
            )
        }
        Commands::Palette { editor, json } => palette::run_palette(config_path, &editor, json),
        Commands::Edit { editor, ops, output, transparent, tolerance } => edit::run_edit(
            config_path,
            &editor,
            &ops,
            output.as_deref(),
            transparent,
            tolerance,
        ),
    }
}
