//! pixedit - turn raster images into editable pixel art
//!
//! This library provides:
//! - A pixelate pipeline (nearest-neighbour downscale, median-cut palette
//!   reduction with dithering, nearest-neighbour upscale)
//! - [`PixelEditor`], an editing session with block painting, palette
//!   selection, bounded undo and a reset toggle
//! - Exports to opaque PNG, colour-keyed transparent PNG and animated GIF
//!
//! ```no_run
//! use pixedit::{EditorSettings, PixelEditor};
//!
//! let mut editor = PixelEditor::open("photo.png", EditorSettings::default())?;
//! editor.select_paint_color(0)?;
//! editor.paint(40, 12);
//! editor.save_transparent(None, pixedit::export::DEFAULT_KEY_TOLERANCE)?;
//! # Ok::<(), pixedit::EditorError>(())
//! ```

pub mod cli;
pub mod color;
pub mod config;
pub mod dither;
pub mod editor;
pub mod export;
pub mod gif;
pub mod history;
pub mod ops;
pub mod output;
pub mod palette;
pub mod quantize;
pub mod resample;

pub use color::Color;
pub use editor::{EditorError, EditorSettings, PaintSelector, PixelEditor};
pub use export::{AnimationOptions, ExportKind};
pub use ops::EditOp;
pub use palette::ColorPalette;
