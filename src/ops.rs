//! Scripted edit operations.
//!
//! Each [`EditOp`] maps onto one mutating call of [`PixelEditor`], so a
//! sequence of them replays an interactive session headlessly:
//!
//! ```text
//! paint:12,30    color:2    color:#FFEEDD    size:8    colors:6
//! undo           reset      load:other.png
//! ```

use crate::color::{parse_hex_color, Color};
use crate::editor::{EditorError, PixelEditor};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an operation string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpParseError {
    #[error("unknown operation '{0}'")]
    Unknown(String),
    #[error("operation '{op}' expects {expected}, got '{value}'")]
    BadArgument { op: String, expected: &'static str, value: String },
}

/// A single edit, as written on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Paint { x: i64, y: i64 },
    SelectIndex(usize),
    SelectColor(Color),
    BlockSize(u32),
    ColorCount(usize),
    Undo,
    Reset,
    Load(PathBuf),
}

impl FromStr for EditOp {
    type Err = OpParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (s, None),
        };

        let bad = |expected: &'static str| OpParseError::BadArgument {
            op: name.to_string(),
            expected,
            value: arg.unwrap_or_default().to_string(),
        };

        match (name.to_ascii_lowercase().as_str(), arg) {
            ("paint", Some(arg)) => {
                let (x, y) = arg.split_once(',').ok_or_else(|| bad("X,Y"))?;
                let x = x.trim().parse().map_err(|_| bad("X,Y"))?;
                let y = y.trim().parse().map_err(|_| bad("X,Y"))?;
                Ok(EditOp::Paint { x, y })
            }
            ("color", Some(arg)) => {
                if let Ok(index) = arg.parse::<usize>() {
                    return Ok(EditOp::SelectIndex(index));
                }
                parse_hex_color(arg)
                    .map(EditOp::SelectColor)
                    .map_err(|_| bad("a palette index or #RRGGBB"))
            }
            ("size", Some(arg)) => arg.parse().map(EditOp::BlockSize).map_err(|_| bad("a block size")),
            ("colors", Some(arg)) => {
                arg.parse().map(EditOp::ColorCount).map_err(|_| bad("a color count"))
            }
            ("load", Some(arg)) if !arg.is_empty() => Ok(EditOp::Load(PathBuf::from(arg))),
            ("undo", None) => Ok(EditOp::Undo),
            ("reset", None) => Ok(EditOp::Reset),
            ("paint", None) => Err(bad("X,Y")),
            ("color", None) => Err(bad("a palette index or #RRGGBB")),
            ("size", None) => Err(bad("a block size")),
            ("colors", None) => Err(bad("a color count")),
            ("load", _) => Err(bad("a path")),
            _ => Err(OpParseError::Unknown(s.to_string())),
        }
    }
}

impl PixelEditor {
    /// Apply one scripted operation.
    ///
    /// `Undo` on an empty history is not an error; it simply changes nothing.
    pub fn apply(&mut self, op: &EditOp) -> Result<(), EditorError> {
        tracing::debug!(?op, "apply");
        match op {
            EditOp::Paint { x, y } => self.paint(*x, *y),
            EditOp::SelectIndex(index) => {
                self.select_paint_color(*index)?;
            }
            EditOp::SelectColor(color) => {
                self.select_paint_color(*color)?;
            }
            EditOp::BlockSize(size) => self.change_block_size(*size)?,
            EditOp::ColorCount(count) => self.change_color_count(*count)?,
            EditOp::Undo => {
                if !self.undo() {
                    tracing::debug!("nothing to undo");
                }
            }
            EditOp::Reset => self.reset(),
            EditOp::Load(path) => self.load_new_image(path)?,
        }
        Ok(())
    }
}
