//! The pixel editor engine.
//!
//! [`PixelEditor`] owns the decoded source image, the current pixelated
//! rendering, its palette, the paint colour and a bounded undo history. Every
//! mutating call snapshots the pre-call state first; callers re-read the
//! accessors after each call to refresh whatever they display.

use crate::color::Color;
use crate::dither::Dither;
use crate::history::{HistoryStore, Snapshot};
use crate::output::OutputError;
use crate::palette::{derive_palette, ColorPalette};
use crate::resample::{pixelate, ResampleError};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Block size used when nothing else is configured.
pub const DEFAULT_BLOCK_SIZE: u32 = 6;
/// Colour count used when nothing else is configured.
pub const DEFAULT_COLOR_COUNT: usize = 4;

/// Error type for editor operations
#[derive(Debug, Error)]
pub enum EditorError {
    /// Source path missing, or no path was picked
    #[error("{}", describe_missing(.0.as_deref()))]
    NotFound(Option<PathBuf>),
    /// The file exists but isn't a decodable image
    #[error("cannot decode image '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Requested paint colour isn't in the active palette
    #[error("color {0} is not in the current palette")]
    PaletteMiss(String),
    /// Block is wider or taller than the source
    #[error("block size {block_size} is larger than the {width}x{height} source")]
    BlockTooLarge { block_size: u32, width: u32, height: u32 },
    /// Writing an export failed
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl From<ResampleError> for EditorError {
    fn from(e: ResampleError) -> Self {
        match e {
            ResampleError::BlockTooLarge { block_size, width, height } => {
                EditorError::BlockTooLarge { block_size, width, height }
            }
        }
    }
}

fn describe_missing(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!("image not found: {}", path.display()),
        None => "no image selected".to_string(),
    }
}

/// Parameters a session starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorSettings {
    pub block_size: u32,
    pub color_count: usize,
    pub dither: Dither,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            color_count: DEFAULT_COLOR_COUNT,
            dither: Dither::default(),
        }
    }
}

/// Which paint colour to select: a palette slot or a literal colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintSelector {
    Index(usize),
    Color(Color),
}

impl From<usize> for PaintSelector {
    fn from(index: usize) -> Self {
        PaintSelector::Index(index)
    }
}

impl From<Color> for PaintSelector {
    fn from(color: Color) -> Self {
        PaintSelector::Color(color)
    }
}

/// Decode `path` into an RGBA buffer, separating missing files from bad ones.
///
/// The format is sniffed from the file content, so the extension may be
/// missing or wrong.
pub fn load_source(path: &Path) -> Result<RgbaImage, EditorError> {
    if !path.is_file() {
        return Err(EditorError::NotFound(Some(path.to_path_buf())));
    }
    let decode = || -> image::ImageResult<image::DynamicImage> {
        image::io::Reader::open(path)?.with_guessed_format()?.decode()
    };
    let decoded = decode().map_err(|source| match source {
        image::ImageError::IoError(ref e) if e.kind() == std::io::ErrorKind::NotFound => {
            EditorError::NotFound(Some(path.to_path_buf()))
        }
        source => EditorError::Decode { path: path.to_path_buf(), source },
    })?;
    Ok(decoded.to_rgba8())
}

/// An editing session over one source image.
#[derive(Debug, Clone)]
pub struct PixelEditor {
    source: RgbaImage,
    source_path: PathBuf,
    image: RgbaImage,
    baseline: Snapshot,
    block_size: u32,
    color_count: usize,
    dither: Dither,
    palette: ColorPalette,
    /// `None` means "unset": painting falls back to the first palette entry.
    paint_color: Option<Color>,
    history: HistoryStore,
}

impl PixelEditor {
    /// Open `path` and pixelate it with `settings`.
    pub fn open(path: impl AsRef<Path>, settings: EditorSettings) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let source = load_source(path)?;
        tracing::info!(
            "loaded {} ({}x{})",
            path.display(),
            source.width(),
            source.height()
        );
        Self::from_image(source, path, settings)
    }

    /// Open `path`, or ask `pick` for one when no path is given.
    ///
    /// A picker returning `None` (cancelled) fails with `NotFound`.
    pub fn open_or_pick<F>(
        path: Option<&Path>,
        settings: EditorSettings,
        pick: F,
    ) -> Result<Self, EditorError>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        match path {
            Some(path) => Self::open(path, settings),
            None => {
                let picked = pick().ok_or(EditorError::NotFound(None))?;
                Self::open(picked, settings)
            }
        }
    }

    /// Start a session from an already decoded image.
    pub fn from_image(
        source: RgbaImage,
        source_path: impl Into<PathBuf>,
        settings: EditorSettings,
    ) -> Result<Self, EditorError> {
        let block_size = settings.block_size.max(1);
        let color_count = settings.color_count.max(1);
        let image = pixelate(&source, block_size, color_count, settings.dither)?;
        let palette = derive_palette(&image, color_count);

        Ok(Self {
            source,
            source_path: source_path.into(),
            baseline: Snapshot { image: image.clone(), block_size, color_count },
            image,
            block_size,
            color_count,
            dither: settings.dither,
            palette,
            paint_color: None,
            history: HistoryStore::new(),
        })
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    /// The colour `paint` will use; an unset colour falls back to palette[0].
    pub fn paint_color(&self) -> Option<Color> {
        self.paint_color.or_else(|| self.palette.first())
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn color_count(&self) -> usize {
        self.color_count
    }

    pub fn dither(&self) -> Dither {
        self.dither
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// The state `reset` swaps in.
    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn settings(&self) -> EditorSettings {
        EditorSettings {
            block_size: self.block_size,
            color_count: self.color_count,
            dither: self.dither,
        }
    }

    // ------------------------------------------------------------------
    // History plumbing
    // ------------------------------------------------------------------

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            image: self.image.clone(),
            block_size: self.block_size,
            color_count: self.color_count,
        }
    }

    /// Snapshot the current state, then apply `op`.
    fn with_history<T>(&mut self, op: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        op(self)
    }

    /// Like [`with_history`](Self::with_history) for fallible operations.
    ///
    /// The snapshot is only recorded when `op` succeeds; `op` must leave the
    /// editor untouched when it fails.
    fn try_with_history<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, EditorError>,
    ) -> Result<T, EditorError> {
        let snapshot = self.snapshot();
        let out = op(self)?;
        self.history.push(snapshot);
        Ok(out)
    }

    /// Pixelate the source and derive the matching palette, without touching state.
    fn render(&self, block_size: u32, color_count: usize) -> Result<(RgbaImage, ColorPalette), EditorError> {
        let image = pixelate(&self.source, block_size, color_count, self.dither)?;
        let palette = derive_palette(&image, color_count);
        Ok((image, palette))
    }

    /// Replace the current state wholesale and keep the paint colour valid.
    fn install(&mut self, image: RgbaImage, block_size: u32, color_count: usize, palette: ColorPalette) {
        self.image = image;
        self.block_size = block_size;
        self.color_count = color_count;
        self.palette = palette;
        if self.paint_color.is_some_and(|c| !self.palette.contains(c)) {
            self.paint_color = None;
        }
    }

    fn install_snapshot(&mut self, snapshot: Snapshot) {
        let palette = derive_palette(&snapshot.image, snapshot.color_count);
        self.install(snapshot.image, snapshot.block_size, snapshot.color_count, palette);
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Top-left corner of the block containing `(x, y)`.
    ///
    /// Coordinates are clamped into the image, floored to the block grid, and
    /// pulled back so the block does not run past the right or bottom edge.
    pub fn block_origin(&self, x: i64, y: i64) -> (u32, u32) {
        let (width, height) = self.image.dimensions();
        let block = self.block_size as i64;
        let axis = |v: i64, extent: u32| -> u32 {
            let extent = extent as i64;
            let v = v.clamp(0, (extent - 1).max(0));
            let origin = v / block * block;
            origin.min((extent - block).max(0)) as u32
        };
        (axis(x, width), axis(y, height))
    }

    /// Fill the block under `(x, y)` with the paint colour.
    ///
    /// Out-of-range coordinates are clamped onto the nearest block rather
    /// than rejected.
    pub fn paint(&mut self, x: i64, y: i64) {
        let Some(color) = self.paint_color() else {
            return;
        };
        let (width, height) = self.image.dimensions();
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            tracing::warn!("paint at ({}, {}) outside {}x{} image, clamping", x, y, width, height);
        }
        let (ox, oy) = self.block_origin(x, y);
        let block = self.block_size;

        self.with_history(|editor| {
            let rgba = color.to_rgba();
            for py in oy..(oy + block).min(height) {
                for px in ox..(ox + block).min(width) {
                    editor.image.put_pixel(px, py, rgba);
                }
            }
        });
        tracing::debug!("painted block at ({}, {}) with {}", ox, oy, color);
    }

    /// Choose the paint colour by palette index or by value.
    ///
    /// A colour or index missing from the palette is a `PaletteMiss` and
    /// leaves the current paint colour unchanged.
    pub fn select_paint_color(&mut self, selector: impl Into<PaintSelector>) -> Result<Color, EditorError> {
        let color = match selector.into() {
            PaintSelector::Index(index) => self
                .palette
                .get(index)
                .ok_or_else(|| EditorError::PaletteMiss(format!("index {}", index)))?,
            PaintSelector::Color(color) if self.palette.contains(color) => color,
            PaintSelector::Color(color) => {
                tracing::warn!("{} not found in palette", color);
                return Err(EditorError::PaletteMiss(color.to_hex()));
            }
        };
        self.paint_color = Some(color);
        Ok(color)
    }

    /// Re-pixelate the source at a new block size (minimum 1).
    pub fn change_block_size(&mut self, block_size: u32) -> Result<(), EditorError> {
        let block_size = block_size.max(1);
        self.try_with_history(|editor| {
            let (image, palette) = editor.render(block_size, editor.color_count)?;
            editor.install(image, block_size, editor.color_count, palette);
            Ok(())
        })?;
        tracing::debug!("block size now {}", block_size);
        Ok(())
    }

    pub fn increase_block_size(&mut self) -> Result<(), EditorError> {
        self.change_block_size(self.block_size + 1)
    }

    /// Step the block size down by one. Returns `false` when already at 1.
    pub fn decrease_block_size(&mut self) -> Result<bool, EditorError> {
        if self.block_size <= 1 {
            return Ok(false);
        }
        self.change_block_size(self.block_size - 1)?;
        Ok(true)
    }

    /// Re-pixelate the source with a new colour budget (minimum 1).
    pub fn change_color_count(&mut self, color_count: usize) -> Result<(), EditorError> {
        let color_count = color_count.max(1);
        self.try_with_history(|editor| {
            let (image, palette) = editor.render(editor.block_size, color_count)?;
            editor.install(image, editor.block_size, color_count, palette);
            Ok(())
        })?;
        tracing::debug!("color count now {}", color_count);
        Ok(())
    }

    /// Restore the most recent snapshot. Returns `false` when there is none.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.install_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Swap the current state with the baseline and clear the history.
    ///
    /// This is a toggle: a second reset brings back the state the first one
    /// replaced.
    pub fn reset(&mut self) {
        let current = self.snapshot();
        let baseline = std::mem::replace(&mut self.baseline, current);
        self.install_snapshot(baseline);
        self.history.clear();
    }

    /// Replace the source with a new file, keeping block size and colour count.
    ///
    /// On failure the session is left exactly as it was.
    pub fn load_new_image(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let path = path.as_ref();
        let source = load_source(path)?;
        let image = pixelate(&source, self.block_size, self.color_count, self.dither)?;
        let palette = derive_palette(&image, self.color_count);

        tracing::info!("loaded {} ({}x{})", path.display(), source.width(), source.height());
        self.source = source;
        self.source_path = path.to_path_buf();
        self.baseline = Snapshot {
            image: image.clone(),
            block_size: self.block_size,
            color_count: self.color_count,
        };
        self.install(image, self.block_size, self.color_count, palette);
        self.history.clear();
        Ok(())
    }
}
