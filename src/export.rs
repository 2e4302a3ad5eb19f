//! Exporting the current rendering: opaque PNG, colour-keyed transparent PNG,
//! and the animated block-size sweep.

use crate::color::Color;
use crate::editor::{EditorError, PixelEditor};
use crate::gif::render_gif;
use crate::output::{ensure_parent_dir, resolve_output_path, save_png, OutputError};
use crate::resample::pixelate;
use image::{DynamicImage, Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-channel tolerance for the transparent export's colour key.
pub const DEFAULT_KEY_TOLERANCE: u8 = 20;

/// Shape of the animated block-size sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationOptions {
    /// Frames in the forward sweep, starting at the current block size
    pub frames: usize,
    /// Copies of the final frame appended as a pause
    pub pause_frames: usize,
    pub frame_duration_ms: u32,
    /// Sweep back down to the starting block size after the pause
    pub mirror: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self { frames: 19, pause_frames: 5, frame_duration_ms: 100, mirror: false }
    }
}

/// The export flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Opaque,
    Transparent { tolerance: u8 },
    Animated(AnimationOptions),
}

impl ExportKind {
    /// Extension used for default names.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Opaque | ExportKind::Transparent { .. } => "png",
            ExportKind::Animated(_) => "gif",
        }
    }
}

/// Replace every pixel within `tolerance` of `key` on all three channels with
/// transparent white; everything else becomes fully opaque.
///
/// The comparison is strict, so a tolerance of 0 keys nothing. Any part of the
/// subject that happens to share the key colour is keyed out too.
pub fn color_key(image: &RgbaImage, key: Color, tolerance: u8) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let color = Color::from_rgba(*pixel);
        *pixel = if color.is_near(key, tolerance) {
            Rgba([255, 255, 255, 0])
        } else {
            color.to_rgba()
        };
    }
    out
}

/// Frames of the block-size sweep for `editor`.
///
/// The first frame is the current rendering, edits included; each following
/// frame re-pixelates the source one block size larger. The sweep stops early
/// once the block would no longer fit the source. The editor is not modified.
pub fn build_animated_sequence(editor: &PixelEditor, options: &AnimationOptions) -> Vec<RgbaImage> {
    if options.frames == 0 {
        return Vec::new();
    }

    let source = editor.source();
    let max_block = source.width().min(source.height());
    let blocks: Vec<u32> = (1..options.frames as u32)
        .map(|step| editor.block_size() + step)
        .take_while(|block| *block <= max_block)
        .collect();

    let sweep: Vec<RgbaImage> = blocks
        .par_iter()
        .filter_map(|&block| pixelate(source, block, editor.color_count(), editor.dither()).ok())
        .collect();

    let mut forward = Vec::with_capacity(sweep.len() + 1);
    forward.push(editor.image().clone());
    forward.extend(sweep);

    let mut frames = forward.clone();
    if let Some(last) = forward.last() {
        frames.extend(std::iter::repeat(last.clone()).take(options.pause_frames));
    }
    if options.mirror {
        frames.extend(forward.iter().rev().cloned());
        frames.extend(std::iter::repeat(forward[0].clone()).take(options.pause_frames));
    }

    tracing::debug!(
        forward = forward.len(),
        total = frames.len(),
        "built block-size sweep from {}",
        editor.block_size()
    );
    frames
}

impl PixelEditor {
    /// Write the current rendering in the format implied by the extension.
    ///
    /// Names without an extension get `.png`.
    pub fn save_opaque(&self, path: Option<&Path>) -> Result<PathBuf, EditorError> {
        self.export(ExportKind::Opaque, path, Path::new("."))
    }

    /// Write the current rendering with palette[0] keyed out as transparency.
    pub fn save_transparent(&self, path: Option<&Path>, tolerance: u8) -> Result<PathBuf, EditorError> {
        self.export(ExportKind::Transparent { tolerance }, path, Path::new("."))
    }

    /// Write the block-size sweep as a looping GIF.
    pub fn save_animated(&self, path: Option<&Path>, options: &AnimationOptions) -> Result<PathBuf, EditorError> {
        self.export(ExportKind::Animated(*options), path, Path::new("."))
    }

    /// Run one export flow.
    ///
    /// Without a requested path the file is named after the current local
    /// time and placed in `out_dir`. Returns the path written.
    pub fn export(&self, kind: ExportKind, path: Option<&Path>, out_dir: &Path) -> Result<PathBuf, EditorError> {
        let ext = kind.extension();
        let target = match kind {
            ExportKind::Opaque => {
                let target = resolve_output_path(path, out_dir, ext, false);
                if target.extension().is_none() {
                    target.with_extension(ext)
                } else {
                    target
                }
            }
            _ => resolve_output_path(path, out_dir, ext, true),
        };

        match kind {
            ExportKind::Opaque => {
                ensure_parent_dir(&target)?;
                DynamicImage::ImageRgba8(self.image().clone())
                    .to_rgb8()
                    .save(&target)
                    .map_err(OutputError::from)?;
            }
            ExportKind::Transparent { tolerance } => {
                let keyed = match self.palette().first() {
                    Some(key) => color_key(self.image(), key, tolerance),
                    None => self.image().clone(),
                };
                save_png(&keyed, &target)?;
            }
            ExportKind::Animated(options) => {
                let frames = build_animated_sequence(self, &options);
                render_gif(&frames, options.frame_duration_ms, true, &target)?;
            }
        }

        tracing::info!("wrote {}", target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorSettings;
    use tempfile::tempdir;

    fn editor() -> PixelEditor {
        let source = RgbaImage::from_fn(60, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Rgba([30, 40, 160, 255])
            } else {
                Rgba([240, 240, 235, 255])
            }
        });
        PixelEditor::from_image(source, "mem.png", EditorSettings::default()).unwrap()
    }

    #[test]
    fn test_color_key_tolerance_is_strict() {
        let image = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([200, 200, 200, 255]),
            1 => Rgba([219, 181, 200, 255]),
            _ => Rgba([220, 200, 200, 255]),
        });
        let keyed = color_key(&image, Color::new(200, 200, 200), 20);

        assert_eq!(*keyed.get_pixel(0, 0), Rgba([255, 255, 255, 0]));
        assert_eq!(*keyed.get_pixel(1, 0), Rgba([255, 255, 255, 0]));
        assert_eq!(*keyed.get_pixel(2, 0), Rgba([220, 200, 200, 255]));
    }

    #[test]
    fn test_color_key_zero_tolerance_keys_nothing() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));
        let keyed = color_key(&image, Color::new(9, 9, 9), 0);
        assert!(keyed.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_save_transparent_keys_brightest() {
        let dir = tempdir().unwrap();
        let editor = editor();
        let key = editor.palette().first().unwrap();

        let path = editor
            .export(ExportKind::Transparent { tolerance: 20 }, Some(&dir.path().join("keyed")), dir.path())
            .unwrap();
        assert_eq!(path, dir.path().join("keyed.png"));

        let loaded = image::open(&path).unwrap().to_rgba8();
        for (x, y, pixel) in loaded.enumerate_pixels() {
            let original = Color::from_rgba(*editor.image().get_pixel(x, y));
            if original.is_near(key, 20) {
                assert_eq!(*pixel, Rgba([255, 255, 255, 0]));
            } else {
                assert_eq!(pixel.0[3], 255);
            }
        }
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([255, 255, 255, 0]));
        assert_eq!(loaded.get_pixel(20, 20).0[3], 255);
    }

    #[test]
    fn test_save_opaque_default_name() {
        let dir = tempdir().unwrap();
        let editor = editor();

        let path = editor.export(ExportKind::Opaque, None, dir.path()).unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(&loaded, editor.image());
    }

    #[test]
    fn test_save_opaque_other_format() {
        let dir = tempdir().unwrap();
        let path = editor().export(ExportKind::Opaque, Some(&dir.path().join("art.bmp")), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("art.bmp"));
        assert_eq!(image::open(&path).unwrap().width(), 60);
    }

    #[test]
    fn test_animated_sequence_plain() {
        let editor = editor();
        let options = AnimationOptions { frames: 4, pause_frames: 2, ..Default::default() };
        let frames = build_animated_sequence(&editor, &options);

        assert_eq!(frames.len(), 6);
        assert_eq!(&frames[0], editor.image());
        // 60x40 at block 9 truncates to 54x36
        assert_eq!(frames[3].dimensions(), (54, 36));
        assert_eq!(frames[4], frames[3]);
        assert_eq!(frames[5], frames[3]);
        assert_eq!(editor.block_size(), 6);
    }

    #[test]
    fn test_animated_sequence_mirror() {
        let editor = editor();
        let options = AnimationOptions { frames: 3, pause_frames: 1, mirror: true, ..Default::default() };
        let frames = build_animated_sequence(&editor, &options);

        assert_eq!(frames.len(), 8);
        assert_eq!(frames[4], frames[2]);
        assert_eq!(&frames[6], editor.image());
        assert_eq!(&frames[7], editor.image());
    }

    #[test]
    fn test_animated_sequence_stops_at_source_size() {
        let editor = editor();
        let options = AnimationOptions { frames: 100, pause_frames: 0, ..Default::default() };
        let frames = build_animated_sequence(&editor, &options);
        // blocks 6..=40 fit a 40 pixel tall source
        assert_eq!(frames.len(), 35);
    }

    #[test]
    fn test_save_animated_writes_gif() {
        let dir = tempdir().unwrap();
        let options = AnimationOptions { frames: 3, pause_frames: 1, ..Default::default() };
        let path = editor()
            .export(ExportKind::Animated(options), Some(&dir.path().join("gifs/sweep")), dir.path())
            .unwrap();

        assert_eq!(path, dir.path().join("gifs/sweep.gif"));
        assert!(path.exists());
    }
}
