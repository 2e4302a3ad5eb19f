//! GIF animation rendering

use crate::output::{ensure_parent_dir, OutputError};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Place every frame on a transparent canvas as large as the biggest frame.
///
/// Frames rendered at different block sizes are truncated to different
/// multiples of their block, so they rarely share exact dimensions.
pub fn pad_to_common_canvas(frames: &[RgbaImage]) -> Vec<RgbaImage> {
    let width = frames.iter().map(RgbaImage::width).max().unwrap_or(0);
    let height = frames.iter().map(RgbaImage::height).max().unwrap_or(0);

    frames
        .iter()
        .map(|frame| {
            if frame.dimensions() == (width, height) {
                return frame.clone();
            }
            let mut canvas = RgbaImage::new(width, height);
            image::imageops::replace(&mut canvas, frame, 0, 0);
            canvas
        })
        .collect()
}

/// Render a sequence of frames as an animated GIF.
///
/// # Arguments
///
/// * `frames` - The image frames to include in the animation
/// * `duration_ms` - Duration per frame in milliseconds
/// * `loop_anim` - Whether the animation should loop infinitely
/// * `path` - Output file path
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(OutputError::Empty)` when `frames` is empty
pub fn render_gif(
    frames: &[RgbaImage],
    duration_ms: u32,
    loop_anim: bool,
    path: &Path,
) -> Result<(), OutputError> {
    if frames.is_empty() {
        return Err(OutputError::Empty);
    }

    ensure_parent_dir(path)?;

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = GifEncoder::new(writer);

    let repeat = if loop_anim { Repeat::Infinite } else { Repeat::Finite(0) };
    encoder.set_repeat(repeat)?;

    // GIF delays are in centiseconds; round down, minimum one
    let delay_cs = (duration_ms / 10).max(1);

    for rgba_image in pad_to_common_canvas(frames) {
        let delay = Delay::from_numer_denom_ms(delay_cs * 10, 1);
        encoder.encode_frame(Frame::from_parts(rgba_image, 0, 0, delay))?;
    }

    Ok(())
}
