//! The pixelate pipeline: nearest-neighbour downscale, palette reduction with
//! dithering, nearest-neighbour upscale.

use crate::dither::Dither;
use crate::quantize::{color_histogram, median_cut};
use image::RgbaImage;
use thiserror::Error;

/// Error type for pixelation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResampleError {
    /// The block is wider or taller than the source, leaving nothing to sample
    #[error("block size {block_size} is larger than the {width}x{height} source")]
    BlockTooLarge { block_size: u32, width: u32, height: u32 },
}

/// Shrink `image` by an integer factor, keeping one sample per block.
///
/// Each output pixel is the source pixel at the centre of its block, with no
/// interpolation. Output dimensions are `floor(width / factor) x
/// floor(height / factor)`. Returns `None` when either dimension would be zero.
pub fn downscale(image: &RgbaImage, factor: u32) -> Option<RgbaImage> {
    let factor = factor.max(1);
    let (w, h) = image.dimensions();
    let (new_w, new_h) = (w / factor, h / factor);
    if new_w == 0 || new_h == 0 {
        return None;
    }
    let centre = factor / 2;
    Some(RgbaImage::from_fn(new_w, new_h, |x, y| {
        *image.get_pixel(x * factor + centre, y * factor + centre)
    }))
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// This preserves crisp pixel edges: every source pixel becomes a solid
/// `factor x factor` block.
pub fn upscale(image: &RgbaImage, factor: u32) -> RgbaImage {
    if factor <= 1 {
        return image.clone();
    }
    let (w, h) = image.dimensions();
    RgbaImage::from_fn(w * factor, h * factor, |x, y| *image.get_pixel(x / factor, y / factor))
}

/// Render `source` as chunky pixel art.
///
/// The source is sampled once per `block_size x block_size` block, reduced to
/// at most `color_count` colours with the given dithering, and blown back up
/// so every block is one solid macro-pixel. The result is
/// `floor(w / block) * block` by `floor(h / block) * block`; any remainder is
/// dropped rather than padded.
///
/// A block size of 0 is treated as 1, as is a colour count of 0.
pub fn pixelate(
    source: &RgbaImage,
    block_size: u32,
    color_count: usize,
    dither: Dither,
) -> Result<RgbaImage, ResampleError> {
    let block_size = block_size.max(1);
    let (width, height) = source.dimensions();

    let small = downscale(source, block_size)
        .ok_or(ResampleError::BlockTooLarge { block_size, width, height })?;

    let table = median_cut(&color_histogram(&small), color_count.max(1));
    let reduced = dither.apply(&small, &table);

    tracing::debug!(
        block_size,
        color_count,
        table = table.len(),
        "pixelated {}x{} -> {}x{}",
        width,
        height,
        small.width() * block_size,
        small.height() * block_size
    );

    Ok(upscale(&reduced, block_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use image::Rgba;
    use std::collections::HashSet;

    fn noisy(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(73).wrapping_add(y.wrapping_mul(151)) % 256;
            Rgba([v as u8, (255 - v) as u8, ((v * 7) % 256) as u8, 255])
        })
    }

    fn distinct_colors(image: &RgbaImage) -> HashSet<Color> {
        image.pixels().map(|p| Color::from_rgba(*p)).collect()
    }

    #[test]
    fn test_dimensions_are_block_multiples() {
        let source = noisy(123, 77);
        for block in 1..=12 {
            let out = pixelate(&source, block, 4, Dither::FloydSteinberg).unwrap();
            assert_eq!(out.width() % block, 0);
            assert_eq!(out.height() % block, 0);
            assert_eq!(out.width(), 123 / block * block);
            assert_eq!(out.height(), 77 / block * block);
        }
    }

    #[test]
    fn test_block_size_zero_treated_as_one() {
        let source = noisy(10, 8);
        let out = pixelate(&source, 0, 256, Dither::None).unwrap();
        assert_eq!(out.dimensions(), (10, 8));
    }

    #[test]
    fn test_color_count_bounds_output() {
        let source = noisy(60, 60);
        for n in [1usize, 2, 4, 8] {
            let out = pixelate(&source, 3, n, Dither::FloydSteinberg).unwrap();
            assert!(distinct_colors(&out).len() <= n);
        }
    }

    #[test]
    fn test_blocks_are_solid() {
        let source = noisy(48, 36);
        let block = 6;
        let out = pixelate(&source, block, 4, Dither::FloydSteinberg).unwrap();

        for by in 0..out.height() / block {
            for bx in 0..out.width() / block {
                let corner = out.get_pixel(bx * block, by * block);
                for dy in 0..block {
                    for dx in 0..block {
                        assert_eq!(out.get_pixel(bx * block + dx, by * block + dy), corner);
                    }
                }
            }
        }
    }

    #[test]
    fn test_few_colors_survive_unchanged() {
        // Two-colour source with blocks aligned to the grid: quantization is a no-op
        let source = RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                Rgba([250, 10, 10, 255])
            } else {
                Rgba([10, 10, 250, 255])
            }
        });
        let out = pixelate(&source, 2, 4, Dither::FloydSteinberg).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn test_block_larger_than_source_fails() {
        let source = noisy(5, 20);
        assert_eq!(
            pixelate(&source, 6, 4, Dither::None),
            Err(ResampleError::BlockTooLarge { block_size: 6, width: 5, height: 20 })
        );
    }

    #[test]
    fn test_upscale_factor_two() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 0]));

        let scaled = upscale(&image, 2);
        assert_eq!(scaled.dimensions(), (4, 2));
        assert_eq!(*scaled.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*scaled.get_pixel(2, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*scaled.get_pixel(3, 1), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_downscale_truncates() {
        let image = noisy(13, 9);
        let small = downscale(&image, 4).unwrap();
        assert_eq!(small.dimensions(), (3, 2));
        assert_eq!(small.get_pixel(1, 1), image.get_pixel(6, 6));
        assert!(downscale(&image, 10).is_none());
    }
}
