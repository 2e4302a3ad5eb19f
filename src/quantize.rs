//! Colour quantization using the median cut algorithm.
//!
//! Boxes of colours are split along their widest channel at the pixel-count
//! median until the requested number of boxes exists; each box contributes
//! its count-weighted average colour to the resulting table.

use crate::color::Color;
use image::RgbaImage;
use std::collections::HashMap;

/// A box of colors for median cut algorithm.
#[derive(Debug, Clone)]
struct ColorBox {
    colors: Vec<(Color, u32)>, // Color and count
}

impl ColorBox {
    fn new(colors: Vec<(Color, u32)>) -> Self {
        Self { colors }
    }

    /// Find which channel has the largest range.
    fn widest_channel(&self) -> Channel {
        let (mut min_r, mut max_r) = (255u8, 0u8);
        let (mut min_g, mut max_g) = (255u8, 0u8);
        let (mut min_b, mut max_b) = (255u8, 0u8);

        for (color, _) in &self.colors {
            min_r = min_r.min(color.r);
            max_r = max_r.max(color.r);
            min_g = min_g.min(color.g);
            max_g = max_g.max(color.g);
            min_b = min_b.min(color.b);
            max_b = max_b.max(color.b);
        }

        let range_r = max_r.saturating_sub(min_r);
        let range_g = max_g.saturating_sub(min_g);
        let range_b = max_b.saturating_sub(min_b);

        if range_r >= range_g && range_r >= range_b {
            Channel::Red
        } else if range_g >= range_b {
            Channel::Green
        } else {
            Channel::Blue
        }
    }

    /// Split the box into two along the widest channel.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let channel = self.widest_channel();

        // Stable sort keeps ties in their canonical order
        self.colors.sort_by_key(|(color, _)| match channel {
            Channel::Red => color.r,
            Channel::Green => color.g,
            Channel::Blue => color.b,
        });

        // Find median by pixel count
        let total: u64 = self.pixel_count();
        let mut running = 0u64;
        let mut split_idx = self.colors.len() / 2;

        for (i, (_, count)) in self.colors.iter().enumerate() {
            running += *count as u64;
            if running >= total / 2 {
                split_idx = i + 1;
                break;
            }
        }

        // Ensure we don't create empty boxes
        split_idx = split_idx.max(1).min(self.colors.len() - 1);

        let right = self.colors.split_off(split_idx);
        (ColorBox::new(self.colors), ColorBox::new(right))
    }

    /// Get the average color of this box (weighted by pixel count).
    fn average_color(&self) -> Color {
        let total = self.pixel_count();
        if total == 0 {
            return Color::new(0, 0, 0);
        }

        let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
        for (c, count) in &self.colors {
            r += c.r as u64 * *count as u64;
            g += c.g as u64 * *count as u64;
            b += c.b as u64 * *count as u64;
        }

        // Round to nearest rather than truncate
        Color::new(
            ((r + total / 2) / total) as u8,
            ((g + total / 2) / total) as u8,
            ((b + total / 2) / total) as u8,
        )
    }

    /// Total pixel count in this box.
    fn pixel_count(&self) -> u64 {
        self.colors.iter().map(|(_, count)| *count as u64).sum()
    }
}

#[derive(Debug, Clone, Copy)]
enum Channel {
    Red,
    Green,
    Blue,
}

/// Count how many pixels of each colour an image holds. Alpha is ignored.
pub fn color_histogram(image: &RgbaImage) -> HashMap<Color, u32> {
    let mut colors: HashMap<Color, u32> = HashMap::new();
    for pixel in image.pixels() {
        *colors.entry(Color::from_rgba(*pixel)).or_insert(0) += 1;
    }
    colors
}

/// Quantize a colour histogram down to at most `max_colors` entries.
///
/// When the histogram already holds `max_colors` or fewer colours they are
/// returned unchanged. The returned table is sorted by descending luma, ties
/// broken by channel value, so the result is deterministic for a given
/// histogram. It may contain duplicates when two boxes average to the same
/// colour; callers that need a set should deduplicate.
pub fn median_cut(colors: &HashMap<Color, u32>, max_colors: usize) -> Vec<Color> {
    let max_colors = max_colors.max(1);

    let mut entries: Vec<(Color, u32)> = colors.iter().map(|(c, n)| (*c, *n)).collect();
    entries.sort_by_key(|(c, _)| *c);

    let mut result: Vec<Color> = if entries.len() <= max_colors {
        entries.into_iter().map(|(c, _)| c).collect()
    } else {
        let mut boxes = vec![ColorBox::new(entries)];

        // Split until we have enough boxes
        while boxes.len() < max_colors {
            // Find the box with the most pixels to split
            let Some(idx) = boxes
                .iter()
                .enumerate()
                .filter(|(_, b)| b.colors.len() > 1)
                .max_by_key(|(_, b)| b.pixel_count())
                .map(|(i, _)| i)
            else {
                break;
            };

            let box_to_split = boxes.remove(idx);
            let (left, right) = box_to_split.split();
            boxes.push(left);
            boxes.push(right);
        }

        boxes.iter().map(ColorBox::average_color).collect()
    };

    result.sort_by(|a, b| b.luma().cmp(&a.luma()).then_with(|| b.cmp(a)));
    result
}

/// Index of the palette entry closest to `color` in RGB space.
///
/// Returns 0 for an empty palette.
pub fn find_closest_color(color: Color, palette: &[Color]) -> usize {
    palette
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| color.distance_sq(**p))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
