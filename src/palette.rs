//! Ordered, deduplicated colour palettes derived from images

use crate::color::Color;
use crate::quantize::{color_histogram, median_cut};
use image::RgbaImage;
use serde::Serialize;
use std::collections::HashSet;

/// An ordered set of unique colours.
///
/// Palettes are derived wholesale from an image and never edited in place.
/// The first entry is the brightest colour of the quantized table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ColorPalette {
    colors: Vec<Color>,
}

impl ColorPalette {
    /// Build a palette from a colour table, dropping repeats but keeping the
    /// first-seen order.
    pub fn from_colors(colors: impl IntoIterator<Item = Color>) -> Self {
        let mut seen = HashSet::new();
        let colors = colors.into_iter().filter(|c| seen.insert(*c)).collect();
        Self { colors }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    /// The colour-key entry used by transparent export.
    pub fn first(&self) -> Option<Color> {
        self.colors.first().copied()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Color> {
        self.colors.iter()
    }

    /// Hex strings in palette order.
    pub fn to_hex(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.to_hex()).collect()
    }
}

/// Quantize `image` to at most `color_count` colours and return the resulting
/// table as a palette.
///
/// A `color_count` of 0 is treated as 1. The result never holds more than
/// `color_count` entries; it may hold fewer when the image has fewer colours
/// or two quantization boxes collapse to the same average.
pub fn derive_palette(image: &RgbaImage, color_count: usize) -> ColorPalette {
    let histogram = color_histogram(image);
    let table = median_cut(&histogram, color_count.max(1));
    ColorPalette::from_colors(table)
}
