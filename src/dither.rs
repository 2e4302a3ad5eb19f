//! Dithering while mapping pixels onto a reduced palette
//!
//! Error diffusion (Floyd-Steinberg) pushes each pixel's quantization error
//! onto its unvisited neighbours; ordered dithering perturbs each pixel by a
//! Bayer threshold before picking the nearest palette entry.

use crate::color::Color;
use crate::quantize::find_closest_color;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// How quantization error is spread when mapping onto a palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Dither {
    /// Plain nearest-colour mapping (hard banding)
    #[serde(rename = "none")]
    #[value(name = "none")]
    None,
    /// Floyd-Steinberg error diffusion
    #[default]
    #[serde(rename = "floyd-steinberg")]
    #[value(name = "floyd-steinberg")]
    FloydSteinberg,
    /// 4x4 Bayer ordered dither (16 threshold levels)
    #[serde(rename = "ordered-4x4")]
    #[value(name = "ordered-4x4")]
    Ordered4x4,
    /// 8x8 Bayer ordered dither (64 threshold levels)
    #[serde(rename = "ordered-8x8")]
    #[value(name = "ordered-8x8")]
    Ordered8x8,
}

// 4x4 Bayer matrix, entries out of 16
const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

// 8x8 Bayer matrix, entries out of 64
const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

impl Dither {
    /// Threshold at a given position in 0.0..1.0, or `None` for non-ordered modes.
    pub fn threshold_at(&self, x: u32, y: u32) -> Option<f32> {
        match self {
            Dither::Ordered4x4 => Some(BAYER_4X4[(y % 4) as usize][(x % 4) as usize] as f32 / 16.0),
            Dither::Ordered8x8 => Some(BAYER_8X8[(y % 8) as usize][(x % 8) as usize] as f32 / 64.0),
            Dither::None | Dither::FloydSteinberg => None,
        }
    }

    /// Map every pixel of `image` onto `palette`. Alpha is carried through.
    ///
    /// An empty palette leaves the image untouched.
    pub fn apply(&self, image: &RgbaImage, palette: &[Color]) -> RgbaImage {
        if palette.is_empty() {
            return image.clone();
        }
        match self {
            Dither::FloydSteinberg => floyd_steinberg(image, palette),
            Dither::None | Dither::Ordered4x4 | Dither::Ordered8x8 => {
                let spread = 255.0 / palette.len().max(2) as f32;
                let mut out = image.clone();
                for (x, y, pixel) in out.enumerate_pixels_mut() {
                    let offset = self.threshold_at(x, y).map(|t| (t - 0.5) * spread).unwrap_or(0.0);
                    let shifted = Color::new(
                        clamp_channel(pixel[0] as f32 + offset),
                        clamp_channel(pixel[1] as f32 + offset),
                        clamp_channel(pixel[2] as f32 + offset),
                    );
                    let chosen = palette[find_closest_color(shifted, palette)];
                    *pixel = Rgba([chosen.r, chosen.g, chosen.b, pixel[3]]);
                }
                out
            }
        }
    }
}

fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Floyd-Steinberg error diffusion, scanning left to right, top to bottom.
///
/// Error weights: 7/16 right, 3/16 below-left, 5/16 below, 1/16 below-right.
fn floyd_steinberg(image: &RgbaImage, palette: &[Color]) -> RgbaImage {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let mut error = vec![[0.0f32; 3]; w * h];
    let mut out = image.clone();

    for y in 0..h {
        for x in 0..w {
            let pixel = *image.get_pixel(x as u32, y as u32);
            let carried = error[y * w + x];
            let wanted = [
                pixel[0] as f32 + carried[0],
                pixel[1] as f32 + carried[1],
                pixel[2] as f32 + carried[2],
            ];
            let target =
                Color::new(clamp_channel(wanted[0]), clamp_channel(wanted[1]), clamp_channel(wanted[2]));
            let chosen = palette[find_closest_color(target, palette)];
            out.put_pixel(x as u32, y as u32, Rgba([chosen.r, chosen.g, chosen.b, pixel[3]]));

            let diff = [
                wanted[0] - chosen.r as f32,
                wanted[1] - chosen.g as f32,
                wanted[2] - chosen.b as f32,
            ];
            let mut spread = |nx: isize, ny: usize, weight: f32| {
                if nx < 0 || nx as usize >= w || ny >= h {
                    return;
                }
                let cell = &mut error[ny * w + nx as usize];
                for c in 0..3 {
                    cell[c] += diff[c] * weight;
                }
            };
            let xi = x as isize;
            spread(xi + 1, y, 7.0 / 16.0);
            spread(xi - 1, y + 1, 3.0 / 16.0);
            spread(xi, y + 1, 5.0 / 16.0);
            spread(xi + 1, y + 1, 1.0 / 16.0);
        }
    }

    out
}
