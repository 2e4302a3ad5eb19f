//! RGB colour triples used by palettes and paint operations
//!
//! Supports hex input in the following formats:
//! - `#RGB` - 3-digit hex, each digit is doubled
//! - `#RRGGBB` - 6-digit hex
//!
//! The leading `#` is optional.

use image::Rgba;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3 or 6 hex chars)
    #[error("invalid color length {0}, expected 3 or 6")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// An opaque 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Take the colour channels of a pixel, ignoring alpha.
    pub fn from_rgba(rgba: Rgba<u8>) -> Self {
        Self { r: rgba[0], g: rgba[1], b: rgba[2] }
    }

    /// Fully opaque pixel of this colour.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Rec. 601 luma, scaled to 0..=255000 to stay in integers.
    pub fn luma(self) -> u32 {
        self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114
    }

    /// Squared euclidean distance in RGB space.
    pub fn distance_sq(self, other: Color) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// True when every channel differs from `key` by less than `tolerance`.
    pub fn is_near(self, key: Color, tolerance: u8) -> bool {
        self.r.abs_diff(key.r) < tolerance
            && self.g.abs_diff(key.g) < tolerance
            && self.b.abs_diff(key.b) < tolerance
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_color(s)
    }
}

/// Parse a hex color string (`#RGB` or `#RRGGBB`, hash optional).
///
/// # Examples
///
/// ```
/// use pixedit::color::{parse_hex_color, Color};
///
/// assert_eq!(parse_hex_color("#F00").unwrap(), Color::new(255, 0, 0));
/// assert_eq!(parse_hex_color("00ff80").unwrap(), Color::new(0, 255, 128));
/// ```
pub fn parse_hex_color(s: &str) -> Result<Color, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let hex = s.strip_prefix('#').unwrap_or(s);

    let digits = hex.chars().map(parse_hex_digit).collect::<Result<Vec<u8>, _>>()?;

    match digits.as_slice() {
        [r, g, b] => Ok(Color::new(r * 17, g * 17, b * 17)),
        [r1, r0, g1, g0, b1, b0] => Ok(Color::new(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0)),
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}
