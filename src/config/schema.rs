//! Configuration schema for `pxe.toml`
//!
//! Defines the structure and validation for editor configuration files.

use crate::dither::Dither;
use crate::editor::{DEFAULT_BLOCK_SIZE, DEFAULT_COLOR_COUNT};
use crate::export::{AnimationOptions, DEFAULT_KEY_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest colour budget accepted from configuration.
pub const MAX_COLOR_COUNT: usize = 256;

/// Editor section - starting parameters for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Pixel block size (must be >= 1)
    #[serde(default = "default_block_size")]
    pub block_size: u32,
    /// Palette size (1..=256)
    #[serde(default = "default_color_count")]
    pub color_count: usize,
    #[serde(default)]
    pub dither: Dither,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            color_count: default_color_count(),
            dither: Dither::default(),
        }
    }
}

fn default_block_size() -> u32 {
    DEFAULT_BLOCK_SIZE
}

fn default_color_count() -> usize {
    DEFAULT_COLOR_COUNT
}

/// Export section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for timestamp-named exports
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Per-channel colour-key tolerance for transparent exports
    #[serde(default = "default_key_tolerance")]
    pub key_tolerance: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { out_dir: default_out_dir(), key_tolerance: default_key_tolerance() }
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_key_tolerance() -> u8 {
    DEFAULT_KEY_TOLERANCE
}

/// Complete pxe.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PxeConfig {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub animation: AnimationOptions,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "editor.block_size")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pxe.toml: '{}' {}", self.field, self.message)
    }
}

impl PxeConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message: message.to_string(),
            });
        };

        if self.editor.block_size == 0 {
            push("editor.block_size", "must be a positive integer");
        }

        if self.editor.color_count == 0 || self.editor.color_count > MAX_COLOR_COUNT {
            push("editor.color_count", "must be between 1 and 256");
        }

        if self.animation.frames == 0 {
            push("animation.frames", "must be a positive integer");
        }

        if self.animation.frame_duration_ms < 10 {
            push("animation.frame_duration_ms", "must be at least 10");
        }

        errors
    }
}
