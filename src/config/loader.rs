//! Configuration loading and discovery for `pxe.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PxeConfig;
use crate::dither::Dither;
use crate::editor::EditorSettings;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during discovery.
pub const CONFIG_FILE_NAME: &str = "pxe.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse pxe.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub block_size: Option<u32>,
    pub color_count: Option<usize>,
    pub dither: Option<Dither>,
    /// Override output directory
    pub out_dir: Option<PathBuf>,
    pub key_tolerance: Option<u8>,
    pub frames: Option<usize>,
    pub pause_frames: Option<usize>,
    pub frame_duration_ms: Option<u32>,
    pub mirror: Option<bool>,
}

/// Find pxe.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for pxe.toml
/// 2. Check XDG_CONFIG_HOME/pixedit/pxe.toml (or ~/.config/pixedit/pxe.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find pxe.toml in XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("pixedit").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find pxe.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a pxe.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("art/pxe.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<PxeConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            tracing::debug!("using config {}", p.display());
            load_config_file(&p)
        }
        None => Ok(PxeConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<PxeConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: PxeConfig = toml::from_str(&contents)?;
    ensure_valid(&config)?;
    Ok(config)
}

fn ensure_valid(config: &PxeConfig) -> Result<(), ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(())
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The merged result
/// is validated again, so a bad flag is reported the same way a bad file is.
///
/// # Example
/// ```ignore
/// let mut config = load_config(None)?;
/// let overrides = CliOverrides { block_size: Some(8), ..Default::default() };
/// merge_cli_overrides(&mut config, &overrides)?;
/// ```
pub fn merge_cli_overrides(config: &mut PxeConfig, overrides: &CliOverrides) -> Result<(), ConfigError> {
    if let Some(block_size) = overrides.block_size {
        config.editor.block_size = block_size;
    }
    if let Some(color_count) = overrides.color_count {
        config.editor.color_count = color_count;
    }
    if let Some(dither) = overrides.dither {
        config.editor.dither = dither;
    }

    if let Some(ref out_dir) = overrides.out_dir {
        config.export.out_dir = out_dir.clone();
    }
    if let Some(key_tolerance) = overrides.key_tolerance {
        config.export.key_tolerance = key_tolerance;
    }

    if let Some(frames) = overrides.frames {
        config.animation.frames = frames;
    }
    if let Some(pause_frames) = overrides.pause_frames {
        config.animation.pause_frames = pause_frames;
    }
    if let Some(frame_duration_ms) = overrides.frame_duration_ms {
        config.animation.frame_duration_ms = frame_duration_ms;
    }
    if let Some(mirror) = overrides.mirror {
        config.animation.mirror = mirror;
    }

    ensure_valid(config)
}

impl PxeConfig {
    /// Starting parameters for an editor session.
    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            block_size: self.editor.block_size,
            color_count: self.editor.color_count,
            dither: self.editor.dither,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &[u8]) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents)
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[editor]\nblock_size = 4");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[editor]\nblock_size = 4");

        let subdir = temp.path().join("art").join("sprites");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    #[serial]
    fn test_find_xdg_config() {
        let temp = TempDir::new().expect("should create temp dir");
        let app_dir = temp.path().join("pixedit");
        fs::create_dir_all(&app_dir).expect("should create config dir");
        let config_path = write_config(&app_dir, b"");

        let previous = env::var_os("XDG_CONFIG_HOME");
        env::set_var("XDG_CONFIG_HOME", temp.path());
        let found = find_xdg_config();
        match previous {
            Some(value) => env::set_var("XDG_CONFIG_HOME", value),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }

        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            br#"
[editor]
block_size = 3
color_count = 8

[export]
key_tolerance = 5
"#,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.editor.block_size, 3);
        assert_eq!(config.editor.color_count, 8);
        assert_eq!(config.export.key_tolerance, 5);
        assert_eq!(config.animation.frames, 19);
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"this is not valid toml {{{");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[editor]\nblock_size = 0\ncolor_count = 0\n");

        match load_config(Some(&config_path)) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = PxeConfig::default();
        let overrides = CliOverrides {
            block_size: Some(10),
            dither: Some(Dither::None),
            out_dir: Some(PathBuf::from("renders")),
            mirror: Some(true),
            ..Default::default()
        };

        merge_cli_overrides(&mut config, &overrides).expect("overrides should be valid");
        assert_eq!(config.editor.block_size, 10);
        assert_eq!(config.editor.color_count, 4);
        assert_eq!(config.editor.dither, Dither::None);
        assert_eq!(config.export.out_dir, PathBuf::from("renders"));
        assert!(config.animation.mirror);
    }

    #[test]
    fn test_merge_cli_overrides_revalidates() {
        let mut config = PxeConfig::default();
        let overrides = CliOverrides { color_count: Some(1000), ..Default::default() };

        let result = merge_cli_overrides(&mut config, &overrides);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_editor_settings() {
        let mut config = PxeConfig::default();
        config.editor.block_size = 9;
        let settings = config.editor_settings();
        assert_eq!(settings.block_size, 9);
        assert_eq!(settings.color_count, 4);
    }
}
