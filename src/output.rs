//! PNG output and file path generation

use chrono::Local;
use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
    /// Nothing to write
    Empty,
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
            OutputError::Empty => write!(f, "no frames to write"),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
            OutputError::Empty => None,
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

/// Create the parent directory of `path` if it doesn't exist yet.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image to a PNG file.
///
/// # Arguments
///
/// * `image` - The image to save
/// * `path` - The output file path
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(OutputError)` on failure
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent_dir(path)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Local-time file stem used when no output name is given, e.g. `20240131235959`.
pub fn timestamp_stem() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// Generate the output path for an export.
///
/// # Output Naming Rules
///
/// | Scenario | Output |
/// |----------|--------|
/// | No name | `{out_dir}/{timestamp}.{ext}` |
/// | `-o name` with `force_ext` | `name.{ext}` (extension appended when missing) |
/// | `-o name.other` without `force_ext` | `name.other` |
/// | `-o dir/` | `dir/{timestamp}.{ext}` |
///
/// # Arguments
///
/// * `requested` - The `-o` argument value, if provided
/// * `out_dir` - Directory for default-named files
/// * `ext` - Extension of the format being written, without the dot
/// * `force_ext` - Append `ext` to a requested name lacking it
pub fn resolve_output_path(
    requested: Option<&Path>,
    out_dir: &Path,
    ext: &str,
    force_ext: bool,
) -> PathBuf {
    match requested {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                return output.join(format!("{}.{}", timestamp_stem(), ext));
            }

            let has_ext = output
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext));
            if force_ext && !has_ext {
                let mut name = output.as_os_str().to_os_string();
                name.push(format!(".{}", ext));
                PathBuf::from(name)
            } else {
                output.to_path_buf()
            }
        }
        None => out_dir.join(format!("{}.{}", timestamp_stem(), ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_explicit_name_kept() {
        let path = resolve_output_path(Some(Path::new("art.png")), Path::new("."), "png", true);
        assert_eq!(path, PathBuf::from("art.png"));
    }

    #[test]
    fn test_resolve_appends_missing_extension() {
        let path = resolve_output_path(Some(Path::new("out/art")), Path::new("."), "png", true);
        assert_eq!(path, PathBuf::from("out/art.png"));

        let path = resolve_output_path(Some(Path::new("art.jpg")), Path::new("."), "png", true);
        assert_eq!(path, PathBuf::from("art.jpg.png"));
    }

    #[test]
    fn test_resolve_without_force_keeps_other_extension() {
        let path = resolve_output_path(Some(Path::new("art.bmp")), Path::new("."), "png", false);
        assert_eq!(path, PathBuf::from("art.bmp"));
    }

    #[test]
    fn test_resolve_default_is_timestamped() {
        let path = resolve_output_path(None, Path::new("renders"), "gif", false);
        assert_eq!(path.parent(), Some(Path::new("renders")));

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with(".gif"));
        let stem = name.trim_end_matches(".gif");
        assert_eq!(stem.len(), 14);
        assert!(stem.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_resolve_directory_target() {
        let path = resolve_output_path(Some(Path::new("frames/")), Path::new("."), "png", true);
        assert_eq!(path.parent(), Some(Path::new("frames")));
        assert!(path.to_string_lossy().ends_with(".png"));
    }

    #[test]
    fn test_save_png_basic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");

        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 1, Rgba([0, 0, 0, 0]));

        save_png(&image, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (2, 2));
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*loaded.get_pixel(1, 1), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_save_png_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dirs/test.png");

        save_png(&RgbaImage::new(1, 1), &path).unwrap();
        assert!(path.exists());
    }
}
