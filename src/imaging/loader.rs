//! Directory image loader.
//!
//! | Step | Crate / function |
//! |---|---|
//! | List folder | `std::fs::read_dir`, sorted by file name |
//! | Match name | [`naming::catalog_number`](crate::naming::catalog_number) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//!
//! Files are visited in file-name order, so when two files name the same
//! catalog number (`M31.jpg`, `M31_wide.png`) the one sorting last wins,
//! on every platform.

use super::backend::{BackendError, ImageLoader, ImageMap};
use crate::naming;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Decode an image from disk.
pub fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Loads catalog images from a single folder (not recursive).
pub struct DirectoryLoader;

impl DirectoryLoader {
    pub fn new() -> Self {
        Self
    }

    /// Files in `folder` that look like images of catalog items, with their
    /// numbers, in file-name order.
    pub fn candidates(folder: &Path, prefix: &str) -> Vec<(u32, PathBuf)> {
        let entries = match fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("cannot read image folder {}: {e}", folder.display());
                return Vec::new();
            }
        };

        let mut files: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                Some((name, entry.path()))
            })
            .collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));

        files
            .into_iter()
            .filter(|(_, path)| has_supported_extension(path))
            .filter_map(|(name, path)| Some((naming::catalog_number(&name, prefix)?, path)))
            .collect()
    }
}

impl Default for DirectoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader for DirectoryLoader {
    fn load_images(&self, folder: &Path, prefix: &str) -> ImageMap {
        let mut images = ImageMap::new();
        if folder.as_os_str().is_empty() {
            log::info!("no image folder configured; drawing placeholders only");
            return images;
        }

        for (number, path) in Self::candidates(folder, prefix) {
            match load_image(&path) {
                Ok(img) => {
                    log::debug!("loaded {} as {prefix}{number}", path.display());
                    if images.insert(number, img).is_some() {
                        log::warn!(
                            "several images for {prefix}{number}; using {}",
                            path.display()
                        );
                    }
                }
                Err(e) => log::warn!("skipping {}: {e}", path.display()),
            }
        }

        log::info!(
            "loaded {} image(s) from {}",
            images.len(),
            folder.display()
        );
        images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_jpeg, create_test_png};
    use tempfile::TempDir;

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "tif", "tiff", "webp"] {
            assert!(exts.contains(expected), "expected {expected}");
        }
    }

    #[test]
    fn loads_matching_files_only() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("M1.jpg"), 40, 30);
        create_test_png(&tmp.path().join("M_42_orion.png"), 20, 20);
        create_test_jpeg(&tmp.path().join("C20.jpg"), 40, 30);
        create_test_jpeg(&tmp.path().join("holiday.jpg"), 40, 30);
        fs::write(tmp.path().join("M2.txt"), "notes").unwrap();

        let images = DirectoryLoader::new().load_images(tmp.path(), "M");
        let keys: Vec<u32> = images.keys().copied().collect();
        assert_eq!(keys, vec![1, 42]);
        assert_eq!(images[&1].width(), 40);
        assert_eq!(images[&42].height(), 20);
    }

    #[test]
    fn prefix_selects_catalog() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("M20.jpg"), 10, 10);
        create_test_jpeg(&tmp.path().join("C 20.jpg"), 12, 12);

        let images = DirectoryLoader::new().load_images(tmp.path(), "C");
        assert_eq!(images.len(), 1);
        assert_eq!(images[&20].width(), 12);
    }

    #[test]
    fn uppercase_extensions_are_accepted() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("M3.JPG"), 10, 10);
        let images = DirectoryLoader::new().load_images(tmp.path(), "M");
        assert!(images.contains_key(&3));
    }

    #[test]
    fn corrupt_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("M5.jpg"), b"definitely not a jpeg").unwrap();
        create_test_jpeg(&tmp.path().join("M6.jpg"), 10, 10);

        let images = DirectoryLoader::new().load_images(tmp.path(), "M");
        assert!(!images.contains_key(&5));
        assert!(images.contains_key(&6));
    }

    #[test]
    fn missing_folder_gives_empty_map() {
        let images =
            DirectoryLoader::new().load_images(Path::new("/nonexistent/astro/folder"), "M");
        assert!(images.is_empty());
    }

    #[test]
    fn empty_folder_path_gives_empty_map() {
        let images = DirectoryLoader::new().load_images(Path::new(""), "M");
        assert!(images.is_empty());
    }

    #[test]
    fn duplicate_numbers_last_file_name_wins() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("M31.jpg"), 10, 10);
        create_test_jpeg(&tmp.path().join("M31_wide.jpg"), 30, 10);

        let images = DirectoryLoader::new().load_images(tmp.path(), "M");
        assert_eq!(images.len(), 1);
        assert_eq!(images[&31].width(), 30);
    }

    #[test]
    fn subdirectories_are_not_scanned() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("M7.jpg")).unwrap();
        let nested = tmp.path().join("more");
        fs::create_dir(&nested).unwrap();
        create_test_jpeg(&nested.join("M8.jpg"), 10, 10);

        let images = DirectoryLoader::new().load_images(tmp.path(), "M");
        assert!(images.is_empty());
    }

    #[test]
    fn candidates_are_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        for name in ["M9.jpg", "M10.jpg", "M1.jpg"] {
            create_test_jpeg(&tmp.path().join(name), 4, 4);
        }
        let numbers: Vec<u32> = DirectoryLoader::candidates(tmp.path(), "M")
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(numbers, vec![1, 10, 9]);
    }

    #[test]
    fn load_image_nonexistent_errors() {
        assert!(matches!(
            load_image(Path::new("/nonexistent/M1.jpg")),
            Err(BackendError::Io(_))
        ));
    }
}
