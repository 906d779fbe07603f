//! Writing the finished mosaic to disk.
//!
//! | Extension | Encoder |
//! |---|---|
//! | `.png` (and anything unrecognised) | `image::codecs::png` |
//! | `.jpg`, `.jpeg` | `image::codecs::jpeg` at quality 100 |
//! | `.tif`, `.tiff` | `image::codecs::tiff` |
//! | `.webp` | `image::codecs::webp` (lossless) |

use super::backend::BackendError;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

const JPEG_QUALITY: u8 = 100;

/// Output format chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Tiff,
    WebP,
}

impl OutputFormat {
    /// Unknown or missing extensions are written as PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("jpg" | "jpeg") => OutputFormat::Jpeg,
            Some("tif" | "tiff") => OutputFormat::Tiff,
            Some("webp") => OutputFormat::WebP,
            Some("png") => OutputFormat::Png,
            other => {
                log::warn!(
                    "unrecognised output extension {:?}; writing PNG to {}",
                    other.unwrap_or(""),
                    path.display()
                );
                OutputFormat::Png
            }
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::WebP => ImageFormat::WebP,
        }
    }
}

/// Save `canvas` to `path`, creating parent directories as needed.
pub fn save_image(canvas: &RgbImage, path: &Path) -> Result<(), BackendError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let format = OutputFormat::from_path(path);
    let processing = |e: image::ImageError| {
        BackendError::ProcessingFailed(format!("Failed to write {}: {}", path.display(), e))
    };

    match format {
        OutputFormat::Jpeg => {
            let writer = BufWriter::new(File::create(path)?);
            let encoder = JpegEncoder::new_with_quality(writer, JPEG_QUALITY);
            canvas.write_with_encoder(encoder).map_err(processing)
        }
        other => canvas
            .save_with_format(path, other.image_format())
            .map_err(processing),
    }
}
