//! Shared test utilities for the astro-mosaic test suite.
//!
//! Provides synthetic image fixtures, small render parameters and pixel
//! predicates.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! create_test_jpeg(&tmp.path().join("M31.jpg"), 40, 30);
//!
//! let params = small_params(0.5);
//! let mosaic = render_mosaic(&params, &images).unwrap();
//! assert!(is_black(mosaic.image.get_pixel(0, 0)));
//! ```

use crate::config::Parameters;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Image fixtures
// =========================================================================

/// A gradient image so resizes and crops are visible.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

/// Write a small JPEG to `path`.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

/// Write a small PNG to `path`.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

// =========================================================================
// Parameters
// =========================================================================

/// Messier defaults at `scale`, drawing with the built-in font.
pub fn small_params(scale: f64) -> Parameters {
    Parameters {
        scale,
        font_path: PathBuf::from("/nonexistent/fonts/none.ttf"),
        ..Parameters::default()
    }
}

// =========================================================================
// Pixel predicates
// =========================================================================

pub fn is_black(pixel: &Rgb<u8>) -> bool {
    *pixel == Rgb([0, 0, 0])
}
