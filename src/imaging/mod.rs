//! Pixel work in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Load** | `image::ImageReader` over one folder, names parsed by [`naming`](crate::naming) |
//! | **Fill + crop** | `resize_to_fill`-style math + `imageops::crop_imm` |
//! | **Text** | `ab_glyph` outlines, built-in 5×7 bitmap fallback |
//! | **Save** | `image` encoders chosen by extension |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Backend**: [`ImageLoader`] trait + [`DirectoryLoader`]
//! - **Draw / Text**: clipped pixel writes and label rendering on an `RgbImage`
//! - **Encode**: output format selection and saving

pub mod backend;
mod builtin_font;
pub mod calculations;
pub mod draw;
pub mod encode;
pub mod loader;
pub mod text;

pub use backend::{BackendError, ImageLoader, ImageMap};
pub use encode::{OutputFormat, save_image};
pub use loader::{DirectoryLoader, load_image, supported_input_extensions};
pub use text::{FontSource, LabelFont, TextBox};

use image::{DynamicImage, RgbImage, imageops};

/// Aspect-fill `img` into `target` and crop the centre.
///
/// The result is exactly `target` pixels; the source aspect ratio is kept
/// and whatever overflows is cut equally from both sides.
pub fn fill_crop(img: &DynamicImage, target: (u32, u32)) -> RgbImage {
    let (w, h) = (target.0.max(1), target.1.max(1));
    let filled_dims = calculations::calculate_fill_dimensions((img.width(), img.height()), (w, h));
    let filled = img
        .resize_exact(filled_dims.0, filled_dims.1, imageops::FilterType::Lanczos3)
        .to_rgb8();
    let (ox, oy) = calculations::center_crop_offset(filled_dims, (w, h));
    imageops::crop_imm(&filled, ox, oy, w, h).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn fill_crop_hits_exact_target() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([9, 9, 9])));
        let out = fill_crop(&img, (299, 599));
        assert_eq!(out.dimensions(), (299, 599));
    }

    #[test]
    fn fill_crop_keeps_centre_of_wide_source() {
        // Left half red, right half blue; a square crop of the centre shows both
        let mut src = RgbImage::from_pixel(200, 100, Rgb([255, 0, 0]));
        for y in 0..100 {
            for x in 100..200 {
                src.put_pixel(x, y, Rgb([0, 0, 255]));
            }
        }
        let out = fill_crop(&DynamicImage::ImageRgb8(src), (50, 50));
        assert!(out.get_pixel(2, 25)[0] > 200);
        assert!(out.get_pixel(47, 25)[2] > 200);
    }

    #[test]
    fn fill_crop_zero_target_is_clamped() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(10, 10));
        assert_eq!(fill_crop(&img, (0, 0)).dimensions(), (1, 1));
    }
}
