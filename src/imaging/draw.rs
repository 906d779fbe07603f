//! Low-level drawing on the mosaic canvas.
//!
//! Coordinates are signed so callers can position things partly off-canvas;
//! every write is clipped to the canvas bounds.

use image::{Rgb, RgbImage};

/// Alpha-blend `color` over the pixel at `(x, y)` with `coverage` in `0.0..=1.0`.
pub fn blend_pixel(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let c = coverage.clamp(0.0, 1.0);
    if c == 0.0 {
        return;
    }
    let px = canvas.get_pixel_mut(x as u32, y as u32);
    for i in 0..3 {
        let blended = px[i] as f32 * (1.0 - c) + color[i] as f32 * c;
        px[i] = blended.round() as u8;
    }
}

/// Solid `size`×`size` block; the builtin font draws with these.
pub fn fill_block(canvas: &mut RgbImage, x: i64, y: i64, size: u32, color: Rgb<u8>) {
    for dy in 0..size as i64 {
        for dx in 0..size as i64 {
            blend_pixel(canvas, x + dx, y + dy, color, 1.0);
        }
    }
}

/// 1px outline of the rectangle whose corners are `(x0, y0)` and `(x1, y1)`,
/// both inclusive.
pub fn draw_rect_outline(canvas: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    for x in x0..=x1 {
        blend_pixel(canvas, x, y0, color, 1.0);
        blend_pixel(canvas, x, y1, color, 1.0);
    }
    for y in y0..=y1 {
        blend_pixel(canvas, x0, y, color, 1.0);
        blend_pixel(canvas, x1, y, color, 1.0);
    }
}

/// Copy `tile` onto the canvas with its top-left corner at `(x, y)`.
pub fn paste(canvas: &mut RgbImage, tile: &RgbImage, x: i64, y: i64) {
    image::imageops::replace(canvas, tile, x, y);
}
