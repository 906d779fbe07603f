//! Font loading and text drawing.
//!
//! | Face | Crate / function |
//! |---|---|
//! | TrueType / OpenType (`.ttf`, `.otf`, `.ttc`) | `ab_glyph::FontVec`, outlines rasterised with coverage blending |
//! | Built-in fallback | [`builtin_font`](super::builtin_font) 5×7 bitmap, scaled by whole pixels |
//!
//! Text is positioned by its *ink box*: [`LabelFont::measure`] returns the
//! size of the painted area and [`LabelFont::draw`] puts that area's top-left
//! corner at the given point, so centring arithmetic is the same for both
//! faces.

use super::builtin_font::{self, CELL_H, CELL_W, GLYPH_H};
use super::draw::{blend_pixel, fill_block};
use ab_glyph::{Font, FontVec, OutlinedGlyph, PxScale, Rect, ScaleFont, point};
use image::{Rgb, RgbImage};
use std::path::Path;

/// Painted extent of a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBox {
    pub width: u32,
    pub height: u32,
}

/// A font file opened once per render; sized faces borrow from it.
pub enum FontSource {
    Outline(FontVec),
    Builtin,
}

impl FontSource {
    /// Open a font file, falling back to the built-in face if it can't be read
    /// or parsed.
    pub fn open(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!(
                    "cannot open font {}: {e}; using built-in font",
                    path.display()
                );
                return FontSource::Builtin;
            }
        };
        match FontVec::try_from_vec(bytes) {
            Ok(font) => {
                log::debug!("using font {}", path.display());
                FontSource::Outline(font)
            }
            Err(e) => {
                log::warn!(
                    "cannot parse font {}: {e}; using built-in font",
                    path.display()
                );
                FontSource::Builtin
            }
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FontSource::Builtin)
    }

    /// A face at `size` pixels.
    pub fn at_size(&self, size: u32) -> LabelFont<'_> {
        LabelFont {
            source: self,
            size: size.max(1),
        }
    }
}

/// A font at a fixed pixel size.
pub struct LabelFont<'a> {
    source: &'a FontSource,
    size: u32,
}

impl LabelFont<'_> {
    pub fn measure(&self, text: &str) -> TextBox {
        match self.source {
            FontSource::Outline(font) => {
                let glyphs = outline_glyphs(font, self.size, text);
                match ink_bounds(&glyphs) {
                    Some(b) => TextBox {
                        width: (b.max.x - b.min.x).ceil() as u32,
                        height: (b.max.y - b.min.y).ceil() as u32,
                    },
                    None => TextBox::default(),
                }
            }
            FontSource::Builtin => {
                let chars = text.chars().count() as u32;
                if chars == 0 {
                    return TextBox::default();
                }
                let k = builtin_pixel(self.size);
                TextBox {
                    width: (chars * CELL_W - 1) * k,
                    height: GLYPH_H * k,
                }
            }
        }
    }

    /// Draw `text` with its ink box's top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbImage, x: i64, y: i64, text: &str, color: Rgb<u8>) {
        match self.source {
            FontSource::Outline(font) => {
                let glyphs = outline_glyphs(font, self.size, text);
                let Some(bounds) = ink_bounds(&glyphs) else {
                    return;
                };
                for glyph in &glyphs {
                    let b = glyph.px_bounds();
                    let gx = x + (b.min.x - bounds.min.x).round() as i64;
                    let gy = y + (b.min.y - bounds.min.y).round() as i64;
                    glyph.draw(|px, py, coverage| {
                        blend_pixel(canvas, gx + px as i64, gy + py as i64, color, coverage);
                    });
                }
            }
            FontSource::Builtin => {
                let k = builtin_pixel(self.size);
                for (i, ch) in text.chars().enumerate() {
                    let Some(rows) = builtin_font::glyph(ch) else {
                        continue;
                    };
                    let cx = x + (i as u32 * CELL_W * k) as i64;
                    for (row, &bits) in rows.iter().enumerate() {
                        for col in 0..builtin_font::GLYPH_W {
                            if bits & (0x10 >> col) != 0 {
                                let px = cx + (col * k) as i64;
                                let py = y + (row as u32 * k) as i64;
                                fill_block(canvas, px, py, k, color);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Size of one bitmap-font pixel so a glyph cell is about `size` tall.
fn builtin_pixel(size: u32) -> u32 {
    (size / CELL_H).max(1)
}

/// Lay out `text` on a single line and outline every glyph that has ink.
fn outline_glyphs(font: &FontVec, size: u32, text: &str) -> Vec<OutlinedGlyph> {
    let scale = PxScale::from(size as f32);
    let scaled = font.as_scaled(scale);
    let mut caret = point(0.0, scaled.ascent());
    let mut previous = None;
    let mut glyphs = Vec::new();

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret.x += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, caret);
        caret.x += scaled.h_advance(id);
        previous = Some(id);
        if let Some(outlined) = font.outline_glyph(glyph) {
            glyphs.push(outlined);
        }
    }
    glyphs
}

fn ink_bounds(glyphs: &[OutlinedGlyph]) -> Option<Rect> {
    glyphs.iter().map(OutlinedGlyph::px_bounds).reduce(|a, b| Rect {
        min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
        max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn missing_font_falls_back_to_builtin() {
        let source = FontSource::open(Path::new("/nonexistent/font.ttf"));
        assert!(source.is_builtin());
    }

    #[test]
    fn unparseable_font_falls_back_to_builtin() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(FontSource::open(&path).is_builtin());
    }

    #[test]
    fn builtin_measure_scales_with_size() {
        let source = FontSource::Builtin;
        // 9px cell → 1px dots
        assert_eq!(
            source.at_size(9).measure("M31"),
            TextBox {
                width: 17,
                height: 7
            }
        );
        // 30px → 3px dots
        assert_eq!(
            source.at_size(30).measure("M31"),
            TextBox {
                width: 51,
                height: 21
            }
        );
    }

    #[test]
    fn builtin_tiny_size_still_draws() {
        let source = FontSource::Builtin;
        let font = source.at_size(2);
        assert_eq!(font.measure("M").height, 7);
    }

    #[test]
    fn empty_text_measures_zero() {
        let source = FontSource::Builtin;
        assert_eq!(source.at_size(30).measure(""), TextBox::default());
    }

    #[test]
    fn builtin_draw_stays_inside_measured_box() {
        let source = FontSource::Builtin;
        let font = source.at_size(18);
        let text = "M42";
        let b = font.measure(text);
        let mut canvas = RgbImage::new(100, 40);
        font.draw(&mut canvas, 10, 5, text, WHITE);

        let lit: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == WHITE)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        for (x, y) in lit {
            assert!(x >= 10 && x < 10 + b.width, "x={x}");
            assert!(y >= 5 && y < 5 + b.height, "y={y}");
        }
    }

    #[test]
    fn draw_off_canvas_does_not_panic() {
        let source = FontSource::Builtin;
        let mut canvas = RgbImage::new(10, 10);
        source
            .at_size(30)
            .draw(&mut canvas, -20, -20, "Progress: 0 / 110", WHITE);
        source.at_size(30).draw(&mut canvas, 8, 8, "M1", WHITE);
    }

    #[test]
    fn non_ascii_is_blank_but_keeps_width() {
        let source = FontSource::Builtin;
        let font = source.at_size(9);
        assert_eq!(font.measure("é").width, font.measure("M").width);
        let mut canvas = RgbImage::new(10, 10);
        font.draw(&mut canvas, 0, 0, "é", WHITE);
        assert!(canvas.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
