//! Mosaic rendering.
//!
//! Turns a [`LayoutPlan`] plus the loaded photographs into one RGB canvas:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │              Messier Catalog          │  title band (row 0)
//! │ ┌────┬────┬─────────┬────┬────┬────┐ │
//! │ │ M1 │ M2 │         │ M3 │ M4 │ M5 │ │  photo cells: cropped image,
//! │ ├────┼────┤  M8, M20├────┼────┼────┤ │  label near the bottom
//! │ │ M6 │ M7 │         │ M9 │M10 │M11 │ │
//! │ ├────┼────┼─────────┼────┼────┴────┤ │  placeholders: label centred
//! │ │... │    │         │    │Progress │ │  readout in the last two cells
//! │ └────┴────┴─────────┴────┴─────────┘ │
//! └──────────────────────────────────────┘
//! ```
//!
//! Drawing order matters: grid outline, title, then each region (photo, label,
//! border on top), then the progress readout.

use crate::catalog::Catalog;
use crate::config::Parameters;
use crate::imaging::calculations::center_start;
use crate::imaging::draw::{draw_rect_outline, paste};
use crate::imaging::{
    BackendError, DirectoryLoader, FontSource, ImageLoader, ImageMap, LabelFont, fill_crop,
    save_image,
};
use crate::layout::{LayoutError, LayoutPlan, Placement, plan_layout};
use crate::special::SpecialObject;
use image::{Rgb, RgbImage};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MosaicError {
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Mosaic of {width}×{height}px exceeds {max} pixels", max = MAX_CANVAS_PIXELS)]
    CanvasTooLarge { width: u32, height: u32 },
    #[error("Failed to save mosaic: {0}")]
    Save(#[from] BackendError),
}

/// Largest canvas, in pixels, a render will allocate (3 GiB of RGB).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 30;

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BORDER_COLOR: Rgb<u8> = Rgb([128, 128, 128]);
/// Cells the progress readout is centred across.
const PROGRESS_SPAN: u32 = 2;

/// Scaled pixel metrics for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub thumb: u32,
    pub padding: u32,
    pub label_bottom_space: u32,
}

impl Metrics {
    pub fn from_params(params: &Parameters) -> Self {
        Self {
            thumb: params.thumb_size(),
            padding: params.padding(),
            label_bottom_space: params.label_bottom_space(),
        }
    }

    /// Pixel rectangle `(x, y, w, h)` of a region in grid cells.
    pub fn region_rect(
        &self,
        col: u32,
        row: u32,
        width: u32,
        height: u32,
    ) -> (i64, i64, u32, u32) {
        (
            col as i64 * self.thumb as i64 + self.padding as i64,
            row as i64 * self.thumb as i64 + self.padding as i64,
            width.saturating_mul(self.thumb),
            height.saturating_mul(self.thumb),
        )
    }
}

/// Canvas size for a `cols × rows` grid.
pub fn canvas_size(cols: u32, rows: u32, metrics: &Metrics) -> (u32, u32) {
    let pad = metrics.padding.saturating_mul(2);
    (
        cols.saturating_mul(metrics.thumb).saturating_add(pad),
        rows.saturating_mul(metrics.thumb).saturating_add(pad),
    )
}

/// A `width × height` RGB canvas, if it stays within [`MAX_CANVAS_PIXELS`].
fn allocate_canvas(width: u32, height: u32) -> Result<RgbImage, MosaicError> {
    let pixels = u64::from(width) * u64::from(height);
    let fits = pixels <= MAX_CANVAS_PIXELS
        && usize::try_from(pixels * 3).is_ok_and(|bytes| bytes <= isize::MAX as usize);
    if !fits {
        return Err(MosaicError::CanvasTooLarge { width, height });
    }
    Ok(RgbImage::new(width, height))
}

/// Pixel size of the mosaic these parameters would produce.
pub fn mosaic_dimensions(params: &Parameters) -> Result<(u32, u32), LayoutError> {
    let plan = plan_layout(
        params.grid_cols,
        params.effective_layout(),
        params.catalog.count(),
    )?;
    Ok(canvas_size(plan.cols, plan.rows, &Metrics::from_params(params)))
}

/// How many catalog items the loaded photographs account for.
///
/// A photograph of any member of a special group counts for the whole group.
/// Each photograph is counted on its own, so a group with two loaded members
/// counts twice; the figure is a completeness readout, not a unique count.
pub fn count_loaded(images: &ImageMap, specials: &[SpecialObject]) -> u32 {
    images
        .keys()
        .map(|&number| {
            specials
                .iter()
                .find(|s| s.contains(number))
                .map_or(1, SpecialObject::objects)
        })
        .sum()
}

/// Catalog items whose region shows no photograph, ascending.
///
/// A region with a photograph of any member counts for all its members.
pub fn missing_items(plan: &LayoutPlan, images: &ImageMap, total: u32) -> Vec<u32> {
    let missing: BTreeSet<u32> = plan
        .placements
        .iter()
        .filter(|p| !p.numbers.iter().any(|n| images.contains_key(n)))
        .flat_map(|p| p.numbers.iter().copied())
        .filter(|n| (1..=total).contains(n))
        .collect();
    missing.into_iter().collect()
}

/// Label for a region: `"M8, M20"`.
pub fn region_label(catalog: Catalog, numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|&n| catalog.label(n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Draw one placed region: photograph or placeholder, label, border.
///
/// Uses the first number, in the region's own order, that has a photograph.
pub fn render_region(
    canvas: &mut RgbImage,
    placement: &Placement,
    images: &ImageMap,
    catalog: Catalog,
    metrics: &Metrics,
    font: &LabelFont<'_>,
) {
    let (x, y, w, h) =
        metrics.region_rect(placement.col, placement.row, placement.width, placement.height);
    let label = region_label(catalog, &placement.numbers);
    let text = font.measure(&label);
    let photo = placement.numbers.iter().find_map(|n| images.get(n));

    match photo {
        Some(img) => {
            let tile = fill_crop(img, (w.saturating_sub(1), h.saturating_sub(1)));
            paste(canvas, &tile, x + 1, y + 1);
            let tx = center_start(x, w, text.width);
            let ty = y + h as i64 - text.height as i64 - metrics.label_bottom_space as i64;
            font.draw(canvas, tx, ty, &label, TEXT_COLOR);
        }
        None => {
            let tx = center_start(x, w, text.width);
            let ty = center_start(y, h, text.height);
            font.draw(canvas, tx, ty, &label, TEXT_COLOR);
        }
    }

    draw_rect_outline(canvas, x, y, x + w as i64, y + h as i64, BORDER_COLOR);
}

/// Centre `title` across the canvas in the title band.
pub fn render_title(canvas: &mut RgbImage, title: &str, font: &LabelFont<'_>, metrics: &Metrics) {
    if title.is_empty() {
        return;
    }
    let text = font.measure(title);
    let x = center_start(0, canvas.width(), text.width);
    let y = center_start(metrics.padding as i64, metrics.thumb, text.height);
    font.draw(canvas, x, y, title, TEXT_COLOR);
}

/// Draw `"Progress: loaded / total"` in the last row's two rightmost cells.
///
/// Returns whether anything was drawn: a complete catalog gets no readout.
pub fn render_progress(
    canvas: &mut RgbImage,
    loaded: u32,
    total: u32,
    plan: &LayoutPlan,
    font: &LabelFont<'_>,
    metrics: &Metrics,
) -> bool {
    if loaded >= total {
        return false;
    }
    let span = PROGRESS_SPAN.min(plan.cols);
    let (x, y, w, h) = metrics.region_rect(
        plan.cols - span,
        plan.rows.saturating_sub(1),
        span,
        1,
    );
    let label = progress_text(loaded, total);
    let text = font.measure(&label);
    font.draw(
        canvas,
        center_start(x, w, text.width),
        center_start(y, h, text.height),
        &label,
        TEXT_COLOR,
    );
    true
}

pub fn progress_text(loaded: u32, total: u32) -> String {
    format!("Progress: {loaded} / {total}")
}

/// A rendered mosaic and what went into it.
#[derive(Debug, Clone)]
pub struct Mosaic {
    pub image: RgbImage,
    pub plan: LayoutPlan,
    pub loaded: u32,
    pub total: u32,
    pub progress_drawn: bool,
    /// Catalog items drawn as placeholders; see [`missing_items`].
    pub missing: Vec<u32>,
}

/// Render a mosaic from photographs already in memory. Nothing is written.
pub fn render_mosaic(params: &Parameters, images: &ImageMap) -> Result<Mosaic, MosaicError> {
    let catalog = params.catalog;
    let total = catalog.count();
    let specials = params.effective_layout();
    let plan = plan_layout(params.grid_cols, specials, total)?;
    let metrics = Metrics::from_params(params);
    let (width, height) = canvas_size(plan.cols, plan.rows, &metrics);

    log::info!(
        "rendering {} mosaic: {}×{} cells, {width}×{height}px",
        catalog.title(),
        plan.cols,
        plan.rows
    );

    let mut canvas = allocate_canvas(width, height)?;

    let fonts = FontSource::open(&params.font_path);
    let label_font = fonts.at_size(params.font_size());
    let title_font = fonts.at_size(params.title_font_size());

    // Grid outline below the title band
    let pad = metrics.padding as i64;
    let thumb = metrics.thumb as i64;
    draw_rect_outline(
        &mut canvas,
        pad,
        pad + thumb,
        pad + plan.cols as i64 * thumb,
        pad + plan.rows as i64 * thumb,
        BORDER_COLOR,
    );

    render_title(&mut canvas, &params.title, &title_font, &metrics);

    for placement in &plan.placements {
        render_region(&mut canvas, placement, images, catalog, &metrics, &label_font);
    }

    let loaded = count_loaded(images, specials);
    let progress_drawn = params.show_progress
        && render_progress(&mut canvas, loaded, total, &plan, &label_font, &metrics);

    let missing = missing_items(&plan, images, total);

    Ok(Mosaic {
        image: canvas,
        plan,
        loaded,
        total,
        progress_drawn,
        missing,
    })
}

/// Load photographs with `loader`, render, and save to `params.output_file`.
pub fn build_mosaic_with(
    params: &Parameters,
    loader: &impl ImageLoader,
) -> Result<Mosaic, MosaicError> {
    let images = loader.load_images(&params.input_folder, params.catalog.prefix());
    let mosaic = render_mosaic(params, &images)?;
    save_image(&mosaic.image, &params.output_file)?;
    log::info!("saved {}", params.output_file.display());
    Ok(mosaic)
}

/// [`build_mosaic_with`] reading photographs from `params.input_folder`.
pub fn build_mosaic(params: &Parameters) -> Result<Mosaic, MosaicError> {
    build_mosaic_with(params, &DirectoryLoader::new())
}
