//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is about catalog items, not files: every region is shown by its
//! label (`M8, M20`) with grid position and size as indented context lines.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! Messier Catalog: 17 × 9 cells
//! Regions
//! 001 M8, M20
//!     Cells: col 2, row 3, 2×3
//! 002 M16
//!     Cells: col 14, row 3, 2×2
//!
//! Rows
//!     1: M1 M2 M3 M4 M5 M6 M7 M9 M10 M11 M12 M13 M14 M15 M17 M18 M19
//!     2: M21 M22 ...
//! ```
//!
//! ## Render
//!
//! ```text
//! Messier Catalog (110 items)
//!     Grid: 17 × 9 cells, 5130×2730px
//!     Photos: 98 / 110
//!     Missing: M3, M5, M14, ...
//! Saved messier_catalog.png
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::catalog::Catalog;
use crate::layout::LayoutPlan;
use crate::render::Mosaic;
use crate::special::SpecialObject;
use std::path::Path;

/// Missing items listed before the list is cut short.
const MISSING_SHOWN: usize = 12;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn region_header(index: usize, catalog: Catalog, numbers: &[u32]) -> String {
    format!(
        "{} {}",
        format_index(index),
        crate::render::region_label(catalog, numbers)
    )
}

fn size(width: u32, height: u32) -> String {
    format!("{width}×{height}")
}

/// Comma-separated labels, cut after `max` with a trailing `...`.
fn label_list(catalog: Catalog, numbers: &[u32], max: usize) -> String {
    let mut parts: Vec<String> = numbers.iter().take(max).map(|&n| catalog.label(n)).collect();
    if numbers.len() > max {
        parts.push("...".to_string());
    }
    parts.join(", ")
}

// ============================================================================
// Plan output
// ============================================================================

/// Format a layout plan: special regions, then single cells row by row.
pub fn format_layout_plan(plan: &LayoutPlan, catalog: Catalog) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: {} × {} cells",
        catalog.title(),
        plan.cols,
        plan.rows
    )];
    if plan.grew() {
        lines.push(format!(
            "{}Grown from {} estimated rows",
            indent(1),
            plan.estimated_rows
        ));
    }

    let regions: Vec<_> = plan.placements.iter().filter(|p| p.special).collect();
    if !regions.is_empty() {
        lines.push("Regions".to_string());
        for (i, p) in regions.iter().enumerate() {
            lines.push(region_header(i + 1, catalog, &p.numbers));
            lines.push(format!(
                "{}Cells: col {}, row {}, {}",
                indent(1),
                p.col,
                p.row,
                size(p.width, p.height)
            ));
        }
        lines.push(String::new());
    }

    lines.push("Rows".to_string());
    for row in 1..plan.rows {
        let mut cells: Vec<_> = plan
            .placements
            .iter()
            .filter(|p| !p.special && p.row == row)
            .collect();
        if cells.is_empty() {
            continue;
        }
        cells.sort_by_key(|p| p.col);
        let labels: Vec<String> = cells
            .iter()
            .flat_map(|p| p.numbers.iter().map(|&n| catalog.label(n)))
            .collect();
        lines.push(format!("{}{}: {}", indent(1), row, labels.join(" ")));
    }

    lines
}

pub fn print_layout_plan(plan: &LayoutPlan, catalog: Catalog) {
    for line in format_layout_plan(plan, catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Layout listing
// ============================================================================

/// Format a special-region layout as declared (rows before the title offset).
pub fn format_layout(catalog: Catalog, layout: &[SpecialObject]) -> Vec<String> {
    let mut lines = vec![format!("{} layout", catalog.title())];
    if layout.is_empty() {
        lines.push(format!("{}(no special regions)", indent(1)));
        return lines;
    }
    for (i, obj) in layout.iter().enumerate() {
        lines.push(region_header(i + 1, catalog, &obj.numbers));
        lines.push(format!(
            "{}At: x {}, y {}, {}",
            indent(1),
            obj.x,
            obj.y,
            size(obj.width, obj.height)
        ));
    }
    lines
}

pub fn print_layout(catalog: Catalog, layout: &[SpecialObject]) {
    for line in format_layout(catalog, layout) {
        println!("{}", line);
    }
}

// ============================================================================
// Render output
// ============================================================================

/// Format the summary of a finished render.
pub fn format_render_summary(mosaic: &Mosaic, catalog: Catalog, output_file: &Path) -> Vec<String> {
    let (w, h) = mosaic.image.dimensions();
    let mut lines = vec![
        format!("{} ({} items)", catalog.title(), mosaic.total),
        format!(
            "{}Grid: {} × {} cells, {}px",
            indent(1),
            mosaic.plan.cols,
            mosaic.plan.rows,
            size(w, h)
        ),
        format!("{}Photos: {} / {}", indent(1), mosaic.loaded, mosaic.total),
    ];
    if !mosaic.missing.is_empty() {
        lines.push(format!(
            "{}Missing: {}",
            indent(1),
            label_list(catalog, &mosaic.missing, MISSING_SHOWN)
        ));
    }
    lines.push(format!("Saved {}", output_file.display()));
    lines
}

pub fn print_render_summary(mosaic: &Mosaic, catalog: Catalog, output_file: &Path) {
    for line in format_render_summary(mosaic, catalog, output_file) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
