//! Special-object registry.
//!
//! Some catalog entries deserve more room than a single cell: large nebulae,
//! galaxies, or several objects that share one photograph (M8 and M20, the
//! Andromeda group M31/M32/M110). A [`SpecialObject`] reserves a rectangular
//! region of grid cells for one or more catalog numbers.
//!
//! Coordinates are grid cells, 0-based, with `y` measured *before* the title
//! row is inserted: `y = 0` is the first row of objects.
//!
//! ## Default layouts
//!
//! [`default_layout`] returns a fresh `Vec` on every call. Callers own their
//! copy and may edit it freely without affecting later defaults.
//!
//! ## Editing
//!
//! [`LayoutDraft`] is the copy-on-edit working set behind a layout editor.
//! Rows hold the raw text of each field; nothing is validated until
//! [`LayoutDraft::commit`], which either returns a complete new layout or the
//! first error. The committed layout is never touched by the draft.

use crate::catalog::Catalog;
use crate::layout::MAX_GRID_EXTENT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One reserved region of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialObject {
    /// Catalog numbers sharing the region, in label order. Never empty.
    pub numbers: Vec<u32>,
    /// Column of the top-left cell.
    pub x: u32,
    /// Row of the top-left cell, excluding the title row.
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SpecialObject {
    pub fn new(numbers: Vec<u32>, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            numbers,
            x,
            y,
            width,
            height,
        }
    }

    /// Grid cells covered by the region.
    pub fn cells(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether the region ends within `extent` columns and `extent` rows.
    pub fn fits_within(&self, extent: u32) -> bool {
        let extent = u64::from(extent);
        u64::from(self.x) + u64::from(self.width) <= extent
            && u64::from(self.y) + u64::from(self.height) <= extent
    }

    /// Catalog items represented by the region.
    pub fn objects(&self) -> u32 {
        self.numbers.len() as u32
    }

    pub fn contains(&self, number: u32) -> bool {
        self.numbers.contains(&number)
    }
}

/// Default layout for a catalog. Always a fresh, independent copy.
pub fn default_layout(catalog: Catalog) -> Vec<SpecialObject> {
    match catalog {
        Catalog::Messier => messier_layout(),
        Catalog::Caldwell => caldwell_layout(),
    }
}

fn messier_layout() -> Vec<SpecialObject> {
    vec![
        SpecialObject::new(vec![8, 20], 2, 2, 2, 3),       // Lagoon + Trifid
        SpecialObject::new(vec![16], 14, 2, 2, 2),         // Eagle
        SpecialObject::new(vec![31, 32, 110], 7, 2, 4, 2), // Andromeda
        SpecialObject::new(vec![33], 1, 6, 3, 2),          // Triangulum
        SpecialObject::new(vec![42, 43], 6, 5, 2, 3),      // Orion
        SpecialObject::new(vec![45], 13, 5, 2, 2),         // Pleiades
    ]
}

fn caldwell_layout() -> Vec<SpecialObject> {
    vec![
        SpecialObject::new(vec![20], 1, 1, 3, 2),  // North America
        SpecialObject::new(vec![33], 11, 2, 2, 3), // Veil (east)
        SpecialObject::new(vec![34], 13, 2, 2, 3), // Veil (west)
        SpecialObject::new(vec![68], 7, 2, 2, 2),  // Helix
        SpecialObject::new(vec![70], 2, 4, 3, 2),  // NGC 300
        SpecialObject::new(vec![71], 7, 7, 4, 2),  // LMC
        SpecialObject::new(vec![72], 0, 7, 3, 2),  // SMC
        SpecialObject::new(vec![99], 14, 6, 3, 2), // Coalsack
    ]
}

// =============================================================================
// Draft editing
// =============================================================================

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LayoutEditError {
    #[error("row {row}: invalid catalog numbers {text:?}")]
    InvalidNumbers { row: usize, text: String },
    #[error("row {row}: at least one catalog number is required")]
    EmptyNumbers { row: usize },
    #[error("row {row}: invalid {field} value {text:?}")]
    InvalidField {
        row: usize,
        field: &'static str,
        text: String,
    },
    #[error("row {row}: region reaches past cell {max}", max = MAX_GRID_EXTENT)]
    OutOfBounds { row: usize },
    #[error("row {row} does not exist")]
    NoSuchRow { row: usize },
}

/// One editable row: the text of every field, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftRow {
    pub numbers: String,
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
}

impl DraftRow {
    pub fn from_object(obj: &SpecialObject) -> Self {
        Self {
            numbers: format_numbers(&obj.numbers),
            x: obj.x.to_string(),
            y: obj.y.to_string(),
            width: obj.width.to_string(),
            height: obj.height.to_string(),
        }
    }

    fn parse(&self, row: usize) -> Result<SpecialObject, LayoutEditError> {
        let numbers = parse_numbers(&self.numbers).ok_or_else(|| LayoutEditError::InvalidNumbers {
            row,
            text: self.numbers.clone(),
        })?;
        if numbers.is_empty() {
            return Err(LayoutEditError::EmptyNumbers { row });
        }
        let x = parse_field(row, "x", &self.x, 0)?;
        let y = parse_field(row, "y", &self.y, 0)?;
        let width = parse_field(row, "width", &self.width, 1)?;
        let height = parse_field(row, "height", &self.height, 1)?;
        let obj = SpecialObject::new(numbers, x, y, width, height);
        if !obj.fits_within(MAX_GRID_EXTENT) {
            return Err(LayoutEditError::OutOfBounds { row });
        }
        Ok(obj)
    }
}

/// Working copy of a layout. Edits stay here until [`commit`](Self::commit).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutDraft {
    rows: Vec<DraftRow>,
}

impl LayoutDraft {
    pub fn from_committed(layout: &[SpecialObject]) -> Self {
        Self {
            rows: layout.iter().map(DraftRow::from_object).collect(),
        }
    }

    pub fn rows(&self) -> &[DraftRow] {
        &self.rows
    }

    /// Validate a new row and append it. Invalid rows are rejected immediately.
    pub fn add(&mut self, row: DraftRow) -> Result<(), LayoutEditError> {
        row.parse(self.rows.len())?;
        self.rows.push(row);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<DraftRow, LayoutEditError> {
        if index >= self.rows.len() {
            return Err(LayoutEditError::NoSuchRow { row: index });
        }
        Ok(self.rows.remove(index))
    }

    /// Replace the text of an existing row. Validation is deferred to commit.
    pub fn update(&mut self, index: usize, row: DraftRow) -> Result<(), LayoutEditError> {
        let slot = self
            .rows
            .get_mut(index)
            .ok_or(LayoutEditError::NoSuchRow { row: index })?;
        *slot = row;
        Ok(())
    }

    /// Parse every row into a new layout. All-or-nothing.
    pub fn commit(&self) -> Result<Vec<SpecialObject>, LayoutEditError> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| row.parse(i))
            .collect()
    }
}

/// Parse a comma-separated list like `"31, 32,110"`. Empty items are skipped.
///
/// Returns `None` if any non-empty item is not a positive integer.
pub fn parse_numbers(text: &str) -> Option<Vec<u32>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().ok().filter(|&n| n > 0))
        .collect()
}

pub fn format_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_field(
    row: usize,
    field: &'static str,
    text: &str,
    min: u32,
) -> Result<u32, LayoutEditError> {
    text.trim()
        .parse::<u32>()
        .ok()
        .filter(|&v| v >= min)
        .ok_or_else(|| LayoutEditError::InvalidField {
            row,
            field,
            text: text.to_string(),
        })
}
