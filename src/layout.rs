//! Grid packing: where every catalog item goes.
//!
//! Planning is a pure function of the column count, the special regions and
//! the catalog size. It knows nothing about pixels or photographs; the
//! [`render`](crate::render) module turns a [`LayoutPlan`] into an image.
//!
//! # Algorithm
//!
//! ```text
//! rows = ceil((Σ region cells + items outside regions) / cols) + 1
//!
//! row 0          title band, pre-occupied
//! phase 1        special regions in registry order at (x, y + 1)
//! phase 2        remaining numbers 1..=N, ascending, first free cell row-major
//! ```
//!
//! The row estimate is a capacity bound, not a packing bound. Regions placed
//! below the estimate, or numbers listed in regions that are outside the
//! catalog, can leave phase 2 short of cells; the grid then grows by whole
//! rows so that no item is ever dropped.

use crate::special::SpecialObject;
use std::collections::BTreeSet;
use thiserror::Error;

/// Largest column count, and the furthest column or row a special region
/// may reach.
pub const MAX_GRID_EXTENT: u32 = 1000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
    #[error("grid needs between 1 and {max} columns (got {0})", max = MAX_GRID_EXTENT)]
    InvalidColumns(u32),
    #[error("special region {numbers:?} reaches past cell {max}", max = MAX_GRID_EXTENT)]
    RegionOutOfBounds { numbers: Vec<u32> },
}

/// Rows needed for `total` items in `grid_cols` columns, title row included.
///
/// `grid_cols` of zero is treated as one; [`plan_layout`] rejects it before
/// getting here.
pub fn compute_grid_rows(grid_cols: u32, specials: &[SpecialObject], total: u32) -> u32 {
    let special_cells: u64 = specials.iter().map(SpecialObject::cells).sum();
    let special_objects: u64 = specials.iter().map(|s| s.objects() as u64).sum();
    let normal_cells = (total as u64).saturating_sub(special_objects);
    let total_cells = special_cells + normal_cells;
    let rows = total_cells.div_ceil(grid_cols.max(1) as u64) + 1;
    u32::try_from(rows).unwrap_or(u32::MAX)
}

/// One placed region in grid coordinates.
///
/// `row` is absolute: the title row is row 0, so a special region declared
/// at `y` lands on `y + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub numbers: Vec<u32>,
    pub col: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
    /// Placed in phase 1 from a special region.
    pub special: bool,
}

impl Placement {
    fn single(number: u32, col: u32, row: u32) -> Self {
        Self {
            numbers: vec![number],
            col,
            row,
            width: 1,
            height: 1,
            special: false,
        }
    }
}

/// The output of [`plan_layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub cols: u32,
    /// Final row count, title row included. Never less than `estimated_rows`.
    pub rows: u32,
    /// What [`compute_grid_rows`] predicted.
    pub estimated_rows: u32,
    /// Special regions first (registry order), then single cells by number.
    pub placements: Vec<Placement>,
}

impl LayoutPlan {
    pub fn grew(&self) -> bool {
        self.rows > self.estimated_rows
    }

    /// The placement holding catalog item `number`.
    pub fn find(&self, number: u32) -> Option<&Placement> {
        self.placements.iter().find(|p| p.numbers.contains(&number))
    }
}

/// Cell bookkeeping for one planning pass.
#[derive(Debug, Clone)]
struct OccupancyGrid {
    cols: u32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// `rows × cols` cells with row 0 reserved for the title.
    fn new(rows: u32, cols: u32) -> Self {
        let mut grid = Self {
            cols,
            cells: vec![false; rows as usize * cols as usize],
        };
        if rows > 0 {
            grid.mark(0, 0, cols, 1);
        }
        grid
    }

    fn rows(&self) -> u32 {
        if self.cols == 0 {
            0
        } else {
            (self.cells.len() / self.cols as usize) as u32
        }
    }

    fn is_occupied(&self, col: u32, row: u32) -> bool {
        self.index(col, row).is_some_and(|i| self.cells[i])
    }

    /// Add free rows at the bottom until there are `rows`.
    fn grow_to(&mut self, rows: u32) {
        let wanted = rows as usize * self.cols as usize;
        if wanted > self.cells.len() {
            self.cells.resize(wanted, false);
        }
    }

    /// Mark a rectangle occupied. Cells outside the grid are ignored.
    fn mark(&mut self, col: u32, row: u32, width: u32, height: u32) {
        for r in row..row.saturating_add(height) {
            for c in col..col.saturating_add(width) {
                if let Some(i) = self.index(c, r) {
                    self.cells[i] = true;
                }
            }
        }
    }

    /// First free cell at or after row-major position `from`.
    fn first_free_from(&self, from: usize) -> Option<usize> {
        self.cells
            .iter()
            .skip(from)
            .position(|&taken| !taken)
            .map(|offset| from + offset)
    }

    /// `(col, row)` of a row-major position.
    fn position(&self, index: usize) -> (u32, u32) {
        let cols = self.cols.max(1) as usize;
        ((index % cols) as u32, (index / cols) as u32)
    }

    fn index(&self, col: u32, row: u32) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        let i = row as usize * self.cols as usize + col as usize;
        (i < self.cells.len()).then_some(i)
    }
}

/// Place every item `1..=total` on a `grid_cols`-wide grid.
///
/// Special regions are placed exactly where they are declared even when they
/// overlap each other; overlaps are logged but not resolved. A region reaching
/// past [`MAX_GRID_EXTENT`] is an error.
pub fn plan_layout(
    grid_cols: u32,
    specials: &[SpecialObject],
    total: u32,
) -> Result<LayoutPlan, LayoutError> {
    if !(1..=MAX_GRID_EXTENT).contains(&grid_cols) {
        return Err(LayoutError::InvalidColumns(grid_cols));
    }
    if let Some(special) = specials.iter().find(|s| !s.fits_within(MAX_GRID_EXTENT)) {
        return Err(LayoutError::RegionOutOfBounds {
            numbers: special.numbers.clone(),
        });
    }

    let estimated_rows = compute_grid_rows(grid_cols, specials, total);
    let mut grid = OccupancyGrid::new(estimated_rows, grid_cols);
    let mut placements = Vec::with_capacity(total as usize);

    // Phase 1
    for special in specials {
        let row = special.y.saturating_add(1);
        let bottom = row.saturating_add(special.height);
        if bottom > grid.rows() {
            grid.grow_to(bottom);
        }
        if special.x.saturating_add(special.width) > grid_cols {
            log::warn!(
                "special region {:?} at column {} is wider than the {grid_cols}-column grid; \
                 cells past the edge are not reserved",
                special.numbers,
                special.x
            );
        }
        if overlaps(&grid, special.x, row, special.width, special.height) {
            log::warn!(
                "special region {:?} overlaps an earlier region",
                special.numbers
            );
        }
        grid.mark(special.x, row, special.width, special.height);
        placements.push(Placement {
            numbers: special.numbers.clone(),
            col: special.x,
            row,
            width: special.width,
            height: special.height,
            special: true,
        });
    }

    // Phase 2
    let covered: BTreeSet<u32> = specials
        .iter()
        .flat_map(|s| s.numbers.iter().copied())
        .collect();
    let mut cursor = 0;
    for number in (1..=total).filter(|n| !covered.contains(n)) {
        let index = loop {
            match grid.first_free_from(cursor) {
                Some(i) => break i,
                None => grid.grow_to(grid.rows() + 1),
            }
        };
        let (col, row) = grid.position(index);
        grid.mark(col, row, 1, 1);
        placements.push(Placement::single(number, col, row));
        cursor = index + 1;
    }

    let rows = grid.rows();
    if rows > estimated_rows {
        log::warn!("layout needed {rows} rows; estimated {estimated_rows}. Grid grown to fit");
    }

    Ok(LayoutPlan {
        cols: grid_cols,
        rows,
        estimated_rows,
        placements,
    })
}

fn overlaps(grid: &OccupancyGrid, col: u32, row: u32, width: u32, height: u32) -> bool {
    (row..row.saturating_add(height))
        .any(|r| (col..col.saturating_add(width)).any(|c| grid.is_occupied(c, r)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::special::default_layout;

    fn cell(plan: &LayoutPlan, number: u32) -> (u32, u32) {
        let p = plan.find(number).unwrap();
        (p.col, p.row)
    }

    // =========================================================================
    // compute_grid_rows
    // =========================================================================

    #[test]
    fn rows_without_specials_is_ceil_plus_title() {
        for cols in 1..=20 {
            for total in [1u32, 5, 6, 7, 109, 110] {
                let expected = total.div_ceil(cols) + 1;
                assert_eq!(compute_grid_rows(cols, &[], total), expected, "{cols}/{total}");
            }
        }
    }

    #[test]
    fn rows_count_region_area_not_items() {
        let specials = vec![SpecialObject::new(vec![1, 2], 0, 0, 2, 2)];
        // 4 region cells + 8 singles = 12 → 3 rows of 4, plus title
        assert_eq!(compute_grid_rows(4, &specials, 10), 4);
    }

    #[test]
    fn rows_at_least_two_for_nonempty_catalog() {
        assert_eq!(compute_grid_rows(17, &[], 1), 2);
        assert_eq!(compute_grid_rows(1000, &[], 3), 2);
    }

    #[test]
    fn rows_empty_catalog_is_title_only() {
        assert_eq!(compute_grid_rows(5, &[], 0), 1);
    }

    #[test]
    fn rows_zero_columns_does_not_divide_by_zero() {
        assert_eq!(compute_grid_rows(0, &[], 4), 5);
    }

    #[test]
    fn rows_with_huge_region_do_not_overflow() {
        let specials = vec![SpecialObject::new(vec![8], 0, 0, 70_000, 70_000)];
        assert_eq!(compute_grid_rows(17, &specials, 110), 288_235_302);
    }

    #[test]
    fn rows_for_default_messier_layout() {
        let specials = default_layout(Catalog::Messier);
        // 6+4+8+6+6+4 = 34 region cells, 110 - 10 = 100 singles
        assert_eq!(compute_grid_rows(17, &specials, 110), 134_u32.div_ceil(17) + 1);
    }

    // =========================================================================
    // OccupancyGrid
    // =========================================================================

    #[test]
    fn title_row_is_reserved() {
        let grid = OccupancyGrid::new(3, 4);
        for c in 0..4 {
            assert!(grid.is_occupied(c, 0));
            assert!(!grid.is_occupied(c, 1));
        }
        assert_eq!(grid.first_free_from(0), Some(4));
    }

    #[test]
    fn mark_ignores_out_of_bounds() {
        let mut grid = OccupancyGrid::new(2, 2);
        grid.mark(1, 1, 5, 5);
        assert!(grid.is_occupied(1, 1));
        assert!(!grid.is_occupied(0, 1));
        assert!(!grid.is_occupied(5, 5));
        assert_eq!(grid.rows(), 2);
    }

    #[test]
    fn grow_adds_free_rows() {
        let mut grid = OccupancyGrid::new(2, 3);
        grid.mark(0, 1, 3, 1);
        assert_eq!(grid.first_free_from(0), None);
        grid.grow_to(3);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.first_free_from(0), Some(6));
        assert_eq!(grid.position(6), (0, 2));
    }

    // =========================================================================
    // plan_layout
    // =========================================================================

    #[test]
    fn six_items_three_columns() {
        let plan = plan_layout(3, &[], 6).unwrap();
        assert_eq!(plan.rows, 3);
        assert!(!plan.grew());
        assert_eq!(cell(&plan, 1), (0, 1));
        assert_eq!(cell(&plan, 2), (1, 1));
        assert_eq!(cell(&plan, 3), (2, 1));
        assert_eq!(cell(&plan, 4), (0, 2));
        assert_eq!(cell(&plan, 5), (1, 2));
        assert_eq!(cell(&plan, 6), (2, 2));
    }

    #[test]
    fn special_region_then_fill_gaps() {
        let specials = vec![SpecialObject::new(vec![1, 2], 0, 0, 2, 1)];
        let plan = plan_layout(3, &specials, 5).unwrap();

        assert_eq!(plan.rows, 3);
        let region = &plan.placements[0];
        assert!(region.special);
        assert_eq!(region.numbers, vec![1, 2]);
        assert_eq!((region.col, region.row, region.width, region.height), (0, 1, 2, 1));

        assert_eq!(cell(&plan, 3), (2, 1));
        assert_eq!(cell(&plan, 4), (0, 2));
        assert_eq!(cell(&plan, 5), (1, 2));
    }

    #[test]
    fn every_item_placed_exactly_once_without_overlap() {
        for catalog in Catalog::ALL {
            let specials = default_layout(catalog);
            let plan = plan_layout(17, &specials, catalog.count()).unwrap();

            for n in 1..=catalog.count() {
                let holders = plan
                    .placements
                    .iter()
                    .filter(|p| p.numbers.contains(&n))
                    .count();
                assert_eq!(holders, 1, "{catalog} item {n}");
            }

            let mut seen = BTreeSet::new();
            for p in &plan.placements {
                for r in p.row..p.row + p.height {
                    for c in p.col..p.col + p.width {
                        assert!(seen.insert((c, r)), "{catalog}: cell ({c},{r}) used twice");
                        assert!(r >= 1, "{catalog}: region in title row");
                    }
                }
            }
        }
    }

    #[test]
    fn singles_are_ascending_in_row_major_order() {
        let specials = default_layout(Catalog::Messier);
        let plan = plan_layout(17, &specials, 110).unwrap();
        let singles: Vec<&Placement> = plan.placements.iter().filter(|p| !p.special).collect();

        for pair in singles.windows(2) {
            assert!(pair[0].numbers[0] < pair[1].numbers[0]);
            assert!((pair[0].row, pair[0].col) < (pair[1].row, pair[1].col));
        }
    }

    #[test]
    fn planning_is_deterministic() {
        let specials = default_layout(Catalog::Caldwell);
        let a = plan_layout(17, &specials, 109).unwrap();
        let b = plan_layout(17, &specials, 109).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn specials_keep_registry_order() {
        let specials = vec![
            SpecialObject::new(vec![5], 2, 1, 1, 1),
            SpecialObject::new(vec![3], 0, 0, 1, 1),
        ];
        let plan = plan_layout(3, &specials, 6).unwrap();
        assert_eq!(plan.placements[0].numbers, vec![5]);
        assert_eq!(plan.placements[1].numbers, vec![3]);
        assert_eq!(cell(&plan, 1), (1, 1));
    }

    #[test]
    fn zero_columns_is_rejected() {
        assert_eq!(plan_layout(0, &[], 10), Err(LayoutError::InvalidColumns(0)));
    }

    #[test]
    fn too_many_columns_is_rejected() {
        assert_eq!(
            plan_layout(MAX_GRID_EXTENT + 1, &[], 10),
            Err(LayoutError::InvalidColumns(MAX_GRID_EXTENT + 1))
        );
        assert!(plan_layout(MAX_GRID_EXTENT, &[], 10).is_ok());
    }

    #[test]
    fn oversized_region_is_rejected_before_allocating() {
        for special in [
            SpecialObject::new(vec![8], 0, 0, 70_000, 70_000),
            SpecialObject::new(vec![8], 0, u32::MAX - 1, 1, 1),
        ] {
            assert_eq!(
                plan_layout(17, &[special], 110),
                Err(LayoutError::RegionOutOfBounds { numbers: vec![8] })
            );
        }
    }

    #[test]
    fn region_touching_the_extent_is_placed() {
        let specials = vec![SpecialObject::new(vec![1], 0, MAX_GRID_EXTENT - 1, 1, 1)];
        let plan = plan_layout(2, &specials, 3).unwrap();
        assert_eq!(cell(&plan, 1), (0, MAX_GRID_EXTENT));
        assert_eq!(plan.rows, MAX_GRID_EXTENT + 1);
    }

    #[test]
    fn grows_when_singles_run_out_of_cells() {
        // 200 is not in the catalog, so the estimate is one cell short
        let specials = vec![SpecialObject::new(vec![200], 0, 0, 1, 1)];
        let plan = plan_layout(1, &specials, 4).unwrap();
        assert_eq!(plan.estimated_rows, 5);
        assert_eq!(plan.rows, 6);
        assert!(plan.grew());
        assert_eq!(cell(&plan, 4), (0, 5));
    }

    #[test]
    fn grows_for_region_below_estimate() {
        let specials = vec![SpecialObject::new(vec![1], 0, 5, 1, 1)];
        let plan = plan_layout(2, &specials, 3).unwrap();
        assert_eq!(plan.estimated_rows, 3);
        assert_eq!(plan.rows, 7);
        assert_eq!(cell(&plan, 1), (0, 6));
        assert_eq!(cell(&plan, 2), (0, 1));
        assert_eq!(cell(&plan, 3), (1, 1));
    }

    #[test]
    fn overlapping_specials_are_both_placed() {
        let specials = vec![
            SpecialObject::new(vec![1], 0, 0, 2, 1),
            SpecialObject::new(vec![2], 1, 0, 2, 1),
        ];
        let plan = plan_layout(3, &specials, 4).unwrap();
        assert_eq!(cell(&plan, 1), (0, 1));
        assert_eq!(cell(&plan, 2), (1, 1));
        assert_eq!(cell(&plan, 3), (0, 2));
        assert_eq!(cell(&plan, 4), (1, 2));
    }

    #[test]
    fn region_past_right_edge_leaves_grid_width_alone() {
        let specials = vec![SpecialObject::new(vec![1], 2, 0, 3, 1)];
        let plan = plan_layout(3, &specials, 3).unwrap();
        assert_eq!(plan.cols, 3);
        assert_eq!(cell(&plan, 2), (0, 1));
        assert_eq!(cell(&plan, 3), (1, 1));
    }

    #[test]
    fn empty_catalog_plans_title_only() {
        let plan = plan_layout(4, &[], 0).unwrap();
        assert_eq!(plan.rows, 1);
        assert!(plan.placements.is_empty());
    }
}
