//! Table types.

use serde::{Deserialize, Serialize};

use crate::geometry::BBox;

/// A table found on a page.
///
/// Rows are ordered top to bottom. Every row has one slot per column of
/// the table; a slot is `None` where no cell covers that grid position
/// (merged cells, ragged edges).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Union of all cell boxes.
    pub bbox: BBox,

    /// Rows of the table.
    pub rows: Vec<TableRow>,
}

/// A row of cell boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<Option<BBox>>,
}

impl TableRow {
    pub fn bbox(&self) -> Option<BBox> {
        self.cells
            .iter()
            .flatten()
            .copied()
            .reduce(|acc, c| acc.union(&c))
    }
}

impl Table {
    /// Build a table from cell boxes, laying them out on the grid formed
    /// by their distinct left and top edges. `None` for no cells.
    pub fn from_cells(cells: &[BBox]) -> Option<Self> {
        let bbox = cells.iter().copied().reduce(|acc, c| acc.union(&c))?;

        let mut tops: Vec<f64> = cells.iter().map(|c| c.top).collect();
        tops.sort_by(f64::total_cmp);
        tops.dedup();

        let mut lefts: Vec<f64> = cells.iter().map(|c| c.x0).collect();
        lefts.sort_by(f64::total_cmp);
        lefts.dedup();

        let rows = tops
            .iter()
            .map(|&top| {
                let cells = lefts
                    .iter()
                    .map(|&x0| cells.iter().find(|c| c.top == top && c.x0 == x0).copied())
                    .collect();
                TableRow { cells }
            })
            .collect();

        Some(Self { bbox, rows })
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }

    /// All cell boxes, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &BBox> {
        self.rows.iter().flat_map(|r| r.cells.iter().flatten())
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
