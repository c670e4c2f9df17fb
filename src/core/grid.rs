//! Raw spreadsheet grid and the retrieval contract

use anyhow::Result;
use async_trait::async_trait;

/// Rows of string cells as delivered by a spreadsheet export. Rows may be
/// shorter than the widest row.
pub type Grid = Vec<Vec<String>>;

#[async_trait]
pub trait GridProvider: Send + Sync {
    async fn fetch_grid(&self) -> Result<Grid>;
}

/// Returns true when the cell carries no content.
pub fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Fills blank cells with the nearest non-blank cell to their left.
///
/// Spreadsheet exports drop the content of merged cells everywhere except the
/// leftmost cell, so header rows come back with gaps. Leading blanks have
/// nothing to inherit and stay blank.
pub fn propagate_merged_cells(row: &[String]) -> Vec<String> {
    let mut previous: Option<&str> = None;
    row.iter()
        .map(|cell| {
            let cell = cell.trim();
            match previous {
                Some(prev) if cell.is_empty() => prev.to_string(),
                _ => {
                    if !cell.is_empty() {
                        previous = Some(cell);
                    }
                    cell.to_string()
                }
            }
        })
        .collect()
}

/// Right-pads every row with blank cells up to the widest row and trims
/// surrounding whitespace from each cell.
pub fn normalize_rows(grid: &[Vec<String>]) -> Grid {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    grid.iter()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(|c| c.trim().to_string()).collect();
            cells.resize(width, String::new());
            cells
        })
        .collect()
}
