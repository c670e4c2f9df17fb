//! Builds a [`PriceTable`] from a raw spreadsheet grid.
//!
//! The sheet layout this understands:
//!
//! ```text
//!            | CRUSADER              |            | HURSTON   |
//!            | Port Olisar |         | Grim Hex   | Lorville  |
//!            | Buy  | Sell           | Buy | Sell | Buy | Sell|
//! Agricium   | 24,5 | 27.4           |     |      |     | 27,9|
//! ```
//!
//! Header cells are merged across the columns they span, so the export only
//! carries the name in the leftmost cell. Price columns alternate buy/sell
//! starting at column 1.

use crate::core::grid::{Grid, is_blank, normalize_rows, propagate_merged_cells};
use crate::core::table::{CommodityPrices, LocationMap, PriceIndex, PriceTable, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalSeparator {
    /// Accept both `10,5` and `10.5`.
    #[default]
    Either,
    Point,
    Comma,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub region_marker: String,
    pub location_marker: String,
    pub decimal_separator: DecimalSeparator,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            region_marker: "CRUSADER".to_string(),
            location_marker: "Port Olisar".to_string(),
            decimal_separator: DecimalSeparator::Either,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellErrorKind {
    NotNumeric(String),
    UnmappedColumn,
    /// Second price for a location already priced on the same side.
    DuplicateLocation(String),
}

/// A rejected cell, addressed by zero-based grid row and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellError {
    pub row: usize,
    pub column: usize,
    pub kind: CellErrorKind,
}

impl Display for CellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            CellErrorKind::NotNumeric(value) => write!(
                f,
                "row {}, column {}: '{}' is not a price",
                self.row, self.column, value
            ),
            CellErrorKind::UnmappedColumn => write!(
                f,
                "row {}, column {}: no location header above this column",
                self.row, self.column
            ),
            CellErrorKind::DuplicateLocation(location) => write!(
                f,
                "row {}, column {}: '{}' already has a different price on this side",
                self.row, self.column, location
            ),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataFormatError {
    #[error("region header row not found (no cell equal to '{marker}')")]
    MissingRegionHeader { marker: String },
    #[error("location header row not found (no cell equal to '{marker}')")]
    MissingLocationHeader { marker: String },
    #[error("{} invalid cell(s) in price grid: {}", .0.len(), join_cells(.0))]
    InvalidCells(Vec<CellError>),
}

fn join_cells(cells: &[CellError]) -> String {
    cells
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct TableBuilder {
    config: BuilderConfig,
}

impl TableBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Builds the location map and price index from `grid`.
    ///
    /// Every bad cell is collected before failing, so one error lists all of
    /// them.
    pub fn build(&self, grid: &[Vec<String>]) -> Result<PriceTable, DataFormatError> {
        let rows = normalize_rows(grid);

        let region_row = self.find_row(&rows, &self.config.region_marker).ok_or_else(|| {
            DataFormatError::MissingRegionHeader {
                marker: self.config.region_marker.clone(),
            }
        })?;
        let location_row = self
            .find_row(&rows, &self.config.location_marker)
            .ok_or_else(|| DataFormatError::MissingLocationHeader {
                marker: self.config.location_marker.clone(),
            })?;
        debug!(region_row, location_row, "Found header rows");

        let width = table_width(&rows, location_row);
        let regions = propagate_merged_cells(&rows[region_row]);
        let columns: Vec<Option<String>> = propagate_merged_cells(&rows[location_row])
            .into_iter()
            .take(width)
            .enumerate()
            .map(|(column, name)| (column > 0 && !name.is_empty()).then_some(name))
            .collect();

        let mut locations = LocationMap::new();
        for (column, name) in columns.iter().enumerate() {
            if let Some(name) = name {
                locations.insert(name.clone(), regions[column].clone());
            }
        }

        let mut prices = PriceIndex::new();
        let mut errors = Vec::new();
        for (row_index, row) in rows.iter().enumerate().skip(location_row + 1) {
            if row_index == region_row || is_blank(&row[0]) || is_side_label_row(row) {
                continue;
            }
            let commodity = self.parse_commodity_row(row_index, row, &columns, &mut errors);
            prices.insert(&row[0], commodity);
        }

        if !errors.is_empty() {
            return Err(DataFormatError::InvalidCells(errors));
        }

        info!(
            locations = locations.len(),
            commodities = prices.len(),
            "Built price table"
        );
        Ok(PriceTable { locations, prices })
    }

    fn find_row(&self, rows: &Grid, marker: &str) -> Option<usize> {
        rows.iter()
            .position(|row| row.iter().any(|cell| cell == marker))
    }

    fn parse_commodity_row(
        &self,
        row_index: usize,
        row: &[String],
        columns: &[Option<String>],
        errors: &mut Vec<CellError>,
    ) -> CommodityPrices {
        let mut prices = CommodityPrices::default();
        for (column, cell) in row.iter().enumerate().skip(1) {
            if is_blank(cell) {
                continue;
            }
            if column >= columns.len() {
                debug!(row = row_index, column, "Ignoring cell outside the price table");
                continue;
            }
            let mut reject = |kind| {
                errors.push(CellError {
                    row: row_index,
                    column,
                    kind,
                })
            };

            let Some(location) = columns.get(column).and_then(Option::as_deref) else {
                reject(CellErrorKind::UnmappedColumn);
                continue;
            };
            let Some(price) = self.parse_price(cell) else {
                reject(CellErrorKind::NotNumeric(cell.clone()));
                continue;
            };

            let side = Side::from_column(column);
            match prices.price_at(side, location) {
                None => prices.add(side, price, location),
                Some(existing) if existing == price => {}
                Some(_) => reject(CellErrorKind::DuplicateLocation(location.to_string())),
            }
        }
        prices
    }

    /// Parses a price cell under the configured separator policy.
    pub fn parse_price(&self, cell: &str) -> Option<Decimal> {
        let cell = cell.trim();
        let text = match self.config.decimal_separator {
            DecimalSeparator::Either => cell.replace(',', "."),
            DecimalSeparator::Point if cell.contains(',') => return None,
            DecimalSeparator::Point => cell.to_string(),
            DecimalSeparator::Comma if cell.contains('.') => return None,
            DecimalSeparator::Comma => cell.replace(',', "."),
        };
        Decimal::from_str(&text).ok().map(|price| price.normalize())
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

/// Sub-header rows label each price column `Buy`/`Sell` instead of carrying prices.
fn is_side_label_row(row: &[String]) -> bool {
    let mut labels = row.iter().skip(1).filter(|cell| !is_blank(cell)).peekable();
    labels.peek().is_some() && labels.all(|cell| cell.parse::<Side>().is_ok())
}

/// Number of columns covered by the price table, counting the name column.
///
/// Taken from the Buy/Sell label row when the sheet has one, otherwise from the
/// last location header plus its Sell column.
fn table_width(rows: &Grid, location_row: usize) -> usize {
    let last_filled = |row: &[String]| row.iter().rposition(|cell| !is_blank(cell));
    let labels = rows
        .iter()
        .skip(location_row + 1)
        .find(|row| is_side_label_row(row));
    match labels {
        Some(row) => last_filled(row).map_or(0, |last| last + 1),
        None => last_filled(&rows[location_row]).map_or(0, |last| last + 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn d(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn sample_grid() -> Grid {
        vec![
            row(&["Release 3.2"]),
            row(&["", "CRUSADER", "", "", "", "HURSTON", ""]),
            row(&["", "Port Olisar", "", "Grim Hex", "", "Lorville", ""]),
            row(&["", "Buy", "Sell", "Buy", "Sell", "Buy", "Sell"]),
            row(&["Agricium", "24,5", "27.4", "", "", "", "27,90"]),
            row(&["Gold", "5.8", "", "5,80", "6.1"]),
            row(&["", "notes"]),
            row(&["Waste", "", "0.005"]),
        ]
    }

    #[test]
    fn test_build_location_map() {
        let table = TableBuilder::default().build(&sample_grid()).unwrap();

        assert_eq!(table.locations.len(), 3);
        assert_eq!(table.region_of("Port Olisar"), Some("CRUSADER"));
        assert_eq!(table.region_of("Grim Hex"), Some("CRUSADER"));
        assert_eq!(table.region_of("Lorville"), Some("HURSTON"));
    }

    #[test]
    fn test_build_price_buckets() {
        let table = TableBuilder::default().build(&sample_grid()).unwrap();

        let names: Vec<_> = table.prices.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Agricium", "Gold", "Waste"]);

        let agricium = table.prices.get("Agricium").unwrap();
        assert_eq!(agricium.buy[&d("24.5")], ["Port Olisar"]);
        assert_eq!(agricium.sell[&d("27.4")], ["Port Olisar"]);
        assert_eq!(agricium.sell[&d("27.9")], ["Lorville"]);

        let gold = table.prices.get("Gold").unwrap();
        assert_eq!(gold.buy.len(), 1);
        assert_eq!(gold.buy[&d("5.8")], ["Port Olisar", "Grim Hex"]);
        assert_eq!(gold.sell[&d("6.1")], ["Grim Hex"]);

        let waste = table.prices.get("Waste").unwrap();
        assert!(waste.buy.is_empty());
        assert!(table.is_consistent());
    }

    #[test]
    fn test_single_commodity_row() {
        let grid = vec![
            row(&["", "CRUSADER", ""]),
            row(&["", "LocationA", "LocationB"]),
            row(&["Gold", "10,50", "12.00"]),
        ];
        let builder = TableBuilder::new(BuilderConfig {
            location_marker: "LocationA".to_string(),
            ..Default::default()
        });
        let table = builder.build(&grid).unwrap();
        let gold = table.prices.get("Gold").unwrap();

        assert_eq!(gold.buy.get(&d("10.50")).unwrap(), &["LocationA"]);
        assert_eq!(gold.sell.get(&d("12.00")).unwrap(), &["LocationB"]);
        assert_eq!(serde_json::to_value(gold).unwrap()["Buy"]["10.5"][0], "LocationA");
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = TableBuilder::default();
        let first = builder.build(&sample_grid()).unwrap();
        let second = builder.build(&sample_grid()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_headers() {
        let builder = TableBuilder::default();

        let no_regions = vec![row(&["", "Port Olisar"]), row(&["Gold", "1"])];
        assert_eq!(
            builder.build(&no_regions).unwrap_err(),
            DataFormatError::MissingRegionHeader {
                marker: "CRUSADER".to_string()
            }
        );

        let no_locations = vec![row(&["", "CRUSADER"]), row(&["Gold", "1"])];
        assert!(matches!(
            builder.build(&no_locations),
            Err(DataFormatError::MissingLocationHeader { .. })
        ));

        assert!(matches!(
            builder.build(&[]),
            Err(DataFormatError::MissingRegionHeader { .. })
        ));
    }

    #[test]
    fn test_all_bad_cells_are_reported() {
        let mut grid = sample_grid();
        grid.push(row(&["Titanium", "n/a", "8.4"]));
        grid.push(row(&["Tungsten", "3.9", "4..1"]));

        let err = TableBuilder::default().build(&grid).unwrap_err();
        let DataFormatError::InvalidCells(cells) = &err else {
            panic!("Expected invalid cells, got {err:?}");
        };

        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].kind, CellErrorKind::NotNumeric("n/a".to_string()));
        assert_eq!((cells[0].row, cells[0].column), (8, 1));
        assert_eq!(cells[1].kind, CellErrorKind::NotNumeric("4..1".to_string()));
        assert_eq!((cells[1].row, cells[1].column), (9, 2));
        assert!(err.to_string().starts_with("2 invalid cell(s) in price grid"));
    }

    #[test]
    fn test_cells_right_of_the_table_are_ignored() {
        let mut grid = sample_grid();
        grid.push(row(&["Titanium", "", "", "", "", "", "8", "9"]));
        grid.push(row(&["Scrap", "1.2", "", "", "", "", "", "", "restocked Tuesday"]));

        let table = TableBuilder::default().build(&grid).unwrap();
        let titanium = table.prices.get("Titanium").unwrap();
        assert!(titanium.buy.is_empty());
        assert_eq!(titanium.sell[&d("8")], ["Lorville"]);
        assert_eq!(table.prices.get("Scrap").unwrap().buy[&d("1.2")], ["Port Olisar"]);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_table_width_without_label_row() {
        let grid = vec![
            row(&["", "CRUSADER", "", "HURSTON"]),
            row(&["", "Port Olisar", "", "Lorville"]),
            row(&["Gold", "10", "", "", "20", "", "", "restocked Tuesday"]),
        ];
        let table = TableBuilder::default().build(&grid).unwrap();
        let gold = table.prices.get("Gold").unwrap();

        assert_eq!(gold.buy[&d("10")], ["Port Olisar"]);
        assert_eq!(gold.sell[&d("20")], ["Lorville"]);
        assert_eq!(gold.locations().count(), 2);
    }

    #[test]
    fn test_label_row_bounds_the_table() {
        let grid = vec![
            row(&["", "CRUSADER", "", "HURSTON"]),
            row(&["", "Port Olisar", "", "Lorville"]),
            row(&["", "Buy", "Sell", "Buy", "Sell"]),
            row(&["Gold", "10", "", "", "20", "", "", "restocked Tuesday"]),
        ];
        let table = TableBuilder::default().build(&grid).unwrap();

        assert_eq!(table.locations.len(), 2);
        assert_eq!(table.prices.get("Gold").unwrap().sell[&d("20")], ["Lorville"]);
    }

    #[test]
    fn test_leading_blank_location_column_is_unmapped() {
        let grid = vec![
            row(&["", "", "CRUSADER", ""]),
            row(&["", "", "Port Olisar", ""]),
            row(&["Gold", "4", "5", "6"]),
        ];
        let err = TableBuilder::default().build(&grid).unwrap_err();

        assert_eq!(
            err,
            DataFormatError::InvalidCells(vec![CellError {
                row: 2,
                column: 1,
                kind: CellErrorKind::UnmappedColumn,
            }])
        );
    }

    #[test]
    fn test_conflicting_price_for_same_location() {
        let grid = vec![
            row(&["", "CRUSADER", "", "", ""]),
            row(&["", "Port Olisar", "", "", ""]),
            row(&["", "Buy", "Sell", "Buy", "Sell"]),
            row(&["Gold", "4", "5", "6"]),
        ];
        let err = TableBuilder::default().build(&grid).unwrap_err();

        assert!(matches!(
            err,
            DataFormatError::InvalidCells(ref cells)
                if cells[0].kind == CellErrorKind::DuplicateLocation("Port Olisar".to_string())
        ));
    }

    #[test]
    fn test_separator_policy() {
        let point_only = TableBuilder::new(BuilderConfig {
            decimal_separator: DecimalSeparator::Point,
            ..Default::default()
        });
        assert_eq!(point_only.parse_price("10.5"), Some(d("10.5")));
        assert_eq!(point_only.parse_price("10,5"), None);

        let comma_only = TableBuilder::new(BuilderConfig {
            decimal_separator: DecimalSeparator::Comma,
            ..Default::default()
        });
        assert_eq!(comma_only.parse_price(" 10,5 "), Some(d("10.5")));
        assert_eq!(comma_only.parse_price("10.5"), None);

        let either = TableBuilder::default();
        assert_eq!(either.parse_price("12.00").unwrap().to_string(), "12");
        assert_eq!(either.parse_price("abc"), None);
    }
}
