//! Header Locator
//!
//! Finds the header row of a raw grid and derives the column to field mapping.

use std::collections::HashSet;
use tracing::debug;

use bomdiff_models::{ColumnFieldMap, FieldAliasTable, RawCell, RawGrid};

use crate::error::{BomDiffError, BomDiffResult};

/// Distinct canonical fields a row must name to count as the header.
/// A single recognizable word in a data row is not enough.
pub const MIN_HEADER_FIELDS: usize = 2;

/// Chosen header row and its column mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub row_index: usize,
    pub columns: ColumnFieldMap,
}

/// Scans raw grids top-down for the first row that qualifies as a header
pub struct HeaderLocator<'a> {
    aliases: &'a FieldAliasTable,
}

impl<'a> HeaderLocator<'a> {
    pub fn new(aliases: &'a FieldAliasTable) -> Self {
        Self { aliases }
    }

    /// Locate the header of `grid`.
    ///
    /// The first row naming at least [`MIN_HEADER_FIELDS`] distinct fields
    /// wins and scanning stops there. Within that row, a field named by
    /// several columns maps to the last of them.
    pub fn locate(&self, document: &str, grid: &RawGrid) -> BomDiffResult<HeaderMatch> {
        for (row_index, row) in grid.rows().iter().enumerate() {
            if let Some(columns) = self.match_row(row) {
                debug!(
                    document,
                    row_index,
                    fields = ?columns.fields().collect::<Vec<_>>(),
                    "Located header row"
                );
                return Ok(HeaderMatch { row_index, columns });
            }
        }

        debug!(document, rows = grid.len(), "No header row found");
        Err(BomDiffError::header_not_found(document))
    }

    /// Column mapping for `row` if it qualifies as a header
    pub fn match_row(&self, row: &[Option<RawCell>]) -> Option<ColumnFieldMap> {
        let mut columns = ColumnFieldMap::new();
        let mut distinct = HashSet::new();

        for (column, cell) in row.iter().enumerate() {
            let Some(cell) = cell else { continue };
            if let Some(field) = self.aliases.resolve(&cell.as_text()) {
                columns.insert(column, field);
                distinct.insert(field);
            }
        }

        (distinct.len() >= MIN_HEADER_FIELDS).then_some(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomdiff_models::BomField;

    fn grid(rows: Vec<Vec<&str>>) -> RawGrid {
        RawGrid::from_text_rows(rows)
    }

    #[test]
    fn test_single_field_row_is_not_a_header() {
        let aliases = FieldAliasTable::default();
        let locator = HeaderLocator::new(&aliases);
        let grid = grid(vec![
            vec!["Description", "Rev B"],
            vec!["PN-1", "Widget"],
        ]);

        let err = locator.locate("bom.csv", &grid).unwrap_err();
        assert_eq!(err, BomDiffError::header_not_found("bom.csv"));
    }

    #[test]
    fn test_two_field_row_is_a_header() {
        let aliases = FieldAliasTable::default();
        let locator = HeaderLocator::new(&aliases);
        let grid = grid(vec![
            vec!["Project X", "", ""],
            vec!["MPN", "Notes", "Qty"],
            vec!["PN-1", "", "4"],
        ]);

        let header = locator.locate("bom.csv", &grid).unwrap();
        assert_eq!(header.row_index, 1);
        assert_eq!(header.columns.column_for(BomField::PartId), Some(0));
        assert_eq!(header.columns.column_for(BomField::Quantity), Some(2));
        assert_eq!(header.columns.field_for(1), None);
    }

    #[test]
    fn test_first_qualifying_row_wins() {
        let aliases = FieldAliasTable::default();
        let locator = HeaderLocator::new(&aliases);
        let grid = grid(vec![
            vec!["MPN", "Qty"],
            vec!["Part Number", "Quantity", "RefDes", "Description"],
        ]);

        let header = locator.locate("bom.csv", &grid).unwrap();
        assert_eq!(header.row_index, 0);
        assert_eq!(header.columns.len(), 2);
    }

    #[test]
    fn test_repeated_field_counts_once_and_last_column_wins() {
        let aliases = FieldAliasTable::default();
        let locator = HeaderLocator::new(&aliases);

        // Two quantity columns name only one distinct field
        let only_qty = grid(vec![vec!["Qty", "Quantity"]]);
        assert!(locator.locate("a.csv", &only_qty).is_err());

        let repeated = grid(vec![vec!["Qty", "MPN", "Quantity"]]);
        let header = locator.locate("b.csv", &repeated).unwrap();
        assert_eq!(header.columns.column_for(BomField::Quantity), Some(2));
        assert_eq!(header.columns.len(), 2);
    }

    #[test]
    fn test_numeric_cells_are_ignored_for_matching() {
        let aliases = FieldAliasTable::default();
        let locator = HeaderLocator::new(&aliases);
        let grid = RawGrid::new(vec![vec![
            Some(RawCell::Integer(1)),
            Some(RawCell::from(" MPN ")),
            None,
            Some(RawCell::from("DESC")),
        ]]);

        let header = locator.locate("bom.xlsx", &grid).unwrap();
        assert_eq!(header.columns.column_for(BomField::Description), Some(3));
    }

    #[test]
    fn test_empty_grid_has_no_header() {
        let aliases = FieldAliasTable::default();
        let locator = HeaderLocator::new(&aliases);
        assert!(locator.locate("empty.csv", &RawGrid::default()).is_err());
    }
}
