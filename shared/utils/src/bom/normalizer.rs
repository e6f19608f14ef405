//! Row Normalizer
//!
//! Turns the data rows below a located header into canonical [`BomItem`]s.
//! Cells are only ever read through the header's column mapping, so columns
//! without a recognized header never reach the records.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace};

use bomdiff_models::{is_blank_row, BomField, BomItem, RawCell, RawGrid};

use super::header::HeaderMatch;

/// Reference designators are separated by commas, semicolons or whitespace
fn refdes_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[,;\s]+").expect("refdes separator pattern is valid"))
}

/// Normalizes data rows into canonical records.
///
/// Pure and deterministic: output follows source row order and no row
/// ever fails the document. Rows without a part ID are dropped silently,
/// and unparseable quantities become zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowNormalizer;

impl RowNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, grid: &RawGrid, header: &HeaderMatch) -> Vec<BomItem> {
        let mut items = Vec::new();
        let mut skipped = 0usize;

        for (row_index, row) in grid.rows().iter().enumerate().skip(header.row_index + 1) {
            if is_blank_row(row) {
                continue;
            }

            let read = |field: BomField| -> String {
                header
                    .columns
                    .column_for(field)
                    .and_then(|column| row.get(column))
                    .and_then(Option::as_ref)
                    .map(|cell: &RawCell| cell.as_text().trim().to_string())
                    .unwrap_or_default()
            };

            let part_id = read(BomField::PartId);
            if part_id.is_empty() {
                trace!(row_index, "Skipping row without part ID");
                skipped += 1;
                continue;
            }

            let quantity = parse_quantity(&read(BomField::Quantity)).unwrap_or_else(|| {
                debug!(row_index, part_id = %part_id, "Quantity is not an integer, defaulting to 0");
                0
            });
            let reference_designators = split_reference_designators(&read(BomField::ReferenceDesignators));
            let description = read(BomField::Description);

            match BomItem::new(part_id, quantity, reference_designators, description) {
                Ok(item) => items.push(item),
                Err(e) => debug!(row_index, error = %e, "Dropping invalid row"),
            }
        }

        debug!(items = items.len(), skipped, "Normalized data rows");
        items
    }
}

/// Parse a quantity cell. `None` for anything that is not a plain integer,
/// including an empty cell.
pub fn parse_quantity(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Split a reference designator cell into tokens, keeping source order
pub fn split_reference_designators(text: &str) -> Vec<String> {
    refdes_separator()
        .split(text)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
