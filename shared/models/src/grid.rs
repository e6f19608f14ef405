//! Raw tabular data as produced by the format extractors.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A single untyped cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

/// Largest float that still converts to an integer without losing precision
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

impl RawCell {
    /// Stringified cell value, untrimmed.
    ///
    /// Floats with an integral value print without a fractional part, so a
    /// spreadsheet quantity stored as `10.0` reads as `"10"`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text.as_str()),
            Self::Integer(value) => Cow::Owned(value.to_string()),
            Self::Float(value) if value.fract() == 0.0 && value.abs() < MAX_EXACT_FLOAT => {
                Cow::Owned((*value as i64).to_string())
            }
            Self::Float(value) => Cow::Owned(value.to_string()),
            Self::Bool(value) => Cow::Owned(value.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

pub type RawRow = Vec<Option<RawCell>>;

/// Ordered rows of optional cells for one table of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGrid {
    rows: Vec<RawRow>,
}

impl RawGrid {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    /// Build a grid from plain strings; empty strings become absent cells
    pub fn from_text_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell: String = cell.into();
                        if cell.is_empty() {
                            None
                        } else {
                            Some(RawCell::Text(cell))
                        }
                    })
                    .collect()
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&RawRow> {
        self.rows.get(index)
    }

    /// Cell at `(row, column)`; `None` when absent or out of bounds
    pub fn cell(&self, row: usize, column: usize) -> Option<&RawCell> {
        self.rows.get(row)?.get(column)?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// True when every cell of the row is absent or blank text.
pub fn is_blank_row(row: &[Option<RawCell>]) -> bool {
    row.iter()
        .all(|cell| cell.as_ref().map_or(true, RawCell::is_blank))
}
