//! # BOM Diff Domain Models
//!
//! Data shapes shared by the extractors, the normalization pipeline, the diff
//! engine and the reporting layer. All models serialize with serde so they
//! can be written to JSON reports or returned from the HTTP service.
//!
//! ## Key Models
//!
//! - **RawGrid**: rows of optional untyped cells, as read from a document
//! - **FieldAliasTable**: header text variants for each canonical field
//! - **ColumnFieldMap**: column index to canonical field for one document
//! - **BomItem**: the canonical, comparable BOM line item
//! - **DiffResult**: presence categories and facet mismatches for one comparison
//! - **BatchReport**: per-target outcomes of a master-vs-targets run

pub mod field;
pub mod grid;
pub mod item;
pub mod diff;
pub mod report;

#[cfg(test)]
pub mod property_tests;

pub use field::*;
pub use grid::*;
pub use item::*;
pub use diff::*;
pub use report::*;
