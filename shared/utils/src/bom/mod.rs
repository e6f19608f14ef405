//! BOM (Bill of Materials) Comparison Pipeline
//!
//! Document bytes flow through four stages:
//!
//! 1. **extractor**: format adapter producing raw grids (CSV, TXT, XLSX/XLS, DOCX, PDF)
//! 2. **header**: locates the header row and maps columns onto canonical fields
//! 3. **normalizer**: turns data rows into canonical `BomItem`s
//! 4. **comparator**: diffs a master BOM against a target BOM
//!
//! `loader` runs the first three stages for one document, `batch` compares a
//! master against several targets concurrently and `report` renders results.

pub mod extractor;
pub mod header;
pub mod normalizer;
pub mod comparator;
pub mod loader;
pub mod batch;
pub mod report;

pub use extractor::{BomFormat, TabularExtractor};
pub use header::{HeaderLocator, HeaderMatch};
pub use normalizer::RowNormalizer;
pub use comparator::compare_boms;
pub use loader::{BomLoader, LoadedBom};
pub use batch::{BatchComparator, TargetInput};
pub use report::{format_summary, format_table, save_json, ColorPalette, ReportStyle};
