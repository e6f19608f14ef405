//! BOM Document Loader
//!
//! Runs one document through extraction, header location and normalization.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use bomdiff_models::{BomItem, FieldAliasTable};

use super::extractor::BomFormat;
use super::header::HeaderLocator;
use super::normalizer::RowNormalizer;
use crate::error::{BomDiffError, BomDiffResult};
use crate::validation::file_extension;

/// Normalized records of one document with load metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedBom {
    pub id: Uuid,
    pub document: String,
    pub format: BomFormat,
    pub items: Vec<BomItem>,
    /// Grids that contributed records
    pub tables_used: usize,
}

/// Loads BOM documents of any supported format
#[derive(Debug, Clone, Default)]
pub struct BomLoader {
    aliases: FieldAliasTable,
}

impl BomLoader {
    pub fn new(aliases: FieldAliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &FieldAliasTable {
        &self.aliases
    }

    /// Load a document from memory. The format comes from `format` when
    /// given, otherwise from the extension of `document`.
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub fn load_bytes(&self, document: &str, data: &[u8], format: Option<BomFormat>) -> BomDiffResult<LoadedBom> {
        let format = match format.or_else(|| BomFormat::from_extension(Path::new(document))) {
            Some(format) => format,
            None => return Err(BomDiffError::unsupported_format(document, file_extension(document))),
        };

        let grids = format.extractor().extract(document, data)?;
        let locator = HeaderLocator::new(&self.aliases);
        let normalizer = RowNormalizer::new();

        let mut items = Vec::new();
        let mut tables_used = 0;

        for (table_index, grid) in grids.iter().enumerate() {
            let header = match locator.locate(document, grid) {
                Ok(header) => header,
                // Only Word documents carry several tables; the others must have a header
                Err(e) if grids.len() == 1 => return Err(e),
                Err(_) => {
                    debug!(table_index, "Skipping table without a header row");
                    continue;
                }
            };

            items.extend(normalizer.normalize(grid, &header));
            tables_used += 1;
        }

        if tables_used == 0 {
            return Err(BomDiffError::header_not_found(document));
        }
        if format == BomFormat::Docx && items.is_empty() {
            return Err(BomDiffError::extraction(
                document,
                "Found tables but could not extract valid BOM data",
            ));
        }

        info!(
            format = format.as_str(),
            items = items.len(),
            tables_used,
            "Loaded BOM document"
        );

        Ok(LoadedBom {
            id: Uuid::new_v4(),
            document: document.to_string(),
            format,
            items,
            tables_used,
        })
    }

    /// Load a document from disk
    pub fn load_path(&self, path: &Path) -> BomDiffResult<LoadedBom> {
        let document = path.display().to_string();
        if !path.is_file() {
            return Err(BomDiffError::document_not_found(document));
        }

        let data = std::fs::read(path)?;
        self.load_bytes(&document, &data, None)
    }
}
