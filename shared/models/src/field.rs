//! Canonical BOM fields and header alias configuration.
//!
//! Every source document names its columns differently ("MPN", "Part Number",
//! "Qty", ...). The alias table maps those header texts onto the four
//! canonical fields the rest of the system works with.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One of the four canonical fields of a BOM line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BomField {
    PartId,
    Quantity,
    ReferenceDesignators,
    Description,
}

impl BomField {
    /// All fields in canonical order.
    pub const ALL: [BomField; 4] = [
        BomField::PartId,
        BomField::Quantity,
        BomField::ReferenceDesignators,
        BomField::Description,
    ];

    /// Key used for this field in JSON reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PartId => "MPN",
            Self::Quantity => "Quantity",
            Self::ReferenceDesignators => "RefDes",
            Self::Description => "Description",
        }
    }
}

impl fmt::Display for BomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header text variants per canonical field, as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AliasVariants {
    pub part_id: Vec<String>,
    pub quantity: Vec<String>,
    pub reference_designators: Vec<String>,
    pub description: Vec<String>,
}

impl AliasVariants {
    fn for_field(&self, field: BomField) -> &[String] {
        match field {
            BomField::PartId => &self.part_id,
            BomField::Quantity => &self.quantity,
            BomField::ReferenceDesignators => &self.reference_designators,
            BomField::Description => &self.description,
        }
    }
}

impl Default for AliasVariants {
    fn default() -> Self {
        fn owned(values: &[&str]) -> Vec<String> {
            values.iter().map(|v| v.to_string()).collect()
        }

        Self {
            part_id: owned(&["mpn", "part number", "manufacturer part number", "mfg part number"]),
            quantity: owned(&["quantity", "qty", "quant"]),
            reference_designators: owned(&["refdes", "reference designator", "designator", "ref des"]),
            description: owned(&["description", "desc"]),
        }
    }
}

/// Lookup from normalized header text to canonical field.
///
/// Matching is exact after trimming and lowercasing. There is no substring or
/// fuzzy matching. When the same variant is configured for two fields, the
/// field that comes first in [`BomField::ALL`] keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AliasVariants", into = "AliasVariants")]
pub struct FieldAliasTable {
    variants: AliasVariants,
    lookup: HashMap<String, BomField>,
}

impl FieldAliasTable {
    pub fn new(variants: AliasVariants) -> Self {
        let mut normalized = AliasVariants {
            part_id: Vec::new(),
            quantity: Vec::new(),
            reference_designators: Vec::new(),
            description: Vec::new(),
        };
        let mut lookup = HashMap::new();

        for field in BomField::ALL {
            let target = match field {
                BomField::PartId => &mut normalized.part_id,
                BomField::Quantity => &mut normalized.quantity,
                BomField::ReferenceDesignators => &mut normalized.reference_designators,
                BomField::Description => &mut normalized.description,
            };

            for variant in variants.for_field(field) {
                let key = normalize_header_text(variant);
                if key.is_empty() || target.contains(&key) {
                    continue;
                }
                lookup.entry(key.clone()).or_insert(field);
                target.push(key);
            }
        }

        Self {
            variants: normalized,
            lookup,
        }
    }

    /// Resolve a raw header cell to its canonical field
    pub fn resolve(&self, text: &str) -> Option<BomField> {
        self.lookup.get(&normalize_header_text(text)).copied()
    }

    /// Normalized variants accepted for `field`
    pub fn variants(&self, field: BomField) -> &[String] {
        self.variants.for_field(field)
    }
}

impl Default for FieldAliasTable {
    fn default() -> Self {
        Self::new(AliasVariants::default())
    }
}

impl From<AliasVariants> for FieldAliasTable {
    fn from(variants: AliasVariants) -> Self {
        Self::new(variants)
    }
}

impl From<FieldAliasTable> for AliasVariants {
    fn from(table: FieldAliasTable) -> Self {
        table.variants
    }
}

/// Trim and lowercase header text before alias lookup.
pub fn normalize_header_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Column index to canonical field, derived from a document's header row.
///
/// Holds at most one column per field. Columns that are not in the map are
/// never read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFieldMap {
    columns: BTreeMap<usize, BomField>,
}

impl ColumnFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `column` to `field`, replacing any earlier column for the same field
    pub fn insert(&mut self, column: usize, field: BomField) {
        self.columns.retain(|_, existing| *existing != field);
        self.columns.insert(column, field);
    }

    pub fn column_for(&self, field: BomField) -> Option<usize> {
        self.columns
            .iter()
            .find(|(_, f)| **f == field)
            .map(|(column, _)| *column)
    }

    pub fn field_for(&self, column: usize) -> Option<BomField> {
        self.columns.get(&column).copied()
    }

    /// Mapped fields in column order
    pub fn fields(&self) -> impl Iterator<Item = BomField> + '_ {
        self.columns.values().copied()
    }

    /// `(column, field)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (usize, BomField)> + '_ {
        self.columns.iter().map(|(column, field)| (*column, *field))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_aliases_resolve_case_insensitively() {
        let table = FieldAliasTable::default();

        assert_eq!(table.resolve("MPN"), Some(BomField::PartId));
        assert_eq!(table.resolve("  Part Number "), Some(BomField::PartId));
        assert_eq!(table.resolve("QTY"), Some(BomField::Quantity));
        assert_eq!(table.resolve("Ref Des"), Some(BomField::ReferenceDesignators));
        assert_eq!(table.resolve("desc"), Some(BomField::Description));
    }

    #[test]
    fn test_no_substring_matching() {
        let table = FieldAliasTable::default();

        assert_eq!(table.resolve("part"), None);
        assert_eq!(table.resolve("quantity each"), None);
        assert_eq!(table.resolve(""), None);
    }

    #[test]
    fn test_configured_variants_are_normalized() {
        let table = FieldAliasTable::new(AliasVariants {
            part_id: vec![" Item Code ".to_string(), "ITEM CODE".to_string()],
            ..AliasVariants::default()
        });

        assert_eq!(table.resolve("item code"), Some(BomField::PartId));
        assert_eq!(table.variants(BomField::PartId), &["item code".to_string()]);
    }

    #[test]
    fn test_shared_variant_goes_to_first_field() {
        let table = FieldAliasTable::new(AliasVariants {
            part_id: vec!["code".to_string()],
            description: vec!["code".to_string()],
            ..AliasVariants::default()
        });

        assert_eq!(table.resolve("Code"), Some(BomField::PartId));
    }

    #[test]
    fn test_alias_table_deserializes_from_config_shape() {
        let json = r#"{"quantity": ["Count"]}"#;
        let table: FieldAliasTable = serde_json::from_str(json).unwrap();

        assert_eq!(table.resolve("count"), Some(BomField::Quantity));
        assert_eq!(table.resolve("qty"), None);
        // Unspecified fields fall back to defaults
        assert_eq!(table.resolve("mpn"), Some(BomField::PartId));
    }

    #[test]
    fn test_column_map_keeps_last_column_per_field() {
        let mut map = ColumnFieldMap::new();
        map.insert(0, BomField::PartId);
        map.insert(1, BomField::Quantity);
        map.insert(3, BomField::Quantity);

        assert_eq!(map.len(), 2);
        assert_eq!(map.column_for(BomField::Quantity), Some(3));
        assert_eq!(map.field_for(1), None);
        assert_eq!(map.fields().collect::<Vec<_>>(), vec![BomField::PartId, BomField::Quantity]);
    }
}
