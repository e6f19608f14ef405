//! Comparison result models.
//!
//! A [`DiffResult`] partitions the part IDs of a master and a target BOM into
//! presence categories, then records every facet on which the common items
//! disagree. Facets are independent: one item may be listed under several
//! of them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::item::BomItem;

/// One independent dimension of comparison between two items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Quantity,
    Description,
    ReferenceDesignators,
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quantity => "quantity",
            Self::Description => "description",
            Self::ReferenceDesignators => "reference-designators",
        };
        f.write_str(name)
    }
}

/// Master and target copies of an item that differs on a scalar facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMismatch {
    #[serde(rename = "MPN")]
    pub part_id: String,
    #[serde(rename = "master_item")]
    pub master: BomItem,
    #[serde(rename = "target_item")]
    pub target: BomItem,
}

/// Reference designator set difference for one common item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefDesMismatch {
    #[serde(rename = "MPN")]
    pub part_id: String,
    #[serde(rename = "master_item")]
    pub master: BomItem,
    #[serde(rename = "target_item")]
    pub target: BomItem,
    /// In target but not in master, ascending
    #[serde(rename = "added_refdes")]
    pub added: Vec<String>,
    /// In master but not in target, ascending
    #[serde(rename = "removed_refdes")]
    pub removed: Vec<String>,
}

/// Full comparison of a master BOM against one target BOM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Present in master only
    #[serde(rename = "missing_items")]
    pub only_in_master: Vec<BomItem>,
    /// Present in target only
    #[serde(rename = "extra_items")]
    pub only_in_target: Vec<BomItem>,
    /// Part IDs present on both sides
    pub common: Vec<String>,
    pub mismatched_quantity: Vec<ItemMismatch>,
    pub mismatched_description: Vec<ItemMismatch>,
    pub mismatched_refdes: Vec<RefDesMismatch>,
    pub matched: Vec<BomItem>,
    /// Part IDs that occurred more than once in the master input
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub master_duplicates: Vec<String>,
    /// Part IDs that occurred more than once in the target input
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_duplicates: Vec<String>,
}

/// Per-category counts of a [`DiffResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub missing: usize,
    pub extra: usize,
    pub common: usize,
    pub mismatched_quantity: usize,
    pub mismatched_description: usize,
    pub mismatched_refdes: usize,
    pub matched: usize,
}

impl DiffResult {
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            missing: self.only_in_master.len(),
            extra: self.only_in_target.len(),
            common: self.common.len(),
            mismatched_quantity: self.mismatched_quantity.len(),
            mismatched_description: self.mismatched_description.len(),
            mismatched_refdes: self.mismatched_refdes.len(),
            matched: self.matched.len(),
        }
    }

    /// False only when both sides hold the same part IDs and every one matched
    pub fn has_differences(&self) -> bool {
        !self.only_in_master.is_empty()
            || !self.only_in_target.is_empty()
            || self.matched.len() != self.common.len()
    }

    /// Facets on which the common item `part_id` differs
    pub fn facets_for(&self, part_id: &str) -> Vec<Facet> {
        let mut facets = Vec::new();
        if self.mismatched_quantity.iter().any(|m| m.part_id == part_id) {
            facets.push(Facet::Quantity);
        }
        if self.mismatched_description.iter().any(|m| m.part_id == part_id) {
            facets.push(Facet::Description);
        }
        if self.mismatched_refdes.iter().any(|m| m.part_id == part_id) {
            facets.push(Facet::ReferenceDesignators);
        }
        facets
    }

    pub fn is_matched(&self, part_id: &str) -> bool {
        self.matched.iter().any(|item| item.part_id() == part_id)
    }
}
