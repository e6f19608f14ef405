//! Diff Engine
//!
//! Compares two normalized BOMs keyed by part ID. Every list in the
//! resulting [`DiffResult`] is ordered by part ID, so the same inputs always
//! produce the same report.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use bomdiff_models::{BomItem, DiffResult, ItemMismatch, RefDesMismatch};

/// Index records by part ID. A repeated ID keeps its last occurrence; the
/// repeated IDs are returned in ascending order.
fn index_by_part_id<'a>(side: &str, items: &'a [BomItem]) -> (BTreeMap<&'a str, &'a BomItem>, Vec<String>) {
    let mut index = BTreeMap::new();
    let mut duplicates = BTreeSet::new();

    for item in items {
        if index.insert(item.part_id(), item).is_some() {
            duplicates.insert(item.part_id());
        }
    }

    if !duplicates.is_empty() {
        warn!(
            side,
            duplicates = ?duplicates,
            "Duplicate part IDs, keeping the last occurrence of each"
        );
    }

    (index, duplicates.into_iter().map(str::to_string).collect())
}

/// Compare `master` against `target`.
///
/// Part IDs split into master-only, target-only and common. Each common ID
/// is checked on quantity, exact description and reference designator set;
/// it lands in `matched` only when all three agree, otherwise under every
/// facet that differs.
pub fn compare_boms(master: &[BomItem], target: &[BomItem]) -> DiffResult {
    let (master_index, master_duplicates) = index_by_part_id("master", master);
    let (target_index, target_duplicates) = index_by_part_id("target", target);

    let mut result = DiffResult {
        master_duplicates,
        target_duplicates,
        ..Default::default()
    };

    for (part_id, master_item) in &master_index {
        let Some(target_item) = target_index.get(part_id) else {
            result.only_in_master.push((*master_item).clone());
            continue;
        };

        result.common.push(part_id.to_string());
        let mut equal = true;

        if master_item.quantity() != target_item.quantity() {
            equal = false;
            result.mismatched_quantity.push(ItemMismatch {
                part_id: part_id.to_string(),
                master: (*master_item).clone(),
                target: (*target_item).clone(),
            });
        }

        if master_item.description() != target_item.description() {
            equal = false;
            result.mismatched_description.push(ItemMismatch {
                part_id: part_id.to_string(),
                master: (*master_item).clone(),
                target: (*target_item).clone(),
            });
        }

        let master_refs = master_item.reference_designator_set();
        let target_refs = target_item.reference_designator_set();
        if master_refs != target_refs {
            equal = false;
            result.mismatched_refdes.push(RefDesMismatch {
                part_id: part_id.to_string(),
                master: (*master_item).clone(),
                target: (*target_item).clone(),
                added: target_refs.difference(&master_refs).map(|r| r.to_string()).collect(),
                removed: master_refs.difference(&target_refs).map(|r| r.to_string()).collect(),
            });
        }

        if equal {
            result.matched.push((*master_item).clone());
        }
    }

    result.only_in_target = target_index
        .iter()
        .filter(|(part_id, _)| !master_index.contains_key(*part_id))
        .map(|(_, item)| (*item).clone())
        .collect();

    debug!(summary = ?result.summary(), "Compared BOMs");
    result
}
