//! Property-based tests for the comparison pipeline
//!
//! Checks the diff engine's partition and facet invariants over random BOMs,
//! and that normalization never depends on column order.

use proptest::prelude::*;
use std::collections::BTreeSet;

use bomdiff_models::{BomItem, FieldAliasTable, RawGrid};

use crate::bom::{compare_boms, HeaderLocator, RowNormalizer};

prop_compose! {
    fn arb_item()(
        part_id in "P-[0-9]{1,2}",
        quantity in 0i64..20,
        refdes in prop::collection::vec("[RCU][1-9]", 0..4),
        description in "(Resistor|Capacitor|MCU|LED)",
    ) -> BomItem {
        BomItem::new(part_id, quantity, refdes, description).unwrap()
    }
}

fn arb_bom() -> impl Strategy<Value = Vec<BomItem>> {
    prop::collection::vec(arb_item(), 0..25)
}

fn part_ids(items: &[BomItem]) -> BTreeSet<String> {
    items.iter().map(|item| item.part_id().to_string()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every part ID lands in exactly one presence category
    #[test]
    fn prop_presence_categories_partition_the_union(master in arb_bom(), target in arb_bom()) {
        let result = compare_boms(&master, &target);

        let only_master = part_ids(&result.only_in_master);
        let only_target = part_ids(&result.only_in_target);
        let common: BTreeSet<String> = result.common.iter().cloned().collect();

        prop_assert!(only_master.is_disjoint(&only_target));
        prop_assert!(only_master.is_disjoint(&common));
        prop_assert!(only_target.is_disjoint(&common));

        let union: BTreeSet<String> = part_ids(&master).union(&part_ids(&target)).cloned().collect();
        let categorized: BTreeSet<String> = only_master.iter().chain(&only_target).chain(&common).cloned().collect();
        prop_assert_eq!(union, categorized);
        prop_assert_eq!(result.common.len(), common.len());
    }

    /// A common item is matched exactly when it is listed under no facet
    #[test]
    fn prop_matched_iff_no_facet_differs(master in arb_bom(), target in arb_bom()) {
        let result = compare_boms(&master, &target);

        for part_id in &result.common {
            prop_assert_eq!(result.is_matched(part_id), result.facets_for(part_id).is_empty());
        }
        prop_assert!(result.matched.len() <= result.common.len());
    }

    /// Comparing a BOM with itself finds no differences
    #[test]
    fn prop_self_comparison_matches_everything(bom in arb_bom()) {
        let result = compare_boms(&bom, &bom);

        prop_assert!(!result.has_differences());
        prop_assert_eq!(result.matched.len(), part_ids(&bom).len());
    }

    /// Swapping master and target swaps the presence categories and the
    /// added and removed reference designators
    #[test]
    fn prop_swapping_sides_is_symmetric(master in arb_bom(), target in arb_bom()) {
        let forward = compare_boms(&master, &target);
        let backward = compare_boms(&target, &master);

        prop_assert_eq!(part_ids(&forward.only_in_master), part_ids(&backward.only_in_target));
        prop_assert_eq!(part_ids(&forward.only_in_target), part_ids(&backward.only_in_master));
        prop_assert_eq!(&forward.common, &backward.common);
        prop_assert_eq!(forward.matched.len(), backward.matched.len());

        for (f, b) in forward.mismatched_refdes.iter().zip(&backward.mismatched_refdes) {
            prop_assert_eq!(&f.part_id, &b.part_id);
            prop_assert_eq!(&f.added, &b.removed);
            prop_assert_eq!(&f.removed, &b.added);
        }
    }

    /// Permuting the columns of a document does not change its records
    #[test]
    fn prop_normalization_ignores_column_order(
        rows in prop::collection::vec(("P-[0-9]{1,3}", 0u32..100, "[RC][1-9]( [RC][1-9]){0,2}", "[a-z]{0,8}"), 1..10),
        order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
    ) {
        let header = ["MPN", "Qty", "RefDes", "Description"];
        let build = |order: &[usize]| {
            let mut text_rows = vec![order.iter().map(|i| header[*i].to_string()).collect::<Vec<_>>()];
            for (part_id, quantity, refdes, description) in &rows {
                let cells = [part_id.clone(), quantity.to_string(), refdes.clone(), description.clone()];
                text_rows.push(order.iter().map(|i| cells[*i].clone()).collect());
            }
            RawGrid::from_text_rows(text_rows)
        };

        let aliases = FieldAliasTable::default();
        let locator = HeaderLocator::new(&aliases);
        let normalize = |grid: &RawGrid| {
            let header = locator.locate("bom.csv", grid).unwrap();
            RowNormalizer::new().normalize(grid, &header)
        };

        prop_assert_eq!(normalize(&build(&[0, 1, 2, 3])), normalize(&build(&order)));
    }
}
