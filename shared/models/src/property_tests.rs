//! Property-based tests for the BOM diff domain models
//!
//! Covers alias lookup normalization, column map invariants and the stability
//! of the canonical record's report representation.

use proptest::prelude::*;

use crate::{BomField, BomItem, ColumnFieldMap, FieldAliasTable, RawCell};

prop_compose! {
    fn arb_field()(index in 0usize..4) -> BomField {
        BomField::ALL[index]
    }
}

prop_compose! {
    fn arb_refdes()(prefix in "[CRLUDQ]", number in 1u32..500) -> String {
        format!("{}{}", prefix, number)
    }
}

prop_compose! {
    fn arb_item()(
        part_id in "[A-Z0-9][A-Z0-9-]{0,15}",
        quantity in -10i64..10_000,
        refdes in prop::collection::vec(arb_refdes(), 0..6),
        description in "[A-Za-z0-9 ,.]{0,30}",
    ) -> BomItem {
        BomItem::new(part_id, quantity, refdes, description).unwrap()
    }
}

/// Randomly flip the case of each character
fn scramble_case(text: &str, mask: &[bool]) -> String {
    text.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Alias lookup ignores case and surrounding whitespace
    #[test]
    fn prop_alias_lookup_is_case_and_padding_insensitive(
        field in arb_field(),
        pick in 0usize..4,
        mask in prop::collection::vec(any::<bool>(), 1..8),
        left in "[ \t]{0,3}",
        right in "[ \t]{0,3}",
    ) {
        let table = FieldAliasTable::default();
        let variants = table.variants(field);
        let variant = &variants[pick % variants.len()];
        let header = format!("{}{}{}", left, scramble_case(variant, &mask), right);

        prop_assert_eq!(table.resolve(&header), Some(field));
    }

    /// A column map never holds two columns for one field, and the last
    /// insertion for a field is the one kept
    #[test]
    fn prop_column_map_one_column_per_field(
        inserts in prop::collection::vec((0usize..12, arb_field()), 0..20),
    ) {
        let mut map = ColumnFieldMap::new();
        for (column, field) in &inserts {
            map.insert(*column, *field);
        }

        let mut seen = std::collections::HashSet::new();
        for field in map.fields() {
            prop_assert!(seen.insert(field));
        }

        for field in BomField::ALL {
            let last = inserts.iter().rev().find(|(_, f)| *f == field).map(|(c, _)| *c);
            if let Some(column) = map.column_for(field) {
                prop_assert_eq!(map.field_for(column), Some(field));
                // The column may have been taken over by a later field, but if
                // this field survives it sits where it was last inserted
                prop_assert_eq!(Some(column), last);
            }
        }
    }

    /// Integral float cells stringify to text that parses back to the integer
    #[test]
    fn prop_integral_float_cells_parse_as_integers(value in -1_000_000i64..1_000_000) {
        let cell = RawCell::Float(value as f64);
        prop_assert_eq!(cell.as_text().parse::<i64>().ok(), Some(value));
    }

    /// Canonical records survive the JSON report representation unchanged
    #[test]
    fn prop_item_json_representation_is_stable(item in arb_item()) {
        let json = serde_json::to_string(&item).unwrap();
        let back: BomItem = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.reference_designator_set(), item.reference_designator_set());
        prop_assert_eq!(back, item);
    }
}
