//! Canonical BOM line item.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::{Validate, ValidationErrors};

/// One normalized BOM line, independent of the source format.
///
/// Fields are read-only after construction. Serialized with the key names of
/// the JSON comparison report (`MPN`, `Quantity`, `RefDes`, `Description`).
/// Deserialization goes through [`BomItem::new`], so it rejects an empty
/// part ID as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(try_from = "BomItemRecord")]
pub struct BomItem {
    #[serde(rename = "MPN")]
    #[validate(length(min = 1, message = "Part ID must not be empty"))]
    part_id: String,
    #[serde(rename = "Quantity")]
    quantity: i64,
    #[serde(rename = "RefDes")]
    reference_designators: Vec<String>,
    #[serde(rename = "Description")]
    description: String,
}

/// Unchecked wire form of [`BomItem`]
#[derive(Deserialize)]
struct BomItemRecord {
    #[serde(rename = "MPN")]
    part_id: String,
    #[serde(rename = "Quantity")]
    quantity: i64,
    #[serde(rename = "RefDes", default)]
    reference_designators: Vec<String>,
    #[serde(rename = "Description", default)]
    description: String,
}

impl TryFrom<BomItemRecord> for BomItem {
    type Error = ValidationErrors;

    fn try_from(record: BomItemRecord) -> Result<Self, Self::Error> {
        BomItem::new(
            record.part_id,
            record.quantity,
            record.reference_designators,
            record.description,
        )
    }
}

impl BomItem {
    pub fn new(
        part_id: impl Into<String>,
        quantity: i64,
        reference_designators: Vec<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationErrors> {
        let item = Self {
            part_id: part_id.into(),
            quantity,
            reference_designators,
            description: description.into(),
        };
        item.validate()?;
        Ok(item)
    }

    pub fn part_id(&self) -> &str {
        &self.part_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Reference designators in source order, for display
    pub fn reference_designators(&self) -> &[String] {
        &self.reference_designators
    }

    /// Reference designators as a set, for comparison
    pub fn reference_designator_set(&self) -> BTreeSet<&str> {
        self.reference_designators.iter().map(String::as_str).collect()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_part_id_is_rejected() {
        assert!(BomItem::new("", 1, vec![], "Resistor").is_err());
        assert!(BomItem::new("R-0402-10K", 1, vec![], "Resistor").is_ok());
    }

    #[test]
    fn test_refdes_set_ignores_order_and_repeats() {
        let a = BomItem::new("P1", 2, vec!["R2".into(), "R1".into(), "R2".into()], "").unwrap();
        let b = BomItem::new("P1", 2, vec!["R1".into(), "R2".into()], "").unwrap();

        assert_ne!(a.reference_designators(), b.reference_designators());
        assert_eq!(a.reference_designator_set(), b.reference_designator_set());
    }

    #[test]
    fn test_report_key_names() {
        let item = BomItem::new("P1", 3, vec!["C1".into()], "Cap").unwrap();
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["MPN"], "P1");
        assert_eq!(json["Quantity"], 3);
        assert_eq!(json["RefDes"][0], "C1");
        assert_eq!(json["Description"], "Cap");
    }

    #[test]
    fn test_deserialize_validates_part_id() {
        let item: BomItem =
            serde_json::from_str(r#"{"MPN":"P1","Quantity":2,"RefDes":["R1"],"Description":"Res"}"#).unwrap();
        assert_eq!(item, BomItem::new("P1", 2, vec!["R1".into()], "Res").unwrap());

        let err = serde_json::from_str::<BomItem>(r#"{"MPN":"","Quantity":1,"RefDes":[],"Description":""}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Part ID must not be empty"));
    }
}
