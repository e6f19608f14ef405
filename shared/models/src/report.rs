//! Batch comparison report models.
//!
//! One master BOM is compared against several targets. Each target either
//! produces a [`DiffResult`] or a [`DocumentFailure`]; a failing target never
//! hides the results of the others.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diff::DiffResult;

/// Why a document could not be compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub document: String,
    pub code: String,
    #[serde(rename = "error")]
    pub message: String,
}

/// Outcome of comparing the master against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComparisonOutcome {
    Compared(DiffResult),
    Failed(DocumentFailure),
}

impl ComparisonOutcome {
    pub fn diff(&self) -> Option<&DiffResult> {
        match self {
            Self::Compared(diff) => Some(diff),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&DocumentFailure> {
        match self {
            Self::Compared(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetComparison {
    #[serde(rename = "target_file")]
    pub target_source: String,
    #[serde(rename = "result")]
    pub outcome: ComparisonOutcome,
}

/// Everything produced by one master-vs-targets run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub master_source: String,
    pub comparisons: Vec<TargetComparison>,
}

impl BatchReport {
    pub fn new(master_source: impl Into<String>, comparisons: Vec<TargetComparison>) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            master_source: master_source.into(),
            comparisons,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.comparisons
            .iter()
            .filter(|c| c.outcome.failure().is_some())
            .count()
    }

    pub fn compared_count(&self) -> usize {
        self.comparisons.len() - self.failed_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_json_shape() {
        let report = BatchReport::new(
            "master.xlsx",
            vec![
                TargetComparison {
                    target_source: "a.csv".to_string(),
                    outcome: ComparisonOutcome::Compared(DiffResult::default()),
                },
                TargetComparison {
                    target_source: "b.pdf".to_string(),
                    outcome: ComparisonOutcome::Failed(DocumentFailure {
                        document: "b.pdf".to_string(),
                        code: "HEADER_NOT_FOUND".to_string(),
                        message: "no header".to_string(),
                    }),
                },
            ],
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["master_source"], "master.xlsx");
        assert_eq!(json["comparisons"][0]["target_file"], "a.csv");
        assert!(json["comparisons"][0]["result"]["matched"].is_array());
        assert_eq!(json["comparisons"][1]["result"]["error"], "no header");
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.compared_count(), 1);

        let back: BatchReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
