//! Batch Comparator
//!
//! Compares one master BOM against several targets. Targets are independent:
//! each comparison runs on its own blocking task against a shared, read-only
//! copy of the master, and a target that fails to load or compare is reported
//! without affecting the others.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use bomdiff_models::{BatchReport, BomItem, ComparisonOutcome, DiffResult, TargetComparison};

use super::comparator::compare_boms;
use super::loader::BomLoader;
use crate::error::{BomDiffError, BomDiffResult};

/// One target of a batch, already loaded or failed to load
#[derive(Debug, Clone)]
pub struct TargetInput {
    pub source: String,
    pub items: BomDiffResult<Vec<BomItem>>,
}

impl TargetInput {
    pub fn new(source: impl Into<String>, items: BomDiffResult<Vec<BomItem>>) -> Self {
        Self {
            source: source.into(),
            items,
        }
    }
}

enum Pending {
    Running(JoinHandle<DiffResult>),
    Failed(BomDiffError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchComparator;

impl BatchComparator {
    pub fn new() -> Self {
        Self
    }

    /// Compare `master` against every target. Comparisons run concurrently;
    /// the report lists the targets in input order.
    #[instrument(skip(self, master, targets), fields(targets = targets.len()))]
    pub async fn run(&self, master_source: &str, master: Vec<BomItem>, targets: Vec<TargetInput>) -> BatchReport {
        let master: Arc<[BomItem]> = master.into();

        let pending: Vec<(String, Pending)> = targets
            .into_iter()
            .map(|target| {
                let state = match target.items {
                    Ok(items) => {
                        let master = Arc::clone(&master);
                        Pending::Running(tokio::task::spawn_blocking(move || compare_boms(&master, &items)))
                    }
                    Err(e) => Pending::Failed(e),
                };
                (target.source, state)
            })
            .collect();

        let mut comparisons = Vec::with_capacity(pending.len());
        for (source, state) in pending {
            let outcome = match state {
                Pending::Running(handle) => match handle.await {
                    Ok(diff) => ComparisonOutcome::Compared(diff),
                    Err(e) => {
                        error!(target_source = %source, error = %e, "Comparison task failed");
                        ComparisonOutcome::Failed(
                            BomDiffError::internal(format!("Comparison task failed: {}", e)).to_failure(&source),
                        )
                    }
                },
                Pending::Failed(e) => {
                    warn!(target_source = %source, error = %e, "Target could not be loaded");
                    ComparisonOutcome::Failed(e.to_failure(&source))
                }
            };
            comparisons.push(TargetComparison {
                target_source: source,
                outcome,
            });
        }

        let report = BatchReport::new(master_source, comparisons);
        info!(
            compared = report.compared_count(),
            failed = report.failed_count(),
            "Batch comparison finished"
        );
        report
    }

    /// Load the master and every target from disk, then run the batch.
    /// A master that cannot be loaded fails the whole run.
    pub async fn load_and_run(
        &self,
        loader: Arc<BomLoader>,
        master_path: &Path,
        target_paths: &[PathBuf],
    ) -> BomDiffResult<BatchReport> {
        let master_source = master_path.display().to_string();
        let master = {
            let loader = Arc::clone(&loader);
            let path = master_path.to_path_buf();
            tokio::task::spawn_blocking(move || loader.load_path(&path))
                .await
                .map_err(|e| BomDiffError::internal(format!("Loading task failed: {}", e)))??
        };

        let handles: Vec<(String, JoinHandle<BomDiffResult<Vec<BomItem>>>)> = target_paths
            .iter()
            .map(|path| {
                let loader = Arc::clone(&loader);
                let owned = path.clone();
                let handle = tokio::task::spawn_blocking(move || loader.load_path(&owned).map(|loaded| loaded.items));
                (path.display().to_string(), handle)
            })
            .collect();

        let mut targets = Vec::with_capacity(handles.len());
        for (source, handle) in handles {
            let items = handle
                .await
                .unwrap_or_else(|e| Err(BomDiffError::internal(format!("Loading task failed: {}", e))));
            targets.push(TargetInput::new(source, items));
        }

        Ok(self.run(&master_source, master.items, targets).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(part_id: &str, quantity: i64) -> BomItem {
        BomItem::new(part_id, quantity, vec![], "").unwrap()
    }

    #[tokio::test]
    async fn test_failed_target_does_not_abort_batch() {
        let master = vec![item("A", 1), item("B", 2)];
        let targets = vec![
            TargetInput::new("t1.csv", Ok(vec![item("A", 1), item("B", 2)])),
            TargetInput::new("t2.csv", Err(BomDiffError::header_not_found("t2.csv"))),
            TargetInput::new("t3.csv", Ok(vec![item("A", 5)])),
        ];

        let report = BatchComparator::new().run("master.csv", master, targets).await;

        assert_eq!(report.master_source, "master.csv");
        let sources: Vec<&str> = report.comparisons.iter().map(|c| c.target_source.as_str()).collect();
        assert_eq!(sources, vec!["t1.csv", "t2.csv", "t3.csv"]);

        assert!(!report.comparisons[0].outcome.diff().unwrap().has_differences());
        let failure = report.comparisons[1].outcome.failure().unwrap();
        assert_eq!(failure.code, "HEADER_NOT_FOUND");
        assert_eq!(failure.document, "t2.csv");
        let third = report.comparisons[2].outcome.diff().unwrap();
        assert_eq!(third.mismatched_quantity.len(), 1);
        assert_eq!(third.only_in_master.len(), 1);

        assert_eq!(report.compared_count(), 2);
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_batch_results_equal_pairwise_comparisons() {
        let master = vec![item("A", 1), item("B", 2)];
        let target_items = vec![vec![item("B", 3)], vec![item("C", 1), item("A", 1)]];
        let targets = target_items
            .iter()
            .enumerate()
            .map(|(i, items)| TargetInput::new(format!("t{}.csv", i), Ok(items.clone())))
            .collect();

        let report = BatchComparator::new().run("m.csv", master.clone(), targets).await;

        for (comparison, items) in report.comparisons.iter().zip(&target_items) {
            assert_eq!(comparison.outcome.diff(), Some(&compare_boms(&master, items)));
        }
    }

    #[tokio::test]
    async fn test_load_and_run_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let master = dir.path().join("master.csv");
        let target = dir.path().join("target.csv");
        std::fs::write(&master, "MPN,Qty\nA,1\nB,2\n").unwrap();
        std::fs::write(&target, "MPN,Qty\nA,1\n").unwrap();

        let report = BatchComparator::new()
            .load_and_run(
                Arc::new(BomLoader::default()),
                &master,
                &[target.clone(), dir.path().join("missing.csv")],
            )
            .await
            .unwrap();

        assert_eq!(report.comparisons.len(), 2);
        let diff = report.comparisons[0].outcome.diff().unwrap();
        assert_eq!(diff.only_in_master[0].part_id(), "B");
        assert_eq!(report.comparisons[1].outcome.failure().unwrap().code, "DOCUMENT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_unloadable_master_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.csv");
        std::fs::write(&target, "MPN,Qty\nA,1\n").unwrap();

        let err = BatchComparator::new()
            .load_and_run(Arc::new(BomLoader::default()), &dir.path().join("master.csv"), &[target])
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "DOCUMENT_NOT_FOUND");
    }
}
