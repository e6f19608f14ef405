//! Report Assembler
//!
//! Human-readable summaries and tables for a [`DiffResult`], plus JSON output
//! of a whole [`BatchReport`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use bomdiff_models::{BatchReport, DiffResult};

use crate::error::BomDiffResult;

/// Row highlighting for [`format_table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub matched: &'static str,
    pub presence: &'static str,
    pub mismatch: &'static str,
    pub reset: &'static str,
}

impl ColorPalette {
    pub const ANSI: ColorPalette = ColorPalette {
        matched: "\x1b[32m",
        presence: "\x1b[33m",
        mismatch: "\x1b[31m",
        reset: "\x1b[0m",
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStyle {
    pub palette: Option<ColorPalette>,
}

impl ReportStyle {
    pub fn plain() -> Self {
        Self { palette: None }
    }

    pub fn ansi() -> Self {
        Self {
            palette: Some(ColorPalette::ANSI),
        }
    }
}

/// Row status labels, in the order they are listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RowStatus {
    DiffDescription,
    DiffQuantity,
    DiffRefDes,
    Extra,
    Missing,
    Ok,
}

impl RowStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::DiffDescription => "DIFF DESCRIPTION",
            Self::DiffQuantity => "DIFF QUANTITY",
            Self::DiffRefDes => "DIFF REFDES",
            Self::Extra => "EXTRA",
            Self::Missing => "MISSING",
            Self::Ok => "OK",
        }
    }
}

#[derive(Default)]
struct TableRow {
    master_quantity: Option<i64>,
    target_quantity: Option<i64>,
    statuses: BTreeSet<RowStatus>,
}

/// "Summary of Differences:" followed by one bullet per non-zero category
pub fn format_summary(result: &DiffResult) -> String {
    if !result.has_differences() {
        return "No differences found. All items matched perfectly.".to_string();
    }

    let summary = result.summary();
    let lines = [
        ("Missing Items", summary.missing),
        ("Extra Items", summary.extra),
        ("Mismatched Quantity", summary.mismatched_quantity),
        ("Mismatched Description", summary.mismatched_description),
        ("Mismatched RefDes", summary.mismatched_refdes),
        ("Perfectly Matched", summary.matched),
    ];

    let mut out = String::from("Summary of Differences:");
    for (label, count) in lines.iter().filter(|(_, count)| *count > 0) {
        let _ = write!(out, "\n  - {}: {}", label, count);
    }
    out
}

/// One row per part ID with both quantities and every status that applies
pub fn format_table(result: &DiffResult, style: &ReportStyle) -> String {
    let mut rows: BTreeMap<&str, TableRow> = BTreeMap::new();

    for item in &result.only_in_master {
        let row = rows.entry(item.part_id()).or_default();
        row.master_quantity = Some(item.quantity());
        row.statuses.insert(RowStatus::Missing);
    }
    for item in &result.only_in_target {
        let row = rows.entry(item.part_id()).or_default();
        row.target_quantity = Some(item.quantity());
        row.statuses.insert(RowStatus::Extra);
    }
    for item in &result.matched {
        let row = rows.entry(item.part_id()).or_default();
        row.master_quantity = Some(item.quantity());
        row.target_quantity = Some(item.quantity());
        row.statuses.insert(RowStatus::Ok);
    }

    let mismatches = result
        .mismatched_quantity
        .iter()
        .map(|m| (m.part_id.as_str(), &m.master, &m.target, RowStatus::DiffQuantity))
        .chain(
            result
                .mismatched_description
                .iter()
                .map(|m| (m.part_id.as_str(), &m.master, &m.target, RowStatus::DiffDescription)),
        )
        .chain(
            result
                .mismatched_refdes
                .iter()
                .map(|m| (m.part_id.as_str(), &m.master, &m.target, RowStatus::DiffRefDes)),
        );
    for (part_id, master, target, status) in mismatches {
        let row = rows.entry(part_id).or_default();
        row.master_quantity = Some(master.quantity());
        row.target_quantity = Some(target.quantity());
        row.statuses.insert(status);
    }

    if rows.is_empty() {
        return "No data to display.".to_string();
    }

    let rendered: Vec<(&str, String, String, String, &TableRow)> = rows
        .iter()
        .map(|(part_id, row)| {
            let quantity = |q: Option<i64>| q.map_or_else(|| "-".to_string(), |q| q.to_string());
            let status = row
                .statuses
                .iter()
                .map(RowStatus::label)
                .collect::<Vec<_>>()
                .join(", ");
            (*part_id, quantity(row.master_quantity), quantity(row.target_quantity), status, row)
        })
        .collect();

    let headers = ["MPN", "Master Qty", "Target Qty", "Status"];
    let mut widths = headers.map(str::len);
    for (part_id, master, target, status, _) in &rendered {
        widths[0] = widths[0].max(part_id.chars().count());
        widths[1] = widths[1].max(master.len());
        widths[2] = widths[2].max(target.len());
        widths[3] = widths[3].max(status.len());
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<w0$}  {:>w1$}  {:>w2$}  {}",
        headers[0],
        headers[1],
        headers[2],
        headers[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    );
    let _ = writeln!(out, "{}", "-".repeat(widths.iter().sum::<usize>() + 6));

    for (part_id, master, target, status, row) in &rendered {
        let line = format!(
            "{:<w0$}  {:>w1$}  {:>w2$}  {}",
            part_id,
            master,
            target,
            status,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
        match style.palette {
            Some(palette) => {
                let color = if row.statuses.contains(&RowStatus::Ok) {
                    palette.matched
                } else if row.statuses.contains(&RowStatus::Missing) || row.statuses.contains(&RowStatus::Extra) {
                    palette.presence
                } else {
                    palette.mismatch
                };
                let _ = writeln!(out, "{}{}{}", color, line, palette.reset);
            }
            None => {
                let _ = writeln!(out, "{}", line);
            }
        }
    }

    out.truncate(out.trim_end().len());
    out
}

/// Write `report` as pretty-printed JSON
pub fn save_json(report: &BatchReport, path: &Path) -> BomDiffResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), comparisons = report.comparisons.len(), "Saved comparison report");
    Ok(())
}
