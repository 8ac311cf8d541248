use serde::Serialize;
use tracing::info;

use crate::cleaning::aggregate::aggregate_per_inspection;
use crate::cleaning::eligibility::select_gradable;
use crate::cleaning::grade::grade_rows;
use crate::cleaning::normalize::{drop_exact_duplicates, parse_dates};
use crate::cleaning::temporal::{remove_uninspected, remove_window_counted};
use crate::cleaning::types::{AggregatedInspection, GradedInspectionRow, InspectionRow};
use crate::config::PipelineConfig;
use crate::error::Result;

/// Row counts observed at each stage. Informational only.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub after_dedup: usize,
    pub uninspected_removed: usize,
    pub window_removed: usize,
    pub missing_date_removed: usize,
    pub gradable_rows: usize,
    pub grade_mismatches: usize,
    pub inspections: usize,
}

/// The two artifacts produced by [`clean_data`].
#[derive(Debug)]
pub struct CleanedData {
    /// Eligible rows, ungrouped, each with its computed grade.
    pub graded: Vec<GradedInspectionRow>,
    /// One record per `(entity_id, inspection_date)`.
    pub aggregated: Vec<AggregatedInspection>,
    pub report: CleaningReport,
}

/// Runs the full cleaning pipeline over loaded rows.
///
/// Stages run in order: exact-duplicate removal, date parsing, sentinel
/// removal, exclusion window, eligibility, grading, aggregation.
///
/// # Errors
///
/// Fails if an eligible row has no score, or if an inspection event holds
/// conflicting categorical values.
#[tracing::instrument(skip_all, fields(rows = rows.len()))]
pub fn clean_data(rows: Vec<InspectionRow>, config: &PipelineConfig) -> Result<CleanedData> {
    info!("Starting preprocessing of data");
    let mut report = CleaningReport {
        input_rows: rows.len(),
        ..Default::default()
    };

    let rows = drop_exact_duplicates(rows);
    report.after_dedup = rows.len();

    let rows = parse_dates(rows, &config.date_columns);

    let rows = remove_uninspected(rows, config.uninspected_sentinel);
    report.uninspected_removed = report.after_dedup - rows.len();

    let (rows, removed) = remove_window_counted(rows, &config.exclusion_window);
    report.window_removed = removed.inside_window;
    report.missing_date_removed = removed.missing_date;

    let rows = select_gradable(rows, &config.eligibility);
    report.gradable_rows = rows.len();

    let (graded, mismatches) = grade_rows(rows)?;
    report.grade_mismatches = mismatches;

    let aggregated = aggregate_per_inspection(&graded)?;
    report.inspections = aggregated.len();

    info!(report = ?report, "Preprocessing complete");

    Ok(CleanedData {
        graded,
        aggregated,
        report,
    })
}
