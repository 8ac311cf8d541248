//! Export of cleaned inspection data.
//!
//! Graded rows are written as CSV (optionally gzip-compressed); aggregated
//! inspections carry list columns and are written as JSON.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, info};

use crate::cleaning::pipeline::CleaningReport;
use crate::cleaning::types::{AggregatedInspection, DateValue, GradedInspectionRow, LetterGrade};

/// Flat CSV shape of a [`GradedInspectionRow`].
#[derive(Serialize)]
struct GradedRecord<'a> {
    entity_id: &'a str,
    dba: Option<&'a str>,
    boro: Option<&'a str>,
    cuisine_description: Option<&'a str>,
    inspection_date: &'a DateValue,
    action: Option<&'a str>,
    violation_code: Option<&'a str>,
    violation_description: Option<&'a str>,
    critical_flag: Option<&'a str>,
    score: Option<f64>,
    grade: Option<&'a str>,
    grade_date: &'a DateValue,
    record_date: &'a DateValue,
    inspection_type: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    computed_grade: LetterGrade,
}

impl<'a> From<&'a GradedInspectionRow> for GradedRecord<'a> {
    fn from(graded: &'a GradedInspectionRow) -> Self {
        let row = &graded.row;
        Self {
            entity_id: &row.entity_id,
            dba: row.dba.as_deref(),
            boro: row.boro.as_deref(),
            cuisine_description: row.cuisine_description.as_deref(),
            inspection_date: &row.inspection_date,
            action: row.action.as_deref(),
            violation_code: row.violation_code.as_deref(),
            violation_description: row.violation_description.as_deref(),
            critical_flag: row.critical_flag.as_deref(),
            score: row.score,
            grade: row.grade.as_deref(),
            grade_date: &row.grade_date,
            record_date: &row.record_date,
            inspection_type: row.inspection_type.as_deref(),
            latitude: row.latitude,
            longitude: row.longitude,
            computed_grade: graded.computed_grade,
        }
    }
}

/// Writes graded rows as CSV with a header line.
pub fn write_graded<W: Write>(writer: W, rows: &[GradedInspectionRow]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for graded in rows {
        writer.serialize(GradedRecord::from(graded))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes graded rows to `path`, gzip-compressing them when `gzip` is set.
pub fn write_graded_csv(path: &str, rows: &[GradedInspectionRow], gzip: bool) -> Result<()> {
    debug!(path, gzip, rows = rows.len(), "Writing graded rows");
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;

    if gzip {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_graded(&mut encoder, rows)?;
        encoder.finish()?.flush()?;
    } else {
        write_graded(BufWriter::new(file), rows)?;
    }

    info!(path, rows = rows.len(), "Graded rows written");
    Ok(())
}

/// Writes aggregated inspections to `path` as a pretty-printed JSON array.
pub fn write_aggregated_json(path: &str, inspections: &[AggregatedInspection]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, inspections)?;
    writer.flush()?;

    info!(path, inspections = inspections.len(), "Aggregated inspections written");
    Ok(())
}

/// Logs the cleaning report as pretty-printed JSON.
pub fn print_report(report: &CleaningReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
