//! Named pipeline constants, overridable from a JSON file.
//!
//! Every field falls back to its default, so a config file only needs the
//! values it changes:
//! ```json
//! {
//!   "exclusion_window": { "start": "2020-03-17T00:00:00", "end": "2021-07-19T00:00:00" },
//!   "eligibility": { "earliest_date": "2010-07-27" }
//! }
//! ```

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::cleaning::types::DateColumn;

/// Inspection types that carry a letter grade.
pub const GRADABLE_INSPECTION_TYPES: [&str; 4] = [
    "Cycle Inspection / Initial Inspection",
    "Cycle Inspection / Re-inspection",
    "Pre-permit (Operational) / Initial Inspection",
    "Pre-permit (Operational) / Re-inspection",
];

pub const VIOLATIONS_CITED: &str = "Violations were cited in the following area(s).";
pub const NO_VIOLATIONS_RECORDED: &str =
    "No violations were recorded at the time of this inspection.";

/// Substring marking a closure action, matched case-insensitively.
pub const CLOSURE_MARKER: &str = "Establishment Closed by DOHMH";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("calendar date literal out of range")
}

fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_time(NaiveTime::MIN)
}

/// Half-open interval `[start, end)` of inspection dates to discard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExclusionWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ExclusionWindow {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts < self.end
    }
}

impl Default for ExclusionWindow {
    /// The COVID-19 suspension of restaurant inspections.
    fn default() -> Self {
        Self {
            start: midnight(2020, 3, 17),
            end: midnight(2021, 7, 19),
        }
    }
}

/// Which rows count as gradable inspections.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EligibilityPolicy {
    pub inspection_types: Vec<String>,
    pub actions: Vec<String>,
    pub closure_marker: String,
    /// Earliest date the current scoring scheme applies.
    pub earliest_date: NaiveDate,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            inspection_types: GRADABLE_INSPECTION_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            actions: vec![
                VIOLATIONS_CITED.to_string(),
                NO_VIOLATIONS_RECORDED.to_string(),
            ],
            closure_marker: CLOSURE_MARKER.to_string(),
            earliest_date: date(2010, 7, 27),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub date_columns: Vec<DateColumn>,
    /// Inspection date the data source uses for "not yet inspected".
    pub uninspected_sentinel: NaiveDateTime,
    pub exclusion_window: ExclusionWindow,
    pub eligibility: EligibilityPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            date_columns: vec![
                DateColumn::InspectionDate,
                DateColumn::RecordDate,
                DateColumn::GradeDate,
            ],
            uninspected_sentinel: midnight(1900, 1, 1),
            exclusion_window: ExclusionWindow::default(),
            eligibility: EligibilityPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid pipeline config in '{path}'"))?;
        Ok(config)
    }
}
