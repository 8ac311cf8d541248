//! Data types flowing through the cleaning pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Output format used whenever a parsed timestamp is written back out.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Value of a date-typed column.
///
/// Loaded rows hold [`DateValue::Raw`] text. The normalizer turns it into
/// [`DateValue::Parsed`] or, when the text is not a recognizable timestamp,
/// [`DateValue::Missing`]. Only parsed values take part in range comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "Option<String>")]
pub enum DateValue {
    Missing,
    Parsed(NaiveDateTime),
    Raw(String),
}

impl DateValue {
    /// Returns the timestamp if the value has been parsed.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            DateValue::Parsed(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl From<Option<String>> for DateValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() => DateValue::Raw(s),
            _ => DateValue::Missing,
        }
    }
}

impl From<NaiveDateTime> for DateValue {
    fn from(ts: NaiveDateTime) -> Self {
        DateValue::Parsed(ts)
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Missing => f.write_str("<missing>"),
            DateValue::Parsed(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            DateValue::Raw(s) => f.write_str(s),
        }
    }
}

impl Serialize for DateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DateValue::Missing => serializer.serialize_none(),
            other => serializer.collect_str(other),
        }
    }
}

/// The date-typed columns of an [`InspectionRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateColumn {
    InspectionDate,
    RecordDate,
    GradeDate,
}

/// One source record: a single cited violation, or an inspection with none.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InspectionRow {
    #[serde(alias = "camis")]
    pub entity_id: String,
    #[serde(default)]
    pub dba: Option<String>,
    #[serde(default)]
    pub boro: Option<String>,
    #[serde(default)]
    pub cuisine_description: Option<String>,
    pub inspection_date: DateValue,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub violation_code: Option<String>,
    #[serde(default)]
    pub violation_description: Option<String>,
    #[serde(default)]
    pub critical_flag: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default = "missing_date")]
    pub grade_date: DateValue,
    #[serde(default = "missing_date")]
    pub record_date: DateValue,
    #[serde(default)]
    pub inspection_type: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

fn missing_date() -> DateValue {
    DateValue::Missing
}

/// Every field of an [`InspectionRow`] in hashable form. Floats compare by bit pattern.
#[derive(PartialEq, Eq, Hash)]
pub(crate) struct RowKey<'a> {
    entity_id: &'a str,
    dba: Option<&'a str>,
    boro: Option<&'a str>,
    cuisine_description: Option<&'a str>,
    inspection_date: &'a DateValue,
    action: Option<&'a str>,
    violation_code: Option<&'a str>,
    violation_description: Option<&'a str>,
    critical_flag: Option<&'a str>,
    score: Option<u64>,
    grade: Option<&'a str>,
    grade_date: &'a DateValue,
    record_date: &'a DateValue,
    inspection_type: Option<&'a str>,
    latitude: Option<u64>,
    longitude: Option<u64>,
}

impl InspectionRow {
    pub(crate) fn key(&self) -> RowKey<'_> {
        RowKey {
            entity_id: &self.entity_id,
            dba: self.dba.as_deref(),
            boro: self.boro.as_deref(),
            cuisine_description: self.cuisine_description.as_deref(),
            inspection_date: &self.inspection_date,
            action: self.action.as_deref(),
            violation_code: self.violation_code.as_deref(),
            violation_description: self.violation_description.as_deref(),
            critical_flag: self.critical_flag.as_deref(),
            score: self.score.map(f64::to_bits),
            grade: self.grade.as_deref(),
            grade_date: &self.grade_date,
            record_date: &self.record_date,
            inspection_type: self.inspection_type.as_deref(),
            latitude: self.latitude.map(f64::to_bits),
            longitude: self.longitude.map(f64::to_bits),
        }
    }

    pub fn date(&self, column: DateColumn) -> &DateValue {
        match column {
            DateColumn::InspectionDate => &self.inspection_date,
            DateColumn::RecordDate => &self.record_date,
            DateColumn::GradeDate => &self.grade_date,
        }
    }

    pub fn date_mut(&mut self, column: DateColumn) -> &mut DateValue {
        match column {
            DateColumn::InspectionDate => &mut self.inspection_date,
            DateColumn::RecordDate => &mut self.record_date,
            DateColumn::GradeDate => &mut self.grade_date,
        }
    }
}

/// Letter grade derived from an inspection score. Ordered `A < B < C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
}

impl LetterGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An eligible row with its score-derived grade attached.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedInspectionRow {
    pub row: InspectionRow,
    pub computed_grade: LetterGrade,
}

/// One inspection event: every row sharing `(entity_id, inspection_date)` collapsed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedInspection {
    pub entity_id: String,
    pub inspection_date: DateValue,
    pub inspection_type: Option<String>,
    pub original_grade: Option<String>,
    pub computed_grade: LetterGrade,
    pub action: Option<String>,
    pub boro: Option<String>,
    pub cuisine_description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// One entry per source row, in row order.
    pub critical_flags: Vec<Option<String>>,
    /// Non-null codes only. Empty means no violations were recorded.
    pub violation_codes: Vec<String>,
}
