//! Row normalization: date parsing and exact-duplicate removal.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::cleaning::types::{DateColumn, DateValue, InspectionRow};

/// Parses a timestamp in any of the formats the inspection exports use.
///
/// Accepts ISO 8601 with a `T` or space separator and optional fractional
/// seconds, a bare `YYYY-MM-DD` date, and `MM/DD/YYYY`.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parses every listed date column. Unparseable text becomes [`DateValue::Missing`].
pub fn parse_dates(mut rows: Vec<InspectionRow>, columns: &[DateColumn]) -> Vec<InspectionRow> {
    let mut coerced = 0usize;

    for row in &mut rows {
        for &column in columns {
            let value = row.date_mut(column);
            if let DateValue::Raw(text) = value {
                let parsed = match parse_timestamp(text) {
                    Some(ts) => DateValue::Parsed(ts),
                    None => {
                        debug!(column = ?column, value = %text, "Unparseable date coerced to missing");
                        coerced += 1;
                        DateValue::Missing
                    }
                };
                *value = parsed;
            }
        }
    }

    info!(columns = ?columns, coerced, "Converted date columns");
    rows
}

/// Removes rows identical across every field, keeping the first occurrence.
pub fn drop_exact_duplicates(rows: Vec<InspectionRow>) -> Vec<InspectionRow> {
    let before = rows.len();

    let mut seen = HashSet::with_capacity(rows.len());
    let keep: Vec<bool> = rows.iter().map(|row| seen.insert(row.key())).collect();
    drop(seen);

    let deduped: Vec<InspectionRow> = rows
        .into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect();

    info!(
        removed = before - deduped.len(),
        remaining = deduped.len(),
        "Sample size after removing duplicates"
    );
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::types::fixtures::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = ts(2019, 5, 14);
        assert_eq!(parse_timestamp("2019-05-14T00:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2019-05-14T00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2019-05-14 00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2019-05-14"), Some(expected));
        assert_eq!(parse_timestamp("05/14/2019"), Some(expected));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2019-13-40"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_parse_dates_only_touches_listed_columns() {
        let mut raw = row("1", ts(2022, 1, 1));
        raw.inspection_date = DateValue::Raw("2022-03-04T00:00:00.000".to_string());
        raw.record_date = DateValue::Raw("2024-01-01".to_string());

        let parsed = parse_dates(vec![raw], &[DateColumn::InspectionDate]);

        assert_eq!(parsed[0].inspection_date, DateValue::Parsed(ts(2022, 3, 4)));
        assert_eq!(parsed[0].record_date, DateValue::Raw("2024-01-01".to_string()));
    }

    #[test]
    fn test_parse_dates_coerces_bad_values_to_missing() {
        let mut raw = row("1", ts(2022, 1, 1));
        raw.inspection_date = DateValue::Raw("N/A".to_string());

        let parsed = parse_dates(vec![raw], &[DateColumn::InspectionDate]);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].inspection_date, DateValue::Missing);
    }

    #[test]
    fn test_drop_exact_duplicates_keeps_first_occurrence_order() {
        let a = row("1", ts(2022, 1, 1));
        let b = row("2", ts(2022, 1, 1));
        let mut c = row("1", ts(2022, 1, 1));
        c.violation_code = Some("04L".to_string());

        let out = drop_exact_duplicates(vec![a.clone(), b.clone(), a.clone(), c.clone(), b.clone()]);

        assert_eq!(out, vec![a, b, c]);
    }

    #[test]
    fn test_drop_exact_duplicates_treats_missing_values_as_equal() {
        let mut a = row("1", ts(2022, 1, 1));
        a.score = None;
        a.grade = None;

        let out = drop_exact_duplicates(vec![a.clone(), a]);
        assert_eq!(out.len(), 1);
    }
}
