//! CSV ingestion of raw inspection rows.
//!
//! Files ending in `.gz` are decompressed on the fly.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::cleaning::types::InspectionRow;

/// Deserializes every record of a headered CSV stream into [`InspectionRow`]s.
///
/// Date columns are kept as raw text; parsing is the normalizer's job.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<InspectionRow>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for (line, result) in rdr.deserialize().enumerate() {
        let record: InspectionRow =
            result.with_context(|| format!("malformed inspection record {}", line + 1))?;
        rows.push(record);
    }

    Ok(rows)
}

/// Loads inspection rows from a plain or gzip-compressed CSV file.
pub fn load_rows(path: &str) -> Result<Vec<InspectionRow>> {
    let file = File::open(path).with_context(|| format!("failed to open '{path}'"))?;
    let gzipped = Path::new(path).extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(path, gzipped, "Reading inspection CSV");

    let rows = if gzipped {
        read_rows(GzDecoder::new(BufReader::new(file)))?
    } else {
        read_rows(BufReader::new(file))?
    };

    info!(path, rows = rows.len(), "Loaded inspection rows");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::types::DateValue;

    const HEADER: &str = "camis,dba,boro,cuisine_description,inspection_date,action,violation_code,violation_description,critical_flag,score,grade,grade_date,record_date,inspection_type,latitude,longitude\n";

    #[test]
    fn test_read_rows_keeps_dates_raw_and_nulls_empty() {
        let data = format!(
            "{HEADER}41234567,CAFE,Queens,Thai,2019-05-14T00:00:00.000,No violations were recorded at the time of this inspection.,,,Not Applicable,0,A,2019-05-14T00:00:00.000,2024-01-02T06:00:00.000,Cycle Inspection / Initial Inspection,40.7,-73.8\n"
        );

        let rows = read_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.entity_id, "41234567");
        assert_eq!(
            row.inspection_date,
            DateValue::Raw("2019-05-14T00:00:00.000".to_string())
        );
        assert_eq!(row.violation_code, None);
        assert_eq!(row.score, Some(0.0));
        assert_eq!(row.longitude, Some(-73.8));
    }

    #[test]
    fn test_read_rows_tolerates_missing_optional_columns() {
        let data = "entity_id,inspection_date,score\n1,2019-05-14,12\n2,,\n";

        let rows = read_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].inspection_date, DateValue::Missing);
        assert_eq!(rows[1].score, None);
        assert_eq!(rows[0].grade_date, DateValue::Missing);
    }

    #[test]
    fn test_read_rows_rejects_non_numeric_score() {
        let data = "entity_id,inspection_date,score\n1,2019-05-14,twelve\n";
        assert!(read_rows(data.as_bytes()).is_err());
    }

    #[test]
    fn test_load_rows_missing_file() {
        assert!(load_rows("/nonexistent/inspections.csv").is_err());
    }
}
