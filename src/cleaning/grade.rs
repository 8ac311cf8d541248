use std::collections::BTreeMap;

use tracing::info;

use crate::cleaning::types::{GradedInspectionRow, InspectionRow, LetterGrade};
use crate::error::{CleanError, Result};

/// Highest score that still earns an A.
pub const MAX_A_SCORE: f64 = 13.0;
/// Highest score that still earns a B.
pub const MAX_B_SCORE: f64 = 27.0;

/// Converts an inspection score into a letter grade. Lower scores are better.
///
/// | Range        | Grade |
/// |--------------|-------|
/// | <= 13        | A     |
/// | 14 ..= 27    | B     |
/// | > 27         | C     |
pub fn compute_grade(score: f64) -> LetterGrade {
    match score {
        s if s <= MAX_A_SCORE => LetterGrade::A,
        s if s <= MAX_B_SCORE => LetterGrade::B,
        _ => LetterGrade::C,
    }
}

/// Attaches a computed grade to every row.
///
/// A pre-existing A/B/C grade that disagrees with the score is counted and
/// logged; the source field is left untouched.
///
/// # Errors
///
/// Returns [`CleanError::MissingScore`] for the first row whose score is absent or NaN.
pub fn grade_rows(rows: Vec<InspectionRow>) -> Result<(Vec<GradedInspectionRow>, usize)> {
    let original: BTreeMap<&str, usize> = rows.iter().fold(BTreeMap::new(), |mut acc, row| {
        *acc.entry(row.grade.as_deref().unwrap_or("<none>")).or_default() += 1;
        acc
    });
    info!(grades = ?original, "Computing grades based on scores");

    let mut graded = Vec::with_capacity(rows.len());
    let mut mismatches = 0usize;
    let mut computed: BTreeMap<LetterGrade, usize> = BTreeMap::new();

    for row in rows {
        let score = match row.score {
            Some(s) if !s.is_nan() => s,
            _ => {
                return Err(CleanError::MissingScore {
                    entity_id: row.entity_id,
                    inspection_date: row.inspection_date,
                });
            }
        };

        let computed_grade = compute_grade(score);
        *computed.entry(computed_grade).or_default() += 1;

        if let Some(existing) = row.grade.as_deref() {
            if matches!(existing, "A" | "B" | "C") && existing != computed_grade.as_str() {
                mismatches += 1;
            }
        }

        graded.push(GradedInspectionRow {
            row,
            computed_grade,
        });
    }

    info!(grades = ?computed, "Computed grades based on scores");
    info!(
        mismatches,
        "Entries where the grade is not aligned with the score; computed grades will be used"
    );

    Ok((graded, mismatches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::types::fixtures::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(compute_grade(0.0), LetterGrade::A);
        assert_eq!(compute_grade(13.0), LetterGrade::A);
        assert_eq!(compute_grade(13.5), LetterGrade::B);
        assert_eq!(compute_grade(14.0), LetterGrade::B);
        assert_eq!(compute_grade(27.0), LetterGrade::B);
        assert_eq!(compute_grade(28.0), LetterGrade::C);
        assert_eq!(compute_grade(151.0), LetterGrade::C);
    }

    #[test]
    fn test_grade_is_monotonic() {
        let scores: Vec<f64> = (-2..=120).map(|s| s as f64 * 0.5).collect();
        for pair in scores.windows(2) {
            assert!(compute_grade(pair[0]) <= compute_grade(pair[1]));
        }
    }

    #[test]
    fn test_grade_rows_counts_mismatches_without_touching_source() {
        let mut agrees = row("1", ts(2019, 1, 1));
        agrees.score = Some(10.0);
        agrees.grade = Some("A".to_string());

        let mut disagrees = row("2", ts(2019, 1, 1));
        disagrees.score = Some(30.0);
        disagrees.grade = Some("A".to_string());

        let mut pending = row("3", ts(2019, 1, 1));
        pending.score = Some(20.0);
        pending.grade = Some("Z".to_string());

        let (graded, mismatches) = grade_rows(vec![agrees, disagrees, pending]).unwrap();

        assert_eq!(mismatches, 1);
        assert_eq!(graded[1].computed_grade, LetterGrade::C);
        assert_eq!(graded[1].row.grade.as_deref(), Some("A"));
        assert_eq!(graded[2].computed_grade, LetterGrade::B);
    }

    #[test]
    fn test_grade_rows_rejects_missing_score() {
        let mut r = row("40356018", ts(2019, 1, 1));
        r.score = None;

        let err = grade_rows(vec![r]).unwrap_err();
        match err {
            CleanError::MissingScore { entity_id, .. } => assert_eq!(entity_id, "40356018"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_grade_rows_rejects_nan_score() {
        let mut r = row("1", ts(2019, 1, 1));
        r.score = Some(f64::NAN);
        assert!(grade_rows(vec![r]).is_err());
    }
}
