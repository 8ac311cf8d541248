//! Data-integrity errors raised by the cleaning pipeline.

use std::fmt;

use thiserror::Error;

use crate::cleaning::types::DateValue;

/// A categorical column that must hold a single value per inspection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictingField {
    InspectionType,
    Action,
    Grade,
}

impl fmt::Display for ConflictingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConflictingField::InspectionType => "inspection_type",
            ConflictingField::Action => "action",
            ConflictingField::Grade => "grade",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CleanError {
    /// Grading hit a row without a usable numeric score.
    #[error("missing or non-numeric score for entity {entity_id} inspected at {inspection_date}")]
    MissingScore {
        entity_id: String,
        inspection_date: DateValue,
    },

    /// Rows of one inspection event disagree on a column that must be unique.
    #[error(
        "conflicting {} for entity {entity_id} inspected at {inspection_date}",
        join_fields(.fields)
    )]
    ConflictingValues {
        entity_id: String,
        inspection_date: DateValue,
        fields: Vec<ConflictingField>,
    },
}

fn join_fields(fields: &[ConflictingField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, CleanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_values_message_lists_fields() {
        let err = CleanError::ConflictingValues {
            entity_id: "41234567".to_string(),
            inspection_date: DateValue::Missing,
            fields: vec![ConflictingField::Action, ConflictingField::Grade],
        };

        let message = err.to_string();
        assert!(message.contains("action, grade"));
        assert!(message.contains("41234567"));
    }

    #[test]
    fn test_missing_score_message_names_row() {
        let err = CleanError::MissingScore {
            entity_id: "50001234".to_string(),
            inspection_date: DateValue::Raw("2022-01-05".to_string()),
        };

        assert_eq!(
            err.to_string(),
            "missing or non-numeric score for entity 50001234 inspected at 2022-01-05"
        );
    }
}
