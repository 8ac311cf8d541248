//! Narrows rows to the inspections that receive a letter grade.

use tracing::info;

use crate::cleaning::types::InspectionRow;
use crate::config::EligibilityPolicy;

impl EligibilityPolicy {
    /// True for closure actions or one of the two canonical action strings.
    pub fn accepts_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
            || action
                .to_lowercase()
                .contains(&self.closure_marker.to_lowercase())
    }

    pub fn accepts(&self, row: &InspectionRow) -> bool {
        let type_ok = row
            .inspection_type
            .as_deref()
            .is_some_and(|t| self.inspection_types.iter().any(|allowed| allowed == t));

        let action_ok = row
            .action
            .as_deref()
            .is_some_and(|a| self.accepts_action(a));

        let date_ok = row
            .inspection_date
            .timestamp()
            .is_some_and(|ts| ts.date() >= self.earliest_date);

        type_ok && action_ok && date_ok
    }
}

/// Retains rows of a gradable type and action inspected on or after the earliest scored date.
pub fn select_gradable(rows: Vec<InspectionRow>, policy: &EligibilityPolicy) -> Vec<InspectionRow> {
    let rows: Vec<InspectionRow> = rows.into_iter().filter(|row| policy.accepts(row)).collect();

    info!(
        remaining = rows.len(),
        "Sample size after filtering for gradable inspections"
    );
    rows
}
