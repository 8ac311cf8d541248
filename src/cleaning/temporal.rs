//! Date-based row removal: the "not yet inspected" sentinel and the exclusion window.

use chrono::NaiveDateTime;
use tracing::info;

use crate::cleaning::types::InspectionRow;
use crate::config::ExclusionWindow;

/// Drops rows whose inspection date is the "not yet inspected" sentinel.
pub fn remove_uninspected(rows: Vec<InspectionRow>, sentinel: NaiveDateTime) -> Vec<InspectionRow> {
    let rows: Vec<InspectionRow> = rows
        .into_iter()
        .filter(|row| row.inspection_date.timestamp() != Some(sentinel))
        .collect();

    info!(
        remaining = rows.len(),
        sentinel = %sentinel,
        "Sample size after removing not-yet-inspected entries"
    );
    rows
}

/// Rows removed by [`remove_window`], broken down by reason.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowRemoval {
    pub inside_window: usize,
    pub missing_date: usize,
}

/// Keeps rows inspected strictly before `window.start` or on/after `window.end`.
///
/// Rows without a parsed inspection date fail both comparisons and are dropped.
pub fn remove_window(rows: Vec<InspectionRow>, window: &ExclusionWindow) -> Vec<InspectionRow> {
    remove_window_counted(rows, window).0
}

pub(crate) fn remove_window_counted(
    rows: Vec<InspectionRow>,
    window: &ExclusionWindow,
) -> (Vec<InspectionRow>, WindowRemoval) {
    let mut removed = WindowRemoval::default();

    let rows: Vec<InspectionRow> = rows
        .into_iter()
        .filter(|row| match row.inspection_date.timestamp() {
            Some(ts) if window.contains(ts) => {
                removed.inside_window += 1;
                false
            }
            Some(_) => true,
            None => {
                removed.missing_date += 1;
                false
            }
        })
        .collect();

    info!(
        inside_window = removed.inside_window,
        missing_date = removed.missing_date,
        start = %window.start,
        end = %window.end,
        "Inspections removed for the exclusion window"
    );
    info!(remaining = rows.len(), "Sample size after removing exclusion window");

    (rows, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::types::DateValue;
    use crate::cleaning::types::fixtures::*;

    #[test]
    fn test_remove_uninspected_drops_sentinel_rows() {
        let sentinel = ts(1900, 1, 1);
        let rows = vec![row("1", sentinel), row("2", ts(2019, 4, 2))];

        let out = remove_uninspected(rows, sentinel);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].entity_id, "2");
    }

    #[test]
    fn test_remove_uninspected_keeps_missing_dates() {
        let mut missing = row("1", ts(2019, 4, 2));
        missing.inspection_date = DateValue::Missing;

        let out = remove_uninspected(vec![missing], ts(1900, 1, 1));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_remove_uninspected_is_idempotent() {
        let sentinel = ts(1900, 1, 1);
        let rows = vec![row("1", sentinel), row("2", ts(2019, 4, 2)), row("3", ts(2023, 1, 9))];

        let once = remove_uninspected(rows, sentinel);
        let twice = remove_uninspected(once.clone(), sentinel);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_remove_window_boundaries() {
        let window = ExclusionWindow::default();
        let rows = vec![
            row("before", ts(2020, 3, 16)),
            row("start", ts(2020, 3, 17)),
            row("inside", ts(2020, 11, 1)),
            row("last_day", ts(2021, 7, 18)),
            row("end", ts(2021, 7, 19)),
        ];

        let (out, removed) = remove_window_counted(rows, &window);

        let ids: Vec<_> = out.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["before", "end"]);
        assert_eq!(removed.inside_window, 3);
        assert_eq!(removed.missing_date, 0);
    }

    #[test]
    fn test_remove_window_drops_missing_dates() {
        let mut missing = row("1", ts(2019, 4, 2));
        missing.inspection_date = DateValue::Missing;

        let (out, removed) = remove_window_counted(vec![missing], &ExclusionWindow::default());

        assert!(out.is_empty());
        assert_eq!(removed.missing_date, 1);
    }

    #[test]
    fn test_remove_window_is_idempotent() {
        let window = ExclusionWindow::default();
        let rows = vec![row("1", ts(2019, 1, 1)), row("2", ts(2020, 6, 1)), row("3", ts(2022, 1, 1))];

        let once = remove_window(rows, &window);
        let twice = remove_window(once.clone(), &window);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }
}
