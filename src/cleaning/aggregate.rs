use crate::cleaning::types::{AggregatedInspection, DateValue, GradedInspectionRow};
use crate::error::{CleanError, ConflictingField, Result};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// Sort order for establishment identifiers: numeric ids by value, then any
/// non-numeric ids as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum EntityKey {
    Numeric(u64, String),
    Text(String),
}

impl EntityKey {
    fn new(entity_id: &str) -> Self {
        match entity_id.parse::<u64>() {
            Ok(n) => EntityKey::Numeric(n, entity_id.to_string()),
            Err(_) => EntityKey::Text(entity_id.to_string()),
        }
    }

    fn into_id(self) -> String {
        match self {
            EntityKey::Numeric(_, id) | EntityKey::Text(id) => id,
        }
    }

    fn id(&self) -> &str {
        match self {
            EntityKey::Numeric(_, id) | EntityKey::Text(id) => id,
        }
    }
}

type InspectionKey = (EntityKey, DateValue);

/// Groups graded rows by `(entity_id, inspection_date)`, preserving row order within each group.
fn group_rows(rows: &[GradedInspectionRow]) -> BTreeMap<InspectionKey, Vec<&GradedInspectionRow>> {
    let mut groups: BTreeMap<InspectionKey, Vec<&GradedInspectionRow>> = BTreeMap::new();
    for graded in rows {
        let key = (
            EntityKey::new(&graded.row.entity_id),
            graded.row.inspection_date.clone(),
        );
        groups.entry(key).or_default().push(graded);
    }
    groups
}

/// Number of distinct non-null values among `values`.
fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> usize {
    values.flatten().collect::<HashSet<&str>>().len()
}

/// Columns holding more than one distinct value within a group.
fn conflicting_fields(group: &[&GradedInspectionRow]) -> Vec<ConflictingField> {
    let mut fields = Vec::new();

    if distinct(group.iter().map(|g| g.row.inspection_type.as_deref())) > 1 {
        fields.push(ConflictingField::InspectionType);
    }
    if distinct(group.iter().map(|g| g.row.action.as_deref())) > 1 {
        fields.push(ConflictingField::Action);
    }
    if distinct(group.iter().map(|g| g.row.grade.as_deref())) > 1 {
        fields.push(ConflictingField::Grade);
    }

    fields
}

/// Fails on the first group whose inspection type, action or grade is not unique.
fn check_unique_per_inspection(
    groups: &BTreeMap<InspectionKey, Vec<&GradedInspectionRow>>,
) -> Result<()> {
    for ((entity_id, inspection_date), group) in groups {
        let fields = conflicting_fields(group);
        if !fields.is_empty() {
            return Err(CleanError::ConflictingValues {
                entity_id: entity_id.id().to_string(),
                inspection_date: inspection_date.clone(),
                fields,
            });
        }
    }
    Ok(())
}

/// Collapses a validated group into one inspection record.
///
/// `inspection_type`, `action` and `computed_grade` are unique per group and
/// come from the first row. The remaining scalars take the first non-null value.
fn reduce_group(key: InspectionKey, group: &[&GradedInspectionRow]) -> AggregatedInspection {
    let (entity_id, inspection_date) = key;
    let entity_id = entity_id.into_id();
    let first = &group[0];

    AggregatedInspection {
        entity_id,
        inspection_date,
        inspection_type: first.row.inspection_type.clone(),
        original_grade: group.iter().find_map(|g| g.row.grade.clone()),
        computed_grade: first.computed_grade,
        action: first.row.action.clone(),
        boro: group.iter().find_map(|g| g.row.boro.clone()),
        cuisine_description: group
            .iter()
            .find_map(|g| g.row.cuisine_description.clone()),
        latitude: group.iter().find_map(|g| g.row.latitude),
        longitude: group.iter().find_map(|g| g.row.longitude),
        critical_flags: group.iter().map(|g| g.row.critical_flag.clone()).collect(),
        violation_codes: group
            .iter()
            .filter_map(|g| g.row.violation_code.clone())
            .collect(),
    }
}

/// Aggregates violation rows into one [`AggregatedInspection`] per inspection event,
/// sorted by `(entity_id, inspection_date)`. Numeric ids sort by value.
///
/// # Errors
///
/// Returns [`CleanError::ConflictingValues`] if any inspection event has more
/// than one distinct inspection type, action or pre-existing grade. Nothing is
/// aggregated in that case.
pub fn aggregate_per_inspection(rows: &[GradedInspectionRow]) -> Result<Vec<AggregatedInspection>> {
    let groups = group_rows(rows);

    check_unique_per_inspection(&groups)?;

    let aggregated: Vec<AggregatedInspection> = groups
        .into_iter()
        .map(|(key, group)| reduce_group(key, &group))
        .collect();

    info!(
        inspections = aggregated.len(),
        "Aggregated data per inspection"
    );
    Ok(aggregated)
}
