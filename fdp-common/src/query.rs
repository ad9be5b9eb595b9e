//! Filtered and sorted views over project records
//!
//! Pure functions over a snapshot; the store uses [`ProjectFilter`] for its
//! own filtering so both sides share one set of matching rules.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::model::{FieldValue, ProjectField, ProjectRecord};

/// Conjunctive filter; empty strings count as "no constraint"
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilter {
    pub construction_progress: Option<String>,
    pub design_stage: Option<String>,
    /// Case-insensitive substring of name, number, brief scope or leader
    pub search: Option<String>,
}

fn constraint(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

impl ProjectFilter {
    pub fn is_empty(&self) -> bool {
        constraint(&self.construction_progress).is_none()
            && constraint(&self.design_stage).is_none()
            && constraint(&self.search).is_none()
    }

    pub fn matches(&self, record: &ProjectRecord) -> bool {
        if let Some(wanted) = constraint(&self.construction_progress) {
            let stage = record.construction_progress.as_ref().map(|stage| stage.as_str());
            if stage != Some(wanted) {
                return false;
            }
        }
        if let Some(wanted) = constraint(&self.design_stage) {
            let stage = record.design_stage.as_ref().map(|stage| stage.as_str());
            if stage != Some(wanted) {
                return false;
            }
        }
        if let Some(search) = constraint(&self.search) {
            let needle = search.to_lowercase();
            let contains = |text: &str| text.to_lowercase().contains(&needle);
            let hit = contains(&record.name)
                || contains(&record.design_project_number)
                || record.brief_scope.as_deref().is_some_and(contains)
                || record.design_project_leader.as_deref().is_some_and(contains);
            if !hit {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Parses "asc"/"desc" in any case; anything else is ascending
    pub fn parse(text: &str) -> Self {
        if text.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// Current table sort: no field means input order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub field: Option<ProjectField>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(field: ProjectField, direction: SortDirection) -> Self {
        Self {
            field: Some(field),
            direction,
        }
    }

    /// Selecting the current field flips direction; a new field starts ascending
    pub fn toggle(self, field: ProjectField) -> Self {
        if self.field == Some(field) {
            Self::by(field, self.direction.flipped())
        } else {
            Self::by(field, SortDirection::Asc)
        }
    }
}

/// Compare two records on one field.
///
/// Absent values go last in either direction. Text compares
/// case-insensitively, numbers numerically.
pub fn compare_by(
    a: &ProjectRecord,
    b: &ProjectRecord,
    field: ProjectField,
    direction: SortDirection,
) -> Ordering {
    let ordering = match (a.field_value(field), b.field_value(field)) {
        (FieldValue::Absent, FieldValue::Absent) => return Ordering::Equal,
        (FieldValue::Absent, _) => return Ordering::Greater,
        (_, FieldValue::Absent) => return Ordering::Less,
        (FieldValue::Number(x), FieldValue::Number(y)) => x.cmp(&y),
        (FieldValue::Text(x), FieldValue::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        // A field has a single kind, so mixed pairs do not occur
        _ => Ordering::Equal,
    };
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Stable sort in place; no sort field leaves the order alone
pub fn sort_records(records: &mut [ProjectRecord], sort: SortState) {
    if let Some(field) = sort.field {
        records.sort_by(|a, b| compare_by(a, b, field, sort.direction));
    }
}

/// Filter, then stable-sort, a snapshot of records
pub fn view(records: &[ProjectRecord], filter: &ProjectFilter, sort: SortState) -> Vec<ProjectRecord> {
    let mut rows: Vec<ProjectRecord> = records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect();
    sort_records(&mut rows, sort);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::new_project;
    use crate::model::ConstructionProgress;

    fn record(id: u64, name: &str, priority: Option<&str>) -> ProjectRecord {
        let mut record = ProjectRecord::new(id, new_project(name, &format!("DP-{id}")));
        record.priority = priority.map(str::to_string);
        record
    }

    fn names(rows: &[ProjectRecord]) -> Vec<&str> {
        rows.iter().map(|row| row.name.as_str()).collect()
    }

    #[test]
    fn test_nulls_sort_last_ascending() {
        let records = vec![
            record(1, "B", None),
            record(2, "A", Some("2")),
            record(3, "C", Some("1")),
        ];
        let rows = view(
            &records,
            &ProjectFilter::default(),
            SortState::by(ProjectField::Priority, SortDirection::Asc),
        );
        assert_eq!(names(&rows), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_nulls_sort_last_descending() {
        let records = vec![
            record(1, "B", None),
            record(2, "A", Some("2")),
            record(3, "C", Some("1")),
        ];
        let rows = view(
            &records,
            &ProjectFilter::default(),
            SortState::by(ProjectField::Priority, SortDirection::Desc),
        );
        assert_eq!(names(&rows), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let records = vec![record(1, "bravo", None), record(2, "Alpha", None), record(3, "charlie", None)];
        let rows = view(
            &records,
            &ProjectFilter::default(),
            SortState::by(ProjectField::Name, SortDirection::Asc),
        );
        assert_eq!(names(&rows), vec!["Alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_numeric_sort() {
        let mut a = record(1, "A", None);
        a.survey_percent_completed = 100;
        let mut b = record(2, "B", None);
        b.survey_percent_completed = 9;
        let rows = view(
            &[a, b],
            &ProjectFilter::default(),
            SortState::by(ProjectField::SurveyPercentCompleted, SortDirection::Asc),
        );
        assert_eq!(names(&rows), vec!["B", "A"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let records = vec![
            record(1, "first", Some("2")),
            record(2, "second", Some("1")),
            record(3, "third", Some("2")),
            record(4, "fourth", Some("2")),
        ];
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let rows = view(
                &records,
                &ProjectFilter::default(),
                SortState::by(ProjectField::Priority, direction),
            );
            let twos: Vec<&str> = rows
                .iter()
                .filter(|row| row.priority.as_deref() == Some("2"))
                .map(|row| row.name.as_str())
                .collect();
            assert_eq!(twos, vec!["first", "third", "fourth"]);
        }
    }

    #[test]
    fn test_no_sort_field_keeps_input_order() {
        let records = vec![record(2, "Z", None), record(1, "A", None)];
        let rows = view(&records, &ProjectFilter::default(), SortState::default());
        assert_eq!(names(&rows), vec!["Z", "A"]);
    }

    #[test]
    fn test_toggle_rules() {
        let state = SortState::default().toggle(ProjectField::Name);
        assert_eq!(state, SortState::by(ProjectField::Name, SortDirection::Asc));
        let state = state.toggle(ProjectField::Name);
        assert_eq!(state.direction, SortDirection::Desc);
        let state = state.toggle(ProjectField::Priority);
        assert_eq!(state, SortState::by(ProjectField::Priority, SortDirection::Asc));
    }

    #[test]
    fn test_filter_conjunction() {
        let mut bridge_earthworks = record(1, "Old bridge renewal", None);
        bridge_earthworks.construction_progress = Some(ConstructionProgress::Earthworks.into());
        let mut bridge_other = record(2, "Bridge approach", None);
        bridge_other.construction_progress = Some(ConstructionProgress::FinishingWorks.into());
        let mut road_earthworks = record(3, "Road widening", None);
        road_earthworks.construction_progress = Some(ConstructionProgress::Earthworks.into());

        let filter = ProjectFilter {
            construction_progress: Some("Earthworks".to_string()),
            search: Some("bridge".to_string()),
            ..Default::default()
        };
        let rows = view(
            &[bridge_earthworks, bridge_other, road_earthworks],
            &filter,
            SortState::default(),
        );
        assert_eq!(names(&rows), vec!["Old bridge renewal"]);
    }

    #[test]
    fn test_search_covers_scope_and_leader() {
        let mut scoped = record(1, "Depot", None);
        scoped.brief_scope = Some("New WASH bay".to_string());
        let mut led = record(2, "Pool", None);
        led.design_project_leader = Some("K. Washington".to_string());
        let plain = record(3, "Library", None);

        let filter = ProjectFilter {
            search: Some("wash".to_string()),
            ..Default::default()
        };
        let rows = view(&[scoped, led, plain], &filter, SortState::default());
        assert_eq!(names(&rows), vec!["Depot", "Pool"]);

        let filter = ProjectFilter {
            search: Some("dp-3".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&record(3, "Library", None)));
    }

    #[test]
    fn test_empty_filter_values_ignored() {
        let filter = ProjectFilter {
            construction_progress: Some(String::new()),
            design_stage: Some(String::new()),
            search: Some(String::new()),
        };
        assert!(filter.is_empty());
        assert!(filter.matches(&record(1, "Anything", None)));
    }
}
