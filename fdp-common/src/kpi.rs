//! Dashboard KPI aggregation

use serde::Serialize;

use crate::model::{ConstructionProgress, DesignStage, Phase, ProjectRecord};

/// Headline figures shown above the project table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total: usize,
    pub active_construction_projects: usize,
    pub construction_complete: usize,
    pub active_design_projects: usize,
    pub design_complete: usize,
    pub avg_survey_progress: u8,
    pub avg_design_progress: u8,
    pub avg_drawings_progress: u8,
    pub avg_wae_progress: u8,
}

impl KpiSummary {
    pub fn from_records(records: &[ProjectRecord]) -> Self {
        let construction = |record: &ProjectRecord| {
            record.construction_progress.as_ref().map(|stage| stage.known())
        };
        let design = |record: &ProjectRecord| record.design_stage.as_ref().map(|stage| stage.known());

        let construction_done = |stage: Option<ConstructionProgress>| {
            matches!(
                stage,
                Some(
                    ConstructionProgress::PracticalCompletion
                        | ConstructionProgress::DefectsLiabilityFinalHandover
                )
            )
        };
        let design_done = |stage: Option<DesignStage>| {
            matches!(
                stage,
                Some(DesignStage::ConstructionPhase | DesignStage::CompletionAndHandover)
            )
        };

        // Outer None: unset. Inner None: set to unrecognised text, which
        // still counts as active.
        let active_construction_projects = records
            .iter()
            .filter_map(construction)
            .filter(|stage| {
                *stage != Some(ConstructionProgress::NotStarted) && !construction_done(*stage)
            })
            .count();
        let construction_complete = records
            .iter()
            .filter_map(construction)
            .filter(|stage| construction_done(*stage))
            .count();
        let active_design_projects = records
            .iter()
            .filter_map(design)
            .filter(|stage| *stage != Some(DesignStage::NotStarted) && !design_done(*stage))
            .count();
        let design_complete = records
            .iter()
            .filter_map(design)
            .filter(|stage| design_done(*stage))
            .count();

        Self {
            total: records.len(),
            active_construction_projects,
            construction_complete,
            active_design_projects,
            design_complete,
            avg_survey_progress: average_progress(records, Phase::Survey),
            avg_design_progress: average_progress(records, Phase::Design),
            avg_drawings_progress: average_progress(records, Phase::Drawings),
            avg_wae_progress: average_progress(records, Phase::Wae),
        }
    }
}

/// Mean percent complete for a phase, rounded half up; 0 with no records
pub fn average_progress(records: &[ProjectRecord], phase: Phase) -> u8 {
    if records.is_empty() {
        return 0;
    }
    let sum: u64 = records
        .iter()
        .map(|record| u64::from(record.percent_completed(phase)))
        .sum();
    let count = records.len() as u64;
    ((sum * 2 + count) / (count * 2)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::new_project;
    use crate::model::Coded;

    fn record(id: u64) -> ProjectRecord {
        ProjectRecord::new(id, new_project("Project", &format!("DP-{id}")))
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(KpiSummary::from_records(&[]), KpiSummary::default());
    }

    #[test]
    fn test_stage_counts() {
        let mut not_started = record(1);
        not_started.construction_progress = Some(ConstructionProgress::NotStarted.into());
        let mut building = record(2);
        building.construction_progress = Some(ConstructionProgress::Earthworks.into());
        building.design_stage = Some(DesignStage::ConstructionPhase.into());
        let mut handed_over = record(3);
        handed_over.construction_progress =
            Some(ConstructionProgress::DefectsLiabilityFinalHandover.into());
        handed_over.design_stage = Some(DesignStage::DetailedDesign.into());
        let mut legacy = record(4);
        legacy.construction_progress = Some(Coded::Unrecognized("On Hold".to_string()));
        let unset = record(5);

        let summary =
            KpiSummary::from_records(&[not_started, building, handed_over, legacy, unset]);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.active_construction_projects, 2);
        assert_eq!(summary.construction_complete, 1);
        assert_eq!(summary.active_design_projects, 1);
        assert_eq!(summary.design_complete, 1);
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        let mut a = record(1);
        a.survey_percent_completed = 50;
        let mut b = record(2);
        b.survey_percent_completed = 25;
        // 37.5 rounds up
        assert_eq!(average_progress(&[a.clone(), b.clone()], Phase::Survey), 38);

        b.survey_percent_completed = 24;
        assert_eq!(average_progress(&[a, b], Phase::Survey), 37);
    }
}
