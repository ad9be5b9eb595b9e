//! Project record model
//!
//! A design project moves through four phases (survey, design, drawings,
//! works-as-executed), each tracked with a responsible person, a percent
//! complete, a status and free-text comments. Construction progress and
//! design stage are tracked separately as ordered stage enums.
//!
//! Stored enum fields use [`Coded`], which holds either a canonical value or
//! text that arrived through a bulk import and matched nothing. Direct API
//! writes only ever produce canonical values (see [`crate::validate`]).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Canonical enums
// ============================================================================

/// Enum with a fixed set of canonical string values
pub trait Canonical: Copy + Eq + 'static {
    /// Every value, in stage order
    const ALL: &'static [Self];

    /// Canonical string stored and rendered for this value
    fn as_str(self) -> &'static str;

    /// Exact (case-sensitive) match against the canonical strings
    fn from_canonical(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.as_str() == text)
    }

    /// Canonical strings, for error reporting
    fn allowed() -> Vec<&'static str> {
        Self::ALL.iter().map(|value| value.as_str()).collect()
    }
}

macro_rules! canonical_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Canonical for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

canonical_enum! {
    /// Physical build status, independent of the design phases
    ConstructionProgress {
        NotStarted => "Not Started",
        PreConstruction => "Pre-Construction",
        SiteEstablishment => "Site Establishment",
        Earthworks => "Earthworks",
        SubsurfaceWorks => "Subsurface Works (e.g. drainage, utilities)",
        PavementStructuralWorks => "Pavement / Structural Works",
        FinishingWorks => "Finishing Works",
        TestingAndQualityAssurance => "Testing and Quality Assurance",
        PracticalCompletion => "Practical Completion",
        DefectsLiabilityFinalHandover => "Defects Liability Period / Final Handover",
    }
}

canonical_enum! {
    /// Design process status
    DesignStage {
        NotStarted => "Not Started",
        ConceptDesign => "Concept Design",
        PreliminaryDesign => "Preliminary Design",
        DetailedDesign => "Detailed Design",
        ReviewAndApproval => "Review and Approval",
        ConstructionPhase => "Construction Phase",
        CompletionAndHandover => "Completion and Handover",
    }
}

canonical_enum! {
    /// Status of a single phase workstream
    PhaseStatus {
        NotStarted => "not-started",
        InProgress => "in-progress",
        Completed => "completed",
    }
}

/// Stored enum value: canonical, or unrecognised import text kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coded<T> {
    Known(T),
    Unrecognized(String),
}

impl<T: Canonical> Coded<T> {
    /// Wrap text, recognising canonical strings exactly
    pub fn parse(text: &str) -> Self {
        match T::from_canonical(text) {
            Some(value) => Coded::Known(value),
            None => Coded::Unrecognized(text.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Coded::Known(value) => value.as_str(),
            Coded::Unrecognized(text) => text,
        }
    }

    /// Canonical value, if this is one
    pub fn known(&self) -> Option<T> {
        match self {
            Coded::Known(value) => Some(*value),
            Coded::Unrecognized(_) => None,
        }
    }
}

impl<T: Canonical> From<T> for Coded<T> {
    fn from(value: T) -> Self {
        Coded::Known(value)
    }
}

impl<T: Canonical> Serialize for Coded<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, T: Canonical> Deserialize<'de> for Coded<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Coded::parse(&text))
    }
}

// ============================================================================
// Phases and fields
// ============================================================================

/// One of the four tracked workstreams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Survey,
    Design,
    Drawings,
    /// Works As Executed
    Wae,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Survey, Phase::Design, Phase::Drawings, Phase::Wae];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Survey => "Survey",
            Phase::Design => "Design",
            Phase::Drawings => "Drawings",
            Phase::Wae => "WAE",
        }
    }
}

/// Scalar field of a project record, addressed by its JSON key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProjectField {
    Id,
    Priority,
    ConstructionProgress,
    DesignStage,
    Name,
    DesignProjectNumber,
    WorkOrderNumber,
    EstimatedStartDate,
    EstimatedCompletionDate,
    ProjectStartDate,
    ProjectFinishDate,
    BriefScope,
    DesignProjectLeader,
    SurveyBy,
    SurveyMethod,
    SurveyPercentCompleted,
    SurveyStatus,
    SurveyComments,
    DesignBy,
    DesignPercentCompleted,
    DesignStatus,
    DesignComments,
    DrawingsBy,
    DrawingsPercentCompleted,
    DrawingsStatus,
    DrawingsComments,
    WaeBy,
    WaePercentCompleted,
    WaeStatus,
    WaeComments,
}

/// How a field's value is typed and validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Id,
    RequiredText,
    Text,
    Priority,
    ConstructionProgress,
    DesignStage,
    Percent,
    Status,
}

impl ProjectField {
    pub const ALL: [ProjectField; 30] = [
        ProjectField::Id,
        ProjectField::Priority,
        ProjectField::ConstructionProgress,
        ProjectField::DesignStage,
        ProjectField::Name,
        ProjectField::DesignProjectNumber,
        ProjectField::WorkOrderNumber,
        ProjectField::EstimatedStartDate,
        ProjectField::EstimatedCompletionDate,
        ProjectField::ProjectStartDate,
        ProjectField::ProjectFinishDate,
        ProjectField::BriefScope,
        ProjectField::DesignProjectLeader,
        ProjectField::SurveyBy,
        ProjectField::SurveyMethod,
        ProjectField::SurveyPercentCompleted,
        ProjectField::SurveyStatus,
        ProjectField::SurveyComments,
        ProjectField::DesignBy,
        ProjectField::DesignPercentCompleted,
        ProjectField::DesignStatus,
        ProjectField::DesignComments,
        ProjectField::DrawingsBy,
        ProjectField::DrawingsPercentCompleted,
        ProjectField::DrawingsStatus,
        ProjectField::DrawingsComments,
        ProjectField::WaeBy,
        ProjectField::WaePercentCompleted,
        ProjectField::WaeStatus,
        ProjectField::WaeComments,
    ];

    /// camelCase key used in JSON bodies and sort parameters
    pub fn key(self) -> &'static str {
        match self {
            ProjectField::Id => "id",
            ProjectField::Priority => "priority",
            ProjectField::ConstructionProgress => "constructionProgress",
            ProjectField::DesignStage => "designStage",
            ProjectField::Name => "name",
            ProjectField::DesignProjectNumber => "designProjectNumber",
            ProjectField::WorkOrderNumber => "workOrderNumber",
            ProjectField::EstimatedStartDate => "estimatedStartDate",
            ProjectField::EstimatedCompletionDate => "estimatedCompletionDate",
            ProjectField::ProjectStartDate => "projectStartDate",
            ProjectField::ProjectFinishDate => "projectFinishDate",
            ProjectField::BriefScope => "briefScope",
            ProjectField::DesignProjectLeader => "designProjectLeader",
            ProjectField::SurveyBy => "surveyBy",
            ProjectField::SurveyMethod => "surveyMethod",
            ProjectField::SurveyPercentCompleted => "surveyPercentCompleted",
            ProjectField::SurveyStatus => "surveyStatus",
            ProjectField::SurveyComments => "surveyComments",
            ProjectField::DesignBy => "designBy",
            ProjectField::DesignPercentCompleted => "designPercentCompleted",
            ProjectField::DesignStatus => "designStatus",
            ProjectField::DesignComments => "designComments",
            ProjectField::DrawingsBy => "drawingsBy",
            ProjectField::DrawingsPercentCompleted => "drawingsPercentCompleted",
            ProjectField::DrawingsStatus => "drawingsStatus",
            ProjectField::DrawingsComments => "drawingsComments",
            ProjectField::WaeBy => "waeBy",
            ProjectField::WaePercentCompleted => "waePercentCompleted",
            ProjectField::WaeStatus => "waeStatus",
            ProjectField::WaeComments => "waeComments",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.key() == key)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            ProjectField::Id => FieldKind::Id,
            ProjectField::Name | ProjectField::DesignProjectNumber => FieldKind::RequiredText,
            ProjectField::Priority => FieldKind::Priority,
            ProjectField::ConstructionProgress => FieldKind::ConstructionProgress,
            ProjectField::DesignStage => FieldKind::DesignStage,
            ProjectField::SurveyPercentCompleted
            | ProjectField::DesignPercentCompleted
            | ProjectField::DrawingsPercentCompleted
            | ProjectField::WaePercentCompleted => FieldKind::Percent,
            ProjectField::SurveyStatus
            | ProjectField::DesignStatus
            | ProjectField::DrawingsStatus
            | ProjectField::WaeStatus => FieldKind::Status,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for ProjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Borrowed view of one field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(i64),
    Absent,
}

// ============================================================================
// Records
// ============================================================================

/// A stored design project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: u64,
    pub priority: Option<String>,
    pub construction_progress: Option<Coded<ConstructionProgress>>,
    pub design_stage: Option<Coded<DesignStage>>,
    pub name: String,
    pub design_project_number: String,
    pub work_order_number: Option<String>,
    pub estimated_start_date: Option<String>,
    pub estimated_completion_date: Option<String>,
    pub project_start_date: Option<String>,
    pub project_finish_date: Option<String>,
    pub brief_scope: Option<String>,
    pub design_project_leader: Option<String>,

    pub survey_by: Option<String>,
    pub survey_method: Option<String>,
    pub survey_percent_completed: u8,
    pub survey_status: Option<Coded<PhaseStatus>>,
    pub survey_comments: Option<String>,

    pub design_by: Option<String>,
    pub design_percent_completed: u8,
    pub design_status: Option<Coded<PhaseStatus>>,
    pub design_comments: Option<String>,

    pub drawings_by: Option<String>,
    pub drawings_percent_completed: u8,
    pub drawings_status: Option<Coded<PhaseStatus>>,
    pub drawings_comments: Option<String>,

    pub wae_by: Option<String>,
    pub wae_percent_completed: u8,
    pub wae_status: Option<Coded<PhaseStatus>>,
    pub wae_comments: Option<String>,
}

/// Partial set of field assignments
///
/// `None` leaves a field untouched. For optional fields `Some(None)` clears
/// the stored value. `id` is deliberately absent: it is never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub priority: Option<Option<String>>,
    pub construction_progress: Option<Option<Coded<ConstructionProgress>>>,
    pub design_stage: Option<Option<Coded<DesignStage>>>,
    pub name: Option<String>,
    pub design_project_number: Option<String>,
    pub work_order_number: Option<Option<String>>,
    pub estimated_start_date: Option<Option<String>>,
    pub estimated_completion_date: Option<Option<String>>,
    pub project_start_date: Option<Option<String>>,
    pub project_finish_date: Option<Option<String>>,
    pub brief_scope: Option<Option<String>>,
    pub design_project_leader: Option<Option<String>>,

    pub survey_by: Option<Option<String>>,
    pub survey_method: Option<Option<String>>,
    pub survey_percent_completed: Option<u8>,
    pub survey_status: Option<Option<Coded<PhaseStatus>>>,
    pub survey_comments: Option<Option<String>>,

    pub design_by: Option<Option<String>>,
    pub design_percent_completed: Option<u8>,
    pub design_status: Option<Option<Coded<PhaseStatus>>>,
    pub design_comments: Option<Option<String>>,

    pub drawings_by: Option<Option<String>>,
    pub drawings_percent_completed: Option<u8>,
    pub drawings_status: Option<Option<Coded<PhaseStatus>>>,
    pub drawings_comments: Option<Option<String>>,

    pub wae_by: Option<Option<String>>,
    pub wae_percent_completed: Option<u8>,
    pub wae_status: Option<Option<Coded<PhaseStatus>>>,
    pub wae_comments: Option<Option<String>>,
}

/// Patch known to carry both required fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    patch: ProjectPatch,
}

impl NewProject {
    /// Returns the patch back when a required field is missing or blank
    pub fn from_patch(patch: ProjectPatch) -> Result<Self, ProjectPatch> {
        let present = |value: &Option<String>| {
            value.as_deref().is_some_and(|text| !text.trim().is_empty())
        };
        if present(&patch.name) && present(&patch.design_project_number) {
            Ok(Self { patch })
        } else {
            Err(patch)
        }
    }

    pub fn name(&self) -> &str {
        self.patch.name.as_deref().unwrap_or_default()
    }

    pub fn design_project_number(&self) -> &str {
        self.patch.design_project_number.as_deref().unwrap_or_default()
    }

    pub fn patch(&self) -> &ProjectPatch {
        &self.patch
    }

    pub fn into_patch(self) -> ProjectPatch {
        self.patch
    }
}

macro_rules! merge_fields {
    ($target:expr, $patch:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )+
    };
}

impl ProjectRecord {
    /// Build a record from a validated candidate under an assigned id
    pub fn new(id: u64, project: NewProject) -> Self {
        let mut record = Self::blank(id);
        record.apply(project.into_patch());
        record
    }

    /// Empty record; phase statuses start out not-started
    fn blank(id: u64) -> Self {
        Self {
            id,
            priority: None,
            construction_progress: None,
            design_stage: None,
            name: String::new(),
            design_project_number: String::new(),
            work_order_number: None,
            estimated_start_date: None,
            estimated_completion_date: None,
            project_start_date: None,
            project_finish_date: None,
            brief_scope: None,
            design_project_leader: None,
            survey_by: None,
            survey_method: None,
            survey_percent_completed: 0,
            survey_status: Some(PhaseStatus::NotStarted.into()),
            survey_comments: None,
            design_by: None,
            design_percent_completed: 0,
            design_status: Some(PhaseStatus::NotStarted.into()),
            design_comments: None,
            drawings_by: None,
            drawings_percent_completed: 0,
            drawings_status: Some(PhaseStatus::NotStarted.into()),
            drawings_comments: None,
            wae_by: None,
            wae_percent_completed: 0,
            wae_status: Some(PhaseStatus::NotStarted.into()),
            wae_comments: None,
        }
    }

    /// Merge a patch; fields the patch leaves unset keep their values
    pub fn apply(&mut self, patch: ProjectPatch) {
        merge_fields!(self, patch;
            priority,
            construction_progress,
            design_stage,
            name,
            design_project_number,
            work_order_number,
            estimated_start_date,
            estimated_completion_date,
            project_start_date,
            project_finish_date,
            brief_scope,
            design_project_leader,
            survey_by,
            survey_method,
            survey_percent_completed,
            survey_status,
            survey_comments,
            design_by,
            design_percent_completed,
            design_status,
            design_comments,
            drawings_by,
            drawings_percent_completed,
            drawings_status,
            drawings_comments,
            wae_by,
            wae_percent_completed,
            wae_status,
            wae_comments,
        );
    }

    pub fn field_value(&self, field: ProjectField) -> FieldValue<'_> {
        fn text(value: &Option<String>) -> FieldValue<'_> {
            value.as_deref().map_or(FieldValue::Absent, FieldValue::Text)
        }
        fn coded<T: Canonical>(value: &Option<Coded<T>>) -> FieldValue<'_> {
            value
                .as_ref()
                .map_or(FieldValue::Absent, |coded| FieldValue::Text(coded.as_str()))
        }
        let percent = |value: u8| FieldValue::Number(i64::from(value));

        match field {
            ProjectField::Id => FieldValue::Number(self.id as i64),
            ProjectField::Priority => text(&self.priority),
            ProjectField::ConstructionProgress => coded(&self.construction_progress),
            ProjectField::DesignStage => coded(&self.design_stage),
            ProjectField::Name => FieldValue::Text(&self.name),
            ProjectField::DesignProjectNumber => FieldValue::Text(&self.design_project_number),
            ProjectField::WorkOrderNumber => text(&self.work_order_number),
            ProjectField::EstimatedStartDate => text(&self.estimated_start_date),
            ProjectField::EstimatedCompletionDate => text(&self.estimated_completion_date),
            ProjectField::ProjectStartDate => text(&self.project_start_date),
            ProjectField::ProjectFinishDate => text(&self.project_finish_date),
            ProjectField::BriefScope => text(&self.brief_scope),
            ProjectField::DesignProjectLeader => text(&self.design_project_leader),
            ProjectField::SurveyBy => text(&self.survey_by),
            ProjectField::SurveyMethod => text(&self.survey_method),
            ProjectField::SurveyPercentCompleted => percent(self.survey_percent_completed),
            ProjectField::SurveyStatus => coded(&self.survey_status),
            ProjectField::SurveyComments => text(&self.survey_comments),
            ProjectField::DesignBy => text(&self.design_by),
            ProjectField::DesignPercentCompleted => percent(self.design_percent_completed),
            ProjectField::DesignStatus => coded(&self.design_status),
            ProjectField::DesignComments => text(&self.design_comments),
            ProjectField::DrawingsBy => text(&self.drawings_by),
            ProjectField::DrawingsPercentCompleted => percent(self.drawings_percent_completed),
            ProjectField::DrawingsStatus => coded(&self.drawings_status),
            ProjectField::DrawingsComments => text(&self.drawings_comments),
            ProjectField::WaeBy => text(&self.wae_by),
            ProjectField::WaePercentCompleted => percent(self.wae_percent_completed),
            ProjectField::WaeStatus => coded(&self.wae_status),
            ProjectField::WaeComments => text(&self.wae_comments),
        }
    }

    pub fn percent_completed(&self, phase: Phase) -> u8 {
        match phase {
            Phase::Survey => self.survey_percent_completed,
            Phase::Design => self.design_percent_completed,
            Phase::Drawings => self.drawings_percent_completed,
            Phase::Wae => self.wae_percent_completed,
        }
    }

    /// Display label for the priority ("1" is Critical through "4" Low)
    pub fn priority_label(&self) -> Option<&str> {
        self.priority.as_deref().map(|priority| match priority {
            "1" => "Critical",
            "2" => "High",
            "3" => "Medium",
            "4" => "Low",
            other => other,
        })
    }
}
