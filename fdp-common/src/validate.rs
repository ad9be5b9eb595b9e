//! Strict validation of client-supplied project data
//!
//! Direct API writes arrive as JSON objects. Every known field is checked and
//! all failures are reported together; unknown keys (including `id`) are
//! ignored. Bulk imports use the lenient rules in [`crate::csv_codec`] instead.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{Canonical, Coded, FieldKind, NewProject, ProjectField, ProjectPatch};

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    Required,
    InvalidEnum,
    OutOfRange,
    InvalidType,
}

/// Field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<&'static str>,
}

impl ValidationError {
    pub fn new(field: ProjectField, reason: ValidationReason) -> Self {
        Self {
            field: field.key().to_string(),
            reason,
            allowed: Vec::new(),
        }
    }

    pub fn invalid_enum(field: ProjectField, allowed: Vec<&'static str>) -> Self {
        Self {
            field: field.key().to_string(),
            reason: ValidationReason::InvalidEnum,
            allowed,
        }
    }
}

/// All failures found in one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn has_field(&self, field: ProjectField) -> bool {
        self.0.iter().any(|error| error.field == field.key())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{} ({:?})", error.field, error.reason))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a create body: both required fields must be present
pub fn validate_new(input: &Value) -> Result<NewProject, ValidationErrors> {
    let patch = validate_patch(input)?;
    NewProject::from_patch(patch).map_err(|patch| {
        let mut errors = Vec::new();
        for (field, value) in [
            (ProjectField::Name, &patch.name),
            (ProjectField::DesignProjectNumber, &patch.design_project_number),
        ] {
            if value.as_deref().map_or(true, |text| text.trim().is_empty()) {
                errors.push(ValidationError::new(field, ValidationReason::Required));
            }
        }
        ValidationErrors(errors)
    })
}

/// Validate a partial update body: only supplied fields are checked
pub fn validate_patch(input: &Value) -> Result<ProjectPatch, ValidationErrors> {
    let Some(object) = input.as_object() else {
        return Err(ValidationErrors(vec![ValidationError {
            field: "body".to_string(),
            reason: ValidationReason::InvalidType,
            allowed: Vec::new(),
        }]));
    };

    let mut reader = FieldReader {
        object,
        errors: Vec::new(),
    };

    let patch = ProjectPatch {
        priority: reader.priority(),
        construction_progress: reader.coded(ProjectField::ConstructionProgress),
        design_stage: reader.coded(ProjectField::DesignStage),
        name: reader.required(ProjectField::Name),
        design_project_number: reader.required(ProjectField::DesignProjectNumber),
        work_order_number: reader.text(ProjectField::WorkOrderNumber),
        estimated_start_date: reader.text(ProjectField::EstimatedStartDate),
        estimated_completion_date: reader.text(ProjectField::EstimatedCompletionDate),
        project_start_date: reader.text(ProjectField::ProjectStartDate),
        project_finish_date: reader.text(ProjectField::ProjectFinishDate),
        brief_scope: reader.text(ProjectField::BriefScope),
        design_project_leader: reader.text(ProjectField::DesignProjectLeader),
        survey_by: reader.text(ProjectField::SurveyBy),
        survey_method: reader.text(ProjectField::SurveyMethod),
        survey_percent_completed: reader.percent(ProjectField::SurveyPercentCompleted),
        survey_status: reader.coded(ProjectField::SurveyStatus),
        survey_comments: reader.text(ProjectField::SurveyComments),
        design_by: reader.text(ProjectField::DesignBy),
        design_percent_completed: reader.percent(ProjectField::DesignPercentCompleted),
        design_status: reader.coded(ProjectField::DesignStatus),
        design_comments: reader.text(ProjectField::DesignComments),
        drawings_by: reader.text(ProjectField::DrawingsBy),
        drawings_percent_completed: reader.percent(ProjectField::DrawingsPercentCompleted),
        drawings_status: reader.coded(ProjectField::DrawingsStatus),
        drawings_comments: reader.text(ProjectField::DrawingsComments),
        wae_by: reader.text(ProjectField::WaeBy),
        wae_percent_completed: reader.percent(ProjectField::WaePercentCompleted),
        wae_status: reader.coded(ProjectField::WaeStatus),
        wae_comments: reader.text(ProjectField::WaeComments),
    };

    if reader.errors.is_empty() {
        Ok(patch)
    } else {
        Err(ValidationErrors(reader.errors))
    }
}

/// Reads typed fields out of a JSON object, collecting errors as it goes
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    errors: Vec<ValidationError>,
}

impl FieldReader<'_> {
    fn fail(&mut self, field: ProjectField, reason: ValidationReason) {
        self.errors.push(ValidationError::new(field, reason));
    }

    /// Outer `None`: key absent. Inner `None`: explicit null.
    fn text(&mut self, field: ProjectField) -> Option<Option<String>> {
        debug_assert_eq!(field.kind(), FieldKind::Text);
        match self.object.get(field.key())? {
            Value::Null => Some(None),
            Value::String(text) => Some(Some(text.clone())),
            _ => {
                self.fail(field, ValidationReason::InvalidType);
                None
            }
        }
    }

    fn required(&mut self, field: ProjectField) -> Option<String> {
        match self.object.get(field.key())? {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::String(_) | Value::Null => {
                self.fail(field, ValidationReason::Required);
                None
            }
            _ => {
                self.fail(field, ValidationReason::InvalidType);
                None
            }
        }
    }

    /// Priority is text, but clients commonly send it as a number
    fn priority(&mut self) -> Option<Option<String>> {
        let field = ProjectField::Priority;
        match self.object.get(field.key())? {
            Value::Null => Some(None),
            Value::String(text) => Some(Some(text.clone())),
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Some(Some(number.to_string()))
            }
            _ => {
                self.fail(field, ValidationReason::InvalidType);
                None
            }
        }
    }

    fn percent(&mut self, field: ProjectField) -> Option<u8> {
        match self.object.get(field.key())? {
            Value::Null => Some(0),
            Value::Number(number) => match number.as_i64() {
                Some(value @ 0..=100) => Some(value as u8),
                Some(_) => {
                    self.fail(field, ValidationReason::OutOfRange);
                    None
                }
                // Floats and integers past i64
                None => {
                    let reason = match number.as_f64() {
                        Some(value) if !(0.0..=100.0).contains(&value) => {
                            ValidationReason::OutOfRange
                        }
                        _ => ValidationReason::InvalidType,
                    };
                    self.fail(field, reason);
                    None
                }
            },
            _ => {
                self.fail(field, ValidationReason::InvalidType);
                None
            }
        }
    }

    fn coded<T: Canonical>(&mut self, field: ProjectField) -> Option<Option<Coded<T>>> {
        match self.object.get(field.key())? {
            Value::Null => Some(None),
            Value::String(text) => match T::from_canonical(text) {
                Some(value) => Some(Some(Coded::Known(value))),
                None => {
                    self.errors
                        .push(ValidationError::invalid_enum(field, T::allowed()));
                    None
                }
            },
            _ => {
                self.fail(field, ValidationReason::InvalidType);
                None
            }
        }
    }
}
