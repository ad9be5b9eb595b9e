//! CSV export and batch import endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use fdp_common::csv_codec::{export_csv, parse_csv, RawProjectRow};
use fdp_common::{NewProject, ProjectRecord};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::ApiError;
use crate::AppState;

/// Batch import result
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub imported: usize,
    pub projects: Vec<ProjectRecord>,
}

impl ImportResponse {
    fn new(projects: Vec<ProjectRecord>) -> Self {
        Self {
            success: true,
            imported: projects.len(),
            projects,
        }
    }
}

/// GET /api/projects/export/csv
///
/// Every record, every column quoted, as a file download.
pub async fn export_projects_csv(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let projects = state.store.read().await.list();
    let body = export_csv(&projects)?;
    info!("Exported {} projects to CSV", projects.len());

    let disposition = format!("attachment; filename=\"{}\"", state.export_filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// POST /api/projects/import
///
/// Body is `{"projects": [...]}` or a bare array of row objects. Rows that
/// fail to normalise are skipped; the rest are upserted by number.
pub async fn import_projects(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ImportResponse>, ApiError> {
    let Json(body) = payload?;
    let rows = match &body {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(object) => match object.get("projects") {
            Some(Value::Array(rows)) => rows.as_slice(),
            _ => return Err(ApiError::NoProjects),
        },
        _ => return Err(ApiError::NoProjects),
    };
    if rows.is_empty() {
        return Err(ApiError::NoProjects);
    }

    let raw: Vec<RawProjectRow> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let parsed = RawProjectRow::from_json(row);
            if parsed.is_none() {
                warn!(row = index + 1, "Skipping import row: not an object");
            }
            parsed
        })
        .collect();

    let projects = upsert_rows(&state, &raw).await;
    info!("Imported {} of {} projects", projects.len(), rows.len());
    Ok(Json(ImportResponse::new(projects)))
}

/// POST /api/projects/import/csv
///
/// Body is raw CSV text with a header row.
pub async fn import_projects_csv(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let projects = import_csv_text(&state, &body).await?;
    if projects.is_empty() {
        return Err(ApiError::NoValidRows);
    }
    Ok(Json(ImportResponse::new(projects)))
}

/// Parse CSV text and upsert its rows into the store
///
/// Shared by the upload endpoint and the startup seed.
pub async fn import_csv_text(
    state: &AppState,
    text: &str,
) -> fdp_common::Result<Vec<ProjectRecord>> {
    let rows = parse_csv(text)?;
    let projects = upsert_rows(state, &rows).await;
    info!("Imported {} of {} CSV rows", projects.len(), rows.len());
    Ok(projects)
}

async fn upsert_rows(state: &AppState, rows: &[RawProjectRow]) -> Vec<ProjectRecord> {
    let batch: Vec<NewProject> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| match row.normalize() {
            Ok(project) => Some(project),
            Err(errors) => {
                warn!(row = index + 1, errors = %errors, "Skipping import row");
                None
            }
        })
        .collect();

    if batch.is_empty() {
        return Vec::new();
    }
    let mut store = state.store.write().await;
    store.upsert_batch(batch)
}
