//! Project CRUD and listing endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use fdp_common::kpi::KpiSummary;
use fdp_common::model::ProjectField;
use fdp_common::query::{sort_records, ProjectFilter, SortDirection, SortState};
use fdp_common::validate::{validate_new, validate_patch};
use fdp_common::ProjectRecord;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::ApiError;
use crate::AppState;

/// Query parameters for project listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub construction_progress: Option<String>,
    pub design_stage: Option<String>,

    /// Field key to sort by (optional)
    pub sort: Option<String>,

    /// Sort order: "asc" or "desc"
    pub order: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> ProjectFilter {
        ProjectFilter {
            construction_progress: self.construction_progress.clone(),
            design_stage: self.design_stage.clone(),
            search: self.search.clone(),
        }
    }

    fn sort_state(&self) -> Result<SortState, ApiError> {
        let Some(key) = self.sort.as_deref().filter(|key| !key.is_empty()) else {
            return Ok(SortState::default());
        };
        let field = ProjectField::from_key(key)
            .ok_or_else(|| ApiError::InvalidSortField(key.to_string()))?;
        let direction = self
            .order
            .as_deref()
            .map(SortDirection::parse)
            .unwrap_or_default();
        Ok(SortState::by(field, direction))
    }
}

/// GET /api/projects
///
/// All projects, or those matching `search`, `constructionProgress` and
/// `designStage` together. Optional `sort`/`order` apply a stable sort.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProjectRecord>>, ApiError> {
    let sort = query.sort_state()?;
    let filter = query.filter();

    let mut projects = {
        let store = state.store.read().await;
        if filter.is_empty() {
            store.list()
        } else {
            store.filter(&filter)
        }
    };
    sort_records(&mut projects, sort);

    debug!("Listing {} projects", projects.len());
    Ok(Json(projects))
}

/// GET /api/projects/kpis
///
/// Dashboard summary over the same filter parameters as the listing.
pub async fn get_kpis(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<KpiSummary> {
    let projects = state.store.read().await.filter(&query.filter());
    Json(KpiSummary::from_records(&projects))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<ProjectRecord>, ApiError> {
    let Path(id) = id?;
    let project = state.store.read().await.find_by_id(id).cloned();
    project.map(Json).ok_or(ApiError::NotFound)
}

/// POST /api/projects
///
/// 201 with the stored record; 400 on invalid data or a taken number.
pub async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ProjectRecord>), ApiError> {
    let Json(body) = payload?;
    let project = validate_new(&body)?;

    let record = state.store.write().await.create(project)?;
    info!(
        "Created project {} ({}) id={}",
        record.design_project_number, record.name, record.id
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT/PATCH /api/projects/:id
///
/// Partial update; fields missing from the body keep their values.
pub async fn update_project(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProjectRecord>, ApiError> {
    let Path(id) = id?;
    let Json(body) = payload?;
    let patch = validate_patch(&body)?;

    let record = state
        .store
        .write()
        .await
        .update(id, patch)?
        .ok_or(ApiError::NotFound)?;
    info!("Updated project id={}", id);
    Ok(Json(record))
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    if state.store.write().await.delete(id) {
        info!("Deleted project id={}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
