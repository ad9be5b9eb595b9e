//! fdp-server library - design project tracker HTTP service
//!
//! Serves the project list, CRUD, CSV export/import and KPI endpoints over
//! one shared in-memory [`ProjectStore`].

use std::sync::Arc;

use axum::Router;
use fdp_common::config::DEFAULT_EXPORT_FILENAME;
use fdp_common::ProjectStore;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Project store. Writers hold the lock across the uniqueness check and
    /// the write, so concurrent creates cannot both claim one number.
    pub store: Arc<RwLock<ProjectStore>>,
    /// Attachment filename for CSV exports
    pub export_filename: Arc<str>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: ProjectStore, export_filename: impl Into<Arc<str>>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            export_filename: export_filename.into(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ProjectStore::new(), DEFAULT_EXPORT_FILENAME)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let projects = Router::new()
        .route(
            "/api/projects",
            get(api::list_projects).post(api::create_project),
        )
        .route("/api/projects/kpis", get(api::get_kpis))
        .route("/api/projects/export/csv", get(api::export_projects_csv))
        .route("/api/projects/import", post(api::import_projects))
        .route("/api/projects/import/csv", post(api::import_projects_csv))
        .route(
            "/api/projects/:id",
            get(api::get_project)
                .put(api::update_project)
                .patch(api::update_project)
                .delete(api::delete_project),
        );

    Router::new()
        .merge(projects)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
