//! HTTP API handlers for fdp-server

pub mod error;
pub mod health;
pub mod projects;
pub mod transfer;

pub use error::ApiError;
pub use health::health_routes;
pub use projects::{
    create_project, delete_project, get_kpis, get_project, list_projects, update_project,
};
pub use transfer::{export_projects_csv, import_csv_text, import_projects, import_projects_csv};
