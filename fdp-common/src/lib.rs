//! # FDP Common Library
//!
//! Core of the design project tracker, shared by the HTTP service:
//! - Project record model and field validation
//! - In-memory project store
//! - CSV export/import codec with legacy value normalisation
//! - Filtered/sorted views and KPI aggregation
//! - Configuration loading

pub mod config;
pub mod csv_codec;
pub mod error;
pub mod kpi;
pub mod model;
pub mod query;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
pub use model::{NewProject, ProjectPatch, ProjectRecord};
pub use store::ProjectStore;
pub use validate::{ValidationError, ValidationErrors};
