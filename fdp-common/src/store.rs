//! In-memory project store
//!
//! Owns the record set and its id counter. Ids start at 1, only ever
//! increase, and are never handed out twice even after deletes. Design
//! project number uniqueness is enforced on every write before any mutation.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::model::{NewProject, ProjectPatch, ProjectRecord};
use crate::query::ProjectFilter;
use crate::{Error, Result};

#[derive(Debug)]
pub struct ProjectStore {
    projects: BTreeMap<u64, ProjectRecord>,
    next_id: u64,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore {
    pub fn new() -> Self {
        Self {
            projects: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Store a new record under the next id
    pub fn create(&mut self, project: NewProject) -> Result<ProjectRecord> {
        if self.find_by_number(project.design_project_number()).is_some() {
            return Err(Error::DuplicateKey(project.design_project_number().to_string()));
        }

        let id = self.next_id;
        self.next_id += 1;

        let record = ProjectRecord::new(id, project);
        debug!(id, number = %record.design_project_number, "Created project");
        self.projects.insert(id, record.clone());
        Ok(record)
    }

    pub fn find_by_id(&self, id: u64) -> Option<&ProjectRecord> {
        self.projects.get(&id)
    }

    /// Exact, case-sensitive match
    pub fn find_by_number(&self, number: &str) -> Option<&ProjectRecord> {
        self.projects
            .values()
            .find(|record| record.design_project_number == number)
    }

    /// Merge a patch into an existing record.
    ///
    /// `Ok(None)` when the id is unknown. Renaming onto another record's
    /// design project number fails with [`Error::DuplicateKey`].
    pub fn update(&mut self, id: u64, patch: ProjectPatch) -> Result<Option<ProjectRecord>> {
        if !self.projects.contains_key(&id) {
            return Ok(None);
        }
        if let Some(number) = patch.design_project_number.as_deref() {
            if let Some(holder) = self.find_by_number(number) {
                if holder.id != id {
                    return Err(Error::DuplicateKey(number.to_string()));
                }
            }
        }

        let Some(record) = self.projects.get_mut(&id) else {
            return Ok(None);
        };
        record.apply(patch);
        debug!(id, "Updated project");
        Ok(Some(record.clone()))
    }

    /// True when a record existed and was removed
    pub fn delete(&mut self, id: u64) -> bool {
        self.projects.remove(&id).is_some()
    }

    /// All records in id order
    pub fn list(&self) -> Vec<ProjectRecord> {
        self.projects.values().cloned().collect()
    }

    pub fn filter(&self, filter: &ProjectFilter) -> Vec<ProjectRecord> {
        self.projects
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    /// Create or merge each row by design project number.
    ///
    /// A failing row is logged and skipped; the rest of the batch still
    /// applies. Returns the records that were written, in batch order.
    pub fn upsert_batch(&mut self, rows: Vec<NewProject>) -> Vec<ProjectRecord> {
        let mut imported = Vec::with_capacity(rows.len());
        for row in rows {
            let number = row.design_project_number().to_string();
            let result = match self.find_by_number(&number).map(|record| record.id) {
                Some(id) => self.update(id, row.into_patch()),
                None => self.create(row).map(Some),
            };
            match result {
                Ok(Some(record)) => imported.push(record),
                Ok(None) => warn!(number = %number, "Import row vanished during upsert"),
                Err(e) => warn!(number = %number, error = %e, "Skipping import row"),
            }
        }
        imported
    }
}
