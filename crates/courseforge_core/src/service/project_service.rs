//! Project list use-case (dashboard).

use crate::model::document::{Document, DocumentStatus};
use crate::repo::project_repo::{ProjectStore, StoreResult};

/// Read model for one row of the project list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    pub page_count: usize,
    pub created_at: String,
    pub status: DocumentStatus,
}

impl From<&Document> for ProjectSummary {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            title: document.title.clone(),
            page_count: document.pages.len(),
            created_at: document.created_at.clone(),
            status: document.status,
        }
    }
}

/// Project list service over a store.
pub struct ProjectService<S: ProjectStore> {
    store: S,
}

impl<S: ProjectStore> ProjectService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists stored projects in stored order.
    ///
    /// Corrupt stored data is recovered as an empty list.
    pub fn list_projects(&self) -> StoreResult<Vec<ProjectSummary>> {
        Ok(self
            .store
            .load_all_or_empty()?
            .iter()
            .map(ProjectSummary::from)
            .collect())
    }

    /// Gets one full project by id.
    pub fn get_project(&self, id: &str) -> StoreResult<Option<Document>> {
        self.store.get(id)
    }
}
