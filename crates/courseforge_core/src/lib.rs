//! Core domain logic for CourseForge, a generated-ebook editor.
//! This crate is the single source of truth for document invariants.

pub mod canvas;
pub mod config;
pub mod db;
pub mod generation;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod text;

pub use canvas::{DragController, DragUpdate, InteractionState, Point, PointerButton};
pub use config::{AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use generation::template::TemplateGenerator;
pub use generation::wire::{GenerationTransport, JsonGenerationAdapter, Operation};
pub use generation::{GenerationAdapter, GenerationError, GenerationResult};
pub use logging::{default_log_level, init_logging, init_logging_to, logging_status, LogDestination};
pub use model::document::{
    Document, DocumentStatus, Element, ElementId, ElementPatch, ElementStyle, ElementType,
    ModelError, Page, StylePatch, TextAlign,
};
pub use model::outline::{AspectRatio, Chapter, ContentLength, GenerationConfig, Outline, PageLayout};
pub use repo::memory_repo::InMemoryProjectStore;
pub use repo::project_repo::{ProjectStore, SqliteProjectStore, StoreError, StoreResult};
pub use service::editor_session::{EditorSession, SessionError, SessionResult};
pub use service::export_service::{export_document, ExportArtifact, ExportError, ExportFormat};
pub use service::project_service::{ProjectService, ProjectSummary};
pub use service::wizard_service::{WizardError, WizardService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
