//! Generation adapter boundary.
//!
//! # Responsibility
//! - Define the request/response contract with the external content
//!   generator (outline, page layout, image, optimization pass).
//! - Provide a JSON wire adapter over any transport and an offline
//!   deterministic generator.
//!
//! # Invariants
//! - Calls are single-shot: no retry, no streaming.
//! - Calls are not idempotent; re-invoking may yield different content.
//! - Unusable responses surface as `GenerationError::MalformedResponse`.

pub mod template;
pub mod wire;

use crate::model::document::Document;
use crate::model::outline::{AspectRatio, Chapter, GenerationConfig, Outline, PageLayout};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Failure of a generation call or of its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Request rejected before any call was made.
    InvalidInput(String),
    /// Transport or provider failure.
    Request(String),
    /// Response arrived but does not match the expected shape.
    MalformedResponse(String),
}

impl GenerationError {
    /// Stable code used in log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "generation_invalid_input",
            Self::Request(_) => "generation_request_failed",
            Self::MalformedResponse(_) => "generation_malformed_response",
        }
    }
}

impl Display for GenerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid generation input: {message}"),
            Self::Request(message) => write!(f, "generation request failed: {message}"),
            Self::MalformedResponse(message) => {
                write!(f, "generation returned unusable data: {message}")
            }
        }
    }
}

impl Error for GenerationError {}

/// External content generator consumed by the wizard and the editor.
pub trait GenerationAdapter {
    /// Drafts a title, subtitle and ordered chapter list.
    fn generate_outline(&self, config: &GenerationConfig) -> GenerationResult<Outline>;

    /// Lays out one chapter page. `page_number` is 1-based; page 0 is the
    /// cover and is never requested here.
    fn generate_page_layout(
        &self,
        chapter: &Chapter,
        page_number: usize,
    ) -> GenerationResult<PageLayout>;

    /// Returns the URL of a freshly generated image.
    fn generate_image(&self, prompt: &str, aspect_ratio: AspectRatio) -> GenerationResult<String>;

    /// Returns a rewritten copy of `document`.
    fn optimize_document(&self, document: &Document) -> GenerationResult<Document>;
}

impl<T: GenerationAdapter + ?Sized> GenerationAdapter for &T {
    fn generate_outline(&self, config: &GenerationConfig) -> GenerationResult<Outline> {
        (**self).generate_outline(config)
    }

    fn generate_page_layout(
        &self,
        chapter: &Chapter,
        page_number: usize,
    ) -> GenerationResult<PageLayout> {
        (**self).generate_page_layout(chapter, page_number)
    }

    fn generate_image(&self, prompt: &str, aspect_ratio: AspectRatio) -> GenerationResult<String> {
        (**self).generate_image(prompt, aspect_ratio)
    }

    fn optimize_document(&self, document: &Document) -> GenerationResult<Document> {
        (**self).optimize_document(document)
    }
}
