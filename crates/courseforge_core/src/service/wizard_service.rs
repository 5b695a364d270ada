//! Generation wizard use-case.
//!
//! # Responsibility
//! - Turn a `GenerationConfig` into a new draft document: outline first,
//!   then one layout per generated chapter page.
//! - Persist the document once every generation call has succeeded.
//!
//! # Invariants
//! - Page 0 is the cover with exactly one title and one heading element.
//! - At most `MAX_GENERATED_CHAPTER_PAGES` chapter pages are generated.
//! - Any failure aborts the flow; nothing is written to the store.

use crate::generation::{GenerationAdapter, GenerationError};
use crate::model::document::{
    validate_color, Document, DocumentStatus, Element, ElementStyle, ElementType, Page, TextAlign,
};
use crate::model::outline::{GenerationConfig, Outline, PageLayout};
use crate::repo::project_repo::{ProjectStore, StoreError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

/// Chapter pages generated per new document; the rest of the outline is
/// left for the user to lay out.
pub const MAX_GENERATED_CHAPTER_PAGES: usize = 2;
/// Author recorded when none is configured.
pub const DEFAULT_AUTHOR: &str = "Me";

/// Error for the wizard flow.
#[derive(Debug)]
pub enum WizardError {
    Generation(GenerationError),
    Store(StoreError),
    /// Creation timestamp could not be formatted.
    Timestamp(time::error::Format),
}

impl Display for WizardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Timestamp(err) => write!(f, "failed to format creation time: {err}"),
        }
    }
}

impl Error for WizardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Generation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Timestamp(err) => Some(err),
        }
    }
}

impl From<GenerationError> for WizardError {
    fn from(value: GenerationError) -> Self {
        Self::Generation(value)
    }
}

impl From<StoreError> for WizardError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Wizard service over a generator and a project store.
pub struct WizardService<G: GenerationAdapter, S: ProjectStore> {
    generator: G,
    store: S,
    author: String,
}

impl<G: GenerationAdapter, S: ProjectStore> WizardService<G, S> {
    pub fn new(generator: G, store: S) -> Self {
        Self {
            generator,
            store,
            author: DEFAULT_AUTHOR.to_string(),
        }
    }

    /// Overrides the author recorded on created documents.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generates, assembles and stores a new draft document.
    ///
    /// # Errors
    /// - `Generation(InvalidInput)` when the topic is blank; no call is made.
    /// - `Generation(..)` when any outline or layout call fails.
    /// - `Store(..)` when the final upsert fails.
    pub fn create_project(&self, config: &GenerationConfig) -> Result<Document, WizardError> {
        let started_at = Instant::now();
        if config.topic.trim().is_empty() {
            return Err(GenerationError::InvalidInput("topic is empty".to_string()).into());
        }
        info!(
            "event=wizard_generate module=service status=start length={}",
            config.length.as_str()
        );

        let result = self.generate_document(config);
        match &result {
            Ok(document) => info!(
                "event=wizard_generate module=service status=ok project_id={} pages={} duration_ms={}",
                document.id,
                document.pages.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=wizard_generate module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn generate_document(&self, config: &GenerationConfig) -> Result<Document, WizardError> {
        let outline = self.generator.generate_outline(config)?;

        let layouts = outline
            .chapters
            .iter()
            .take(MAX_GENERATED_CHAPTER_PAGES)
            .enumerate()
            .map(|(index, chapter)| self.generator.generate_page_layout(chapter, index + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(WizardError::Timestamp)?;
        let document = assemble_document(
            format!("project_{}", Uuid::new_v4().simple()),
            self.author.clone(),
            created_at,
            outline,
            layouts,
        );
        self.store.upsert(&document)?;
        Ok(document)
    }
}

/// Builds the cover page from an outline's title and subtitle.
pub fn cover_page(outline: &Outline) -> Page {
    let mut page = Page::blank("page_0");
    page.elements = vec![
        Element::new("el_title", ElementType::Title, outline.title.clone())
            .at(50.0, 100.0)
            .sized(400.0, 80.0)
            .with_style(ElementStyle {
                font_size: Some(42.0),
                font_weight: Some("bold".to_string()),
                text_align: Some(TextAlign::Center),
                color: Some("#1e293b".to_string()),
                ..ElementStyle::default()
            }),
        Element::new("el_subtitle", ElementType::Heading, outline.subtitle.clone())
            .at(100.0, 190.0)
            .sized(300.0, 40.0)
            .with_style(ElementStyle {
                font_size: Some(18.0),
                text_align: Some(TextAlign::Center),
                color: Some("#64748b".to_string()),
                ..ElementStyle::default()
            }),
    ];
    page
}

/// Assembles a draft document: cover page followed by one page per layout.
///
/// Layout `i` becomes page `page_{i+1}` with element ids `el_{i+1}_{idx}`.
/// A layout background that is not a hex colour is replaced by the blank
/// page default.
pub fn assemble_document(
    id: String,
    author: String,
    created_at: String,
    outline: Outline,
    layouts: Vec<PageLayout>,
) -> Document {
    let mut pages = Vec::with_capacity(layouts.len() + 1);
    pages.push(cover_page(&outline));

    for (index, layout) in layouts.into_iter().enumerate() {
        let page_number = index + 1;
        let mut page = Page::blank(format!("page_{page_number}"));
        if let Some(color) = layout
            .background_color
            .filter(|color| validate_color(color).is_ok())
        {
            page.background_color = color;
        }
        page.elements = layout
            .elements
            .into_iter()
            .enumerate()
            .map(|(idx, draft)| draft.into_element(format!("el_{page_number}_{idx}")))
            .collect();
        pages.push(page);
    }

    Document {
        id,
        title: outline.title,
        subtitle: outline.subtitle,
        author,
        pages,
        created_at,
        status: DocumentStatus::Draft,
    }
}
