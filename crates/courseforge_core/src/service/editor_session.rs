//! Editor session use-case.
//!
//! # Responsibility
//! - Hold the active document, active page index and canvas selection.
//! - Apply element/page edits through copy-on-write document operations.
//! - Persist the whole document after every successful mutation.
//!
//! # Invariants
//! - `0 <= active_page_index < document.pages.len()`.
//! - A failed edit leaves the document, page index and selection untouched.
//! - Drag moves are applied in memory and persisted once on pointer-up; a
//!   failed pointer-up persist restores the document from drag start.
//! - A drag stays on the page it started on, even if the active page changes.
//! - Deleting the selected element clears the selection.

use crate::canvas::{DragController, DragUpdate, InteractionState, Point, PointerButton};
use crate::generation::{GenerationAdapter, GenerationError};
use crate::model::document::{
    Document, Element, ElementId, ElementPatch, ElementStyle, ElementType, ModelError, Page,
    TextAlign,
};
use crate::model::outline::AspectRatio;
use crate::repo::project_repo::{ProjectStore, StoreError};
use crate::service::export_service::{export_document, ExportArtifact, ExportError, ExportFormat};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NEW_ELEMENT_X: f64 = 100.0;
const NEW_ELEMENT_Y: f64 = 100.0;
const PLACEHOLDER_IMAGE_URL: &str = "https://picsum.photos/400/300";
const COVER_PAGE_INDEX: usize = 0;
const COVER_IMAGE_WIDTH: f64 = 600.0;
const COVER_IMAGE_HEIGHT: f64 = 840.0;

pub type SessionResult<T> = Result<T, SessionError>;

/// Error for editor session operations.
#[derive(Debug)]
pub enum SessionError {
    Model(ModelError),
    Store(StoreError),
    Generation(GenerationError),
    Export(ExportError),
    /// No stored project has the requested id.
    ProjectNotFound(String),
    /// Operation needs a selected element.
    NoSelection,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Generation(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::NoSelection => write!(f, "no element is selected"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Generation(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::ProjectNotFound(_) | Self::NoSelection => None,
        }
    }
}

impl From<ModelError> for SessionError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::ProjectNotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<GenerationError> for SessionError {
    fn from(value: GenerationError) -> Self {
        Self::Generation(value)
    }
}

impl From<ExportError> for SessionError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Unpersisted drag bookkeeping.
#[derive(Debug)]
struct PendingDrag {
    page_index: usize,
    /// Document as last persisted before the drag moved anything.
    before: Document,
    moved: bool,
}

/// Interactive editing session over one document.
pub struct EditorSession<S: ProjectStore> {
    store: S,
    document: Document,
    active_page_index: usize,
    canvas: DragController,
    drag: Option<PendingDrag>,
}

impl<S: ProjectStore> EditorSession<S> {
    /// Starts a session on `document` with page 0 active and no selection.
    ///
    /// # Errors
    /// - `Model(EmptyDocument)` when the document has no pages.
    pub fn new(store: S, document: Document) -> SessionResult<Self> {
        if document.pages.is_empty() {
            return Err(ModelError::EmptyDocument.into());
        }
        Ok(Self {
            store,
            document,
            active_page_index: 0,
            canvas: DragController::new(),
            drag: None,
        })
    }

    /// Loads project `id` from the store and starts a session on it.
    pub fn open(store: S, id: &str) -> SessionResult<Self> {
        let document = store
            .get(id)?
            .ok_or_else(|| SessionError::ProjectNotFound(id.to_string()))?;
        info!(
            "event=session_open module=service status=ok project_id={} pages={}",
            document.id,
            document.pages.len()
        );
        Self::new(store, document)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn active_page_index(&self) -> usize {
        self.active_page_index
    }

    pub fn active_page(&self) -> &Page {
        &self.document.pages[self.active_page_index]
    }

    pub fn selected_element_id(&self) -> Option<&str> {
        self.canvas.selected_id().map(String::as_str)
    }

    /// Selected element, looked up on the active page.
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected_element_id()
            .and_then(|id| self.active_page().element(id))
    }

    pub fn interaction(&self) -> &InteractionState {
        self.canvas.state()
    }

    /// Switches the active page. Selection is left as is.
    pub fn select_page(&mut self, index: usize) -> SessionResult<()> {
        self.document.page_at(index)?;
        self.active_page_index = index;
        Ok(())
    }

    /// Selects an element on the active page without starting a drag.
    pub fn select_element(&mut self, id: &str) -> SessionResult<()> {
        self.require_on_active_page(id)?;
        self.canvas.select(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.canvas.clear();
    }

    /// Appends a new element of `kind` to the active page and persists.
    ///
    /// Images default to 300x300 with a placeholder URL; other kinds default
    /// to 200x50 with `New <kind>` as text.
    pub fn add_element(
        &mut self,
        kind: ElementType,
        content: Option<String>,
    ) -> SessionResult<ElementId> {
        let content = content.unwrap_or_else(|| match kind {
            ElementType::Image => PLACEHOLDER_IMAGE_URL.to_string(),
            other => format!("New {other}"),
        });
        let (w, h) = match kind {
            ElementType::Image => (300.0, 300.0),
            _ => (200.0, 50.0),
        };
        let element = Element::new(new_element_id("el"), kind, content)
            .at(NEW_ELEMENT_X, NEW_ELEMENT_Y)
            .sized(w, h)
            .with_style(ElementStyle {
                font_size: Some(16.0),
                text_align: Some(TextAlign::Left),
                color: Some("#000000".to_string()),
                ..ElementStyle::default()
            });
        let id = element.id.clone();

        let next = self
            .document
            .with_element_added(self.active_page_index, element)?;
        self.commit(next, "element_add")?;
        Ok(id)
    }

    /// Merges `patch` into element `id` on the active page and persists.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> SessionResult<()> {
        let next = self
            .document
            .with_element_updated(self.active_page_index, id, patch)?;
        self.commit(next, "element_update")
    }

    /// Merges `patch` into the selected element.
    pub fn update_selected(&mut self, patch: &ElementPatch) -> SessionResult<()> {
        let id = self
            .selected_element_id()
            .ok_or(SessionError::NoSelection)?
            .to_string();
        self.update_element(&id, patch)
    }

    /// Removes element `id` from the active page and persists. Clears the
    /// selection when it pointed at the removed element.
    pub fn delete_element(&mut self, id: &str) -> SessionResult<()> {
        let next = self
            .document
            .with_element_removed(self.active_page_index, id)?;
        self.commit(next, "element_delete")?;
        if self.selected_element_id() == Some(id) {
            self.canvas.clear();
        }
        Ok(())
    }

    /// Removes the selected element and returns its id.
    pub fn delete_selected(&mut self) -> SessionResult<ElementId> {
        let id = self
            .selected_element_id()
            .ok_or(SessionError::NoSelection)?
            .to_string();
        self.delete_element(&id)?;
        Ok(id)
    }

    /// Appends a blank page, makes it active and returns its index.
    pub fn add_page(&mut self) -> SessionResult<usize> {
        let next = self
            .document
            .with_page_added(Page::blank(new_element_id("page")));
        self.commit(next, "page_add")?;
        self.active_page_index = self.document.pages.len() - 1;
        Ok(self.active_page_index)
    }

    /// Replaces the active page background colour and persists.
    pub fn set_page_background(&mut self, color: &str) -> SessionResult<()> {
        let next = self
            .document
            .with_page_background(self.active_page_index, color)?;
        self.commit(next, "page_background")
    }

    /// Pointer-down on element `id` of the active page. Selects it, and a
    /// primary button starts a drag.
    ///
    /// An unfinished drag with unpersisted moves is persisted first.
    pub fn pointer_down(
        &mut self,
        id: &str,
        pointer: Point,
        button: PointerButton,
    ) -> SessionResult<()> {
        let element = self.require_on_active_page(id)?;
        let origin = Point::new(element.x, element.y);
        self.finish_drag()?;
        self.canvas.pointer_down(id, origin, pointer, button);
        if button == PointerButton::Primary {
            self.drag = Some(PendingDrag {
                page_index: self.active_page_index,
                before: self.document.clone(),
                moved: false,
            });
        }
        Ok(())
    }

    /// Moves the dragged element so its top-left is `pointer - offset`.
    ///
    /// Returns `None` when no drag is active. The move is not persisted until
    /// `pointer_up`. A move to non-finite coordinates is rejected and leaves
    /// the element where it was.
    pub fn pointer_move(&mut self, pointer: Point) -> SessionResult<Option<DragUpdate>> {
        let Some(update) = self.canvas.move_to(pointer) else {
            return Ok(None);
        };
        let Some(drag) = self.drag.as_mut() else {
            return Ok(None);
        };
        self.document = self.document.with_element_updated(
            drag.page_index,
            &update.id,
            &ElementPatch::position(update.x, update.y),
        )?;
        drag.moved = true;
        Ok(Some(update))
    }

    /// Ends the drag, keeps the selection and persists the final position.
    ///
    /// # Errors
    /// - `Store(..)` when the persist fails; the document is restored to its
    ///   state at drag start.
    pub fn pointer_up(&mut self) -> SessionResult<()> {
        self.canvas.end();
        self.finish_drag()
    }

    /// Generates an image from `prompt` and adds it to the active page.
    ///
    /// # Errors
    /// - `Generation(InvalidInput)` for a blank prompt; no call is made.
    pub fn generate_image<G: GenerationAdapter>(
        &mut self,
        generator: &G,
        prompt: &str,
    ) -> SessionResult<ElementId> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidInput("image prompt is empty".to_string()).into());
        }
        let url = self.call_generator("image", || {
            generator.generate_image(prompt, AspectRatio::Square)
        })?;
        self.add_element(ElementType::Image, Some(url))
    }

    /// Generates a cover image for the document and places it behind the
    /// cover page content, replacing any previous cover image. Switches to
    /// the cover page.
    pub fn generate_cover<G: GenerationAdapter>(
        &mut self,
        generator: &G,
    ) -> SessionResult<ElementId> {
        let prompt = cover_prompt(&self.document);
        let url = self.call_generator("cover", || {
            generator.generate_image(&prompt, AspectRatio::Portrait)
        })?;

        let mut cover = Element::new(new_element_id("cover_img"), ElementType::Image, url)
            .sized(COVER_IMAGE_WIDTH, COVER_IMAGE_HEIGHT)
            .with_style(ElementStyle {
                border_radius: Some(0.0),
                ..ElementStyle::default()
            });
        cover.is_cover = true;
        let id = cover.id.clone();

        let next = self
            .document
            .with_elements_removed_where(COVER_PAGE_INDEX, |element| element.is_cover)?
            .with_element_prepended(COVER_PAGE_INDEX, cover)?;
        self.commit(next, "cover_generate")?;
        self.cancel_drag();
        self.active_page_index = COVER_PAGE_INDEX;
        if self
            .selected_element_id()
            .is_some_and(|selected| !self.active_page().contains(selected))
        {
            self.canvas.clear();
        }
        Ok(id)
    }

    /// Replaces the document with the generator's optimized copy.
    ///
    /// The document id and creation time are kept. The active page index is
    /// clamped and a selection that no longer exists is cleared.
    pub fn optimize<G: GenerationAdapter>(&mut self, generator: &G) -> SessionResult<()> {
        let mut optimized =
            self.call_generator("optimize", || generator.optimize_document(&self.document))?;
        optimized
            .validate()
            .map_err(|err| GenerationError::MalformedResponse(format!("optimized document: {err}")))?;
        optimized.id = self.document.id.clone();
        optimized.created_at = self.document.created_at.clone();

        self.commit(optimized, "optimize")?;
        self.cancel_drag();
        self.active_page_index = self.active_page_index.min(self.document.pages.len() - 1);
        if self
            .selected_element_id()
            .is_some_and(|selected| !self.active_page().contains(selected))
        {
            self.canvas.clear();
        }
        Ok(())
    }

    /// Exports the current document.
    pub fn export(&self, format: ExportFormat) -> SessionResult<ExportArtifact> {
        Ok(export_document(&self.document, format)?)
    }

    fn finish_drag(&mut self) -> SessionResult<()> {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };
        if !drag.moved {
            return Ok(());
        }
        if let Err(err) = self.persist("element_drag") {
            self.document = drag.before;
            return Err(err);
        }
        Ok(())
    }

    /// Drops drag bookkeeping after an edit that replaced page contents.
    fn cancel_drag(&mut self) {
        self.canvas.end();
        self.drag = None;
    }

    fn require_on_active_page(&self, id: &str) -> SessionResult<&Element> {
        self.active_page()
            .element(id)
            .ok_or_else(|| ModelError::ElementNotFound(id.to_string()).into())
    }

    fn call_generator<T>(
        &self,
        operation: &'static str,
        call: impl FnOnce() -> Result<T, GenerationError>,
    ) -> SessionResult<T> {
        call().map_err(|err| {
            error!(
                "event=session_generate module=service status=error project_id={} operation={} error_code={}",
                self.document.id,
                operation,
                err.error_code()
            );
            SessionError::Generation(err)
        })
    }

    /// Persists `next` and then adopts it; on store failure the session keeps
    /// its previous document.
    fn commit(&mut self, next: Document, operation: &'static str) -> SessionResult<()> {
        if let Err(err) = self.store.upsert(&next) {
            error!(
                "event=session_commit module=service status=error project_id={} operation={} error={}",
                next.id, operation, err
            );
            return Err(err.into());
        }
        self.document = next;
        if let Some(drag) = self.drag.as_mut() {
            drag.before = self.document.clone();
            drag.moved = false;
        }
        debug!(
            "event=session_commit module=service status=ok project_id={} operation={}",
            self.document.id, operation
        );
        Ok(())
    }

    fn persist(&mut self, operation: &'static str) -> SessionResult<()> {
        let current = self.document.clone();
        self.commit(current, operation)
    }
}

fn new_element_id(prefix: &str) -> ElementId {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn cover_prompt(document: &Document) -> String {
    let theme = if document.subtitle.trim().is_empty() {
        "Modern knowledge"
    } else {
        document.subtitle.as_str()
    };
    format!(
        "A professional and high-quality ebook cover for the book titled \"{}\". Theme: {}. Style: Cinematic, high-quality illustration.",
        document.title, theme
    )
}
