//! Document domain model.
//!
//! # Responsibility
//! - Define the canonical document/page/element records shared by the
//!   editor, the wizard and the persistence adapter.
//! - Provide copy-on-write structural edits (add page, add/update/remove
//!   element).
//!
//! # Invariants
//! - Every document has at least one page; page 0 is the cover.
//! - Element ids are unique within a page, not across the document.
//! - Geometry is finite and `w`, `h` are non-negative.
//! - No structural edit mutates `self`; every edit returns a new value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex color regex")
});

/// Stable identifier of a document within the persisted collection.
pub type DocumentId = String;
/// Identifier of a page within its document.
pub type PageId = String;
/// Identifier of an element, unique only within its page.
pub type ElementId = String;

pub type ModelResult<T> = Result<T, ModelError>;

/// Structural or validation failure raised by document edits.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Page index is not within `0..page_count`.
    PageOutOfRange { index: usize, page_count: usize },
    /// No element with this id exists on the addressed page.
    ElementNotFound(ElementId),
    /// Element id already present on the addressed page.
    DuplicateElementId(ElementId),
    /// Document has no pages.
    EmptyDocument,
    /// Element carries NaN or infinite geometry.
    NonFiniteGeometry(ElementId),
    /// Element carries negative width or height.
    NegativeSize(ElementId),
    /// Colour is not `#rgb` or `#rrggbb`.
    InvalidColor(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageOutOfRange { index, page_count } => write!(
                f,
                "page index {index} out of range for document with {page_count} page(s)"
            ),
            Self::ElementNotFound(id) => write!(f, "element not found: {id}"),
            Self::DuplicateElementId(id) => write!(f, "duplicate element id on page: {id}"),
            Self::EmptyDocument => write!(f, "document must contain at least one page"),
            Self::NonFiniteGeometry(id) => write!(f, "element {id} has non-finite geometry"),
            Self::NegativeSize(id) => write!(f, "element {id} has negative width or height"),
            Self::InvalidColor(value) => write!(f, "invalid colour `{value}`; expected #rgb or #rrggbb"),
        }
    }
}

impl Error for ModelError {}

/// Kind of content an element renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Title,
    Heading,
    Paragraph,
    /// `content` holds an image URL.
    Image,
    Quote,
    List,
    Shape,
}

impl ElementType {
    pub const ALL: [ElementType; 7] = [
        Self::Title,
        Self::Heading,
        Self::Paragraph,
        Self::Image,
        Self::Quote,
        Self::List,
        Self::Shape,
    ];

    /// Returns the stored lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::Image => "image",
            Self::Quote => "quote",
            Self::List => "list",
            Self::Shape => "shape",
        }
    }

    /// Parses the stored lowercase name.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Publication lifecycle of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Published,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

/// Optional visual properties of an element. Absent fields fall back to the
/// renderer defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
}

/// One positioned content unit on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    /// Serialized as `type` to match the stored layout.
    #[serde(rename = "type")]
    pub kind: ElementType,
    /// Text body, or image URL when `kind == ElementType::Image`.
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub style: ElementStyle,
    /// Marks the full-bleed cover image on page 0. Replaced as a unit when a
    /// new cover is generated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_cover: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Element {
    /// Creates an element at the origin with zero size and default style.
    pub fn new(id: impl Into<ElementId>, kind: ElementType, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            style: ElementStyle::default(),
            is_cover: false,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, w: f64, h: f64) -> Self {
        self.w = w;
        self.h = h;
        self
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    /// Checks geometry invariants assumed by rendering.
    pub fn validate(&self) -> ModelResult<()> {
        if ![self.x, self.y, self.w, self.h]
            .iter()
            .all(|value| value.is_finite())
        {
            return Err(ModelError::NonFiniteGeometry(self.id.clone()));
        }
        if self.w < 0.0 || self.h < 0.0 {
            return Err(ModelError::NegativeSize(self.id.clone()));
        }
        Ok(())
    }
}

/// Partial style update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub font_size: Option<f64>,
    pub font_weight: Option<String>,
    pub color: Option<String>,
    pub text_align: Option<TextAlign>,
    pub background_color: Option<String>,
    pub border_radius: Option<f64>,
    pub padding: Option<f64>,
}

impl StylePatch {
    fn apply(&self, style: &mut ElementStyle) {
        if let Some(value) = self.font_size {
            style.font_size = Some(value);
        }
        if let Some(value) = &self.font_weight {
            style.font_weight = Some(value.clone());
        }
        if let Some(value) = &self.color {
            style.color = Some(value.clone());
        }
        if let Some(value) = self.text_align {
            style.text_align = Some(value);
        }
        if let Some(value) = &self.background_color {
            style.background_color = Some(value.clone());
        }
        if let Some(value) = self.border_radius {
            style.border_radius = Some(value);
        }
        if let Some(value) = self.padding {
            style.padding = Some(value);
        }
    }
}

/// Partial element update with merge semantics: fields left as `None` keep
/// their previous value. The element id is not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub kind: Option<ElementType>,
    pub content: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
    pub style: Option<StylePatch>,
}

impl ElementPatch {
    /// Patch that only moves the element's top-left corner.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns a copy of `element` with the present fields replaced.
    pub fn apply(&self, element: &Element) -> Element {
        let mut next = element.clone();
        if let Some(kind) = self.kind {
            next.kind = kind;
        }
        if let Some(content) = &self.content {
            next.content = content.clone();
        }
        if let Some(x) = self.x {
            next.x = x;
        }
        if let Some(y) = self.y {
            next.y = y;
        }
        if let Some(w) = self.w {
            next.w = w;
        }
        if let Some(h) = self.h {
            next.h = h;
        }
        if let Some(style) = &self.style {
            style.apply(&mut next.style);
        }
        next
    }
}

/// One canvas page. Element order is paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub background_color: String,
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl Page {
    pub const DEFAULT_BACKGROUND: &'static str = "#ffffff";

    /// Creates an empty page with the default white background.
    pub fn blank(id: impl Into<PageId>) -> Self {
        Self {
            id: id.into(),
            background_color: Self::DEFAULT_BACKGROUND.to_string(),
            elements: Vec::new(),
            template_id: None,
        }
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut seen = HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            if !seen.insert(element.id.as_str()) {
                return Err(ModelError::DuplicateElementId(element.id.clone()));
            }
            element.validate()?;
        }
        Ok(())
    }
}

/// One ebook project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub pages: Vec<Page>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    pub status: DocumentStatus,
}

impl Document {
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Returns the page at `index` or a range error.
    pub fn page_at(&self, index: usize) -> ModelResult<&Page> {
        self.pages.get(index).ok_or(ModelError::PageOutOfRange {
            index,
            page_count: self.pages.len(),
        })
    }

    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|page| page.elements.len()).sum()
    }

    /// Returns a copy with `page` appended after the last page.
    pub fn with_page_added(&self, page: Page) -> Document {
        let mut next = self.clone();
        next.pages.push(page);
        next
    }

    /// Returns a copy with `element` appended to the page at `page_index`.
    ///
    /// # Errors
    /// - `PageOutOfRange` when the page does not exist.
    /// - `DuplicateElementId` when the id is already used on that page.
    /// - `NonFiniteGeometry` / `NegativeSize` when the element's geometry is
    ///   unusable.
    pub fn with_element_added(&self, page_index: usize, element: Element) -> ModelResult<Document> {
        let page = self.page_at(page_index)?;
        element.validate()?;
        if page.contains(&element.id) {
            return Err(ModelError::DuplicateElementId(element.id));
        }
        Ok(self.with_page_replaced(page_index, |page| page.elements.push(element)))
    }

    /// Returns a copy with `element` inserted before every other element on
    /// the page, i.e. painted first.
    pub fn with_element_prepended(
        &self,
        page_index: usize,
        element: Element,
    ) -> ModelResult<Document> {
        let page = self.page_at(page_index)?;
        element.validate()?;
        if page.contains(&element.id) {
            return Err(ModelError::DuplicateElementId(element.id));
        }
        Ok(self.with_page_replaced(page_index, |page| page.elements.insert(0, element)))
    }

    /// Returns a copy where element `id` on page `page_index` has the fields
    /// present in `patch` replaced. Position in the element list is kept.
    ///
    /// # Errors
    /// - `ElementNotFound` when the page has no element `id`.
    /// - `NonFiniteGeometry` / `NegativeSize` when the patched geometry is
    ///   unusable; the document is left as is.
    pub fn with_element_updated(
        &self,
        page_index: usize,
        id: &str,
        patch: &ElementPatch,
    ) -> ModelResult<Document> {
        let page = self.page_at(page_index)?;
        let position = page
            .elements
            .iter()
            .position(|element| element.id == id)
            .ok_or_else(|| ModelError::ElementNotFound(id.to_string()))?;
        let updated = patch.apply(&page.elements[position]);
        updated.validate()?;
        Ok(self.with_page_replaced(page_index, |page| page.elements[position] = updated))
    }

    /// Returns a copy without element `id`; remaining elements keep their
    /// relative order.
    pub fn with_element_removed(&self, page_index: usize, id: &str) -> ModelResult<Document> {
        let page = self.page_at(page_index)?;
        let position = page
            .elements
            .iter()
            .position(|element| element.id == id)
            .ok_or_else(|| ModelError::ElementNotFound(id.to_string()))?;
        Ok(self.with_page_replaced(page_index, |page| {
            page.elements.remove(position);
        }))
    }

    /// Returns a copy with every element matching `predicate` removed from
    /// the page.
    pub fn with_elements_removed_where(
        &self,
        page_index: usize,
        predicate: impl Fn(&Element) -> bool,
    ) -> ModelResult<Document> {
        self.page_at(page_index)?;
        Ok(self.with_page_replaced(page_index, |page| {
            page.elements.retain(|element| !predicate(element));
        }))
    }

    /// Returns a copy with the page background replaced.
    ///
    /// # Errors
    /// - `InvalidColor` unless `color` is `#rgb` or `#rrggbb`.
    pub fn with_page_background(&self, page_index: usize, color: &str) -> ModelResult<Document> {
        validate_color(color)?;
        self.page_at(page_index)?;
        Ok(self.with_page_replaced(page_index, |page| {
            page.background_color = color.to_string();
        }))
    }

    /// Checks every structural invariant of the document.
    pub fn validate(&self) -> ModelResult<()> {
        if self.pages.is_empty() {
            return Err(ModelError::EmptyDocument);
        }
        self.pages.iter().try_for_each(Page::validate)
    }

    // Caller guarantees `page_index` is in range.
    fn with_page_replaced(&self, page_index: usize, edit: impl FnOnce(&mut Page)) -> Document {
        let mut next = self.clone();
        edit(&mut next.pages[page_index]);
        next
    }
}

/// Accepts `#rgb` and `#rrggbb` colour literals.
pub fn validate_color(value: &str) -> ModelResult<()> {
    if HEX_COLOR_RE.is_match(value) {
        Ok(())
    } else {
        Err(ModelError::InvalidColor(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        validate_color, Document, DocumentStatus, Element, ElementPatch, ElementType, ModelError,
        Page, TextAlign,
    };

    fn sample() -> Document {
        let mut cover = Page::blank("page_0");
        cover.elements = vec![
            Element::new("a", ElementType::Title, "A").sized(10.0, 10.0),
            Element::new("b", ElementType::Paragraph, "B").sized(10.0, 10.0),
            Element::new("c", ElementType::Quote, "C").sized(10.0, 10.0),
        ];
        Document {
            id: "project_1".to_string(),
            title: "T".to_string(),
            subtitle: "S".to_string(),
            author: "Me".to_string(),
            pages: vec![cover, Page::blank("page_1")],
            created_at: "2026-01-01T00:00:00Z".to_string(),
            status: DocumentStatus::Draft,
        }
    }

    #[test]
    fn element_type_parse_accepts_stored_names() {
        for kind in ElementType::ALL {
            assert_eq!(ElementType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ElementType::parse(" Image "), Some(ElementType::Image));
        assert_eq!(ElementType::parse("video"), None);
    }

    #[test]
    fn update_does_not_touch_source_document() {
        let doc = sample();
        let next = doc
            .with_element_updated(0, "b", &ElementPatch::content("changed"))
            .unwrap();
        assert_eq!(doc.pages[0].elements[1].content, "B");
        assert_eq!(next.pages[0].elements[1].content, "changed");
        assert_eq!(next.pages[1], doc.pages[1]);
    }

    #[test]
    fn empty_patch_is_identity() {
        let doc = sample();
        let patch = ElementPatch::default();
        assert!(patch.is_empty());
        assert_eq!(doc.with_element_updated(0, "c", &patch).unwrap(), doc);
    }

    #[test]
    fn text_align_parses_case_insensitively() {
        assert_eq!(TextAlign::parse(" Right "), Some(TextAlign::Right));
        assert_eq!(TextAlign::parse("justify"), None);
    }

    #[test]
    fn edits_reject_unusable_geometry() {
        let doc = sample();
        assert_eq!(
            doc.with_element_updated(0, "a", &ElementPatch::position(f64::NAN, 0.0))
                .unwrap_err(),
            ModelError::NonFiniteGeometry("a".to_string())
        );
        let shrink = ElementPatch {
            w: Some(-1.0),
            ..ElementPatch::default()
        };
        assert_eq!(
            doc.with_element_updated(0, "b", &shrink).unwrap_err(),
            ModelError::NegativeSize("b".to_string())
        );
        let infinite = Element::new("z", ElementType::Shape, "").at(f64::INFINITY, 0.0);
        assert!(doc.with_element_added(0, infinite.clone()).is_err());
        assert!(doc.with_element_prepended(0, infinite).is_err());
    }

    #[test]
    fn prepend_places_element_first() {
        let doc = sample()
            .with_element_prepended(0, Element::new("z", ElementType::Image, "u"))
            .unwrap();
        let ids: Vec<&str> = doc.pages[0].elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "b", "c"]);
    }

    #[test]
    fn color_validation_accepts_short_and_long_hex() {
        assert!(validate_color("#fff").is_ok());
        assert!(validate_color("#1E293b").is_ok());
        assert!(validate_color("white").is_err());
        assert!(validate_color("#12345").is_err());
    }
}
