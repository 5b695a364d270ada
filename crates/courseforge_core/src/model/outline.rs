//! Generation inputs and AI-produced drafts.
//!
//! # Responsibility
//! - Define the one-shot generation request (`GenerationConfig`).
//! - Define outline and page-layout drafts consumed to seed a document.
//!
//! # Invariants
//! - Drafts never carry element ids; ids are assigned by the consumer.
//! - `GenerationConfig` is never persisted.

use crate::model::document::{Element, ElementId, ElementStyle, ElementType};
use serde::{Deserialize, Serialize};

/// Requested overall ebook length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ContentLength {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "short" => Some(Self::Short),
            "medium" => Some(Self::Medium),
            "long" => Some(Self::Long),
            _ => None,
        }
    }
}

/// Wizard input, consumed once per generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub topic: String,
    pub audience: String,
    pub tone: String,
    pub length: ContentLength,
    pub style: String,
}

impl GenerationConfig {
    pub const DEFAULT_TONE: &'static str = "Professional";
    pub const DEFAULT_STYLE: &'static str = "Modern";

    /// Creates a config for `topic` with wizard defaults for everything else.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            topic: String::new(),
            audience: String::new(),
            tone: Self::DEFAULT_TONE.to_string(),
            length: ContentLength::default(),
            style: Self::DEFAULT_STYLE.to_string(),
        }
    }
}

/// One chapter of an outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub title: String,
    #[serde(default)]
    pub subsections: Vec<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// Structural draft of an ebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub subtitle: String,
    pub chapters: Vec<Chapter>,
}

/// An element as produced by generation: every field except `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDraft {
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub style: ElementStyle,
}

impl ElementDraft {
    /// Materializes the draft under a caller-assigned id.
    pub fn into_element(self, id: impl Into<ElementId>) -> Element {
        Element::new(id, self.kind, self.content)
            .at(self.x, self.y)
            .sized(self.w, self.h)
            .with_style(self.style)
    }
}

/// Generated layout for one chapter page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    pub elements: Vec<ElementDraft>,
}

/// Aspect ratio token accepted by image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "9:16",
        }
    }
}
