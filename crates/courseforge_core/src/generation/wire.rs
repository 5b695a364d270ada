//! JSON wire format for generation requests and responses.
//!
//! # Responsibility
//! - Build the request payloads sent to the generator.
//! - Parse and check JSON responses into typed drafts.
//!
//! # Invariants
//! - Any response that fails to decode, or decodes with empty required
//!   text, is `MalformedResponse`; nothing partial is returned.

use crate::generation::{GenerationAdapter, GenerationError, GenerationResult};
use crate::model::document::{validate_color, Document};
use crate::model::outline::{AspectRatio, Chapter, GenerationConfig, Outline, PageLayout};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generation operation carried by a transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Outline,
    PageLayout,
    Image,
    Optimize,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Outline => "outline",
            Self::PageLayout => "page_layout",
            Self::Image => "image",
            Self::Optimize => "optimize",
        }
    }
}

/// Moves one JSON request to the generator and returns the raw response body.
pub trait GenerationTransport {
    fn send(&self, operation: Operation, payload: &Value) -> GenerationResult<String>;
}

impl<T: GenerationTransport + ?Sized> GenerationTransport for &T {
    fn send(&self, operation: Operation, payload: &Value) -> GenerationResult<String> {
        (**self).send(operation, payload)
    }
}

/// Layout request payload: `{chapterTitle, subsections, keyPoints, pageNumber}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest<'a> {
    pub chapter_title: &'a str,
    pub subsections: &'a [String],
    pub key_points: &'a [String],
    pub page_number: usize,
}

/// Image request payload: `{prompt, aspectRatio}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest<'a> {
    pub prompt: &'a str,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    url: String,
}

pub fn outline_request(config: &GenerationConfig) -> GenerationResult<Value> {
    to_payload(config)
}

pub fn layout_request(chapter: &Chapter, page_number: usize) -> GenerationResult<Value> {
    to_payload(&LayoutRequest {
        chapter_title: chapter.title.as_str(),
        subsections: &chapter.subsections,
        key_points: &chapter.key_points,
        page_number,
    })
}

pub fn image_request(prompt: &str, aspect_ratio: AspectRatio) -> GenerationResult<Value> {
    to_payload(&ImageRequest {
        prompt,
        aspect_ratio,
    })
}

/// Parses an outline response.
///
/// # Errors
/// - `MalformedResponse` on invalid JSON, missing fields or a blank title.
pub fn parse_outline(body: &str) -> GenerationResult<Outline> {
    let outline: Outline = decode(body, "outline")?;
    if outline.title.trim().is_empty() {
        return Err(malformed("outline title is empty"));
    }
    if let Some(index) = outline
        .chapters
        .iter()
        .position(|chapter| chapter.title.trim().is_empty())
    {
        return Err(malformed(format!("chapter {index} has an empty title")));
    }
    Ok(outline)
}

/// Parses a page layout response. Unknown element types are rejected.
pub fn parse_page_layout(body: &str) -> GenerationResult<PageLayout> {
    let layout: PageLayout = decode(body, "page layout")?;
    if let Some(index) = layout.elements.iter().position(|draft| {
        ![draft.x, draft.y, draft.w, draft.h]
            .iter()
            .all(|value| value.is_finite())
            || draft.w < 0.0
            || draft.h < 0.0
    }) {
        return Err(malformed(format!("element {index} has invalid geometry")));
    }
    if let Some(color) = &layout.background_color {
        validate_color(color)
            .map_err(|_| malformed(format!("invalid background color `{color}`")))?;
    }
    Ok(layout)
}

/// Parses an image response `{"url": "..."}`.
pub fn parse_image_url(body: &str) -> GenerationResult<String> {
    let response: ImageResponse = decode(body, "image")?;
    let url = response.url.trim();
    if url.is_empty() {
        return Err(malformed("image url is empty"));
    }
    Ok(url.to_string())
}

/// Parses an optimized document response.
pub fn parse_document(body: &str) -> GenerationResult<Document> {
    let document: Document = decode(body, "document")?;
    document
        .validate()
        .map_err(|err| malformed(format!("optimized document is invalid: {err}")))?;
    Ok(document)
}

fn to_payload<T: Serialize + ?Sized>(value: &T) -> GenerationResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| GenerationError::InvalidInput(format!("unencodable request: {err}")))
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> GenerationResult<T> {
    serde_json::from_str(strip_code_fence(body))
        .map_err(|err| malformed(format!("{what} response: {err}")))
}

/// Removes a surrounding markdown code fence (```json ... ```), which text
/// generators commonly add around JSON bodies.
fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn malformed(message: impl Into<String>) -> GenerationError {
    GenerationError::MalformedResponse(message.into())
}

/// Generation adapter that speaks JSON over a pluggable transport.
pub struct JsonGenerationAdapter<T: GenerationTransport> {
    transport: T,
}

impl<T: GenerationTransport> JsonGenerationAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    fn call<R>(
        &self,
        operation: Operation,
        payload: &Value,
        parse: impl FnOnce(&str) -> GenerationResult<R>,
    ) -> GenerationResult<R> {
        debug!(
            "event=generation_call module=generation status=start operation={}",
            operation.as_str()
        );
        let result = self.transport.send(operation, payload).and_then(|body| parse(&body));
        match &result {
            Ok(_) => debug!(
                "event=generation_call module=generation status=ok operation={}",
                operation.as_str()
            ),
            Err(err) => error!(
                "event=generation_call module=generation status=error operation={} error_code={}",
                operation.as_str(),
                err.error_code()
            ),
        }
        result
    }
}

impl<T: GenerationTransport> GenerationAdapter for JsonGenerationAdapter<T> {
    fn generate_outline(&self, config: &GenerationConfig) -> GenerationResult<Outline> {
        let payload = outline_request(config)?;
        self.call(Operation::Outline, &payload, parse_outline)
    }

    fn generate_page_layout(
        &self,
        chapter: &Chapter,
        page_number: usize,
    ) -> GenerationResult<PageLayout> {
        let payload = layout_request(chapter, page_number)?;
        self.call(Operation::PageLayout, &payload, parse_page_layout)
    }

    fn generate_image(&self, prompt: &str, aspect_ratio: AspectRatio) -> GenerationResult<String> {
        let payload = image_request(prompt, aspect_ratio)?;
        self.call(Operation::Image, &payload, parse_image_url)
    }

    fn optimize_document(&self, document: &Document) -> GenerationResult<Document> {
        let payload = to_payload(document)?;
        self.call(Operation::Optimize, &payload, parse_document)
    }
}
