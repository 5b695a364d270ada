//! Document export.
//!
//! Packages a document into a downloadable artifact. Rendering to the final
//! binary format is delegated elsewhere; this layer checks the document and
//! produces a format-tagged JSON package plus its file name.

use crate::model::document::{Document, ModelError};
use crate::text::slugify;
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Supported export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Epub,
    Docx,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Epub => "epub",
            Self::Docx => "docx",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "epub" => Some(Self::Epub),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Epub => "application/epub+zip",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Export failure.
#[derive(Debug)]
pub enum ExportError {
    /// Document breaks a structural invariant and cannot be laid out.
    InvalidDocument(ModelError),
    Encoding(serde_json::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDocument(err) => write!(f, "cannot export document: {err}"),
            Self::Encoding(err) => write!(f, "failed to encode export package: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDocument(err) => Some(err),
            Self::Encoding(err) => Some(err),
        }
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    /// `<title-slug>.<extension>`
    pub file_name: String,
    pub page_count: usize,
    pub element_count: usize,
    pub payload: Vec<u8>,
}

#[derive(Serialize)]
struct ExportPackage<'a> {
    format: ExportFormat,
    mime_type: &'static str,
    document: &'a Document,
}

/// Exports `document` as `format`.
///
/// # Errors
/// - `InvalidDocument` when `Document::validate` fails.
pub fn export_document(document: &Document, format: ExportFormat) -> Result<ExportArtifact, ExportError> {
    if let Err(err) = document.validate() {
        error!(
            "event=export module=service status=error project_id={} format={} error={}",
            document.id,
            format.as_str(),
            err
        );
        return Err(ExportError::InvalidDocument(err));
    }

    let payload = serde_json::to_vec_pretty(&ExportPackage {
        format,
        mime_type: format.mime_type(),
        document,
    })
    .map_err(ExportError::Encoding)?;

    let artifact = ExportArtifact {
        format,
        file_name: format!("{}.{}", slugify(&document.title), format.as_str()),
        page_count: document.pages.len(),
        element_count: document.element_count(),
        payload,
    };
    info!(
        "event=export module=service status=ok project_id={} format={} pages={} bytes={}",
        document.id,
        format.as_str(),
        artifact.page_count,
        artifact.payload.len()
    );
    Ok(artifact)
}
