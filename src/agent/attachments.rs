//! Attachment decoding: PDF text extraction and image pass-through.

use base64::Engine;
use lopdf::Document;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, warn};

use crate::agent::input_types::{AttachmentKind, FileAttachment};

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("{0}")]
    Pdf(#[from] lopdf::Error),
    #[error("PDF parser panicked: {0}")]
    Panic(String),
}

/// What a single attachment contributes to the user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedAttachment {
    /// Text extracted from a PDF, or a diagnostic if extraction failed
    PdfText { name: String, text: String },
    /// Image forwarded untouched as a data URI
    Image { data_uri: String },
    /// Unsupported type, dropped silently
    Ignored,
}

/// Decode one attachment according to its declared MIME type. Never fails:
/// PDF problems degrade to placeholder text.
pub fn decode(file: &FileAttachment) -> DecodedAttachment {
    match file.kind() {
        AttachmentKind::Pdf => DecodedAttachment::PdfText {
            name: file.name.clone(),
            text: extract_pdf_text(&file.data),
        },
        AttachmentKind::Image => DecodedAttachment::Image {
            data_uri: format!("data:{};base64,{}", file.mime_type, file.data),
        },
        AttachmentKind::Unsupported => {
            debug!("Ignoring attachment '{}' of type {}", file.name, file.mime_type);
            DecodedAttachment::Ignored
        }
    }
}

/// Extract the text of a base64-encoded PDF, page by page. Returns a
/// bracketed diagnostic instead of an error. lopdf panics on some malformed
/// documents, so a panic is treated like any other parse failure.
pub fn extract_pdf_text(base64_data: &str) -> String {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| try_extract_pdf_text(base64_data)))
        .unwrap_or_else(|payload| Err(AttachmentError::Panic(panic_message(payload.as_ref()))));

    match outcome {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read PDF attachment: {}", e);
            format!("[Error al leer PDF: {}]", e)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn try_extract_pdf_text(base64_data: &str) -> Result<String, AttachmentError> {
    let cleaned: String = base64_data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(cleaned)?;
    let document = Document::load_mem(&bytes)?;

    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            // A page without extractable text contributes nothing.
            Err(e) => debug!("No text extracted from page {}: {}", page_number, e),
        }
    }
    Ok(text.trim().to_string())
}
