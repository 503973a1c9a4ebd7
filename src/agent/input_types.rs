use serde::{Deserialize, Serialize};

/// Represents a file uploaded by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Original filename
    pub name: String,
    /// Declared MIME type of the file
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Base64 encoded file data
    pub data: String,
}

/// How an attachment is routed, decided solely by its declared MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Pdf,
    Image,
    Unsupported,
}

impl AttachmentKind {
    pub fn classify(mime_type: &str) -> Self {
        if mime_type == "application/pdf" {
            AttachmentKind::Pdf
        } else if mime_type.starts_with("image/") {
            AttachmentKind::Image
        } else {
            AttachmentKind::Unsupported
        }
    }
}

impl FileAttachment {
    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::classify(&self.mime_type)
    }
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Accepted for client compatibility; not replayed to the agent.
    #[serde(default)]
    pub conversation_history: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub files: Option<Vec<FileAttachment>>,
}

impl ChatRequest {
    pub fn files(&self) -> &[FileAttachment] {
        self.files.as_deref().unwrap_or_default()
    }

    pub fn history_len(&self) -> usize {
        self.conversation_history.as_ref().map_or(0, Vec::len)
    }
}
