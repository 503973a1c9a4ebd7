use serde::{Deserialize, Serialize};

use crate::agent::attachments::{self, DecodedAttachment};
use crate::agent::input_types::FileAttachment;

/// A typed unit of turn content, serialized in the Responses API input shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentItem {
    #[serde(rename = "input_text")]
    Text { text: String },
    #[serde(rename = "input_image")]
    Image { image_url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// One structured unit of conversational input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: Vec<ContentItem>,
}

impl ConversationTurn {
    /// The combined text block, always the first content item
    pub fn text(&self) -> &str {
        match self.content.first() {
            Some(ContentItem::Text { text }) => text,
            _ => "",
        }
    }
}

/// Build the single user turn for a request: the message plus any PDF text
/// first, then one image item per image attachment in input order.
pub fn assemble_turn(message: &str, files: &[FileAttachment]) -> ConversationTurn {
    let mut pdf_context = String::new();
    let mut images = Vec::new();

    for file in files {
        match attachments::decode(file) {
            DecodedAttachment::PdfText { name, text } => {
                if !text.is_empty() {
                    pdf_context.push_str(&format!("\n\n[Contingut del PDF '{}']: {}", name, text));
                }
            }
            DecodedAttachment::Image { data_uri } => {
                images.push(ContentItem::Image { image_url: data_uri });
            }
            DecodedAttachment::Ignored => {}
        }
    }

    let full_message = if pdf_context.is_empty() {
        message.to_string()
    } else {
        format!("{}\n{}", message, pdf_context)
    };

    let mut content = Vec::with_capacity(images.len() + 1);
    content.push(ContentItem::Text { text: full_message });
    content.extend(images);

    ConversationTurn {
        role: Role::User,
        content,
    }
}
