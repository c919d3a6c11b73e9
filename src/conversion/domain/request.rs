//! Chat-completion request messages produced by projection.

use crate::message::domain::AuthorRole;
use serde::{Deserialize, Serialize};

/// The role of a request message as chat-completion APIs name it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestRole {
    /// Instructions from the developer.
    System,
    /// Input from a human.
    User,
    /// Output from a model.
    Assistant,
}

impl From<AuthorRole> for RequestRole {
    fn from(role: AuthorRole) -> Self {
        match role {
            AuthorRole::Generative => Self::Assistant,
            AuthorRole::Human => Self::User,
            AuthorRole::Developer => Self::System,
        }
    }
}

/// Reference to an image by URL, which may be a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// The image location.
    pub url: String,
}

/// One content block of a request message.
///
/// Serialises with a `type` tag:
///
/// ```
/// use palaver::conversion::domain::ContentBlock;
///
/// let block = ContentBlock::image_url("https://x/cat.png");
/// let json = serde_json::to_string(&block).expect("serialisable");
/// assert_eq!(json, r#"{"type":"image_url","image_url":{"url":"https://x/cat.png"}}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Image content.
    ImageUrl {
        /// Where the image lives.
        image_url: ImageUrl,
    },
}

impl ContentBlock {
    /// Builds a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Builds an image block.
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }

    /// Returns the text of a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ImageUrl { .. } => None,
        }
    }
}

/// One message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    /// Who the message is attributed to.
    pub role: RequestRole,
    /// The message content, one block per part.
    pub content: Vec<ContentBlock>,
}

impl RequestMessage {
    /// Builds a request message.
    #[must_use]
    pub const fn new(role: RequestRole, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }
}
