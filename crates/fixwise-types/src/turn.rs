//! Conversation turn and part types.
//!
//! A [`Turn`] is one message in a conversation, attributed to the user or
//! the model, containing ordered [`Part`]s. The durable (storage-safe)
//! representation keeps only text parts; inline media never reaches the
//! database.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Model,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::User => write!(f, "user"),
            Author::Model => write!(f, "model"),
        }
    }
}

impl FromStr for Author {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Author::User),
            "model" => Ok(Author::Model),
            other => Err(format!("invalid author: '{other}'")),
        }
    }
}

/// An atomic content unit within a turn: text or one inline media blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    InlineMedia { mime_type: String, data: Vec<u8> },
}

impl Part {
    /// The text content of this part, if it is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(text) => Some(text),
            Part::InlineMedia { .. } => None,
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Author,
    pub parts: Vec<Part>,
}

impl Turn {
    /// A turn containing a single text part.
    pub fn text(role: Author, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Whether the turn carries at least one non-empty text part.
    pub fn has_text(&self) -> bool {
        self.parts
            .iter()
            .any(|p| p.as_text().is_some_and(|t| !t.is_empty()))
    }
}

/// An inline media attachment supplied with a user prompt.
#[derive(Debug, Clone)]
pub struct MediaAttachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl MediaAttachment {
    /// Only image and video attachments are forwarded to the model.
    pub fn is_supported(&self) -> bool {
        self.mime_type.starts_with("image/") || self.mime_type.starts_with("video/")
    }
}

/// A text-only part in the durable history representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurablePart {
    pub text: String,
}

/// A turn in the durable history representation.
///
/// Serializes as `{"role": "user", "parts": [{"text": "..."}]}` -- the
/// exact shape stored in the session row and returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableTurn {
    pub role: Author,
    pub parts: Vec<DurablePart>,
}

impl DurableTurn {
    pub fn new(role: Author, texts: Vec<String>) -> Self {
        Self {
            role,
            parts: texts.into_iter().map(|text| DurablePart { text }).collect(),
        }
    }
}
