//! Author roles distinguishing who produced a message.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kind of participant that authored a message.
///
/// # Examples
///
/// ```
/// use palaver::message::domain::AuthorRole;
///
/// assert_eq!(AuthorRole::Generative.as_str(), "genai");
/// assert_eq!(AuthorRole::try_from("human"), Ok(AuthorRole::Human));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorRole {
    /// A generative model.
    #[serde(rename = "genai")]
    Generative,
    /// A human participant.
    #[serde(rename = "human")]
    Human,
    /// The developer configuring the conversation.
    #[serde(rename = "developer")]
    Developer,
}

impl AuthorRole {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generative => "genai",
            Self::Human => "human",
            Self::Developer => "developer",
        }
    }
}

impl fmt::Display for AuthorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid author role: {0}")]
pub struct ParseAuthorRoleError(pub String);

impl TryFrom<&str> for AuthorRole {
    type Error = ParseAuthorRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "genai" => Ok(Self::Generative),
            "human" => Ok(Self::Human),
            "developer" => Ok(Self::Developer),
            other => Err(ParseAuthorRoleError(other.to_owned())),
        }
    }
}
