//! Message authorship.

use super::AuthorRole;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a message: a display name paired with a role.
///
/// Two fragments belong to the same turn only when both the name and the
/// role match.
///
/// # Examples
///
/// ```
/// use palaver::message::domain::{Author, AuthorRole};
///
/// let author = Author::human("ada");
/// assert_eq!(author.name(), "ada");
/// assert_eq!(author.role(), AuthorRole::Human);
/// assert_ne!(author, Author::generative("ada"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    name: String,
    role: AuthorRole,
}

impl Author {
    /// Creates an author.
    #[must_use]
    pub fn new(name: impl Into<String>, role: AuthorRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    /// Creates a human author.
    #[must_use]
    pub fn human(name: impl Into<String>) -> Self {
        Self::new(name, AuthorRole::Human)
    }

    /// Creates a generative-model author.
    #[must_use]
    pub fn generative(name: impl Into<String>) -> Self {
        Self::new(name, AuthorRole::Generative)
    }

    /// Creates a developer author.
    #[must_use]
    pub fn developer(name: impl Into<String>) -> Self {
        Self::new(name, AuthorRole::Developer)
    }

    /// Returns the author's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the author's role.
    #[must_use]
    pub const fn role(&self) -> AuthorRole {
        self.role
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.role)
    }
}
