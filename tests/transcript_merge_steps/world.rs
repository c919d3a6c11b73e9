//! Shared world state for transcript merging scenarios.

use eyre::eyre;
use mockable::DefaultClock;
use palaver::message::domain::{Author, AuthorRole};
use palaver::message::error::MessageError;
use palaver::transcript::domain::Transcript;
use rstest::fixture;

/// Scenario world for transcript merging behaviour tests.
pub struct TranscriptWorld {
    /// The transcript under test.
    pub transcript: Option<Transcript>,
    /// Snapshot taken before the last rejected chunk.
    pub before_rejection: Option<Transcript>,
    /// Error from the last rejected chunk.
    pub last_error: Option<MessageError>,
    /// Clock driving timestamps.
    pub clock: DefaultClock,
}

impl TranscriptWorld {
    /// Creates a world with no transcript yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            transcript: None,
            before_rejection: None,
            last_error: None,
            clock: DefaultClock,
        }
    }

    /// Returns the transcript under test.
    pub fn transcript(&self) -> Result<&Transcript, eyre::Report> {
        self.transcript
            .as_ref()
            .ok_or_else(|| eyre!("no transcript in scenario world"))
    }
}

impl Default for TranscriptWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TranscriptWorld {
    TranscriptWorld::default()
}

/// Builds an author from a name and a role's wire name.
pub fn author(name: &str, role: &str) -> Result<Author, eyre::Report> {
    let parsed = AuthorRole::try_from(role).map_err(|err| eyre!("{err}"))?;
    Ok(Author::new(name, parsed))
}
