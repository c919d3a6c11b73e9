//! Shared access to a transcript with a single writer at a time.
//!
//! Readers may run concurrently. A streamed response holds the write lock
//! through a [`StreamWriter`] until it is dropped, so chunks from one
//! response are applied in arrival order with no interleaved writes.

use crate::message::domain::Author;
use crate::message::error::MessageError;
use crate::schema::{AttributeValue, ValueMap};
use crate::transcript::{domain::Transcript, error::TranscriptAccessError};
use mockable::Clock;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tracing::debug;

/// A cloneable handle to a transcript guarded by a read-write lock.
///
/// # Examples
///
/// ```
/// use palaver::message::domain::Author;
/// use palaver::schema::AttributeValue;
/// use palaver::transcript::domain::Transcript;
/// use palaver::transcript::services::SharedTranscript;
/// use mockable::DefaultClock;
///
/// let clock = DefaultClock;
/// let shared = SharedTranscript::new(Transcript::new("live", &clock));
///
/// {
///     let mut stream = shared
///         .stream(Author::generative("bot"), "text")
///         .expect("lock available");
///     for token in ["Hel", "lo"] {
///         stream
///             .push_attribute("text", &AttributeValue::from(token), &clock)
///             .expect("text chunk");
///     }
/// }
///
/// let turns = shared.read(|transcript| transcript.len()).expect("lock available");
/// assert_eq!(turns, 1);
/// ```
#[derive(Debug, Clone)]
pub struct SharedTranscript {
    inner: Arc<RwLock<Transcript>>,
}

impl SharedTranscript {
    /// Wraps a transcript for shared access.
    #[must_use]
    pub fn new(transcript: Transcript) -> Self {
        Self {
            inner: Arc::new(RwLock::new(transcript)),
        }
    }

    /// Runs `f` with shared read access.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptAccessError::Poisoned`] if a writer panicked.
    pub fn read<R>(&self, f: impl FnOnce(&Transcript) -> R) -> Result<R, TranscriptAccessError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| TranscriptAccessError::Poisoned)?;
        Ok(f(&guard))
    }

    /// Runs a fallible mutation with exclusive access.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptAccessError::Poisoned`] if a writer panicked, or
    /// [`TranscriptAccessError::Message`] if `f` fails.
    pub fn write<R>(
        &self,
        f: impl FnOnce(&mut Transcript) -> Result<R, MessageError>,
    ) -> Result<R, TranscriptAccessError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| TranscriptAccessError::Poisoned)?;
        Ok(f(&mut guard)?)
    }

    /// Returns a copy of the current state.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptAccessError::Poisoned`] if a writer panicked.
    pub fn snapshot(&self) -> Result<Transcript, TranscriptAccessError> {
        self.read(Transcript::clone)
    }

    /// Opens a streamed response, holding the write lock until the returned
    /// writer is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptAccessError::Poisoned`] if a writer panicked.
    pub fn stream(
        &self,
        author: Author,
        message_type: impl Into<String>,
    ) -> Result<StreamWriter<'_>, TranscriptAccessError> {
        let guard = self
            .inner
            .write()
            .map_err(|_| TranscriptAccessError::Poisoned)?;
        let writer = StreamWriter {
            guard,
            author,
            message_type: message_type.into(),
            applied: 0,
        };
        debug!(author = %writer.author, message_type = %writer.message_type, "stream opened");
        Ok(writer)
    }
}

/// Exclusive writer for one streamed response.
///
/// Chunks are applied in call order. A failed chunk is reported and leaves
/// the transcript at its last applied state; dropping the writer releases
/// the lock without rolling anything back.
#[derive(Debug)]
pub struct StreamWriter<'a> {
    guard: RwLockWriteGuard<'a, Transcript>,
    author: Author,
    message_type: String,
    applied: usize,
}

impl StreamWriter<'_> {
    /// Applies a chunk carrying every attribute of the stream's type.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptAccessError::Message`] if the chunk is rejected.
    pub fn push_chunk(
        &mut self,
        chunk: ValueMap,
        clock: &impl Clock,
    ) -> Result<(), TranscriptAccessError> {
        self.guard
            .append_message_chunk(self.author.clone(), &self.message_type, chunk, clock)?;
        self.applied += 1;
        Ok(())
    }

    /// Applies a chunk for one attribute of the stream's type.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptAccessError::Message`] if the chunk is rejected.
    pub fn push_attribute(
        &mut self,
        key: &str,
        chunk: &AttributeValue,
        clock: &impl Clock,
    ) -> Result<(), TranscriptAccessError> {
        self.guard.append_message_chunk_by_attribute(
            self.author.clone(),
            &self.message_type,
            key,
            chunk,
            clock,
        )?;
        self.applied += 1;
        Ok(())
    }

    /// Returns the number of chunks applied so far.
    #[must_use]
    pub const fn applied(&self) -> usize {
        self.applied
    }

    /// Returns the transcript as seen by the writer.
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.guard
    }
}
