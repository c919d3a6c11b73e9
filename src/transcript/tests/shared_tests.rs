//! Unit tests for shared transcript access and streaming writers.

use super::text_chunk;
use crate::message::domain::{Author, Message};
use crate::message::error::MessageError;
use crate::schema::AttributeValue;
use crate::test_support::SteppingClock;
use crate::transcript::domain::Transcript;
use crate::transcript::error::TranscriptAccessError;
use crate::transcript::services::SharedTranscript;
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::thread;

#[fixture]
fn clock() -> Arc<SteppingClock> {
    Arc::new(SteppingClock::forwards())
}

#[fixture]
fn shared(clock: Arc<SteppingClock>) -> (SharedTranscript, Arc<SteppingClock>) {
    (SharedTranscript::new(Transcript::new("shared", &*clock)), clock)
}

#[rstest]
fn stream_applies_chunks_in_order(shared: (SharedTranscript, Arc<SteppingClock>)) {
    let (shared, clock) = shared;

    {
        let mut stream = shared
            .stream(Author::generative("bot"), "text")
            .expect("lock available");
        for token in ["The ", "quick ", "fox"] {
            stream
                .push_attribute("text", &AttributeValue::from(token), &*clock)
                .expect("text chunk");
        }
        assert_eq!(stream.applied(), 3);
        assert_eq!(stream.transcript().len(), 1);
    }

    let text = shared
        .read(|transcript| {
            transcript
                .focus()
                .and_then(Message::as_single_part)
                .and_then(|focus| focus.attribute("text").ok())
                .cloned()
        })
        .expect("lock available");
    assert_eq!(text, Some(AttributeValue::from("The quick fox")));
}

#[rstest]
fn rejected_chunk_keeps_last_applied_state(shared: (SharedTranscript, Arc<SteppingClock>)) {
    let (shared, clock) = shared;
    let mut stream = shared
        .stream(Author::generative("bot"), "text")
        .expect("lock available");
    stream
        .push_chunk(text_chunk("partial"), &*clock)
        .expect("text chunk");

    let err = stream
        .push_attribute("text", &AttributeValue::Integer(9), &*clock)
        .expect_err("wrong kind");
    drop(stream);

    assert!(matches!(
        err,
        TranscriptAccessError::Message(MessageError::SchemaMismatch { .. })
    ));
    let snapshot = shared.snapshot().expect("lock available");
    assert_eq!(snapshot.len(), 1);
}

#[rstest]
fn write_propagates_transcript_errors(shared: (SharedTranscript, Arc<SteppingClock>)) {
    let (shared, clock) = shared;

    let result = shared.write(|transcript| {
        transcript.append_message_chunk(Author::human("ada"), "hologram", text_chunk("x"), &*clock)
    });

    assert!(matches!(
        result,
        Err(TranscriptAccessError::Message(ref err)) if err.is_unknown_type()
    ));
}

#[rstest]
fn concurrent_streams_never_interleave(shared: (SharedTranscript, Arc<SteppingClock>)) {
    let (shared, clock) = shared;
    let writers: Vec<_> = ["alpha", "beta", "gamma", "delta"]
        .into_iter()
        .map(|name| {
            let handle = shared.clone();
            let writer_clock = Arc::clone(&clock);
            thread::spawn(move || {
                let mut stream = handle
                    .stream(Author::generative(name), "text")
                    .expect("lock available");
                for _ in 0..50 {
                    stream
                        .push_attribute("text", &AttributeValue::from("x"), &*writer_clock)
                        .expect("text chunk");
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().expect("writer thread");
    }

    let lengths = shared
        .read(|transcript| {
            transcript
                .messages()
                .iter()
                .filter_map(Message::as_single_part)
                .filter_map(|message| message.attribute("text").ok())
                .filter_map(AttributeValue::as_text)
                .map(str::len)
                .collect::<Vec<_>>()
        })
        .expect("lock available");
    assert_eq!(lengths, [50, 50, 50, 50]);
}

#[rstest]
fn poisoned_lock_is_reported(shared: (SharedTranscript, Arc<SteppingClock>)) {
    let (shared, _) = shared;
    let handle = shared.clone();

    let outcome = thread::spawn(move || {
        handle.write(|_| -> Result<(), MessageError> { panic!("writer crashed") })
    })
    .join();

    assert!(outcome.is_err());
    assert_eq!(
        shared.read(Transcript::len),
        Err(TranscriptAccessError::Poisoned)
    );
}
