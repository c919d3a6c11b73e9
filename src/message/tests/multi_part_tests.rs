//! Unit tests for composite messages.

use crate::message::domain::{Author, Metadata, MultiPartMessage, SinglePartMessage};
use crate::message::error::{CompositionError, MessageError};
use crate::schema::{AttributeValue, SchemaRegistry, ValueMap};
use crate::test_support::SteppingClock;
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn registry() -> Arc<SchemaRegistry> {
    SchemaRegistry::builtin()
}

#[fixture]
fn clock() -> SteppingClock {
    SteppingClock::forwards()
}

fn text_value(text: &str) -> ValueMap {
    ValueMap::from([("text".to_owned(), AttributeValue::from(text))])
}

fn url_value(url: &str) -> ValueMap {
    ValueMap::from([("url".to_owned(), AttributeValue::from(url))])
}

fn part(
    registry: &SchemaRegistry,
    clock: &SteppingClock,
    author: Author,
    message_type: &str,
    value: ValueMap,
) -> SinglePartMessage {
    SinglePartMessage::create(registry, author, message_type, Some(value), clock)
        .expect("valid part")
}

// ============================================================================
// Construction
// ============================================================================

#[rstest]
fn create_with_same_author_parts_succeeds(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let author = Author::generative("bot");
    let parts = vec![
        part(&registry, &clock, author.clone(), "text", text_value("Look:")),
        part(&registry, &clock, author.clone(), "image_url", url_value("https://x/cat.png")),
    ];

    let message = MultiPartMessage::create(author, parts, &clock).expect("valid composite");

    assert_eq!(message.message_type(), "multipart");
    assert_eq!(message.len(), 2);
    assert_eq!(message.part_types().collect::<Vec<_>>(), ["text", "image_url"]);
    assert_eq!(
        message.part(1).map(SinglePartMessage::message_type),
        Some("image_url")
    );
    assert!(message.part(2).is_none());
}

#[rstest]
fn create_with_no_parts_fails(clock: SteppingClock) {
    let result = MultiPartMessage::create(Author::human("ada"), Vec::new(), &clock);

    assert_eq!(
        result.expect_err("empty composite"),
        MessageError::InvalidComposition(CompositionError::EmptyParts)
    );
}

#[rstest]
#[case(Author::human("grace"))]
#[case(Author::generative("ada"))]
fn create_with_foreign_author_fails(
    registry: Arc<SchemaRegistry>,
    clock: SteppingClock,
    #[case] stranger: Author,
) {
    let owner = Author::human("ada");
    let parts = vec![
        part(&registry, &clock, owner.clone(), "text", text_value("mine")),
        part(&registry, &clock, stranger.clone(), "text", text_value("theirs")),
    ];

    let err = MultiPartMessage::create(owner.clone(), parts, &clock).expect_err("mixed authors");

    assert_eq!(
        err,
        MessageError::InvalidComposition(CompositionError::AuthorMismatch {
            expected: owner,
            found: stranger,
        })
    );
}

#[rstest]
fn with_metadata_sets_composite_metadata(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let message = MultiPartMessage::start(
        &registry,
        Author::human("ada"),
        "text",
        text_value("hi"),
        &clock,
    )
    .expect("valid chunk")
    .with_metadata(Metadata::new().with("channel", AttributeValue::from("web")));

    assert_eq!(
        message.metadata_attribute("channel").ok(),
        Some(&AttributeValue::from("web"))
    );
    assert_eq!(message.created_at(), message.updated_at());
}

// ============================================================================
// Parts
// ============================================================================

#[rstest]
fn append_part_rejects_foreign_author_atomically(
    registry: Arc<SchemaRegistry>,
    clock: SteppingClock,
) {
    let mut message =
        MultiPartMessage::start(&registry, Author::human("ada"), "text", text_value("a"), &clock)
            .expect("valid chunk");
    let snapshot = message.clone();
    let stray = part(&registry, &clock, Author::human("grace"), "text", text_value("b"));

    let result = message.append_part(stray, &clock);

    assert!(matches!(
        result,
        Err(MessageError::InvalidComposition(CompositionError::AuthorMismatch { .. }))
    ));
    assert_eq!(message, snapshot);
}

#[rstest]
fn extend_parts_appends_in_order(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let author = Author::human("ada");
    let mut message =
        MultiPartMessage::start(&registry, author.clone(), "text", text_value("a"), &clock)
            .expect("valid chunk");
    let before = message.updated_at();

    message
        .extend_parts(
            vec![
                part(&registry, &clock, author.clone(), "image_url", url_value("u")),
                part(&registry, &clock, author, "text", text_value("b")),
            ],
            &clock,
        )
        .expect("same author");

    assert_eq!(message.part_types().collect::<Vec<_>>(), ["text", "image_url", "text"]);
    assert!(message.updated_at() > before);
}

#[rstest]
fn set_part_replaces_in_place(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let author = Author::human("ada");
    let mut message =
        MultiPartMessage::start(&registry, author.clone(), "text", text_value("a"), &clock)
            .expect("valid chunk");
    message
        .append_part(part(&registry, &clock, author.clone(), "text", text_value("b")), &clock)
        .expect("same author");
    let before = message.updated_at();

    message
        .set_part(1, part(&registry, &clock, author, "image_url", url_value("u")), &clock)
        .expect("index in range");

    assert_eq!(message.part_types().collect::<Vec<_>>(), ["text", "image_url"]);
    assert!(message.updated_at() > before);
}

#[rstest]
#[case(1, 1)]
#[case(7, 1)]
fn set_part_rejects_out_of_range_index(
    registry: Arc<SchemaRegistry>,
    clock: SteppingClock,
    #[case] index: usize,
    #[case] len: usize,
) {
    let author = Author::human("ada");
    let mut message =
        MultiPartMessage::start(&registry, author.clone(), "text", text_value("a"), &clock)
            .expect("valid chunk");
    let snapshot = message.clone();

    let result = message.set_part(
        index,
        part(&registry, &clock, author, "text", text_value("b")),
        &clock,
    );

    assert_eq!(
        result,
        Err(MessageError::InvalidComposition(
            CompositionError::PartIndexOutOfRange { index, len }
        ))
    );
    assert_eq!(message, snapshot);
}

#[rstest]
fn set_part_rejects_foreign_author(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let mut message =
        MultiPartMessage::start(&registry, Author::human("ada"), "text", text_value("a"), &clock)
            .expect("valid chunk");
    let snapshot = message.clone();
    let stray = part(&registry, &clock, Author::human("grace"), "text", text_value("b"));

    let result = message.set_part(0, stray, &clock);

    assert!(matches!(
        result,
        Err(MessageError::InvalidComposition(CompositionError::AuthorMismatch { .. }))
    ));
    assert_eq!(message, snapshot);
}

#[rstest]
fn set_parts_replaces_the_whole_list(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let author = Author::generative("bot");
    let mut message =
        MultiPartMessage::start(&registry, author.clone(), "text", text_value("draft"), &clock)
            .expect("valid chunk");
    let created = message.created_at();

    message
        .set_parts(
            vec![
                part(&registry, &clock, author.clone(), "image_url", url_value("u")),
                part(&registry, &clock, author, "text", text_value("final")),
            ],
            &clock,
        )
        .expect("same author");

    assert_eq!(message.part_types().collect::<Vec<_>>(), ["image_url", "text"]);
    assert_eq!(message.created_at(), created);
    assert!(message.updated_at() > created);
}

#[rstest]
fn set_parts_rejects_empty_list(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let mut message =
        MultiPartMessage::start(&registry, Author::human("ada"), "text", text_value("a"), &clock)
            .expect("valid chunk");
    let snapshot = message.clone();

    let result = message.set_parts(Vec::new(), &clock);

    assert_eq!(
        result,
        Err(MessageError::InvalidComposition(CompositionError::EmptyParts))
    );
    assert_eq!(message, snapshot);
}

#[rstest]
fn set_parts_rejects_mixed_authors(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let owner = Author::human("ada");
    let mut message =
        MultiPartMessage::start(&registry, owner.clone(), "text", text_value("a"), &clock)
            .expect("valid chunk");
    let snapshot = message.clone();

    let result = message.set_parts(
        vec![
            part(&registry, &clock, owner, "text", text_value("b")),
            part(&registry, &clock, Author::human("grace"), "text", text_value("c")),
        ],
        &clock,
    );

    assert!(matches!(
        result,
        Err(MessageError::InvalidComposition(CompositionError::AuthorMismatch { .. }))
    ));
    assert_eq!(message, snapshot);
}

#[rstest]
fn set_part_under_frozen_clock_keeps_timestamps_equal(registry: Arc<SchemaRegistry>) {
    let clock = SteppingClock::frozen();
    let author = Author::human("ada");
    let mut message =
        MultiPartMessage::start(&registry, author.clone(), "text", text_value("a"), &clock)
            .expect("valid chunk");

    message
        .set_part(0, part(&registry, &clock, author, "text", text_value("b")), &clock)
        .expect("index in range");

    assert_eq!(message.updated_at(), message.created_at());
}

// ============================================================================
// Chunk dispatch
// ============================================================================

#[rstest]
fn append_chunk_extends_matching_trailing_part(
    registry: Arc<SchemaRegistry>,
    clock: SteppingClock,
) {
    let mut message = MultiPartMessage::start(
        &registry,
        Author::generative("bot"),
        "text",
        text_value("Hel"),
        &clock,
    )
    .expect("valid chunk");

    message
        .append_chunk(&registry, "text", text_value("lo"), &clock)
        .expect("text chunk");

    assert_eq!(message.len(), 1);
    assert_eq!(
        message.part(0).and_then(|first| first.attribute("text").ok()),
        Some(&AttributeValue::from("Hello"))
    );
}

#[rstest]
fn append_chunk_of_new_type_starts_new_part(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let mut message = MultiPartMessage::start(
        &registry,
        Author::generative("bot"),
        "text",
        text_value("a"),
        &clock,
    )
    .expect("valid chunk");

    message
        .append_chunk(&registry, "image_url", url_value("u"), &clock)
        .expect("image chunk");
    message
        .append_chunk(&registry, "text", text_value("b"), &clock)
        .expect("text chunk");

    assert_eq!(message.part_types().collect::<Vec<_>>(), ["text", "image_url", "text"]);
    assert!(message.parts().iter().all(|p| p.author() == message.author()));
}

#[rstest]
fn append_chunk_of_multipart_type_is_rejected(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let mut message =
        MultiPartMessage::start(&registry, Author::human("ada"), "text", text_value("a"), &clock)
            .expect("valid chunk");
    let snapshot = message.clone();

    let err = message
        .append_chunk(&registry, "multipart", ValueMap::new(), &clock)
        .expect_err("nested composite");

    assert_eq!(
        err,
        MessageError::InvalidComposition(CompositionError::NestedComposite(
            "multipart".to_owned()
        ))
    );
    assert_eq!(message, snapshot);
}

#[rstest]
fn append_chunk_by_attribute_of_multipart_type_is_rejected(
    registry: Arc<SchemaRegistry>,
    clock: SteppingClock,
) {
    let mut message =
        MultiPartMessage::start(&registry, Author::human("ada"), "text", text_value("a"), &clock)
            .expect("valid chunk");

    let result = message.append_chunk_by_attribute(
        &registry,
        "multipart",
        "text",
        &AttributeValue::from("b"),
        &clock,
    );

    assert!(matches!(
        result,
        Err(MessageError::InvalidComposition(CompositionError::NestedComposite(_)))
    ));
}

#[rstest]
fn append_chunk_by_attribute_seeds_empty_part(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let mut message =
        MultiPartMessage::start(&registry, Author::human("ada"), "text", text_value("see"), &clock)
            .expect("valid chunk");

    message
        .append_chunk_by_attribute(
            &registry,
            "file_url",
            "url",
            &AttributeValue::from("https://x/doc.pdf"),
            &clock,
        )
        .expect("url chunk");

    let seeded = message.part(1).expect("new part");
    assert_eq!(seeded.message_type(), "file_url");
    assert_eq!(seeded.attribute("url").ok(), Some(&AttributeValue::from("https://x/doc.pdf")));
    assert_eq!(seeded.attribute("mime_type").ok(), Some(&AttributeValue::from("")));
}

#[rstest]
fn failed_seeded_part_is_not_appended(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let mut message =
        MultiPartMessage::start(&registry, Author::human("ada"), "text", text_value("a"), &clock)
            .expect("valid chunk");
    let snapshot = message.clone();

    let result = message.append_chunk_by_attribute(
        &registry,
        "image_url",
        "url",
        &AttributeValue::Integer(1),
        &clock,
    );

    assert!(matches!(result, Err(MessageError::SchemaMismatch { .. })));
    assert_eq!(message, snapshot);
}

#[rstest]
fn append_chunk_of_unknown_type_fails(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let mut message =
        MultiPartMessage::start(&registry, Author::human("ada"), "text", text_value("a"), &clock)
            .expect("valid chunk");

    let err = message
        .append_chunk(&registry, "hologram", ValueMap::new(), &clock)
        .expect_err("unknown type");

    assert!(err.is_unknown_type());
    assert_eq!(message.len(), 1);
}

// ============================================================================
// Structured form
// ============================================================================

#[rstest]
fn structured_round_trip_preserves_parts(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let mut message = MultiPartMessage::start(
        &registry,
        Author::generative("bot"),
        "text",
        text_value("a"),
        &clock,
    )
    .expect("valid chunk");
    message
        .append_chunk(&registry, "image_url", url_value("u"), &clock)
        .expect("image chunk");
    message.set_metadata_attribute("model", AttributeValue::from("m1"), &clock);

    let restored = MultiPartMessage::from_structured(&message.to_structured(), &registry)
        .expect("round trip");

    assert_eq!(restored, message);
}

#[rstest]
fn from_structured_rejects_empty_parts(registry: Arc<SchemaRegistry>, clock: SteppingClock) {
    let message =
        MultiPartMessage::start(&registry, Author::human("ada"), "text", text_value("a"), &clock)
            .expect("valid chunk");
    let AttributeValue::Map(mut record) = message.to_structured() else {
        panic!("structured form is a map");
    };
    record.insert("parts".to_owned(), AttributeValue::List(Vec::new()));

    let result = MultiPartMessage::from_structured(&AttributeValue::Map(record), &registry);

    assert_eq!(
        result.expect_err("no parts"),
        MessageError::InvalidComposition(CompositionError::EmptyParts)
    );
}

#[rstest]
fn from_structured_rejects_single_part_record(
    registry: Arc<SchemaRegistry>,
    clock: SteppingClock,
) {
    let single = part(&registry, &clock, Author::human("ada"), "text", text_value("a"));

    let result = MultiPartMessage::from_structured(&single.to_structured(), &registry);

    assert!(matches!(result, Err(MessageError::MalformedStructure(_))));
}
