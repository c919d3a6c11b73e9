//! Individual invariant checks.
//!
//! Each check reports every violation it finds, in turn order, so callers
//! see the whole picture rather than the first failure.

use crate::message::domain::Message;
use crate::schema::SchemaRegistry;
use crate::transcript::error::InvariantViolation;

/// Runs every check against `messages`.
///
/// # Examples
///
/// ```
/// use palaver::message::domain::{Author, Message, SinglePartMessage};
/// use palaver::schema::SchemaRegistry;
/// use palaver::transcript::error::InvariantViolation;
/// use palaver::transcript::validation::audit;
/// use mockable::DefaultClock;
///
/// let registry = SchemaRegistry::builtin();
/// let ada = Author::human("ada");
/// let turn = |author: &Author| -> Message {
///     SinglePartMessage::create_empty(&registry, author.clone(), "text", &DefaultClock)
///         .expect("text is built in")
///         .into()
/// };
///
/// let violations = audit(&[turn(&ada), turn(&ada)], &registry);
/// assert!(matches!(
///     violations.as_slice(),
///     [InvariantViolation::RepeatedAuthor { turn: 1, .. }]
/// ));
/// ```
#[must_use]
pub fn audit(messages: &[Message], registry: &SchemaRegistry) -> Vec<InvariantViolation> {
    let mut violations = repeated_authors(messages);
    violations.extend(registry_conformance(messages, registry));
    violations.sort_by_key(InvariantViolation::turn);
    violations
}

/// Reports each turn whose author matches the turn before it.
#[must_use]
pub fn repeated_authors(messages: &[Message]) -> Vec<InvariantViolation> {
    messages
        .windows(2)
        .zip(1..)
        .filter_map(|(pair, turn)| match pair {
            [previous, current] if previous.author() == current.author() => {
                Some(InvariantViolation::RepeatedAuthor {
                    turn,
                    author: current.author().clone(),
                })
            }
            _ => None,
        })
        .collect()
}

/// Reports each part whose type or value disagrees with `registry`.
///
/// A part is checked against the registry's schema for its type, not the
/// schema it was built with.
#[must_use]
pub fn registry_conformance(
    messages: &[Message],
    registry: &SchemaRegistry,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    for (turn, message) in messages.iter().enumerate() {
        for (part, single) in message.parts().iter().enumerate() {
            let message_type = single.message_type();
            let Ok(schema) = registry.lookup(message_type) else {
                violations.push(InvariantViolation::UnregisteredType {
                    turn,
                    part,
                    message_type: message_type.to_owned(),
                });
                continue;
            };
            let mismatches = schema.check_value(single.value());
            if !mismatches.is_empty() {
                violations.push(InvariantViolation::NonConformingPart {
                    turn,
                    part,
                    message_type: message_type.to_owned(),
                    violations: mismatches,
                });
            }
        }
    }
    violations
}
