//! Then steps for transcript merging scenarios.

use super::world::{TranscriptWorld, author};
use eyre::{WrapErr, eyre};
use palaver::message::domain::{Message, SinglePartMessage};
use palaver::schema::{AttributeValue, SchemaRegistry};
use palaver::transcript::domain::Transcript;
use rstest_bdd_macros::then;

fn turn(world: &TranscriptWorld, number: usize) -> Result<&Message, eyre::Report> {
    world
        .transcript()?
        .messages()
        .get(number.saturating_sub(1))
        .ok_or_else(|| eyre!("transcript has no turn {number}"))
}

#[then("the number of turns is {count:usize}")]
fn number_of_turns(world: &TranscriptWorld, count: usize) -> Result<(), eyre::Report> {
    let actual = world.transcript()?.len();
    if actual != count {
        return Err(eyre!("expected {count} turns, found {actual}"));
    }
    Ok(())
}

#[then(r#"turn {number:usize} reads "{text}""#)]
fn turn_reads(world: &TranscriptWorld, number: usize, text: String) -> Result<(), eyre::Report> {
    let message = turn(world, number)?
        .as_single_part()
        .ok_or_else(|| eyre!("turn {number} is composite"))?;
    let actual = message.attribute("text").wrap_err("read text")?;
    if actual != &AttributeValue::from(text.as_str()) {
        return Err(eyre!("turn {number} reads {actual:?}, expected {text:?}"));
    }
    Ok(())
}

#[then(r#"turn {number:usize} is authored by "{name}" as "{role}""#)]
fn turn_authored_by(
    world: &TranscriptWorld,
    number: usize,
    name: String,
    role: String,
) -> Result<(), eyre::Report> {
    let expected = author(&name, &role)?;
    let actual = turn(world, number)?.author();
    if actual != &expected {
        return Err(eyre!("turn {number} authored by {actual:?}"));
    }
    Ok(())
}

#[then(r#"turn {number:usize} has the parts "{types}""#)]
fn turn_has_parts(
    world: &TranscriptWorld,
    number: usize,
    types: String,
) -> Result<(), eyre::Report> {
    let message = turn(world, number)?;
    let actual: Vec<&str> = message
        .parts()
        .iter()
        .map(SinglePartMessage::message_type)
        .collect();
    let expected: Vec<&str> = types.split(',').collect();
    if !message.is_multi_part() || actual != expected {
        return Err(eyre!("turn {number} has parts {actual:?}, expected {expected:?}"));
    }
    Ok(())
}

#[then("the chunk is rejected as an unknown type")]
fn chunk_rejected_as_unknown(world: &TranscriptWorld) -> Result<(), eyre::Report> {
    let error = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre!("expected the chunk to be rejected"))?;
    if !error.is_unknown_type() {
        return Err(eyre!("expected an unknown type error, got {error}"));
    }
    Ok(())
}

#[then("the rejected chunk left the transcript unchanged")]
fn rejection_left_transcript_unchanged(world: &TranscriptWorld) -> Result<(), eyre::Report> {
    let before = world
        .before_rejection
        .as_ref()
        .ok_or_else(|| eyre!("no snapshot taken before the rejection"))?;
    if world.transcript()? != before {
        return Err(eyre!("transcript changed after a rejected chunk"));
    }
    Ok(())
}

#[then("the transcript round-trips through JSON unchanged")]
fn json_round_trip(world: &TranscriptWorld) -> Result<(), eyre::Report> {
    let transcript = world.transcript()?;
    let json = transcript.to_json().wrap_err("encode transcript")?;
    let restored =
        Transcript::from_json(&json, SchemaRegistry::builtin()).wrap_err("decode transcript")?;
    if &restored != transcript {
        return Err(eyre!("round trip changed the transcript"));
    }
    Ok(())
}
