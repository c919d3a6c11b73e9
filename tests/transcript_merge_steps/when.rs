//! When steps for transcript merging scenarios.

use super::world::{TranscriptWorld, author};
use eyre::{WrapErr, eyre};
use palaver::schema::{AttributeValue, ValueMap};
use palaver::transcript::services::SharedTranscript;
use rstest_bdd_macros::when;

fn stream_chunk(
    world: &mut TranscriptWorld,
    name: &str,
    role: &str,
    message_type: &str,
    chunk: ValueMap,
) -> Result<(), eyre::Report> {
    let sender = author(name, role)?;
    let TranscriptWorld {
        transcript, clock, ..
    } = world;
    transcript
        .as_mut()
        .ok_or_else(|| eyre!("no transcript in scenario world"))?
        .append_message_chunk(sender, message_type, chunk, &*clock)
        .wrap_err_with(|| format!("append {message_type} chunk"))
}

#[when(r#""{name}" as "{role}" streams the text "{text}""#)]
fn streams_text(
    world: &mut TranscriptWorld,
    name: String,
    role: String,
    text: String,
) -> Result<(), eyre::Report> {
    let chunk = ValueMap::from([("text".to_owned(), AttributeValue::from(text))]);
    stream_chunk(world, &name, &role, "text", chunk)
}

#[when(r#""{name}" as "{role}" streams the image url "{url}""#)]
fn streams_image_url(
    world: &mut TranscriptWorld,
    name: String,
    role: String,
    url: String,
) -> Result<(), eyre::Report> {
    let chunk = ValueMap::from([("url".to_owned(), AttributeValue::from(url))]);
    stream_chunk(world, &name, &role, "image_url", chunk)
}

#[when(r#""{name}" as "{role}" streams a "{message_type}" chunk"#)]
fn streams_unregistered_chunk(
    world: &mut TranscriptWorld,
    name: String,
    role: String,
    message_type: String,
) -> Result<(), eyre::Report> {
    let sender = author(&name, &role)?;
    let TranscriptWorld {
        transcript, clock, ..
    } = world;
    let current = transcript
        .as_mut()
        .ok_or_else(|| eyre!("no transcript in scenario world"))?;
    let before = current.clone();
    let chunk = ValueMap::from([("text".to_owned(), AttributeValue::from("?"))]);
    let outcome = current.append_message_chunk(sender, &message_type, chunk, &*clock);
    world.before_rejection = Some(before);
    world.last_error = outcome.err();
    Ok(())
}

#[when(r#""{name}" as "{role}" streams the tokens "{tokens}" through a shared handle"#)]
fn streams_through_shared_handle(
    world: &mut TranscriptWorld,
    name: String,
    role: String,
    tokens: String,
) -> Result<(), eyre::Report> {
    let sender = author(&name, &role)?;
    let shared = SharedTranscript::new(
        world
            .transcript
            .take()
            .ok_or_else(|| eyre!("no transcript in scenario world"))?,
    );
    {
        let mut stream = shared.stream(sender, "text").wrap_err("open stream")?;
        for token in tokens.split(',') {
            stream
                .push_attribute("text", &AttributeValue::from(token), &world.clock)
                .wrap_err("push token")?;
        }
    }
    world.transcript = Some(shared.snapshot().wrap_err("take snapshot")?);
    Ok(())
}
