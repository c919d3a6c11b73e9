//! Projection of transcripts into chat-completion request messages.

use crate::conversion::domain::{ContentBlock, FileFormat, Payload, RequestMessage, RequestRole};
use crate::conversion::error::{ConversionError, ConversionResult};
use crate::conversion::ports::{AudioTranscriber, ContentExtractor};
use crate::message::domain::{Message, SinglePartMessage};
use crate::schema::AttributeValue;
use crate::transcript::domain::Transcript;
use std::sync::Arc;
use tracing::{debug, trace};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
const TRANSCRIPTION_PREFIX: &str = "Here is the audio transcription:\n";

/// Where a media part keeps its content, taken from the type suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Url,
    Base64,
    Bytes,
}

impl Source {
    fn of(message_type: &str, family: &str) -> Option<Self> {
        match message_type.strip_prefix(family)? {
            "_url" => Some(Self::Url),
            "_base64" => Some(Self::Base64),
            "_bytes" => Some(Self::Bytes),
            _ => None,
        }
    }
}

/// Projects transcripts into the message list of a chat-completion request.
///
/// Each turn becomes one request message whose role follows the author
/// (`genai` to assistant, `human` to user, `developer` to system) and whose
/// content holds one block per part. File parts are turned into text by the
/// [`ContentExtractor`], audio parts by the [`AudioTranscriber`]. Failures of
/// either are returned to the caller unchanged. The transcript is only read.
#[derive(Debug)]
pub struct RequestProjector<E, T> {
    extractor: Arc<E>,
    transcriber: Arc<T>,
}

impl<E, T> Clone for RequestProjector<E, T> {
    fn clone(&self) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
            transcriber: Arc::clone(&self.transcriber),
        }
    }
}

impl<E, T> RequestProjector<E, T>
where
    E: ContentExtractor,
    T: AudioTranscriber,
{
    /// Creates a projector over the given backends.
    #[must_use]
    pub const fn new(extractor: Arc<E>, transcriber: Arc<T>) -> Self {
        Self {
            extractor,
            transcriber,
        }
    }

    /// Projects every turn of `transcript`, preceded by a system message
    /// carrying the developer instructions when they are not empty.
    ///
    /// # Errors
    ///
    /// Returns the first `ConversionError` raised while projecting a part.
    pub async fn project(&self, transcript: &Transcript) -> ConversionResult<Vec<RequestMessage>> {
        let mut projected = Vec::with_capacity(transcript.len().saturating_add(1));
        let instructions = transcript.developer_instructions();
        if !instructions.trim().is_empty() {
            projected.push(RequestMessage::new(
                RequestRole::System,
                vec![ContentBlock::text(instructions)],
            ));
        }
        for message in transcript.messages() {
            projected.push(self.project_message(message).await?);
        }
        debug!(
            title = transcript.title(),
            messages = projected.len(),
            "projected transcript into request messages"
        );
        Ok(projected)
    }

    /// Projects a single turn.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError` if any part cannot be projected.
    pub async fn project_message(&self, message: &Message) -> ConversionResult<RequestMessage> {
        let mut content = Vec::with_capacity(message.parts().len());
        for part in message.parts() {
            content.push(self.project_part(part).await?);
        }
        Ok(RequestMessage::new(message.author_role().into(), content))
    }

    /// Projects one part into a content block.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::UnsupportedMessageType` for types with no
    /// projection, and propagates extractor and transcriber failures.
    pub async fn project_part(&self, part: &SinglePartMessage) -> ConversionResult<ContentBlock> {
        let message_type = part.message_type();
        trace!(message_type, "projecting part");

        if message_type == "text" {
            return Ok(ContentBlock::text(text_attribute(part, "text")?));
        }
        if let Some(source) = Source::of(message_type, "image") {
            return image_block(part, source);
        }
        if let Some(source) = Source::of(message_type, "file") {
            let format = file_format(part)?;
            let payload = payload(part, source)?;
            let text = self.extractor.extract(&payload, format).await?;
            return Ok(ContentBlock::text(text));
        }
        if let Some(source) = Source::of(message_type, "audio") {
            let payload = payload(part, source)?;
            let format = text_attribute(part, "mime_type")?;
            let transcription = self.transcriber.transcribe(&payload, format).await?;
            return Ok(ContentBlock::text(format!("{TRANSCRIPTION_PREFIX}{transcription}")));
        }
        Err(ConversionError::UnsupportedMessageType(message_type.to_owned()))
    }
}

fn image_block(part: &SinglePartMessage, source: Source) -> ConversionResult<ContentBlock> {
    let image = payload(part, source)?;
    let mime_type = part
        .attribute("mime_type")
        .ok()
        .and_then(AttributeValue::as_text)
        .filter(|mime| mime.contains('/'))
        .unwrap_or(DEFAULT_IMAGE_MIME);
    Ok(ContentBlock::image_url(image.to_url(mime_type)))
}

fn payload(part: &SinglePartMessage, source: Source) -> ConversionResult<Payload> {
    match source {
        Source::Url => Ok(Payload::Url(text_attribute(part, "url")?.to_owned())),
        Source::Base64 => Payload::base64_from_utf8(bytes_attribute(part, part.message_type())?),
        Source::Bytes => Ok(Payload::Bytes(
            bytes_attribute(part, part.message_type())?.to_vec(),
        )),
    }
}

/// Resolves the format from the MIME type, falling back to the file name's
/// extension.
fn file_format(part: &SinglePartMessage) -> ConversionResult<FileFormat> {
    FileFormat::parse(text_attribute(part, "mime_type")?).or_else(|err| {
        part.attribute("filename")
            .ok()
            .and_then(AttributeValue::as_text)
            .and_then(|name| name.rsplit_once('.'))
            .and_then(|(_, extension)| FileFormat::parse(extension).ok())
            .ok_or(err)
    })
}

fn text_attribute<'a>(part: &'a SinglePartMessage, key: &str) -> ConversionResult<&'a str> {
    part.attribute(key)?.as_text().ok_or_else(|| {
        ConversionError::InvalidPayload(format!(
            "'{key}' of a {} part is not text",
            part.message_type()
        ))
    })
}

fn bytes_attribute<'a>(part: &'a SinglePartMessage, key: &str) -> ConversionResult<&'a [u8]> {
    part.attribute(key)?.as_bytes().ok_or_else(|| {
        ConversionError::InvalidPayload(format!(
            "'{key}' of a {} part is not bytes",
            part.message_type()
        ))
    })
}
