//! Unit tests for file formats and payloads.

use crate::conversion::domain::{FileFormat, Payload};
use crate::conversion::error::ConversionError;
use rstest::rstest;

#[rstest]
#[case(".pdf", FileFormat::Pdf)]
#[case("pdf", FileFormat::Pdf)]
#[case("application/pdf", FileFormat::Pdf)]
#[case(".JSON", FileFormat::Json)]
#[case("application/json", FileFormat::Json)]
#[case(
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    FileFormat::Docx
)]
#[case(".docx", FileFormat::Docx)]
#[case(" text/plain ", FileFormat::Txt)]
#[case(".txt", FileFormat::Txt)]
#[case(".md", FileFormat::Markdown)]
#[case("text/markdown", FileFormat::Markdown)]
fn parses_extensions_and_mime_types(#[case] tag: &str, #[case] expected: FileFormat) {
    assert_eq!(FileFormat::parse(tag), Ok(expected));
    assert_eq!(tag.parse::<FileFormat>(), Ok(expected));
}

#[rstest]
#[case("image/png")]
#[case(".exe")]
#[case("")]
fn rejects_unknown_formats(#[case] tag: &str) {
    assert_eq!(
        FileFormat::parse(tag),
        Err(ConversionError::UnsupportedFormat(tag.to_owned()))
    );
}

#[rstest]
fn canonical_names_parse_back() {
    for format in [
        FileFormat::Pdf,
        FileFormat::Json,
        FileFormat::Docx,
        FileFormat::Txt,
        FileFormat::Markdown,
    ] {
        assert_eq!(FileFormat::parse(format.extension()), Ok(format));
        assert_eq!(FileFormat::parse(format.mime_type()), Ok(format));
    }
}

#[rstest]
fn only_text_formats_are_textual() {
    assert!(FileFormat::Markdown.is_textual());
    assert!(!FileFormat::Pdf.is_textual());
    assert!(!FileFormat::Docx.is_textual());
}

#[rstest]
fn base64_payload_decodes_to_bytes() {
    let payload = Payload::base64_from_utf8(b"aGVsbG8=\n").expect("utf-8 text");

    assert_eq!(payload, Payload::Base64("aGVsbG8=".to_owned()));
    assert_eq!(payload.decode(), Ok(b"hello".to_vec()));
}

#[rstest]
fn malformed_base64_is_an_invalid_payload() {
    let result = Payload::Base64("***".to_owned()).decode();

    assert!(matches!(result, Err(ConversionError::InvalidPayload(_))));
}

#[rstest]
fn non_utf8_base64_text_is_rejected() {
    let result = Payload::base64_from_utf8(&[0xff, 0xfe]);

    assert!(matches!(result, Err(ConversionError::InvalidPayload(_))));
}

#[rstest]
fn url_payloads_cannot_be_decoded_locally() {
    let payload = Payload::Url("https://x/a.txt".to_owned());

    assert!(payload.is_remote());
    assert!(payload.decode().is_err());
    assert_eq!(payload.to_url("text/plain"), "https://x/a.txt");
}

#[rstest]
fn inline_payloads_render_as_data_urls() {
    assert_eq!(
        Payload::Bytes(vec![0xff, 0xd8]).to_url("image/jpeg"),
        "data:image/jpeg;base64,/9g="
    );
    assert_eq!(
        Payload::Base64("/9g=".to_owned()).to_url("image/jpeg"),
        "data:image/jpeg;base64,/9g="
    );
}
