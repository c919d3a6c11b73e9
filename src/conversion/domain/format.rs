//! File formats understood by content extraction.

use crate::conversion::error::ConversionError;
use std::fmt;
use std::str::FromStr;

/// A document format whose text can be extracted.
///
/// Parsed from an extension (with or without the leading dot) or a MIME
/// type, case-insensitively.
///
/// # Examples
///
/// ```
/// use palaver::conversion::domain::FileFormat;
///
/// assert_eq!(FileFormat::parse(".PDF"), Ok(FileFormat::Pdf));
/// assert_eq!(FileFormat::parse("text/markdown"), Ok(FileFormat::Markdown));
/// assert!(FileFormat::parse("image/png").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Portable Document Format.
    Pdf,
    /// JSON documents.
    Json,
    /// Office Open XML word processing documents.
    Docx,
    /// Plain text.
    Txt,
    /// Markdown text.
    Markdown,
}

impl FileFormat {
    /// Parses a format tag.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::UnsupportedFormat`] for any tag that does
    /// not name one of the supported formats.
    pub fn parse(tag: &str) -> Result<Self, ConversionError> {
        let normalised = tag.trim().to_ascii_lowercase();
        let bare = normalised.strip_prefix('.').unwrap_or(normalised.as_str());
        match bare {
            "pdf" | "application/pdf" => Ok(Self::Pdf),
            "json" | "application/json" => Ok(Self::Json),
            "docx"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Ok(Self::Docx)
            }
            "txt" | "text" | "text/plain" => Ok(Self::Txt),
            "md" | "markdown" | "text/markdown" | "text/x-markdown" => Ok(Self::Markdown),
            _ => Err(ConversionError::UnsupportedFormat(tag.to_owned())),
        }
    }

    /// Returns the conventional file extension, including the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Json => ".json",
            Self::Docx => ".docx",
            Self::Txt => ".txt",
            Self::Markdown => ".md",
        }
    }

    /// Returns the canonical MIME type.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Json => "application/json",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Txt => "text/plain",
            Self::Markdown => "text/markdown",
        }
    }

    /// Whether the format is plain text that can be decoded without a
    /// document parser.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Json | Self::Txt | Self::Markdown)
    }
}

impl FromStr for FileFormat {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
