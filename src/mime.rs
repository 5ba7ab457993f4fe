//! MIME envelope decoding: raw email bytes to attachment parts.
//!
//! Decoding is an injected capability so the pipeline can be tested with
//! synthetic envelopes. The production decoder delegates to `mail-parser`;
//! multipart traversal, charset handling, and content-transfer-decoding are
//! its concern, not ours.

use bytes::Bytes;
use mail_parser::{MessageParser, MimeHeaders};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Message could not be parsed as MIME")]
    Unparseable,
}

/// One file-like component of an email
#[derive(Debug, Clone)]
pub struct AttachmentPart {
    pub filename: String,
    /// Already content-transfer-decoded
    pub content: Bytes,
}

/// Decoded representation of an email, reduced to its attachment parts
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    pub attachments: Vec<AttachmentPart>,
}

/// Envelope decoding seam
pub trait EnvelopeDecoder: Send + Sync {
    /// Decode raw message bytes. Non-retryable: a failure skips the record.
    fn decode(&self, raw: &[u8]) -> Result<Envelope, DecodeError>;
}

/// Production decoder built on `mail-parser`
#[derive(Debug, Clone, Default)]
pub struct MailDecoder;

impl MailDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl EnvelopeDecoder for MailDecoder {
    fn decode(&self, raw: &[u8]) -> Result<Envelope, DecodeError> {
        let parser = MessageParser::default();
        let message = parser.parse(raw).ok_or(DecodeError::Unparseable)?;

        let mut attachments = Vec::new();
        for part in message.attachments() {
            // Parts without a filename can never match the extension
            // allow-list, so they are dropped here
            let Some(filename) = part.attachment_name() else {
                continue;
            };

            attachments.push(AttachmentPart {
                filename: filename.to_string(),
                content: Bytes::copy_from_slice(part.contents()),
            });
        }

        Ok(Envelope { attachments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // "Hello PDF" / "Hello EPUB" in base64
    const MULTIPART_FIXTURE: &str = "From: sender@example.com\r\n\
To: ingest@example.com\r\n\
Subject: Documents\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"boundary42\"\r\n\
\r\n\
--boundary42\r\n\
Content-Type: text/plain\r\n\
\r\n\
See attached.\r\n\
--boundary42\r\n\
Content-Type: application/pdf; name=\"contract.pdf\"\r\n\
Content-Disposition: attachment; filename=\"contract.pdf\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
SGVsbG8gUERG\r\n\
--boundary42\r\n\
Content-Type: application/epub+zip; name=\"manual.EPUB\"\r\n\
Content-Disposition: attachment; filename=\"manual.EPUB\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
SGVsbG8gRVBVQg==\r\n\
--boundary42--\r\n";

    #[test]
    fn test_decode_multipart_attachments() {
        let envelope = MailDecoder::new()
            .decode(MULTIPART_FIXTURE.as_bytes())
            .unwrap();

        assert_eq!(envelope.attachments.len(), 2);
        assert_eq!(envelope.attachments[0].filename, "contract.pdf");
        assert_eq!(&envelope.attachments[0].content[..], b"Hello PDF");
        assert_eq!(envelope.attachments[1].filename, "manual.EPUB");
        assert_eq!(&envelope.attachments[1].content[..], b"Hello EPUB");
    }

    #[test]
    fn test_decode_plain_message_has_no_attachments() {
        let raw = b"From: a@example.com\r\nSubject: Hi\r\n\r\nJust text.\r\n";
        let envelope = MailDecoder::new().decode(raw).unwrap();
        assert!(envelope.attachments.is_empty());
    }
}
