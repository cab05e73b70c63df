//! Parsed archive messages.

use super::address::EmailAddress;

/// Content type assumed for parts that do not declare one (RFC 2045 §5.2).
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// One archived email, reduced to what reply mining needs.
///
/// Built once while reading the archive and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Message {
    /// `Message-ID` in angle-bracket form (`<id@host>`). `None` if missing or blank.
    pub message_id: Option<String>,

    /// Author from the `From:` header, with encoded words resolved.
    pub from: EmailAddress,

    /// First identifier of the `In-Reply-To` header.
    pub in_reply_to: Option<String>,

    /// Body content, shaped as single-part or multipart.
    pub body: MessageBody,

    /// Sequential index within the MBOX (0, 1, 2, …).
    pub sequence: u64,
}

/// Body shape of a message.
#[derive(Debug, Clone)]
pub enum MessageBody {
    /// A message whose top-level content type is not `multipart/*`.
    Single(BodyPart),
    /// Every part of a multipart message in depth-first order, containers included.
    Multipart(Vec<BodyPart>),
}

/// A single MIME part.
#[derive(Debug, Clone, Default)]
pub struct BodyPart {
    /// Lower-case `type/subtype`.
    pub content_type: String,

    /// Content after transfer decoding.
    pub decoded: Vec<u8>,

    /// Undecoded textual payload, kept for messages the MIME parser could not make sense of.
    pub raw_text: Option<String>,
}

impl BodyPart {
    /// A part with decoded content and no raw fallback.
    pub fn new(content_type: impl Into<String>, decoded: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            decoded: decoded.into(),
            raw_text: None,
        }
    }

    pub fn is_plain_text(&self) -> bool {
        self.content_type == "text/plain"
    }

    pub fn is_html(&self) -> bool {
        self.content_type == "text/html"
    }
}

