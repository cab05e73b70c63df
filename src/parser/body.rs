//! Body selection: the most useful human-readable content of a message.
//!
//! Plain text is preferred; HTML is used only when no plain part exists,
//! and then only with its tags removed.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::message::{BodyPart, Message, MessageBody};

/// Return the best body of `message` as raw bytes.
///
/// An empty result means "no usable body".
pub fn extract_body(message: &Message) -> Vec<u8> {
    match &message.body {
        MessageBody::Single(part) => extract_single(part),
        MessageBody::Multipart(parts) => extract_multipart(parts),
    }
}

/// Same as [`extract_body`], decoded as UTF-8 with invalid sequences dropped.
pub fn extract_body_text(message: &Message) -> String {
    lossy_utf8(&extract_body(message))
}

fn extract_multipart(parts: &[BodyPart]) -> Vec<u8> {
    if let Some(plain) = parts.iter().find(|p| p.is_plain_text()) {
        return plain.decoded.clone();
    }
    if let Some(html) = parts.iter().find(|p| p.is_html()) {
        return strip_tags(&lossy_utf8(&html.decoded)).into_bytes();
    }
    Vec::new()
}

fn extract_single(part: &BodyPart) -> Vec<u8> {
    let payload = match (&part.raw_text, part.decoded.is_empty()) {
        (Some(raw), true) => raw.as_bytes().to_vec(),
        _ => part.decoded.clone(),
    };
    if part.is_html() {
        strip_tags(&lossy_utf8(&payload)).into_bytes()
    } else {
        payload
    }
}

/// Remove every `<...>` markup tag. Entities are left alone.
pub fn strip_tags(html: &str) -> String {
    html_tag_regex().replace_all(html, "").into_owned()
}

fn html_tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid HTML tag regex"))
}

/// UTF-8 decode that silently drops invalid byte sequences.
pub fn lossy_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
