//! Raw message bytes → [`Message`].
//!
//! Threading headers and the author are read with the crate's own header
//! code; MIME structure and transfer decoding are delegated to `mail-parser`.

use mail_parser::{MessageParser, MessagePart, MimeHeaders, PartType};
use tracing::debug;

use crate::model::address::EmailAddress;
use crate::model::message::{BodyPart, Message, MessageBody, DEFAULT_CONTENT_TYPE};
use crate::parser::header::{
    decode_header, decode_header_bytes, extract_angle_bracket, get_header, unfold_headers,
};
use crate::parser::mbox::skip_from_line;

/// Parse one raw archive message. Never fails: missing pieces become `None`
/// or empty values and the message is simply unusable downstream.
pub fn parse_message(raw: &[u8], sequence: u64) -> Message {
    let bytes = skip_from_line(raw);
    let header_end = find_header_end(bytes).unwrap_or(bytes.len());
    let headers = unfold_headers(&decode_header_bytes(&bytes[..header_end]));

    let message_id = get_header(&headers, "message-id").and_then(extract_angle_bracket);
    let in_reply_to = get_header(&headers, "in-reply-to").and_then(extract_angle_bracket);
    let from = get_header(&headers, "from")
        .map(|v| {
            let decoded = decode_header(v);
            if decoded.is_raw() {
                debug!(sequence, from = v, "Author header kept undecoded");
            }
            EmailAddress::parse(&decoded.into_string())
        })
        .unwrap_or_default();

    let body = match MessageParser::default().parse(bytes) {
        Some(parsed) => body_from_parts(&parsed.parts),
        None => {
            debug!(sequence, "MIME parser gave up, keeping raw body text");
            let content_type = get_header(&headers, "content-type")
                .map(bare_content_type)
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
            MessageBody::Single(BodyPart {
                content_type,
                decoded: Vec::new(),
                raw_text: Some(raw_body_text(bytes, header_end)),
            })
        }
    };

    Message {
        message_id,
        from,
        in_reply_to,
        body,
        sequence,
    }
}

/// Map `mail-parser`'s part list onto the body shape.
///
/// Attached `message/rfc822` parts are descended into, so a forwarded
/// message's own text parts follow their container in depth-first order.
fn body_from_parts(parts: &[MessagePart<'_>]) -> MessageBody {
    match parts.first() {
        Some(root) if matches!(root.body, PartType::Multipart(_) | PartType::Message(_)) => {
            let mut flat = Vec::with_capacity(parts.len());
            flatten_parts(parts, &mut flat);
            MessageBody::Multipart(flat)
        }
        Some(root) => MessageBody::Single(to_body_part(root)),
        None => MessageBody::Single(BodyPart::new(DEFAULT_CONTENT_TYPE, Vec::new())),
    }
}

fn flatten_parts(parts: &[MessagePart<'_>], out: &mut Vec<BodyPart>) {
    for part in parts {
        out.push(to_body_part(part));
        if let PartType::Message(inner) = &part.body {
            flatten_parts(&inner.parts, out);
        }
    }
}

fn to_body_part(part: &MessagePart<'_>) -> BodyPart {
    let content_type = part
        .content_type()
        .map(|ct| match ct.subtype() {
            Some(sub) => format!("{}/{}", ct.ctype(), sub),
            None => ct.ctype().to_string(),
        })
        .map(|ct| ct.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    BodyPart::new(content_type, part.contents())
}

/// `"Text/HTML; charset=utf-8"` → `"text/html"`.
fn bare_content_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Find the byte offset where headers end (position of the first blank line).
fn find_header_end(data: &[u8]) -> Option<usize> {
    (0..data.len()).find(|&i| data[i..].starts_with(b"\n\n") || data[i..].starts_with(b"\r\n\r\n"))
}

/// Everything after the blank line that ends the headers.
fn raw_body_text(data: &[u8], header_end: usize) -> String {
    let rest = &data[header_end..];
    let body = rest
        .strip_prefix(b"\r\n\r\n")
        .or_else(|| rest.strip_prefix(b"\n\n"))
        .unwrap_or(rest);
    String::from_utf8_lossy(body).into_owned()
}
