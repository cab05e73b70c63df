//! RFC 5322 header handling: folding, lookup, identifiers, and RFC 2047 encoded-words.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use tracing::debug;

/// Encoded words in the wild frequently drop their `=` padding.
const ENCODED_WORD_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Outcome of decoding a header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderText {
    /// All encoded words were resolved.
    Decoded(String),
    /// Something could not be decoded; the original value is returned untouched.
    Raw(String),
}

impl HeaderText {
    /// The usable text, whichever way decoding went.
    pub fn into_string(self) -> String {
        match self {
            HeaderText::Decoded(s) | HeaderText::Raw(s) => s,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, HeaderText::Raw(_))
    }
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// Example: `"=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="` → `Decoded("Hola mundo")`
///
/// Text that merely looks like the start of an encoded word (`=?` without
/// the rest of the syntax) is kept literally. A well-formed word that cannot
/// be decoded (unknown charset, bad base64, unknown encoding letter) makes
/// the whole value fall back to [`HeaderText::Raw`].
pub fn decode_header(input: &str) -> HeaderText {
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;
    let mut last_was_encoded = false;

    while let Some(start) = remaining.find("=?") {
        let before = &remaining[..start];
        // Whitespace between two adjacent encoded words is dropped (RFC 2047 §6.2)
        if !last_was_encoded || !before.trim().is_empty() {
            result.push_str(before);
        }

        let after_start = &remaining[start + 2..];
        match split_encoded_word(after_start) {
            Some(word) => match word.decode() {
                Some(text) => {
                    result.push_str(&text);
                    remaining = &after_start[word.consumed..];
                    last_was_encoded = true;
                }
                None => {
                    debug!(
                        header = input,
                        charset = word.charset,
                        "Undecodable encoded word, keeping raw header"
                    );
                    return HeaderText::Raw(input.to_string());
                }
            },
            None => {
                result.push_str("=?");
                remaining = after_start;
                last_was_encoded = false;
            }
        }
    }

    result.push_str(remaining);
    HeaderText::Decoded(result)
}

/// The syntactic pieces of one `charset?encoding?text?=` word.
struct EncodedWord<'a> {
    charset: &'a str,
    encoding: &'a str,
    text: &'a str,
    /// Bytes consumed from the string *after* the initial `=?`.
    consumed: usize,
}

fn split_encoded_word(s: &str) -> Option<EncodedWord<'_>> {
    let (charset, rest) = s.split_once('?')?;
    let (encoding, rest) = rest.split_once('?')?;
    let end = rest.find("?=")?;
    if charset.is_empty() || charset.contains(char::is_whitespace) {
        return None;
    }
    Some(EncodedWord {
        charset,
        encoding,
        text: &rest[..end],
        consumed: charset.len() + 1 + encoding.len() + 1 + end + 2,
    })
}

impl EncodedWord<'_> {
    fn decode(&self) -> Option<String> {
        let bytes = match self.encoding {
            "B" | "b" => ENCODED_WORD_B64.decode(self.text.trim()).ok()?,
            "Q" | "q" => decode_q_encoding(self.text),
            _ => return None,
        };
        decode_charset(self.charset, &bytes)
    }
}

/// Decode Q-encoding (RFC 2047): underscores → spaces, `=XX` → byte.
fn decode_q_encoding(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => result.push(b' '),
            b'=' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(byte) => {
                        result.push(byte);
                        i += 3;
                        continue;
                    }
                    None => result.push(b'='),
                }
            }
            b => result.push(b),
        }
        i += 1;
    }
    result
}

/// Decode bytes using a named charset. `None` if the charset is unknown.
///
/// RFC 2231 language suffixes (`utf-8*en`) are ignored.
fn decode_charset(charset: &str, bytes: &[u8]) -> Option<String> {
    let label = charset.split('*').next().unwrap_or(charset);
    if label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8") {
        return Some(String::from_utf8_lossy(bytes).into_owned());
    }
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes())?;
    let (decoded, _, _) = encoding.decode(bytes);
    Some(decoded.into_owned())
}

/// Decode raw header bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
pub fn decode_header_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Unfold headers: join continuation lines (starting with space or tab) with the previous header.
///
/// Returns a list of `(lowercase_name, raw_value)` pairs in header order.
pub fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some((name, value)) = line.split_once(':') {
            result.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
        // The mbox "From " separator and other colon-less lines are skipped
    }

    result
}

/// Get the first value for a header name. `name` must be lower-case.
pub fn get_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Extract the first `<…>` token (for Message-ID, In-Reply-To).
///
/// Values without brackets are returned trimmed. Blank values yield `None`.
pub fn extract_angle_bracket(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if let Some(start) = trimmed.find('<') {
        if let Some(end) = trimmed[start..].find('>') {
            return Some(trimmed[start..start + end + 1].to_string());
        }
    }
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_encoded_word() {
        let input = "=?UTF-8?B?SG9sYSBtdW5kbw==?=";
        assert_eq!(
            decode_header(input),
            HeaderText::Decoded("Hola mundo".into())
        );
    }

    #[test]
    fn test_decode_base64_without_padding() {
        assert_eq!(decode_header("=?UTF-8?B?SG9sYQ?=").into_string(), "Hola");
    }

    #[test]
    fn test_decode_q_encoded_word() {
        assert_eq!(decode_header("=?ISO-8859-1?Q?caf=E9?=").into_string(), "café");
    }

    #[test]
    fn test_decode_multiple_encoded_words() {
        let input = "=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?=";
        assert_eq!(decode_header(input).into_string(), "Hola mundo");
    }

    #[test]
    fn test_decode_mixed_plain_and_encoded() {
        let input = "Re: =?UTF-8?B?SG9sYQ==?= there";
        assert_eq!(decode_header(input).into_string(), "Re: Hola there");
    }

    #[test]
    fn test_decode_display_name_in_from() {
        let input = "=?UTF-8?B?Sm9zw6kgR2FyY8OtYQ==?= <jose@example.com>";
        assert_eq!(
            decode_header(input).into_string(),
            "José García <jose@example.com>"
        );
    }

    #[test]
    fn test_decode_windows1252_encoded_word() {
        assert_eq!(decode_header("=?Windows-1252?Q?M=FCller?=").into_string(), "Müller");
    }

    #[test]
    fn test_unknown_charset_falls_back_to_raw() {
        let input = "=?X-NOT-A-CHARSET?Q?abc?= <a@b.com>";
        let decoded = decode_header(input);
        assert!(decoded.is_raw());
        assert_eq!(decoded.into_string(), input);
    }

    #[test]
    fn test_invalid_base64_falls_back_to_raw() {
        let input = "=?UTF-8?B?!!!!?=";
        assert_eq!(decode_header(input), HeaderText::Raw(input.into()));
    }

    #[test]
    fn test_unknown_encoding_letter_falls_back_to_raw() {
        assert!(decode_header("=?UTF-8?X?abc?=").is_raw());
    }

    #[test]
    fn test_incomplete_encoded_word_is_literal() {
        assert_eq!(
            decode_header("Price =? unknown").into_string(),
            "Price =? unknown"
        );
    }

    #[test]
    fn test_plain_passthrough() {
        assert_eq!(
            decode_header("Normal subject"),
            HeaderText::Decoded("Normal subject".into())
        );
    }

    #[test]
    fn test_decode_header_bytes_latin1_fallback() {
        assert_eq!(decode_header_bytes(b"From: Jos\xe9\n"), "From: José\n");
    }

    #[test]
    fn test_unfold_headers() {
        let text = "Subject: This is a long\n\tsubject line\nFrom: user@example.com\n";
        let headers = unfold_headers(text);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].0, "subject");
        assert_eq!(headers[0].1, "This is a long subject line");
        assert_eq!(get_header(&headers, "from"), Some("user@example.com"));
        assert_eq!(get_header(&headers, "to"), None);
    }

    #[test]
    fn test_extract_angle_brackets() {
        assert_eq!(
            extract_angle_bracket(" <msg001@example.com> (comment)"),
            Some("<msg001@example.com>".to_string())
        );
        assert_eq!(extract_angle_bracket("bare-id"), Some("bare-id".to_string()));
        assert_eq!(extract_angle_bracket("   "), None);
    }
}
