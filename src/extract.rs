//! Pair selection: which (parent, reply) pairs become records.

use std::collections::HashSet;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::clean::clean_text;
use crate::error::{Result, SftError};
use crate::model::address::EmailAddress;
use crate::model::message::Message;
use crate::model::record::Record;
use crate::parser::body::extract_body_text;
use crate::thread::ThreadIndex;

/// Joins input and output before hashing, so `("ab", "c")` and `("a", "bc")` differ.
const HASH_SEPARATOR: &str = "\n---\n";

/// Selection policy for one run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Your address; only messages from it count as replies.
    pub owner: EmailAddress,
    /// Minimum cleaned reply length in characters (inclusive).
    pub min_chars: usize,
    /// Maximum cleaned reply length in characters (inclusive).
    pub max_chars: usize,
}

impl ExtractOptions {
    /// Build options; `owner` may be a bare address or `Name <address>`.
    pub fn new(owner: &str, min_chars: usize, max_chars: usize) -> Result<Self> {
        let owner = EmailAddress::parse(owner);
        if owner.is_empty() {
            return Err(SftError::InvalidOptions("owner address is empty".into()));
        }
        if min_chars > max_chars {
            return Err(SftError::InvalidOptions(format!(
                "min_chars ({min_chars}) is greater than max_chars ({max_chars})"
            )));
        }
        Ok(Self {
            owner,
            min_chars,
            max_chars,
        })
    }

    fn accepts_length(&self, chars: usize) -> bool {
        (self.min_chars..=self.max_chars).contains(&chars)
    }
}

/// Content hashes of the pairs accepted so far in this run.
#[derive(Debug, Default)]
pub struct SeenSet {
    hashes: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pair. Returns `false` if an identical pair was already seen.
    pub fn insert(&mut self, input: &str, output: &str) -> bool {
        self.hashes.insert(content_hash(input, output))
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Hex SHA-256 of `input + "\n---\n" + output`. Used only for deduplication.
pub fn content_hash(input: &str, output: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hasher.update(HASH_SEPARATOR.as_bytes());
    hasher.update(output.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Counters describing what happened to every message of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractStats {
    /// Messages in the archive.
    pub messages: usize,
    /// Identifiers in the thread index.
    pub indexed: usize,
    /// Messages written by the owner.
    pub owner_messages: usize,
    /// Owner messages whose parent is missing from the archive.
    pub unresolved_parent: usize,
    /// Pairs where either cleaned body came out empty.
    pub empty_body: usize,
    /// Replies shorter than `min_chars` or longer than `max_chars`.
    pub out_of_bounds: usize,
    /// Pairs identical to an earlier accepted pair.
    pub duplicates: usize,
    /// Records produced.
    pub accepted: usize,
}

/// Result of [`extract_records`].
#[derive(Debug, Default)]
pub struct Extraction {
    /// Records in archive order.
    pub records: Vec<Record>,
    pub stats: ExtractStats,
}

/// Why a candidate pair was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    EmptyBody,
    OutOfBounds,
    Duplicate,
}

/// Walk the archive in order and build a record for every reply you wrote
/// whose parent is present, non-empty, within length bounds, and not a
/// duplicate of an earlier pair.
pub fn extract_records(messages: &[Message], options: &ExtractOptions) -> Extraction {
    let index = ThreadIndex::build(messages);
    let mut seen = SeenSet::new();
    let mut extraction = Extraction {
        records: Vec::new(),
        stats: ExtractStats {
            messages: messages.len(),
            indexed: index.len(),
            ..ExtractStats::default()
        },
    };
    let stats = &mut extraction.stats;

    for reply in messages {
        if !reply.from.same_person(&options.owner) {
            continue;
        }
        stats.owner_messages += 1;

        let Some(parent) = index.parent_of(reply) else {
            stats.unresolved_parent += 1;
            continue;
        };

        match select_pair(parent, reply, options, &mut seen) {
            Ok(record) => {
                stats.accepted += 1;
                extraction.records.push(record);
            }
            Err(rejection) => {
                debug!(
                    sequence = reply.sequence,
                    reason = ?rejection,
                    "Skipping reply"
                );
                match rejection {
                    Rejection::EmptyBody => stats.empty_body += 1,
                    Rejection::OutOfBounds => stats.out_of_bounds += 1,
                    Rejection::Duplicate => stats.duplicates += 1,
                }
            }
        }
    }

    info!(
        messages = stats.messages,
        owner_messages = stats.owner_messages,
        accepted = stats.accepted,
        "Extraction finished"
    );
    extraction
}

fn select_pair(
    parent: &Message,
    reply: &Message,
    options: &ExtractOptions,
    seen: &mut SeenSet,
) -> std::result::Result<Record, Rejection> {
    let output = clean_text(&extract_body_text(reply));
    let input = clean_text(&extract_body_text(parent));

    if input.is_empty() || output.is_empty() {
        return Err(Rejection::EmptyBody);
    }
    if !options.accepts_length(output.chars().count()) {
        return Err(Rejection::OutOfBounds);
    }
    if !seen.insert(&input, &output) {
        return Err(Rejection::Duplicate);
    }
    Ok(Record::new(input, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::{BodyPart, MessageBody};

    fn msg(id: Option<&str>, from: &str, reply_to: Option<&str>, body: &str) -> Message {
        Message {
            message_id: id.map(String::from),
            from: EmailAddress::parse(from),
            in_reply_to: reply_to.map(String::from),
            body: MessageBody::Single(BodyPart::new("text/plain", body)),
            sequence: 0,
        }
    }

    fn options(min_chars: usize) -> ExtractOptions {
        ExtractOptions::new("owner@x.com", min_chars, 4000).unwrap()
    }

    #[test]
    fn test_signature_scenario() {
        let messages = vec![
            msg(Some("<1>"), "other@x.com", None, "Hi there, question?"),
            msg(
                Some("<2>"),
                "owner@x.com",
                Some("<1>"),
                "Thanks! Answer is 42.\n--\nSignature",
            ),
        ];
        let extraction = extract_records(&messages, &options(1));
        assert_eq!(
            extraction.records,
            vec![Record::new("Hi there, question?", "Thanks! Answer is 42.")]
        );
        assert_eq!(extraction.stats.accepted, 1);
    }

    #[test]
    fn test_short_reply_rejected_with_default_minimum() {
        let messages = vec![
            msg(Some("<1>"), "other@x.com", None, "Hi there, question?"),
            msg(Some("<2>"), "owner@x.com", Some("<1>"), "Thanks! Answer is 42."),
        ];
        let extraction = extract_records(&messages, &options(40));
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.stats.out_of_bounds, 1);
    }

    #[test]
    fn test_length_bounds_are_inclusive() {
        let reply = "x".repeat(10);
        let messages = vec![
            msg(Some("<1>"), "other@x.com", None, "question"),
            msg(Some("<2>"), "owner@x.com", Some("<1>"), &reply),
        ];
        let exact = ExtractOptions::new("owner@x.com", 10, 10).unwrap();
        assert_eq!(extract_records(&messages, &exact).records.len(), 1);
        let too_long = ExtractOptions::new("owner@x.com", 1, 9).unwrap();
        assert!(extract_records(&messages, &too_long).records.is_empty());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let reply = "é".repeat(5);
        let messages = vec![
            msg(Some("<1>"), "other@x.com", None, "question"),
            msg(Some("<2>"), "owner@x.com", Some("<1>"), &reply),
        ];
        let opts = ExtractOptions::new("owner@x.com", 5, 5).unwrap();
        assert_eq!(extract_records(&messages, &opts).records.len(), 1);
    }

    #[test]
    fn test_quote_only_reply_rejected() {
        let messages = vec![
            msg(Some("<1>"), "other@x.com", None, "Are you coming?"),
            msg(Some("<2>"), "owner@x.com", Some("<1>"), "> Are you coming?\n>\n"),
        ];
        let extraction = extract_records(&messages, &options(1));
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.stats.empty_body, 1);
    }

    #[test]
    fn test_duplicate_pair_emitted_once() {
        let reply = msg(
            Some("<2>"),
            "owner@x.com",
            Some("<1>"),
            "Sure, Thursday afternoon works for me.",
        );
        let mut copy = reply.clone();
        copy.message_id = Some("<2-copy>".into());
        let messages = vec![
            msg(Some("<1>"), "other@x.com", None, "Can we meet this week?"),
            reply,
            copy,
        ];
        let extraction = extract_records(&messages, &options(1));
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.stats.duplicates, 1);
    }

    #[test]
    fn test_other_authors_never_selected() {
        let messages = vec![
            msg(Some("<1>"), "owner@x.com", None, "Original from me"),
            msg(Some("<2>"), "Owner <owner@y.com>", Some("<1>"), "Reply by someone else"),
        ];
        let extraction = extract_records(&messages, &options(1));
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.stats.owner_messages, 1);
    }

    #[test]
    fn test_owner_match_ignores_case_and_display_name() {
        let messages = vec![
            msg(Some("<1>"), "other@x.com", None, "Ping"),
            msg(Some("<2>"), "\"Me\" <OWNER@X.COM>", Some("<1>"), "Pong"),
        ];
        let opts = ExtractOptions::new("My Name <owner@x.com>", 1, 100).unwrap();
        assert_eq!(extract_records(&messages, &opts).records.len(), 1);
    }

    #[test]
    fn test_parent_without_message_id_is_never_used() {
        let messages = vec![
            msg(None, "other@x.com", None, "No id here"),
            msg(Some("<2>"), "owner@x.com", None, "Standalone"),
            msg(Some("<3>"), "owner@x.com", Some(""), "Blank reply-to"),
        ];
        let extraction = extract_records(&messages, &options(1));
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.stats.unresolved_parent, 2);
    }

    #[test]
    fn test_records_keep_archive_order() {
        let messages = vec![
            msg(Some("<a>"), "other@x.com", None, "first question"),
            msg(Some("<b>"), "other@x.com", None, "second question"),
            msg(Some("<rb>"), "owner@x.com", Some("<b>"), "answer to second"),
            msg(Some("<ra>"), "owner@x.com", Some("<a>"), "answer to first"),
        ];
        let records = extract_records(&messages, &options(1)).records;
        let outputs: Vec<&str> = records.iter().map(|r| r.output.as_str()).collect();
        assert_eq!(outputs, ["answer to second", "answer to first"]);
    }

    #[test]
    fn test_invalid_options() {
        assert!(ExtractOptions::new("", 1, 2).is_err());
        assert!(ExtractOptions::new("owner@x.com", 10, 2).is_err());
    }

    #[test]
    fn test_seen_set_and_hash_separator() {
        let mut seen = SeenSet::new();
        assert!(seen.insert("ab", "c"));
        assert!(seen.insert("a", "bc"));
        assert!(!seen.insert("ab", "c"));
        assert_eq!(seen.len(), 2);
        assert_eq!(content_hash("x", "y").len(), 64);
    }
}
