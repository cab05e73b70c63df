//! Reply body normalization.
//!
//! [`clean_text`] turns a decoded email body into the text you actually
//! wrote: signatures, reply attributions, forwarded headers and quoted
//! lines are removed, then whitespace is collapsed.
//!
//! The three truncations run in a fixed order (signature, attribution line,
//! forwarded header), each cutting at its own first match. They do not search
//! for whichever marker appears earliest.

use std::sync::OnceLock;

use regex::Regex;

/// Clean a decoded body. The result never starts or ends with whitespace,
/// contains no quoted lines and at most one blank line between paragraphs.
///
/// Cleaning is idempotent: `clean_text(&clean_text(s)) == clean_text(s)`.
pub fn clean_text(text: &str) -> String {
    let text = normalize_newlines(text);
    let text = cut_at_first(&text, signature_regex());
    let text = cut_at_first(text, wrote_line_regex());
    let text = cut_at_first(text, forwarded_regex());
    let text = drop_quoted_lines(text);
    let text = horizontal_space_regex().replace_all(&text, " ");
    let text = blank_run_regex().replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// `\r\n` and lone `\r` become `\n`.
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Keep only the text before the first match of `re`.
fn cut_at_first<'a>(text: &'a str, re: &Regex) -> &'a str {
    re.find(text).map_or(text, |m| &text[..m.start()])
}

/// Remove lines that start (after indentation) with `>`.
fn drop_quoted_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('>'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A line holding only `--`.
fn signature_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?m)^\s*--\s*$").expect("valid signature regex"))
}

/// `On Mon, 1 Jan 2024, Bob <bob@x.com> wrote:`
fn wrote_line_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?mi)^[ \t]*on[ \t].*?wrote:\s*$").expect("valid attribution regex")
    })
}

/// Outlook-style headers of a forwarded or quoted original message.
fn forwarded_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?mi)^[ \t]*(?:from:\s|sent:\s|subject:\s)|^[ \t]*[-_]{5,}[ \t]*original[ \t]+message[ \t]*[-_]{5,}",
        )
        .expect("valid forwarded-header regex")
    })
}

fn horizontal_space_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[ \t]+").expect("valid whitespace regex"))
}

fn blank_run_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\n{3,}").expect("valid blank-line regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_removed() {
        assert_eq!(
            clean_text("Thanks! Answer is 42.\n--\nSignature"),
            "Thanks! Answer is 42."
        );
    }

    #[test]
    fn test_signature_separator_with_spaces() {
        assert_eq!(clean_text("Body\r\n  -- \r\nJohn\r\nCEO"), "Body");
    }

    #[test]
    fn test_double_dash_inside_text_is_kept() {
        assert_eq!(clean_text("a -- b"), "a -- b");
    }

    #[test]
    fn test_attribution_line_cuts_reply() {
        let body = "Sounds good, see you then.\n\nOn Mon, Jan 1, 2024 at 10:00 AM Bob <bob@x.com> wrote:\n> Lunch?\n";
        assert_eq!(clean_text(body), "Sounds good, see you then.");
    }

    #[test]
    fn test_attribution_line_is_case_insensitive() {
        assert_eq!(clean_text("Yes.\nON TUESDAY ALICE WROTE:\nold"), "Yes.");
    }

    #[test]
    fn test_forwarded_headers_cut() {
        let body = "FYI below.\n\n-----Original Message-----\nFrom: Bob\nSent: Monday\nSubject: hi\n\nold text";
        assert_eq!(clean_text(body), "FYI below.");
        let outlook = "Agreed.\n\nFrom: Bob <bob@x.com>\nSent: Monday\n\nold text";
        assert_eq!(clean_text(outlook), "Agreed.");
        let underscores = "Ok\n_____ Original Message _____\nstuff";
        assert_eq!(clean_text(underscores), "Ok");
        let wide = "Ok\n-----Original  Message-----\nstuff";
        assert_eq!(clean_text(wide), "Ok");
        let tabbed = "Ok\n-----Original\tMessage-----\nstuff";
        assert_eq!(clean_text(tabbed), "Ok");
    }

    #[test]
    fn test_from_inside_sentence_is_kept() {
        assert_eq!(
            clean_text("Greetings from: the office"),
            "Greetings from: the office"
        );
    }

    #[test]
    fn test_quoted_lines_dropped() {
        let body = "My answer\n> your question\n  >> older question\nmore answer";
        assert_eq!(clean_text(body), "My answer\nmore answer");
    }

    #[test]
    fn test_only_quotes_becomes_empty() {
        assert_eq!(clean_text("> a\n> b\n>\n"), "");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let body = "  Hello \t  world\n\n\n\n\nSecond   paragraph  \n";
        assert_eq!(clean_text(body), "Hello world\n\nSecond paragraph");
    }

    #[test]
    fn test_cuts_apply_in_fixed_order() {
        // The signature cut runs first and removes the attribution line
        // together with everything after it.
        let body = "Reply text\nOn Friday Bob wrote:\n> q\n--\nsig";
        assert_eq!(clean_text(body), "Reply text");
        // A forwarded header above the signature still cuts after the signature pass.
        let body = "Short\nSubject: fwd\nmore\n--\nsig";
        assert_eq!(clean_text(body), "Short");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let samples = [
            "Thanks! Answer is 42.\n--\nSignature",
            "  \tIndented   start\r\n\r\n\r\n\r\nnext\r\n> q\n",
            "Hi\n\n  On Mon Bob wrote:\n> hi",
            "a\n\n\n\nb\n \n \nc",
            "\t>not quoted after tab? it is quoted\nkept",
            "line  with   spaces\t\tand tabs  ",
            "Ok\n-----Original  Message-----\nstuff",
            "Ok\n-----Original\tMessage-----\nstuff",
            "Ok\n-----  Original Message\t-----\nstuff",
            "",
        ];
        for s in samples {
            let once = clean_text(s);
            assert_eq!(clean_text(&once), once, "not idempotent for {s:?}");
        }
    }
}
