//! Console summary and sample preview.

use std::fmt::Write as _;
use std::path::Path;

use unicode_width::UnicodeWidthChar;

use crate::model::record::Record;

/// Appended to fields cut short in the preview.
const ELLIPSIS: char = '…';

/// `✅ Wrote 12 samples (3.4 KiB) → out.jsonl`
pub fn render_summary(count: usize, bytes: u64, path: &Path) -> String {
    use humansize::{format_size, BINARY};
    format!(
        "✅ Wrote {count} samples ({}) → {}",
        format_size(bytes, BINARY),
        path.display()
    )
}

/// Render the first `count` records, each field capped to `width` columns.
pub fn render_preview(records: &[Record], count: usize, width: usize) -> String {
    let mut out = String::new();
    for (i, record) in records.iter().take(count).enumerate() {
        let _ = writeln!(out, "\n--- sample {} ---", i + 1);
        let _ = writeln!(out, "INSTRUCTION: {}", record.instruction);
        let _ = writeln!(out, "INPUT      : {}", truncate_display(&record.input, width));
        let _ = writeln!(out, "OUTPUT     : {}", truncate_display(&record.output, width));
    }
    out
}

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`.
pub fn truncate_display(text: &str, width: usize) -> String {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        used += ch.width().unwrap_or(0);
        if used > width {
            let mut cut = text[..idx].to_string();
            cut.push(ELLIPSIS);
            return cut;
        }
    }
    text.to_string()
}
