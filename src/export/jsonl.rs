//! Write records as JSON Lines.
//!
//! One compact object per line, keys in `instruction, input, output` order.
//! Non-ASCII text is written as-is rather than `\u` escaped.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{Result, SftError};
use crate::model::record::Record;

/// Write `records` to a new file at `path`, replacing any existing file.
///
/// Returns the number of bytes written.
pub fn write_jsonl(records: &[Record], path: &Path) -> Result<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SftError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| SftError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let bytes = write_jsonl_to(records, &mut writer).map_err(|e| with_path(e, path))?;
    writer.flush().map_err(|e| SftError::io(path, e))?;

    info!(path = %path.display(), records = records.len(), bytes, "Wrote JSONL");
    Ok(bytes)
}

/// Write `records` to any writer. Returns the number of bytes written.
pub fn write_jsonl_to<W: Write>(records: &[Record], writer: &mut W) -> Result<u64> {
    let mut bytes: u64 = 0;
    for record in records {
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        bytes += line.len() as u64 + 1;
    }
    Ok(bytes)
}

/// Attach the destination path to I/O errors raised without one.
fn with_path(err: SftError, path: &Path) -> SftError {
    match err {
        SftError::Io { source, .. } => SftError::io(path, source),
        other => other,
    }
}
