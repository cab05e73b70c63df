//! MBOX splitter.
//!
//! Reads an MBOX file line-by-line through a 1 MB buffer and hands every
//! message to a callback. Tolerant of malformed input.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Result, SftError};

/// Size of the internal read buffer.
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Default maximum message size in bytes (256 MB).
const MAX_MESSAGE_SIZE: usize = 256 * 1024 * 1024;

/// Progress is reported every 4 MB.
const PROGRESS_INTERVAL: u64 = 4 * 1024 * 1024;

/// UTF-8 byte-order mark.
const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Sequential MBOX parser.
///
/// The parser is tolerant of:
///
/// - Mixed `\n` and `\r\n` line endings
/// - `From ` lines not preceded by a blank line (logs a warning)
/// - Truncated messages at EOF
/// - NUL bytes and other binary content in the body
/// - UTF-8 BOM at the start of the file
///
/// Blank lines before the first separator are ignored. Any other content
/// there means the file is not an MBOX ([`SftError::InvalidMbox`]).
pub struct MboxParser {
    path: PathBuf,
    file_size: u64,
    max_message_size: usize,
}

impl MboxParser {
    /// Create a parser for the given MBOX file.
    ///
    /// Verifies that the file exists and is readable.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SftError::FileNotFound(path.clone())
            } else {
                SftError::io(&path, e)
            }
        })?;
        if metadata.is_dir() {
            return Err(SftError::InvalidMbox(path));
        }
        Ok(Self {
            path,
            file_size: metadata.len(),
            max_message_size: MAX_MESSAGE_SIZE,
        })
    }

    /// Total size of the underlying file in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Parse the full MBOX, calling `message_callback` with the raw bytes
    /// of each message (separator line included).
    ///
    /// `progress_callback` receives `(bytes_read, file_size)`.
    /// Returns the number of messages found.
    pub fn parse(
        &self,
        message_callback: &mut dyn FnMut(&[u8]),
        progress_callback: Option<&dyn Fn(u64, u64)>,
    ) -> Result<u64> {
        if self.file_size == 0 {
            return Ok(0);
        }

        let file = File::open(&self.path).map_err(|e| SftError::io(&self.path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut count: u64 = 0;
        let mut message_buf: Vec<u8> = Vec::with_capacity(64 * 1024);
        let mut line_buf: Vec<u8> = Vec::with_capacity(4096);
        let mut bytes_read: u64 = 0;
        let mut last_progress: u64 = 0;
        let mut prev_line_was_empty = true;
        let mut truncated = false;
        let mut seen_separator = false;

        loop {
            line_buf.clear();
            let line_len = reader
                .read_until(b'\n', &mut line_buf)
                .map_err(|e| SftError::io(&self.path, e))?;
            if line_len == 0 {
                break;
            }

            let is_separator = is_mbox_separator(&line_buf);
            if !seen_separator && !is_separator {
                if !is_blank_line(&line_buf) {
                    return Err(SftError::InvalidMbox(self.path.clone()));
                }
                bytes_read += line_len as u64;
                continue;
            }

            if is_separator {
                seen_separator = true;
                if !prev_line_was_empty {
                    warn!(
                        offset = bytes_read,
                        "Found 'From ' separator without preceding blank line"
                    );
                }
                if !message_buf.is_empty() {
                    message_callback(&message_buf);
                    count += 1;
                }
                message_buf.clear();
                truncated = false;
                message_buf.extend_from_slice(&line_buf);
            } else if message_buf.len() + line_buf.len() <= self.max_message_size {
                message_buf.extend_from_slice(&line_buf);
            } else if !truncated {
                warn!(
                    offset = bytes_read,
                    max_size = self.max_message_size,
                    "Message exceeds maximum size, truncating body"
                );
                truncated = true;
            }

            prev_line_was_empty = is_blank_line(&line_buf);
            bytes_read += line_len as u64;

            if let Some(cb) = progress_callback {
                if bytes_read - last_progress >= PROGRESS_INTERVAL {
                    cb(bytes_read, self.file_size);
                    last_progress = bytes_read;
                }
            }
        }

        if !message_buf.is_empty() {
            message_callback(&message_buf);
            count += 1;
        }

        if let Some(cb) = progress_callback {
            cb(self.file_size, self.file_size);
        }

        Ok(count)
    }
}

/// Check whether a line is an MBOX separator (`From ` at the start).
fn is_mbox_separator(line: &[u8]) -> bool {
    line.strip_prefix(BOM).unwrap_or(line).starts_with(b"From ")
}

/// Check whether a line is blank (empty or only whitespace / CR / LF).
fn is_blank_line(line: &[u8]) -> bool {
    line.iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b' ' || b == b'\t')
}

/// Skip the `From ` separator line (and a BOM) at the start of a raw message.
pub fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(BOM).unwrap_or(data);
    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
        return &[];
    }
    data
}
