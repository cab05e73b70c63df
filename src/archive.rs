//! Whole-archive loading.
//!
//! Parent lookup needs random access by identifier, so every message is
//! parsed and kept in memory before extraction starts.

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::model::message::Message;
use crate::parser::mbox::MboxParser;
use crate::parser::message::parse_message;

/// Read and parse every message of an MBOX file, in archive order.
///
/// `progress` receives `(bytes_read, file_size)`.
pub fn load_archive(path: &Path, progress: Option<&dyn Fn(u64, u64)>) -> Result<Vec<Message>> {
    let parser = MboxParser::new(path)?;
    let mut messages = Vec::new();
    let mut sequence: u64 = 0;

    parser.parse(
        &mut |raw| {
            messages.push(parse_message(raw, sequence));
            sequence += 1;
        },
        progress,
    )?;

    info!(
        path = %path.display(),
        size = parser.file_size(),
        count = messages.len(),
        "Loaded archive"
    );
    Ok(messages)
}
