//! Email parsing: MBOX splitting, header decoding, MIME message parsing, and body selection.

pub mod body;
pub mod header;
pub mod mbox;
pub mod message;
