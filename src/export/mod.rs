//! Output: JSONL records and the console preview.

pub mod jsonl;
pub mod preview;
