//! `mboxsft` turns the replies you wrote in an MBOX archive into
//! instruction/input/output records for fine-tuning.
//!
//! The pipeline is strictly one-directional:
//! [`archive::load_archive`] → [`extract::extract_records`] (thread lookup,
//! body selection, [`clean::clean_text`], length and duplicate filters) →
//! [`export::jsonl::write_jsonl`].

pub mod archive;
pub mod clean;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod parser;
pub mod thread;
