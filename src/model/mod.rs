//! Core data model types: archive messages, addresses, and output records.

pub mod address;
pub mod message;
pub mod record;
