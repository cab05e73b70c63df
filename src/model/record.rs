//! Output records.

use serde::{Deserialize, Serialize};

/// Instruction attached to every record.
pub const INSTRUCTION: &str = "Reply to the following email in my tone and style.";

/// One fine-tuning example: the email you received and the reply you wrote.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub instruction: String,
    /// Cleaned body of the parent message.
    pub input: String,
    /// Cleaned body of your reply.
    pub output: String,
}

impl Record {
    /// Build a record with the fixed [`INSTRUCTION`].
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            instruction: INSTRUCTION.to_string(),
            input: input.into(),
            output: output.into(),
        }
    }
}
