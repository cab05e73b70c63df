//! Direct reply-to-parent resolution.
//!
//! Only the immediate parent named by `In-Reply-To` is looked up; full
//! thread trees are never built.

use std::collections::HashMap;

use crate::model::message::Message;

/// Lookup from `Message-ID` to message, built once per run.
///
/// Messages without an identifier are not indexed and so can never be a
/// parent. When several messages share an identifier the last one wins.
#[derive(Debug)]
pub struct ThreadIndex<'a> {
    by_id: HashMap<&'a str, &'a Message>,
}

impl<'a> ThreadIndex<'a> {
    /// Index every message that carries a non-empty `Message-ID`.
    pub fn build(messages: &'a [Message]) -> Self {
        let mut by_id = HashMap::with_capacity(messages.len());
        for message in messages {
            if let Some(id) = message.message_id.as_deref().filter(|id| !id.is_empty()) {
                by_id.insert(id, message);
            }
        }
        Self { by_id }
    }

    /// The message `reply` answers, if it is in the archive.
    pub fn parent_of(&self, reply: &Message) -> Option<&'a Message> {
        let id = reply.in_reply_to.as_deref().filter(|id| !id.is_empty())?;
        self.get(id)
    }

    pub fn get(&self, message_id: &str) -> Option<&'a Message> {
        self.by_id.get(message_id).copied()
    }

    /// Number of indexed identifiers.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
