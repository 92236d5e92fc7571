//! Conversation log
//!
//! Append-only ordered record of the edit dialog. Messages are immutable
//! once appended, with one sanctioned exception: a change preview is
//! annotated (never replaced) when its changes have been applied.

use crate::model::{Change, ChatMessage, Preview};

#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, returning a reference to the stored entry
    pub fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        self.messages.last().expect("just pushed")
    }

    pub fn get(&self, message_id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// Changes held by a message's change preview; `None` when the message
    /// is unknown, has no preview, or carries recommendations instead
    pub fn preview_changes(&self, message_id: &str) -> Option<Vec<Change>> {
        match self.get(message_id)?.preview.as_ref()? {
            Preview::Change { changes, .. } => Some(changes.clone()),
            Preview::Recommendation { .. } => None,
        }
    }

    /// Annotate a change preview as applied. Returns false when the
    /// message is unknown or does not carry a change preview.
    pub fn mark_applied(&mut self, message_id: &str) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) else {
            return false;
        };
        match message.preview.as_mut() {
            Some(Preview::Change { applied, .. }) => {
                *applied = true;
                true
            }
            _ => false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
