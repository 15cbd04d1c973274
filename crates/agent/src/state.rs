//! Per-turn conversation log.

use twinbot_provider::Message;

/// Append-only message log for a single turn.
///
/// Seeded with the system persona and the user's text; the orchestrator
/// appends assistant and tool messages as the turn unfolds. Nothing is ever
/// removed or reordered, and the log does not outlive the turn.
#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn seeded(system_prompt: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(user_text)],
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Owned copy of the log, in append order, for one model invocation.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
