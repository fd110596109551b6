//! Conversation log entries.

use serde::{Deserialize, Serialize};

/// Who sent a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn display_name(&self) -> &str {
        match self {
            Sender::User => "You",
            Sender::Ai => "AI Opponent",
        }
    }
}

/// Opaque handle to synthesized audio for a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioRef(pub String);

/// A single exchanged message. Immutable once logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    /// Always `None`: no speech is synthesized.
    pub audio: Option<AudioRef>,
    /// Local wall-clock time the message was logged, for display.
    pub timestamp: String,
}

/// Append-only, ordered list of messages for the current debate.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    next_id: u64,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a message and return a copy of it.
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> Message {
        self.next_id += 1;
        let message = Message {
            id: self.next_id,
            sender,
            text: text.into(),
            audio: None,
            timestamp: display_timestamp(),
        };
        self.messages.push(message.clone());
        message
    }

    /// Drop all messages. Ids keep increasing across clears.
    pub fn clear(&mut self) {
        self.messages.clear();
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

fn display_timestamp() -> String {
    chrono::Local::now().format("%-I:%M:%S %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut log = ConversationLog::new();
        log.append(Sender::User, "first");
        log.append(Sender::Ai, "second");

        let senders: Vec<Sender> = log.messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Ai]);
        assert_eq!(log.messages()[1].text, "second");
        assert!(log.messages().iter().all(|m| m.audio.is_none()));
    }

    #[test]
    fn test_ids_are_monotonic_across_clear() {
        let mut log = ConversationLog::new();
        let a = log.append(Sender::User, "a");
        let b = log.append(Sender::Ai, "b");
        log.clear();
        assert!(log.is_empty());
        let c = log.append(Sender::Ai, "c");

        assert!(a.id < b.id);
        assert!(b.id < c.id);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::Ai).unwrap(), "\"ai\"");
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
    }
}
