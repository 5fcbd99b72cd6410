// src/message.rs

use crate::constants::SERVER_UNREACHABLE_TEXT;
use crate::errors::{ChatError, ChatResult};
use chrono::{DateTime, Local};
use std::fmt;

/// Stable handle of a message in the transcript.
///
/// The transcript never removes or reorders entries, so the append index stays
/// valid for as long as the transcript lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub usize);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    Final,
    Pending,
    Error,
}

/// Outcome of one exchange with the backend, applied to a pending bubble.
pub type ReplyOutcome = ChatResult<String>;

#[derive(Debug, Clone)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    state: MessageState,
    text: String,
    created_at: DateTime<Local>,
}

impl Message {
    fn user(id: MessageId, text: String) -> Self {
        Self {
            id,
            sender: Sender::User,
            state: MessageState::Final,
            text,
            created_at: Local::now(),
        }
    }

    fn pending_bot(id: MessageId) -> Self {
        Self {
            id,
            sender: Sender::Bot,
            state: MessageState::Pending,
            text: String::new(),
            created_at: Local::now(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn state(&self) -> MessageState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn is_pending(&self) -> bool {
        self.state == MessageState::Pending
    }

    pub fn from_user(&self) -> bool {
        self.sender == Sender::User
    }

    fn resolve(&mut self, outcome: ReplyOutcome) -> ChatResult<()> {
        if self.state != MessageState::Pending {
            return Err(ChatError::AlreadyResolved(self.id));
        }
        match outcome {
            Ok(body) => {
                self.text = body;
                self.state = MessageState::Final;
            }
            Err(_) => {
                self.text = SERVER_UNREACHABLE_TEXT.to_string();
                self.state = MessageState::Error;
            }
        }
        Ok(())
    }
}

/// Append-only conversation history.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> MessageId {
        let id = self.next_id();
        self.messages.push(Message::user(id, text.into()));
        id
    }

    pub fn push_pending_bot(&mut self) -> MessageId {
        let id = self.next_id();
        self.messages.push(Message::pending_bot(id));
        id
    }

    /// Settles a pending bot message. Each message settles at most once.
    pub fn resolve(&mut self, id: MessageId, outcome: ReplyOutcome) -> ChatResult<()> {
        let message = self
            .messages
            .get_mut(id.0)
            .ok_or(ChatError::UnknownMessage(id))?;
        if message.sender != Sender::Bot {
            return Err(ChatError::NotABotMessage(id));
        }
        message.resolve(outcome)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }

    fn next_id(&self) -> MessageId {
        MessageId(self.messages.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_append_order() {
        let mut transcript = Transcript::new();
        let a = transcript.push_user("hi");
        let b = transcript.push_pending_bot();
        assert_eq!(a, MessageId(0));
        assert_eq!(b, MessageId(1));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_user_messages_are_final() {
        let mut transcript = Transcript::new();
        let id = transcript.push_user("hi");
        let msg = transcript.get(id).unwrap();
        assert_eq!(msg.state(), MessageState::Final);
        assert_eq!(msg.sender(), Sender::User);
        let err = transcript.resolve(id, Ok("nope".into())).unwrap_err();
        assert!(matches!(err, ChatError::NotABotMessage(MessageId(0))));
        assert_eq!(err.to_string(), "Message #0 is not a bot reply");
        assert_eq!(transcript.get(id).unwrap().text(), "hi");
        assert_eq!(transcript.get(id).unwrap().state(), MessageState::Final);
    }

    #[test]
    fn test_pending_resolves_to_final() {
        let mut transcript = Transcript::new();
        let id = transcript.push_pending_bot();
        assert!(transcript.get(id).unwrap().is_pending());
        assert!(transcript.get(id).unwrap().text().is_empty());

        transcript.resolve(id, Ok("Hello!".into())).unwrap();
        let msg = transcript.get(id).unwrap();
        assert_eq!(msg.state(), MessageState::Final);
        assert_eq!(msg.text(), "Hello!");
    }

    #[test]
    fn test_failure_uses_fixed_text() {
        let mut transcript = Transcript::new();
        let id = transcript.push_pending_bot();
        transcript
            .resolve(id, Err(ChatError::api_error("connection refused")))
            .unwrap();
        let msg = transcript.get(id).unwrap();
        assert_eq!(msg.state(), MessageState::Error);
        assert_eq!(msg.text(), "⚠️ Error: Unable to reach the server.");
    }

    #[test]
    fn test_second_resolution_is_rejected() {
        let mut transcript = Transcript::new();
        let id = transcript.push_pending_bot();
        transcript.resolve(id, Ok("first".into())).unwrap();

        let err = transcript.resolve(id, Ok("second".into())).unwrap_err();
        assert!(matches!(err, ChatError::AlreadyResolved(_)));
        assert_eq!(transcript.get(id).unwrap().text(), "first");
    }

    #[test]
    fn test_unknown_id() {
        let mut transcript = Transcript::new();
        let err = transcript.resolve(MessageId(7), Ok("x".into())).unwrap_err();
        assert!(matches!(err, ChatError::UnknownMessage(MessageId(7))));
    }

    #[test]
    fn test_pending_count() {
        let mut transcript = Transcript::new();
        transcript.push_user("a");
        let first = transcript.push_pending_bot();
        transcript.push_user("b");
        transcript.push_pending_bot();
        assert_eq!(transcript.pending_count(), 2);
        transcript.resolve(first, Ok("done".into())).unwrap();
        assert_eq!(transcript.pending_count(), 1);
    }
}
