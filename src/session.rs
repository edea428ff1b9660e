//! Session and transcript models.
//!
//! A session is one visitor's continuous interaction: one conversation state,
//! one append-only transcript, and the three mutable lead fields (selected
//! service, description, contact). Nothing survives a reload — the session id
//! is a fresh random token each time.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flow::ConversationState;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Assistant,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One immutable transcript entry.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub author: Author,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Author::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Author::Assistant, text)
    }

    fn new(author: Author, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Contact details collected by the structured form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub full_name: String,
    pub phone: String,
    pub email: String,
}

impl ContactInfo {
    /// All three fields are required, non-empty after trimming.
    pub fn is_complete(&self) -> bool {
        !self.full_name.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.email.trim().is_empty()
    }
}

/// Generate a short random session token (lowercase base-36, 9 chars).
///
/// Used only to correlate persistence and notification calls; not persisted
/// across reloads.
pub fn generate_session_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// One visitor session: state + transcript + accumulated lead fields.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub state: ConversationState,
    transcript: Vec<Message>,
    pub selected_service: Option<&'static crate::catalog::Service>,
    pub description: Option<String>,
    pub contact: Option<ContactInfo>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(generate_session_id())
    }

    pub fn with_id(id: String) -> Self {
        Self {
            id,
            state: ConversationState::Initial,
            transcript: Vec::new(),
            selected_service: None,
            description: None,
            contact: None,
        }
    }

    /// Append a message. The transcript is strictly append-only: no edits,
    /// no deletions, for the lifetime of the session.
    pub fn push(&mut self, message: Message) {
        self.transcript.push(message);
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// The trailing window of messages handed to the reply source.
    pub fn recent_messages(&self, window: usize) -> &[Message] {
        let len = self.transcript.len();
        &self.transcript[len.saturating_sub(window)..]
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_is_append_only_and_monotonic() {
        let mut session = Session::new();
        session.push(Message::assistant("Bonjour"));
        session.push(Message::user("Salut"));
        session.push(Message::assistant("Comment puis-je vous aider ?"));

        assert_eq!(session.transcript().len(), 3);
        for pair in session.transcript().windows(2) {
            assert!(pair[0].sent_at <= pair[1].sent_at);
        }
    }

    #[test]
    fn recent_messages_bounds_the_window() {
        let mut session = Session::new();
        for i in 0..15 {
            session.push(Message::user(format!("msg {i}")));
        }
        let recent = session.recent_messages(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].text, "msg 5");

        // Window larger than transcript returns everything
        assert_eq!(session.recent_messages(100).len(), 15);
    }

    #[test]
    fn session_ids_are_short_random_tokens() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_eq!(a.len(), 9);
        assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(a, b);
    }

    #[test]
    fn contact_completeness() {
        let mut contact = ContactInfo {
            full_name: "Awa Diop".into(),
            phone: "+221770000000".into(),
            email: "awa@example.com".into(),
        };
        assert!(contact.is_complete());

        contact.phone = "   ".into();
        assert!(!contact.is_complete());
    }

    #[test]
    fn new_session_starts_initial_and_empty() {
        let session = Session::new();
        assert_eq!(session.state, ConversationState::Initial);
        assert!(session.transcript().is_empty());
        assert!(session.selected_service.is_none());
        assert!(session.description.is_none());
        assert!(session.contact.is_none());
    }
}
