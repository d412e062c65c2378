use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub is_from_bot: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_from_bot: false,
            timestamp: Utc::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_from_bot: true,
            timestamp: Utc::now(),
        }
    }
}

/// One page load's conversation. Never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    messages: Vec<Message>,
    user_message_count: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(generate_session_id())
    }

    pub fn with_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            user_message_count: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn user_message_count(&self) -> u32 {
        self.user_message_count
    }

    pub fn push(&mut self, message: Message) {
        if !message.is_from_bot {
            self.user_message_count += 1;
        }
        self.messages.push(message);
    }

    /// The last `window` messages in wire form, oldest first.
    pub fn context(&self, window: usize) -> Vec<ContextEntry> {
        let start = self.messages.len().saturating_sub(window);
        self.messages[start..].iter().map(ContextEntry::from).collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// `session-<epoch millis>-<9 random lowercase alphanumerics>`
pub fn generate_session_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("session-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum Rating {
    VeryUnsatisfied = 1,
    Unsatisfied = 2,
    Satisfied = 3,
    VerySatisfied = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [
        Rating::VeryUnsatisfied,
        Rating::Unsatisfied,
        Rating::Satisfied,
        Rating::VerySatisfied,
    ];

    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.value() == value)
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Rating::VeryUnsatisfied => "😞",
            Rating::Unsatisfied => "😐",
            Rating::Satisfied => "😊",
            Rating::VerySatisfied => "😄",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::VeryUnsatisfied => "Very Unsatisfied",
            Rating::Unsatisfied => "Unsatisfied",
            Rating::Satisfied => "Satisfied",
            Rating::VerySatisfied => "Very Satisfied",
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.value()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextEntry {
    pub text: String,
    #[serde(rename = "isBot")]
    pub is_bot: bool,
    pub timestamp: String,
}

impl From<&Message> for ContextEntry {
    fn from(message: &Message) -> Self {
        Self {
            text: message.text.clone(),
            is_bot: message.is_from_bot,
            timestamp: message.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub question: String,
    pub user_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatAnswer {
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfactionPayload {
    pub rating: Rating,
    pub session_id: String,
    pub conversation_context: Vec<ContextEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackPayload {
    pub feedback_type: String,
    pub feedback_text: String,
    pub session_id: String,
    pub conversation_context: Vec<ContextEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_user_messages_are_counted() {
        let mut session = Session::with_id("s");
        session.push(Message::user("hi"));
        session.push(Message::bot("hello"));
        session.push(Message::user("prices?"));
        assert_eq!(session.user_message_count(), 2);
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn context_keeps_the_last_five() {
        let mut session = Session::with_id("s");
        for i in 0..8 {
            session.push(Message::user(format!("m{}", i)));
        }
        let context = session.context(5);
        assert_eq!(context.len(), 5);
        assert_eq!(context[0].text, "m3");
        assert_eq!(context[4].text, "m7");
    }

    #[test]
    fn context_entry_wire_shape() {
        let entry = ContextEntry::from(&Message::bot("hi"));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["isBot"], true);
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn rating_serializes_as_number() {
        let payload = SatisfactionPayload {
            rating: Rating::VerySatisfied,
            session_id: "s".into(),
            conversation_context: vec![],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["rating"], 4);
        assert_eq!(Rating::from_value(2), Some(Rating::Unsatisfied));
        assert_eq!(Rating::from_value(5), None);
    }

    #[test]
    fn session_ids_are_prefixed_and_distinct() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert!(a.starts_with("session-"));
        assert_eq!(a.rsplit('-').next().unwrap().len(), 9);
        assert_ne!(a, b);
    }
}
