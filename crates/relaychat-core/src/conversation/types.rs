use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::defaults;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
    Error,
    /// Placeholder shown while a request is outstanding.
    Thinking,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
            Role::Error => "error",
            Role::Thinking => "thinking",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Role::Bot, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Role::Error, text)
    }

    pub fn thinking() -> Self {
        Self::new(Role::Thinking, "")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            title: defaults::CONVERSATION_TITLE.to_string(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }

    /// Case-insensitive match on the title or any message body.
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .messages
                .iter()
                .any(|m| m.text.to_lowercase().contains(needle))
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a unique conversation or message ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Title shown for a conversation whose first user message is `first_message`.
pub fn derive_title(first_message: &str) -> String {
    let trimmed = first_message.trim();
    if trimmed.is_empty() {
        return defaults::CONVERSATION_TITLE.to_string();
    }
    if trimmed.chars().count() > defaults::TITLE_MAX_CHARS {
        let head: String = trimmed.chars().take(defaults::TITLE_MAX_CHARS).collect();
        format!("{head}{}", defaults::TITLE_ELLIPSIS)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_unique() {
        let id1 = generate_id();
        let id2 = generate_id();
        assert_ne!(id1, id2);
        assert!(id1.contains('-'));
    }

    #[test]
    fn test_derive_title_short_message_verbatim() {
        assert_eq!(derive_title("What is Rust?"), "What is Rust?");
    }

    #[test]
    fn test_derive_title_exactly_forty_chars_is_not_truncated() {
        let text = "b".repeat(40);
        assert_eq!(derive_title(&text), text);
    }

    #[test]
    fn test_derive_title_truncates_long_message() {
        let text = "a".repeat(41);
        let title = derive_title(&text);
        assert_eq!(title, format!("{}...", "a".repeat(40)));
    }

    #[test]
    fn test_derive_title_counts_characters_not_bytes() {
        let text = "é".repeat(45);
        let title = derive_title(&text);
        assert_eq!(title.chars().count(), 43);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_derive_title_blank_falls_back_to_default() {
        assert_eq!(derive_title("   \n\t"), "New Conversation");
        assert_eq!(derive_title(""), "New Conversation");
    }

    #[test]
    fn test_derive_title_trims_whitespace() {
        assert_eq!(derive_title("  hello  "), "hello");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Thinking).unwrap();
        assert_eq!(json, "\"thinking\"");
        let role: Role = serde_json::from_str("\"bot\"").unwrap();
        assert_eq!(role, Role::Bot);
        assert_eq!(Role::Error.as_str(), "error");
    }

    #[test]
    fn test_conversation_serializes_camel_case() {
        let conv = Conversation::new();
        let value = serde_json::to_value(&conv).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["title"], "New Conversation");
        assert!(value["messages"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_thinking_message_is_empty() {
        let msg = Message::thinking();
        assert_eq!(msg.role, Role::Thinking);
        assert!(msg.text.is_empty());
    }
}
