use chrono::Utc;

use super::persistence::{KeyValueStore, PersistedState};
use super::types::{derive_title, Conversation, Message, Role};
use crate::constants::paths;

/// Owns every conversation and writes the whole state back to the
/// key-value store after each mutation.
pub struct ConversationStore<K: KeyValueStore> {
    kv: K,
    conversations: Vec<Conversation>,
    current_id: Option<String>,
    user_has_scrolled: bool,
}

impl<K: KeyValueStore> ConversationStore<K> {
    /// Load persisted state from `kv`. A missing or unreadable entry yields an
    /// empty store; the failure is logged, not returned.
    pub fn load(kv: K) -> Self {
        let state = match kv.get(paths::STATE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedState>(&raw) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!("Failed to parse saved state, starting empty: {e}");
                    PersistedState::default()
                }
            },
            Ok(None) => PersistedState::default(),
            Err(e) => {
                tracing::warn!("Failed to load saved state, starting empty: {e}");
                PersistedState::default()
            }
        };

        tracing::debug!(
            conversations = state.conversations.len(),
            "Loaded conversation state"
        );

        Self {
            kv,
            conversations: state.conversations,
            current_id: state.current_conversation_id,
            user_has_scrolled: false,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn current_conversation_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.current_id.as_deref().and_then(|id| self.conversation(id))
    }

    pub fn user_has_scrolled(&self) -> bool {
        self.user_has_scrolled
    }

    pub fn set_user_scrolled(&mut self, scrolled: bool) {
        self.user_has_scrolled = scrolled;
    }

    pub fn create_conversation(&mut self) -> Conversation {
        let conversation = Conversation::new();
        tracing::debug!(id = %conversation.id, "Created conversation");
        self.conversations.insert(0, conversation.clone());
        self.persist();
        conversation
    }

    /// Make `id` the current conversation. Returns `false` and leaves the
    /// selection untouched when no conversation has that id.
    pub fn select_conversation(&mut self, id: &str) -> bool {
        if self.conversation(id).is_none() {
            tracing::debug!(id, "Ignoring selection of unknown conversation");
            return false;
        }
        self.current_id = Some(id.to_string());
        self.user_has_scrolled = false;
        self.persist();
        true
    }

    /// Remove the conversation with `id`. If it was current, the first
    /// remaining conversation becomes current (or none).
    pub fn delete_conversation(&mut self, id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        let removed = self.conversations.len() != before;

        if self.current_id.as_deref() == Some(id) {
            self.current_id = self.conversations.first().map(|c| c.id.clone());
        }

        if removed {
            tracing::debug!(id, "Deleted conversation");
        }
        self.persist();
        removed
    }

    /// Append a message to the current conversation. Returns `None` when no
    /// conversation is selected.
    pub fn append_message(&mut self, role: Role, text: impl Into<String>) -> Option<Message> {
        let current_id = self.current_id.clone()?;
        self.append_message_to(&current_id, role, text)
    }

    /// Append a message to the conversation with `conversation_id`, whether
    /// or not it is current. Returns `None` when it no longer exists.
    pub fn append_message_to(
        &mut self,
        conversation_id: &str,
        role: Role,
        text: impl Into<String>,
    ) -> Option<Message> {
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)?;

        let message = Message::new(role, text);
        conversation.messages.push(message.clone());
        conversation.updated_at = Utc::now();

        if role == Role::User && conversation.user_message_count() == 1 {
            conversation.title = derive_title(&message.text);
            conversation.updated_at = Utc::now();
        }

        self.persist();
        Some(message)
    }

    /// Remove a message from the current conversation.
    pub fn remove_message(&mut self, id: &str) -> bool {
        match self.current_id.clone() {
            Some(current_id) => self.remove_message_from(&current_id, id),
            None => false,
        }
    }

    /// Remove message `id` from the conversation with `conversation_id`.
    pub fn remove_message_from(&mut self, conversation_id: &str, id: &str) -> bool {
        let Some(conversation) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        else {
            return false;
        };

        let before = conversation.messages.len();
        conversation.messages.retain(|m| m.id != id);
        if conversation.messages.len() == before {
            return false;
        }

        self.persist();
        true
    }

    /// Forget every conversation and drop the saved entry.
    pub fn clear(&mut self) {
        self.conversations.clear();
        self.current_id = None;
        self.user_has_scrolled = false;
        if let Err(e) = self.kv.remove(paths::STATE_KEY) {
            tracing::error!("Failed to remove saved state: {e}");
        }
        tracing::debug!("Cleared all conversations");
    }

    /// Conversations whose title or any message contains `query`,
    /// case-insensitively. A blank query matches everything.
    pub fn filter_conversations(&self, query: &str) -> Vec<&Conversation> {
        if query.trim().is_empty() {
            return self.conversations.iter().collect();
        }
        let needle = query.to_lowercase();
        self.conversations
            .iter()
            .filter(|c| c.matches(&needle))
            .collect()
    }

    /// Snapshot of the persisted document.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            conversations: self.conversations.clone(),
            current_conversation_id: self.current_id.clone(),
        }
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&self.snapshot()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Failed to serialize state: {e}");
                return;
            }
        };
        if let Err(e) = self.kv.set(paths::STATE_KEY, &raw) {
            tracing::error!("Failed to save state: {e}");
        }
    }
}
