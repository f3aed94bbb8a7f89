use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::constants::defaults;
use crate::conversation::{ConversationStore, KeyValueStore, Role};
use crate::error::GatewayError;
use crate::gateway::AnswerSource;

/// What happened to a send attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Nothing to send (blank input, or nothing to retry).
    Ignored,
    /// Another request was still outstanding; the input was discarded.
    Dropped,
    /// The relay answered; a `bot` message holds `answer`.
    Answered { answer: String },
    /// The request failed; an `error` message holds the description.
    Failed { error: GatewayError },
}

/// Drives one chat: user message, thinking placeholder, relay call, reply.
/// At most one request is outstanding at a time.
pub struct ChatSession<K: KeyValueStore, C: AnswerSource> {
    store: Mutex<ConversationStore<K>>,
    source: C,
    in_flight: AtomicBool,
    last_user_message: Mutex<Option<String>>,
}

/// Clears the in-flight flag however the request ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<K: KeyValueStore, C: AnswerSource> ChatSession<K, C> {
    pub fn new(store: ConversationStore<K>, source: C) -> Self {
        Self {
            store: Mutex::new(store),
            source,
            in_flight: AtomicBool::new(false),
            last_user_message: Mutex::new(None),
        }
    }

    pub fn is_request_in_progress(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn last_user_message(&self) -> Option<String> {
        lock(&self.last_user_message).clone()
    }

    /// Run `f` against the conversation store.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut ConversationStore<K>) -> R) -> R {
        f(&mut lock(&self.store))
    }

    /// Send `text` to the relay inside the current conversation, creating one
    /// if none is selected.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Request already in progress, dropping input");
            return SendOutcome::Dropped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let (conversation_id, thinking_id) = {
            let mut store = lock(&self.store);
            let conversation_id = match store.current_conversation().map(|c| c.id.clone()) {
                Some(id) => id,
                None => {
                    let conversation = store.create_conversation();
                    store.select_conversation(&conversation.id);
                    conversation.id
                }
            };
            store.append_message_to(&conversation_id, Role::User, text);
            let thinking_id = store
                .append_message_to(&conversation_id, Role::Thinking, "")
                .map(|m| m.id);
            (conversation_id, thinking_id)
        };
        *lock(&self.last_user_message) = Some(text.to_string());

        let result = self.source.ask(text).await;

        // The selection may have moved while waiting
        let mut store = lock(&self.store);
        if let Some(ref id) = thinking_id {
            store.remove_message_from(&conversation_id, id);
        }

        let (role, reply) = match result {
            Ok(ref answer) => (Role::Bot, answer.clone()),
            Err(ref error) => (Role::Error, format!("{}{error}", defaults::ERROR_PREFIX)),
        };
        if store.append_message_to(&conversation_id, role, reply).is_none() {
            tracing::debug!(id = %conversation_id, "Conversation deleted before the reply arrived");
        }

        match result {
            Ok(answer) => SendOutcome::Answered { answer },
            Err(error) => SendOutcome::Failed { error },
        }
    }

    /// Send the last user message again.
    pub async fn retry(&self) -> SendOutcome {
        match self.last_user_message() {
            Some(text) => self.send_message(&text).await,
            None => SendOutcome::Ignored,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
