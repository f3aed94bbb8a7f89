use relaychat_core::conversation::{FileKvStore, KeyValueStore, MemoryKvStore, PersistedState};
use relaychat_core::constants::paths::STATE_KEY;
use relaychat_core::*;
use std::sync::Arc;
use tempfile::TempDir;

fn memory_store() -> ConversationStore<Arc<MemoryKvStore>> {
    ConversationStore::load(Arc::new(MemoryKvStore::new()))
}

/// Backend whose writes always fail.
struct BrokenKvStore;

impl KeyValueStore for BrokenKvStore {
    fn get(&self, _key: &str) -> Result<Option<String>, ChatError> {
        Err(ChatError::persistence("read failed"))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), ChatError> {
        Err(ChatError::persistence("quota exceeded"))
    }

    fn remove(&self, _key: &str) -> Result<(), ChatError> {
        Err(ChatError::persistence("remove failed"))
    }
}

// ========================================================================
// Creation & Selection
// ========================================================================

#[test]
fn test_new_store_is_empty() {
    let store = memory_store();
    assert!(store.conversations().is_empty());
    assert!(store.current_conversation_id().is_none());
    assert!(store.current_conversation().is_none());
}

#[test]
fn test_create_conversation_defaults() {
    let mut store = memory_store();
    let conv = store.create_conversation();

    assert_eq!(conv.title, "New Conversation");
    assert!(conv.messages.is_empty());
    assert_eq!(conv.created_at, conv.updated_at);
    // Creating does not select
    assert!(store.current_conversation_id().is_none());
}

#[test]
fn test_create_conversation_prepends_newest_first() {
    let mut store = memory_store();
    let ids: Vec<String> = (0..5).map(|_| store.create_conversation().id).collect();

    let listed: Vec<String> = store.conversations().iter().map(|c| c.id.clone()).collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(listed, expected);
}

#[test]
fn test_select_conversation_sets_current_and_resets_scroll() {
    let mut store = memory_store();
    let a = store.create_conversation();
    let b = store.create_conversation();

    store.set_user_scrolled(true);
    assert!(store.select_conversation(&a.id));
    assert_eq!(store.current_conversation_id(), Some(a.id.as_str()));
    assert!(!store.user_has_scrolled());

    assert!(store.select_conversation(&b.id));
    assert_eq!(store.current_conversation().unwrap().id, b.id);
}

#[test]
fn test_select_unknown_id_keeps_previous_selection() {
    let mut store = memory_store();
    let a = store.create_conversation();
    store.select_conversation(&a.id);
    store.set_user_scrolled(true);

    assert!(!store.select_conversation("does-not-exist"));
    assert_eq!(store.current_conversation_id(), Some(a.id.as_str()));
    assert!(store.user_has_scrolled());
}

// ========================================================================
// Deletion
// ========================================================================

#[test]
fn test_delete_only_current_conversation_clears_selection() {
    let mut store = memory_store();
    let conv = store.create_conversation();
    store.select_conversation(&conv.id);

    assert!(store.delete_conversation(&conv.id));
    assert!(store.conversations().is_empty());
    assert!(store.current_conversation_id().is_none());
}

#[test]
fn test_delete_current_selects_new_first() {
    let mut store = memory_store();
    let oldest = store.create_conversation();
    let middle = store.create_conversation();
    let newest = store.create_conversation();
    store.select_conversation(&newest.id);

    store.delete_conversation(&newest.id);
    assert_eq!(store.current_conversation_id(), Some(middle.id.as_str()));
    assert_eq!(store.conversations().len(), 2);
    assert_eq!(store.conversations()[1].id, oldest.id);
}

#[test]
fn test_delete_other_conversation_keeps_selection() {
    let mut store = memory_store();
    let a = store.create_conversation();
    let b = store.create_conversation();
    store.select_conversation(&a.id);

    store.delete_conversation(&b.id);
    assert_eq!(store.current_conversation_id(), Some(a.id.as_str()));
}

#[test]
fn test_delete_unknown_id_is_noop() {
    let mut store = memory_store();
    store.create_conversation();
    assert!(!store.delete_conversation("missing"));
    assert_eq!(store.conversations().len(), 1);
}

// ========================================================================
// Messages
// ========================================================================

#[test]
fn test_append_without_current_conversation_returns_none() {
    let mut store = memory_store();
    store.create_conversation();
    assert!(store.append_message(Role::User, "hello").is_none());
    assert!(store.conversations()[0].messages.is_empty());
}

#[test]
fn test_append_keeps_order_and_refreshes_updated_at() {
    let mut store = memory_store();
    let conv = store.create_conversation();
    store.select_conversation(&conv.id);

    let first = store.append_message(Role::User, "one").unwrap();
    let second = store.append_message(Role::Bot, "two").unwrap();

    let current = store.current_conversation().unwrap();
    assert_eq!(current.messages.len(), 2);
    assert_eq!(current.messages[0].id, first.id);
    assert_eq!(current.messages[1].id, second.id);
    assert!(current.updated_at >= conv.updated_at);
    assert!(current.updated_at >= second.timestamp);
}

#[test]
fn test_first_user_message_sets_title() {
    let mut store = memory_store();
    let conv = store.create_conversation();
    store.select_conversation(&conv.id);

    store.append_message(Role::Bot, "welcome");
    assert_eq!(store.current_conversation().unwrap().title, "New Conversation");

    store.append_message(Role::User, "What is X?");
    assert_eq!(store.current_conversation().unwrap().title, "What is X?");

    store.append_message(Role::User, "A different question");
    assert_eq!(store.current_conversation().unwrap().title, "What is X?");
}

#[test]
fn test_long_first_user_message_is_truncated() {
    let mut store = memory_store();
    let conv = store.create_conversation();
    store.select_conversation(&conv.id);

    let text = "x".repeat(60);
    store.append_message(Role::User, text);
    let title = &store.current_conversation().unwrap().title;
    assert_eq!(title, &format!("{}...", "x".repeat(40)));
}

#[test]
fn test_whitespace_first_user_message_keeps_default_title() {
    let mut store = memory_store();
    let conv = store.create_conversation();
    store.select_conversation(&conv.id);

    store.append_message(Role::User, "    ");
    assert_eq!(store.current_conversation().unwrap().title, "New Conversation");

    // The title is derived once, so a later user message does not replace it
    store.append_message(Role::User, "real question");
    assert_eq!(store.current_conversation().unwrap().title, "New Conversation");
}

#[test]
fn test_remove_message_and_ids_are_not_reused() {
    let mut store = memory_store();
    let conv = store.create_conversation();
    store.select_conversation(&conv.id);

    let thinking = store.append_message(Role::Thinking, "").unwrap();
    assert!(store.remove_message(&thinking.id));
    let next = store.append_message(Role::Bot, "answer").unwrap();

    assert_ne!(next.id, thinking.id);
    let current = store.current_conversation().unwrap();
    assert_eq!(current.messages.len(), 1);
    assert!(current.messages.iter().all(|m| m.id != thinking.id));
}

#[test]
fn test_remove_message_noop_cases() {
    let mut store = memory_store();
    assert!(!store.remove_message("anything"));

    let conv = store.create_conversation();
    store.select_conversation(&conv.id);
    store.append_message(Role::User, "keep me");
    assert!(!store.remove_message("unknown"));
    assert_eq!(store.current_conversation().unwrap().messages.len(), 1);
}

#[test]
fn test_messages_can_target_a_conversation_that_is_not_current() {
    let mut store = memory_store();
    let asked = store.create_conversation();
    store.select_conversation(&asked.id);
    let thinking = store.append_message(Role::Thinking, "").unwrap();

    let other = store.create_conversation();
    store.select_conversation(&other.id);

    assert!(!store.remove_message(&thinking.id));
    assert!(store.remove_message_from(&asked.id, &thinking.id));
    let reply = store.append_message_to(&asked.id, Role::Bot, "late answer").unwrap();

    let asked = store.conversation(&asked.id).unwrap();
    assert_eq!(asked.messages.len(), 1);
    assert_eq!(asked.messages[0].id, reply.id);
    assert!(store.current_conversation().unwrap().messages.is_empty());
    assert!(store.append_message_to("gone", Role::Bot, "x").is_none());
}

#[test]
fn test_clear_drops_everything_and_the_saved_entry() {
    let kv = Arc::new(MemoryKvStore::new());
    let mut store = ConversationStore::load(kv.clone());
    let conv = store.create_conversation();
    store.select_conversation(&conv.id);
    store.append_message(Role::User, "hello");
    assert!(kv.get(STATE_KEY).unwrap().is_some());

    store.clear();
    assert!(store.conversations().is_empty());
    assert!(store.current_conversation_id().is_none());
    assert!(kv.get(STATE_KEY).unwrap().is_none());

    let reopened = ConversationStore::load(kv);
    assert!(reopened.conversations().is_empty());
}

// ========================================================================
// Filtering
// ========================================================================

fn seeded_store() -> ConversationStore<Arc<MemoryKvStore>> {
    let mut store = memory_store();

    let rust = store.create_conversation();
    store.select_conversation(&rust.id);
    store.append_message(Role::User, "Tell me about Rust");
    store.append_message(Role::Bot, "It has a BORROW checker");

    let cooking = store.create_conversation();
    store.select_conversation(&cooking.id);
    store.append_message(Role::User, "Pasta recipes");

    store.create_conversation();
    store
}

#[test]
fn test_filter_blank_query_returns_everything() {
    let store = seeded_store();
    assert_eq!(store.filter_conversations("").len(), 3);
    assert_eq!(store.filter_conversations("   ").len(), 3);
}

#[test]
fn test_filter_matches_title_case_insensitively() {
    let store = seeded_store();
    let hits = store.filter_conversations("PASTA");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Pasta recipes");
}

#[test]
fn test_filter_matches_message_text() {
    let store = seeded_store();
    let hits = store.filter_conversations("borrow");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Tell me about Rust");
}

#[test]
fn test_filter_does_not_mutate_list() {
    let store = seeded_store();
    assert!(store.filter_conversations("nothing matches this").is_empty());
    assert_eq!(store.conversations().len(), 3);
}

// ========================================================================
// Persistence
// ========================================================================

#[test]
fn test_every_mutation_is_persisted() {
    let kv = Arc::new(MemoryKvStore::new());
    let mut store = ConversationStore::load(kv.clone());

    let conv = store.create_conversation();
    let saved: PersistedState =
        serde_json::from_str(&kv.get(STATE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(saved.conversations.len(), 1);
    assert!(saved.current_conversation_id.is_none());

    store.select_conversation(&conv.id);
    store.append_message(Role::User, "persist me");
    let saved: PersistedState =
        serde_json::from_str(&kv.get(STATE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(saved.current_conversation_id.as_deref(), Some(conv.id.as_str()));
    assert_eq!(saved.conversations[0].messages[0].text, "persist me");
    assert_eq!(saved.conversations[0].title, "persist me");
}

#[test]
fn test_roundtrip_through_memory_store() {
    let kv = Arc::new(MemoryKvStore::new());
    let mut store = ConversationStore::load(kv.clone());
    let a = store.create_conversation();
    store.create_conversation();
    store.select_conversation(&a.id);
    store.append_message(Role::User, "question");
    store.append_message(Role::Bot, "answer");
    store.append_message(Role::Error, "Error: boom");
    let before = store.snapshot();

    let reloaded = ConversationStore::load(kv);
    assert_eq!(reloaded.snapshot(), before);
    assert_eq!(reloaded.conversations(), store.conversations());
    assert_eq!(reloaded.current_conversation_id(), Some(a.id.as_str()));
}

#[test]
fn test_roundtrip_through_file_store() {
    let dir = TempDir::new().unwrap();
    let before = {
        let mut store = ConversationStore::load(FileKvStore::with_dir(dir.path()).unwrap());
        let conv = store.create_conversation();
        store.select_conversation(&conv.id);
        store.append_message(Role::User, "héllo wörld");
        store.snapshot()
    };

    let reloaded = ConversationStore::load(FileKvStore::with_dir(dir.path()).unwrap());
    assert_eq!(reloaded.snapshot(), before);
}

#[test]
fn test_corrupt_state_degrades_to_empty() {
    let kv = Arc::new(MemoryKvStore::new());
    kv.set(STATE_KEY, "{ not json").unwrap();

    let store = ConversationStore::load(kv);
    assert!(store.conversations().is_empty());
    assert!(store.current_conversation_id().is_none());
}

#[test]
fn test_legacy_document_with_theme_loads() {
    let kv = Arc::new(MemoryKvStore::new());
    let raw = r#"{
        "conversations": [{
            "id": "c1",
            "title": "Old chat",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-01T10:05:00.000Z",
            "messages": [{"id": "m1", "role": "user", "text": "hi", "timestamp": "2024-05-01T10:00:01.000Z"}]
        }],
        "currentConversationId": "c1",
        "theme": "dark"
    }"#;
    kv.set(STATE_KEY, raw).unwrap();

    let store = ConversationStore::load(kv);
    let current = store.current_conversation().unwrap();
    assert_eq!(current.title, "Old chat");
    assert_eq!(current.messages[0].role, Role::User);
}

#[test]
fn test_unreadable_backend_degrades_and_writes_do_not_block_memory() {
    let mut store = ConversationStore::load(BrokenKvStore);
    assert!(store.conversations().is_empty());

    let conv = store.create_conversation();
    assert!(store.select_conversation(&conv.id));
    let msg = store.append_message(Role::User, "still works").unwrap();

    let current = store.current_conversation().unwrap();
    assert_eq!(current.messages[0].id, msg.id);
    assert_eq!(current.title, "still works");
}
