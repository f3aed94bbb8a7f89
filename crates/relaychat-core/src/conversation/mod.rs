mod types;
mod store;
pub mod persistence;

pub use types::{derive_title, generate_id, Conversation, Message, Role};
pub use store::ConversationStore;
pub use persistence::{FileKvStore, KeyValueStore, MemoryKvStore, PersistedState};
