pub mod error;
pub mod constants;
pub mod config;
pub mod conversation;
pub mod gateway;
pub mod session;

// Re-export key types
pub use error::{ChatError, GatewayError};
pub use config::Settings;
pub use conversation::{
    Conversation, ConversationStore, FileKvStore, KeyValueStore, MemoryKvStore, Message, Role,
};
pub use gateway::{AnswerSource, RelayClient, ServerReply};
pub use session::{ChatSession, SendOutcome};
