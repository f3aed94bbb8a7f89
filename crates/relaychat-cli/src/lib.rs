// Library interface for relaychat-cli
// The binary and the integration tests both go through these modules.

pub mod app;
pub mod commands;
pub mod display;

// Re-export commonly used items for easier testing
pub use commands::{handle_command, CommandResult};
