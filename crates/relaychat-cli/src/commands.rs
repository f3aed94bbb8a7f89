/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Quit the application.
    Quit,
    /// Start a fresh conversation.
    NewConversation,
    /// List saved conversations, newest first.
    ListConversations,
    /// Select a conversation by id (or unique id prefix).
    SwitchConversation(String),
    /// Delete a conversation by id (or unique id prefix).
    DeleteConversation(String),
    /// Delete every saved conversation.
    ClearAll,
    /// List conversations whose title or messages match.
    Search(String),
    /// Print the messages of the current conversation.
    ShowHistory,
    /// Re-send the last user message.
    Retry,
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/new" => CommandResult::NewConversation,
        "/list" | "/conversations" => CommandResult::ListConversations,
        "/history" => CommandResult::ShowHistory,
        "/clear-all" => CommandResult::ClearAll,
        "/retry" | "/r" => CommandResult::Retry,
        "/switch" | "/open" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /switch <conversation-id>".into())
            } else {
                CommandResult::SwitchConversation(arg.to_string())
            }
        }
        "/delete" | "/rm" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /delete <conversation-id>".into())
            } else {
                CommandResult::DeleteConversation(arg.to_string())
            }
        }
        // An empty query lists everything, same as /list
        "/search" | "/find" => CommandResult::Search(arg.to_string()),
        "/version" => CommandResult::Message(format!("relaychat v{}", env!("CARGO_PKG_VERSION"))),

        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ relaychat commands ───────────────────────────────────────────╮

  CONVERSATIONS
    /new                      Start a fresh conversation
    /list, /conversations     List saved conversations
    /switch <id>              Switch to a conversation (id prefix ok)
    /delete <id>              Delete a conversation (id prefix ok)
    /search <text>            Find conversations by title or message
    /history                  Show the current conversation
    /clear-all                Delete every saved conversation

  MESSAGES
    <text>                    Send a message to the relay
    /retry, /r                Re-send the last message

  OTHER
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          Quit the application

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
