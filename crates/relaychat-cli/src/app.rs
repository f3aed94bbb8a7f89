use anyhow::{Context, Result};
use chrono::Utc;
use relaychat_core::{
    ChatSession, Conversation, ConversationStore, FileKvStore, KeyValueStore, MemoryKvStore,
    RelayClient, SendOutcome, Settings,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{self, CommandResult};
use crate::display;

pub type Session = ChatSession<Arc<dyn KeyValueStore>, RelayClient>;

/// Build a session from settings. `ephemeral` keeps state in memory only.
pub fn build_session(settings: &Settings, ephemeral: bool) -> Result<Session> {
    let kv: Arc<dyn KeyValueStore> = if ephemeral {
        Arc::new(MemoryKvStore::new())
    } else {
        let dir = settings.data_dir()?;
        Arc::new(
            FileKvStore::with_dir(&dir)
                .with_context(|| format!("opening data directory {}", dir.display()))?,
        )
    };

    tracing::info!(relay = %settings.relay.url, ephemeral, "Starting session");
    let store = ConversationStore::load(kv);
    let client = RelayClient::new(settings.relay.url.clone());
    Ok(ChatSession::new(store, client))
}

/// Resolve a full id or a unique id prefix to a conversation id.
pub fn resolve_conversation_id(conversations: &[Conversation], needle: &str) -> Option<String> {
    if let Some(exact) = conversations.iter().find(|c| c.id == needle) {
        return Some(exact.id.clone());
    }
    let mut matches = conversations.iter().filter(|c| c.id.starts_with(needle));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only.id.clone()),
        _ => None,
    }
}

// ── Single-prompt mode ──────────────────────────────────────────────────

pub async fn run_single_prompt(session: &Session, prompt: &str) -> Result<()> {
    match session.send_message(prompt).await {
        SendOutcome::Answered { answer } => println!("{answer}"),
        SendOutcome::Failed { error } => anyhow::bail!("{error}"),
        SendOutcome::Ignored => anyhow::bail!("Prompt is empty"),
        SendOutcome::Dropped => anyhow::bail!("Another request is still in progress"),
    }
    Ok(())
}

// ── Interactive loop ────────────────────────────────────────────────────

pub async fn run_repl(session: &Session) -> Result<()> {
    println!("relaychat v{} - type /help for commands", env!("CARGO_PKG_VERSION"));
    print_history(session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match commands::handle_command(&line) {
            CommandResult::Quit => break,
            CommandResult::Message(msg) => println!("{msg}"),
            CommandResult::NewConversation => {
                let conversation = session.with_store(|store| {
                    let conversation = store.create_conversation();
                    store.select_conversation(&conversation.id);
                    conversation
                });
                println!("Started conversation {}", display::short_id(&conversation.id));
            }
            CommandResult::ListConversations => print_conversations(session, ""),
            CommandResult::Search(query) => print_conversations(session, &query),
            CommandResult::ShowHistory => print_history(session),
            CommandResult::SwitchConversation(needle) => {
                let switched = session.with_store(|store| {
                    resolve_conversation_id(store.conversations(), &needle)
                        .map(|id| store.select_conversation(&id))
                        .unwrap_or(false)
                });
                if switched {
                    print_history(session);
                } else {
                    println!("No single conversation matches '{needle}'");
                }
            }
            CommandResult::DeleteConversation(needle) => {
                let deleted = session.with_store(|store| {
                    let id = resolve_conversation_id(store.conversations(), &needle)?;
                    store.delete_conversation(&id).then_some(id)
                });
                match deleted {
                    Some(id) => println!("Deleted conversation {}", display::short_id(&id)),
                    None => println!("No single conversation matches '{needle}'"),
                }
            }
            CommandResult::ClearAll => {
                session.with_store(|store| store.clear());
                println!("Deleted all conversations");
            }
            CommandResult::Retry => {
                let outcome = session.retry().await;
                report(session, outcome);
            }
            CommandResult::NotACommand => {
                println!("  … Thinking...");
                let outcome = session.send_message(&line).await;
                report(session, outcome);
            }
        }
    }

    Ok(())
}

fn report(session: &Session, outcome: SendOutcome) {
    match outcome {
        SendOutcome::Answered { .. } | SendOutcome::Failed { .. } => {
            let last = session.with_store(|store| {
                store
                    .current_conversation()
                    .and_then(|c| c.messages.last().cloned())
            });
            if let Some(message) = last {
                println!("{}", display::render_message(&message));
            }
        }
        SendOutcome::Ignored => println!("Nothing to send"),
        SendOutcome::Dropped => println!("Still waiting for the previous answer"),
    }
}

fn print_history(session: &Session) {
    session.with_store(|store| match store.current_conversation() {
        Some(conversation) => {
            println!("── {} ──", conversation.title);
            if conversation.messages.is_empty() {
                println!("Start the conversation: type a message below");
            }
            for message in &conversation.messages {
                println!("{}", display::render_message(message));
            }
        }
        None => println!("No conversation selected. Type a message to start one."),
    });
}

fn print_conversations(session: &Session, query: &str) {
    let now = Utc::now();
    session.with_store(|store| {
        let current = store.current_conversation_id().map(str::to_string);
        let hits = store.filter_conversations(query);
        if hits.is_empty() {
            if query.trim().is_empty() {
                println!("No conversations yet");
            } else {
                println!("No conversations found");
            }
            return;
        }
        for conversation in hits {
            let is_current = current.as_deref() == Some(conversation.id.as_str());
            println!(
                "{}",
                display::render_conversation_line(conversation, is_current, now)
            );
        }
    });
}
