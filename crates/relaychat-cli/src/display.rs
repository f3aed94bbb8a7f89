use chrono::{DateTime, Local, Utc};
use relaychat_core::{Conversation, Message, Role};

/// Short relative age: `Just now`, `5m ago`, `3h ago`, `2d ago`, else `Mar 4`.
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{mins}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        then.with_timezone(&Local).format("%b %-d").to_string()
    }
}

/// Clock time of a message, e.g. `3:07 PM`.
pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-I:%M %p").to_string()
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn render_message(message: &Message) -> String {
    match message.role {
        Role::Thinking => "  … Thinking...".to_string(),
        Role::User | Role::Bot => format!(
            "{} · {}\n  {}",
            message.role.as_str(),
            format_time(message.timestamp),
            indent(&message.text)
        ),
        Role::Error => format!(
            "{} · {}\n  {}\n  (type /retry to send it again)",
            message.role.as_str(),
            format_time(message.timestamp),
            indent(&message.text)
        ),
    }
}

pub fn render_conversation_line(
    conversation: &Conversation,
    is_current: bool,
    now: DateTime<Utc>,
) -> String {
    format!(
        "{} {}  {}  ({})",
        if is_current { "*" } else { " " },
        short_id(&conversation.id),
        conversation.title,
        format_relative(conversation.updated_at, now)
    )
}

fn indent(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join("\n  ")
}
