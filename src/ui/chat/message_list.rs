//! Chat message list component.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};

use crate::conversation::{ChatMessage, ConversationState, MessageRole};
use crate::ui::escape_html;

/// Render a timestamp as `h:mm AM/PM` in local time.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%-I:%M %p").to_string()
}

/// Banner for the store's error slot. Empty when there is no error.
pub fn error_banner(error: Option<&str>) -> String {
    match error {
        Some(message) => format!(
            r#"<div class="rounded-lg border border-red-200 bg-red-50 px-4 py-3 text-sm text-red-700" role="alert">{}</div>"#,
            escape_html(message)
        ),
        None => String::new(),
    }
}

/// All messages in display order.
pub fn message_items(state: &ConversationState) -> String {
    let mut html = String::new();
    for message in &state.messages {
        html.push_str(&message_item(message));
    }
    html
}

/// A single message bubble.
///
/// User messages sit on the right, assistant messages on the left and
/// system messages centered. A streaming assistant message with no content
/// yet shows a typing indicator instead of text.
pub fn message_item(message: &ChatMessage) -> String {
    let (row, bubble) = match message.role {
        MessageRole::User => ("justify-end", "bg-blue-600 text-white"),
        MessageRole::Assistant => ("justify-start", "bg-gray-100 text-gray-900"),
        MessageRole::System => ("justify-center", "bg-yellow-50 text-gray-700 text-xs"),
    };

    let body = if message.is_streaming && message.content.is_empty() {
        typing_indicator()
    } else {
        format!(
            r#"<div class="whitespace-pre-wrap break-words">{}</div>"#,
            escape_html(&message.content)
        )
    };

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div id="message-{id}" class="flex {row}" data-role="{role}"><div class="max-w-[80%] rounded-2xl px-4 py-2 {bubble}">{body}<div class="mt-1 text-[10px] opacity-70">{time}</div></div></div>"#,
        id = message.id,
        role = message.role.as_str(),
        time = format_timestamp(&message.timestamp),
    );
    html
}

fn typing_indicator() -> String {
    r#"<div class="typing-indicator flex gap-1 py-1" aria-label="Assistant is typing"><span class="typing-dot h-2 w-2 rounded-full bg-gray-400"></span><span class="typing-dot h-2 w-2 rounded-full bg-gray-400"></span><span class="typing-dot h-2 w-2 rounded-full bg-gray-400"></span></div>"#
        .to_string()
}
