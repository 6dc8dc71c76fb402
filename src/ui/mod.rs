//! HTML rendering of the conversation.
//!
//! Everything here is a pure function of [`ConversationState`] (and the UI
//! section of the configuration). The server renders the full page once and
//! then pushes the [`render_conversation`] and [`render_composer_action`]
//! fragments over SSE whenever the store changes; htmx swaps them in place.
//!
//! # Structure
//!
//! - [`components`]: Buttons and icons
//! - [`chat`]: Chat layout pieces (shell, header, message list, composer)

pub mod chat;
pub mod components;

use crate::config::UiConfig;
use crate::conversation::ConversationState;

/// SSE event name carrying the message list fragment.
pub const CONVERSATION_EVENT: &str = "conversation";
/// SSE event name carrying the composer action fragment.
pub const COMPOSER_EVENT: &str = "composer";

/// Escape text for use in HTML content and attribute values.
///
/// Carriage returns are dropped; newlines are kept and rendered by
/// `whitespace-pre-wrap`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Full HTML document for `GET /`.
pub fn render_page(state: &ConversationState, ui: &UiConfig) -> String {
    chat::html_document(&ui.title, &chat::chat_shell(state, &ui.title))
}

/// Error banner plus message list.
pub fn render_conversation(state: &ConversationState) -> String {
    let mut html = chat::error_banner(state.error.as_deref());
    html.push_str(&chat::message_items(state));
    html
}

/// Send button while idle, stop button while a request is in flight.
pub fn render_composer_action(state: &ConversationState) -> String {
    chat::composer_action(state.is_loading)
}
