//! Page document and chat shell layout.

use crate::conversation::ConversationState;
use crate::ui::{COMPOSER_EVENT, CONVERSATION_EVENT, escape_html};

use super::{chat_header, chat_input_area, composer_action, error_banner, message_items};

/// Route the page subscribes to for live updates.
const EVENTS_URL: &str = "/api/conversation/events";

/// Full HTML document around `content`.
pub fn html_document(title: &str, content: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Streaming chat with a local language model">
    <title>{title}</title>

    <script src="https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js"></script>
    <script src="https://unpkg.com/htmx-ext-sse@2.2.2/sse.js"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .typing-dot {{ animation: typing 1.2s infinite ease-in-out; }}
        .typing-dot:nth-child(2) {{ animation-delay: 0.2s; }}
        .typing-dot:nth-child(3) {{ animation-delay: 0.4s; }}
        @keyframes typing {{ 0%, 80%, 100% {{ opacity: 0.3; }} 40% {{ opacity: 1; }} }}
    </style>
</head>
<body class="min-h-screen bg-gray-50 text-gray-900 antialiased">
    <main id="app" class="container mx-auto px-4 py-4 md:py-8 max-w-3xl">
        {content}
    </main>
</body>
</html>"#
    )
}

/// Complete chat interface: header, live message list and composer.
pub fn chat_shell(state: &ConversationState, title: &str) -> String {
    format!(
        r#"<div class="chat-shell flex flex-col h-[calc(100vh-4rem)] bg-white border border-gray-200 rounded-2xl overflow-hidden shadow-sm" hx-ext="sse" sse-connect="{EVENTS_URL}">
    {header}
    <div id="messages" class="flex-1 overflow-y-auto p-4 space-y-4" sse-swap="{CONVERSATION_EVENT}" hx-swap="innerHTML" aria-live="polite" aria-label="Chat messages">{error}{messages}</div>
    {composer}
</div>"#,
        header = chat_header(title),
        error = error_banner(state.error.as_deref()),
        messages = message_items(state),
        composer = chat_input_area(&composer_action(state.is_loading)),
    )
}
