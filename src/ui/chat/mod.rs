//! Chat-specific layout pieces.
//!
//! The shell wires the page to the conversation event stream through the
//! htmx SSE extension: the message list listens for
//! [`CONVERSATION_EVENT`](crate::ui::CONVERSATION_EVENT) and the composer
//! action slot for [`COMPOSER_EVENT`](crate::ui::COMPOSER_EVENT).

mod header;
mod input_area;
mod message_list;
mod shell;

pub use header::chat_header;
pub use input_area::{chat_input_area, composer_action};
pub use message_list::{error_banner, format_timestamp, message_item, message_items};
pub use shell::{chat_shell, html_document};
