//! Chat header component.

use crate::ui::components::icons::{sparkles_icon, trash_icon};
use crate::ui::components::{Button, ButtonSize, ButtonVariant};
use crate::ui::escape_html;

/// Header with the configured title and the clear-conversation action.
pub fn chat_header(title: &str) -> String {
    let clear = Button::new(format!("{}<span>Clear</span>", trash_icon("mr-1")))
        .variant(ButtonVariant::Ghost)
        .size(ButtonSize::Sm)
        .attr("hx-post", "/api/conversation/reset")
        .attr("hx-swap", "none")
        .attr("title", "Clear conversation")
        .render();

    format!(
        r#"<header class="flex items-center justify-between px-4 py-3 border-b border-gray-200">
        <div class="flex items-center gap-2">
            {icon}
            <h1 class="font-semibold text-gray-900">{title}</h1>
        </div>
        {clear}
    </header>"#,
        icon = sparkles_icon("text-blue-600"),
        title = escape_html(title),
    )
}
