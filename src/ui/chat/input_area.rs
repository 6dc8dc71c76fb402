//! Chat input area component.

use crate::ui::COMPOSER_EVENT;
use crate::ui::components::icons::{send_icon, stop_icon};
use crate::ui::components::{Button, ButtonSize, ButtonVariant};

/// Marks the stop button so the composer can find it.
const STOP_ACTION: &str = "stop";

/// Enter submits a non-blank message, or stops the reply while one is
/// streaming. Shift+Enter inserts a newline.
const ENTER_TO_SUBMIT: &str = "if (event.key === 'Enter' && !event.shiftKey) { \
     event.preventDefault(); \
     const stop = this.form.querySelector('[data-action=stop]'); \
     if (stop) stop.click(); else if (this.value.trim()) this.form.requestSubmit(); }";

/// Clears the draft only after the form's own submission succeeded.
const RESET_AFTER_SUBMIT: &str =
    "if (event.detail.successful && event.detail.elt === this) this.reset()";

/// Composer form. `action` is the initial content of the action slot.
pub fn chat_input_area(action: &str) -> String {
    format!(
        r#"<div class="border-t border-gray-200 p-4 bg-white">
        <form class="flex gap-2" hx-post="/api/conversation/messages" hx-trigger="submit" hx-swap="none" hx-on::after-request="{RESET_AFTER_SUBMIT}">
            <div class="flex-1 relative">
                <textarea name="message" placeholder="Type your message..." rows="1" required
                    class="w-full min-h-[44px] max-h-[200px] px-4 py-3 rounded-xl border border-gray-300 bg-white resize-none focus:outline-none focus:ring-2 focus:ring-blue-500 focus:border-transparent"
                    hx-on:keydown="{ENTER_TO_SUBMIT}"></textarea>
            </div>
            <div id="composer-action" class="shrink-0" sse-swap="{COMPOSER_EVENT}" hx-swap="innerHTML">{action}</div>
        </form>
        <p class="text-xs text-gray-500 mt-2 text-center">Press Enter to send, Shift+Enter for new line</p>
    </div>"#
    )
}

/// Send button while idle, stop button while loading.
pub fn composer_action(is_loading: bool) -> String {
    if is_loading {
        Button::new(format!("{}<span class=\"sr-only\">Stop</span>", stop_icon("h-5 w-5")))
            .variant(ButtonVariant::Destructive)
            .size(ButtonSize::Icon)
            .class("h-11 w-11 rounded-xl")
            .attr("hx-post", "/api/conversation/cancel")
            .attr("hx-swap", "none")
            .attr("title", "Stop generating")
            .attr("data-action", STOP_ACTION)
            .render()
    } else {
        Button::new(format!("{}<span class=\"sr-only\">Send</span>", send_icon("h-5 w-5")))
            .variant(ButtonVariant::Primary)
            .size(ButtonSize::Icon)
            .button_type("submit")
            .class("h-11 w-11 rounded-xl")
            .attr("title", "Send message")
            .render()
    }
}
