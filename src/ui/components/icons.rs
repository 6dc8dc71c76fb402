//! SVG icon components.
//!
//! Icons are rendered inline as SVG elements so they inherit `currentColor`.

/// Common icon size class.
const ICON_SIZE: &str = "h-4 w-4";

fn svg(class: &str, body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="{ICON_SIZE} {class}" aria-hidden="true">{body}</svg>"#
    )
}

/// Send/paper-plane icon.
pub fn send_icon(class: &str) -> String {
    svg(
        class,
        r#"<line x1="22" y1="2" x2="11" y2="13" /><polygon points="22 2 15 22 11 13 2 9 22 2" />"#,
    )
}

/// Stop/square icon.
pub fn stop_icon(class: &str) -> String {
    svg(class, r#"<rect x="6" y="6" width="12" height="12" rx="2" ry="2" />"#)
}

/// Trash icon.
pub fn trash_icon(class: &str) -> String {
    svg(
        class,
        r#"<path d="M3 6h18" /><path d="M19 6v14a2 2 0 0 1-2 2H7a2 2 0 0 1-2-2V6" /><path d="M8 6V4a2 2 0 0 1 2-2h4a2 2 0 0 1 2 2v2" />"#,
    )
}

/// Sparkles icon.
pub fn sparkles_icon(class: &str) -> String {
    svg(
        class,
        r#"<path d="m12 3-1.912 5.813a2 2 0 0 1-1.275 1.275L3 12l5.813 1.912a2 2 0 0 1 1.275 1.275L12 21l1.912-5.813a2 2 0 0 1 1.275-1.275L21 12l-5.813-1.912a2 2 0 0 1-1.275-1.275L12 3Z" />"#,
    )
}
