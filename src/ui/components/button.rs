//! Button component with variants and sizes.

use std::fmt::Write as _;

/// Button visual variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    /// Primary action button.
    #[default]
    Primary,
    /// Subtle ghost button.
    Ghost,
    /// Destructive action button.
    Destructive,
}

impl ButtonVariant {
    /// Get CSS classes for this variant.
    #[must_use]
    pub fn classes(self) -> &'static str {
        match self {
            Self::Primary => "bg-blue-600 text-white hover:bg-blue-700",
            Self::Ghost => "bg-transparent text-gray-600 hover:bg-gray-100",
            Self::Destructive => "bg-red-500 text-white hover:bg-red-600",
        }
    }
}

/// Button size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonSize {
    /// Small button.
    Sm,
    /// Medium button (default).
    #[default]
    Md,
    /// Icon-only button.
    Icon,
}

impl ButtonSize {
    /// Get CSS classes for this size.
    #[must_use]
    pub fn classes(self) -> &'static str {
        match self {
            Self::Sm => "h-8 px-3 text-xs",
            Self::Md => "h-10 px-4 text-sm",
            Self::Icon => "h-10 w-10",
        }
    }
}

/// Button markup builder.
///
/// # Example
///
/// ```rust
/// use local_llm_chat::ui::components::{Button, ButtonVariant};
///
/// let html = Button::new("Send")
///     .variant(ButtonVariant::Primary)
///     .button_type("submit")
///     .render();
/// assert!(html.contains(r#"type="submit""#));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Button {
    variant: ButtonVariant,
    size: ButtonSize,
    button_type: &'static str,
    class: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: String,
}

impl Button {
    /// Create a button around pre-rendered `children` markup.
    pub fn new(children: impl Into<String>) -> Self {
        Self {
            button_type: "button",
            children: children.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub fn size(mut self, size: ButtonSize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn button_type(mut self, button_type: &'static str) -> Self {
        self.button_type = button_type;
        self
    }

    #[must_use]
    pub fn class(mut self, class: &'static str) -> Self {
        self.class = class;
        self
    }

    /// Add an attribute. The value is escaped.
    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// Render to HTML.
    pub fn render(&self) -> String {
        let base_classes = "inline-flex items-center justify-center rounded-lg font-medium \
                            transition-colors focus-visible:outline-none focus-visible:ring-2 \
                            focus-visible:ring-blue-500 focus-visible:ring-offset-2 \
                            disabled:pointer-events-none disabled:opacity-50";

        let mut attrs = String::new();
        for (name, value) in &self.attrs {
            let _ = write!(attrs, r#" {name}="{}""#, crate::ui::escape_html(value));
        }

        format!(
            r#"<button type="{}" class="{} {} {} {}"{}>{}</button>"#,
            self.button_type,
            base_classes,
            self.variant.classes(),
            self.size.classes(),
            self.class,
            attrs,
            self.children
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_are_escaped() {
        let html = Button::new("x")
            .attr("aria-label", r#"Say "hi""#)
            .size(ButtonSize::Icon)
            .render();
        assert!(html.contains(r#"aria-label="Say &quot;hi&quot;""#));
        assert!(html.contains("h-10 w-10"));
        assert!(html.starts_with(r#"<button type="button""#));
    }
}
