//! Reusable UI components.
//!
//! # Components
//!
//! - [`Button`]: Clickable button with variants
//! - [`icons`]: SVG icon markup

mod button;
pub mod icons;

pub use button::{Button, ButtonSize, ButtonVariant};
