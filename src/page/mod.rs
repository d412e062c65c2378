//! Stateful handlers for the rest of the landing page. Each one is independent
//! of the chat and theme controllers.

pub mod contact;
pub mod images;
pub mod mobile_menu;
pub mod navbar;
pub mod reveal;
pub mod scroll_top;
pub mod tabs;

/// Where a document click landed relative to a popup and its toggle button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Panel,
    ToggleButton,
    Outside,
}
