//! Client-side behaviour for the E-click marketing site: the support chat
//! widget, the theme switcher and the landing-page interactions.
//!
//! The controllers here talk to the page only through small traits
//! ([`chat::ChatView`], [`theme::ThemeSurface`], [`page::contact::ContactView`]),
//! so they run unchanged in the browser (see `web`) and in native tests.

pub mod chat;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod page;
pub mod theme;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::WidgetConfig;
pub use dispatch::{Dispatch, Ignored};
pub use error::WidgetError;
