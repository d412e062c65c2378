use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::WidgetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(WidgetError::Config(format!("unknown theme '{}'", other))),
        }
    }
}

/// Key-value storage that outlives the page (local storage in the browser).
#[cfg_attr(test, mockall::automock)]
pub trait ThemeStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
}

/// The document side of theming.
#[cfg_attr(test, mockall::automock)]
pub trait ThemeSurface {
    /// Sets the root `dark` class and swaps the sun/moon icons.
    fn render(&self, theme: Theme);
    /// The platform's ambient colour-scheme signal.
    fn prefers_dark(&self) -> bool;
}

/// What the chat widget needs from the theme controller.
pub trait ThemeCommands {
    fn set_preference(&self, theme: Theme);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThemeStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

pub struct ThemeController<S, A> {
    store: S,
    surface: A,
    key: String,
    current: Cell<Theme>,
    rendered: Cell<Option<Theme>>,
}

impl<S: ThemeStore, A: ThemeSurface> ThemeController<S, A> {
    /// Resolves the starting theme (stored preference, else ambient signal) and applies it.
    pub fn init(store: S, surface: A, key: impl Into<String>) -> Self {
        let key = key.into();
        let initial = Self::stored(&store, &key)
            .unwrap_or_else(|| Theme::from_prefers_dark(surface.prefers_dark()));
        let controller = Self {
            store,
            surface,
            key,
            current: Cell::new(initial),
            rendered: Cell::new(None),
        };
        controller.apply(initial);
        controller
    }

    fn stored(store: &S, key: &str) -> Option<Theme> {
        let raw = store.load(key)?;
        match raw.parse() {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::warn!("Ignoring stored theme: {}", e);
                None
            }
        }
    }

    pub fn current(&self) -> Theme {
        self.current.get()
    }

    pub fn has_stored_preference(&self) -> bool {
        Self::stored(&self.store, &self.key).is_some()
    }

    /// Renders `theme`. Re-applying the rendered theme touches nothing.
    pub fn apply(&self, theme: Theme) {
        self.current.set(theme);
        if self.rendered.get() == Some(theme) {
            return;
        }
        self.surface.render(theme);
        self.rendered.set(Some(theme));
        tracing::debug!("Applied {} theme", theme);
    }

    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set_preference(next);
        next
    }

    /// Follows the ambient colour scheme unless the user picked a theme.
    pub fn on_ambient_change(&self, prefers_dark: bool) {
        if self.has_stored_preference() {
            return;
        }
        self.apply(Theme::from_prefers_dark(prefers_dark));
    }
}

impl<S: ThemeStore, A: ThemeSurface> ThemeCommands for ThemeController<S, A> {
    fn set_preference(&self, theme: Theme) {
        self.store.save(&self.key, theme.as_str());
        self.apply(theme);
    }
}
