use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use eclick_site::theme::{Theme, ThemeCommands, ThemeController, ThemeStore, ThemeSurface};

#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<HashMap<String, String>>>);

impl ThemeStore for SharedStore {
    fn load(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

#[derive(Clone, Default)]
struct RecordingSurface {
    prefers_dark: bool,
    renders: Rc<RefCell<Vec<Theme>>>,
}

impl ThemeSurface for RecordingSurface {
    fn render(&self, theme: Theme) {
        self.renders.borrow_mut().push(theme);
    }

    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }
}

type Fixture = (
    ThemeController<SharedStore, RecordingSurface>,
    SharedStore,
    RecordingSurface,
);

fn setup(stored: Option<&str>, prefers_dark: bool) -> Fixture {
    let store = SharedStore::default();
    if let Some(value) = stored {
        store.save("theme", value);
    }
    let surface = RecordingSurface {
        prefers_dark,
        ..Default::default()
    };
    let controller = ThemeController::init(store.clone(), surface.clone(), "theme");
    (controller, store, surface)
}

#[test]
fn first_visit_follows_the_system_scheme_without_persisting() {
    let (theme, store, surface) = setup(None, true);

    assert_eq!(theme.current(), Theme::Dark);
    assert_eq!(*surface.renders.borrow(), vec![Theme::Dark]);
    assert_eq!(store.load("theme"), None);
    assert!(!theme.has_stored_preference());
}

#[test]
fn stored_light_beats_a_dark_system() {
    let (theme, _, surface) = setup(Some("light"), true);

    assert_eq!(theme.current(), Theme::Light);
    assert_eq!(*surface.renders.borrow(), vec![Theme::Light]);
}

#[test]
fn toggle_twice_restores_and_persists() {
    let (theme, store, surface) = setup(None, false);

    assert_eq!(theme.toggle(), Theme::Dark);
    assert_eq!(store.load("theme").as_deref(), Some("dark"));
    assert_eq!(theme.toggle(), Theme::Light);
    assert_eq!(store.load("theme").as_deref(), Some("light"));
    assert_eq!(*surface.renders.borrow(), vec![Theme::Light, Theme::Dark, Theme::Light]);
}

#[test]
fn applying_the_current_theme_again_renders_nothing() {
    let (theme, _, surface) = setup(None, false);

    theme.apply(Theme::Light);
    theme.apply(Theme::Light);

    assert_eq!(surface.renders.borrow().len(), 1);
}

#[test]
fn system_changes_only_matter_without_a_preference() {
    let (theme, _, _) = setup(None, false);
    theme.on_ambient_change(true);
    assert_eq!(theme.current(), Theme::Dark);

    let (theme, _, surface) = setup(Some("light"), false);
    theme.on_ambient_change(true);
    assert_eq!(theme.current(), Theme::Light);
    assert_eq!(surface.renders.borrow().len(), 1);
}

#[test]
fn chat_commands_persist_like_the_toggle() {
    let (theme, store, _) = setup(None, false);

    theme.set_preference(Theme::Dark);

    assert_eq!(theme.current(), Theme::Dark);
    assert_eq!(store.load("theme").as_deref(), Some("dark"));
    assert!(theme.has_stored_preference());
}

#[test]
fn garbage_in_storage_falls_back_to_the_system() {
    let (theme, _, _) = setup(Some("sepia"), true);

    assert_eq!(theme.current(), Theme::Dark);
    assert!(!theme.has_stored_preference());
}
