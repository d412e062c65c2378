//! Browser adapters. Everything here is thin DOM plumbing around the
//! controllers in [`crate::chat`], [`crate::theme`] and [`crate::page`].

mod chat;
mod page;

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, MediaQueryListEvent, Node};

use crate::chat::view::Timer;
use crate::config::{data_attribute, WidgetConfig};
use crate::logging;
use crate::theme::{ThemeController, ThemeStore, ThemeSurface, Theme};

pub use chat::{mount_chat, DomChatView};
pub use page::mount_page;

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

pub type SiteTheme = ThemeController<LocalStorageStore, DocumentThemeSurface>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let config = match page_config() {
        Ok(config) => {
            logging::init(&config.log_filter);
            config
        }
        Err(e) => {
            logging::init(logging::DEFAULT_FILTER);
            tracing::error!("Ignoring widget settings: {:#}", e);
            WidgetConfig {
                backend_url: origin().unwrap_or_else(|| WidgetConfig::default().backend_url),
                ..WidgetConfig::default()
            }
        }
    };
    let theme = mount_theme(&config);
    mount_chat(config.clone(), theme)?;
    mount_page(&config)?;
    Ok(())
}

fn origin() -> Option<String> {
    web_sys::window().and_then(|w| w.location().origin().ok())
}

/// Settings come from `data-*` attributes on `#chatbot-window`, then on
/// `<html>`. The backend defaults to the page origin.
fn page_config() -> anyhow::Result<WidgetConfig> {
    let hosts: Vec<Element> = [
        by_id("chatbot-window"),
        document().and_then(|d| d.document_element()),
    ]
    .into_iter()
    .flatten()
    .collect();
    let origin = origin();
    WidgetConfig::from_lookup(|key| {
        let attribute = data_attribute(key);
        hosts
            .iter()
            .find_map(|host| host.get_attribute(&attribute))
            .or_else(|| (key == "SITE_BACKEND_URL").then(|| origin.clone()).flatten())
    })
}

pub(crate) fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

pub(crate) fn by_id(id: &str) -> Option<Element> {
    document().and_then(|d| d.get_element_by_id(id))
}

pub(crate) fn is_dark() -> bool {
    document()
        .and_then(|d| d.document_element())
        .map(|root| root.class_list().contains("dark"))
        .unwrap_or(false)
}

/// Adds and removes classes in one go; missing elements are skipped.
pub(crate) fn swap_classes(element: &Element, add: &[&str], remove: &[&str]) {
    let list = element.class_list();
    for class in remove {
        let _ = list.remove_1(class);
    }
    for class in add {
        let _ = list.add_1(class);
    }
}

pub(crate) fn listen<F>(target: &EventTarget, event: &str, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let callback = closure.as_ref().unchecked_ref();
    if let Err(e) = target.add_event_listener_with_callback(event, callback) {
        tracing::error!("Failed to attach {} listener: {:?}", event, e);
    }
    closure.forget();
}

/// Whether the event target sits inside `container`.
pub(crate) fn event_inside(event: &Event, container: &Element) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<Node>().ok())
        .map(|node| container.contains(Some(&node)))
        .unwrap_or(false)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTimer;

impl Timer for GlooTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        gloo_timers::future::sleep(duration)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

impl ThemeStore for LocalStorageStore {
    fn load(&self, key: &str) -> Option<String> {
        let storage = web_sys::window()?.local_storage().ok().flatten()?;
        storage.get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, value: &str) {
        if let Some(Ok(Some(storage))) = web_sys::window().map(|w| w.local_storage()) {
            if let Err(e) = storage.set_item(key, value) {
                tracing::error!("Failed to persist {}: {:?}", key, e);
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentThemeSurface;

impl ThemeSurface for DocumentThemeSurface {
    fn render(&self, theme: Theme) {
        let dark = theme == Theme::Dark;
        if let Some(root) = document().and_then(|d| d.document_element()) {
            let _ = root.class_list().toggle_with_force("dark", dark);
        }

        if let (Some(sun), Some(moon)) = (by_id("sun-icon"), by_id("moon-icon")) {
            let _ = sun.class_list().toggle_with_force("opacity-100", dark);
            let _ = sun.class_list().toggle_with_force("opacity-0", !dark);
            let _ = moon.class_list().toggle_with_force("opacity-0", dark);
            let _ = moon.class_list().toggle_with_force("opacity-100", !dark);
        }

        if let Some(toggle) = by_id("mobile-theme-toggle") {
            let sun = toggle.query_selector("svg:first-child").ok().flatten();
            let moon = toggle.query_selector("svg:last-child").ok().flatten();
            if let (Some(sun), Some(moon)) = (sun, moon) {
                let _ = sun.class_list().toggle_with_force("hidden", !dark);
                let _ = sun.class_list().toggle_with_force("block", dark);
                let _ = moon.class_list().toggle_with_force("hidden", dark);
                let _ = moon.class_list().toggle_with_force("block", !dark);
            }
        }
    }

    fn prefers_dark(&self) -> bool {
        web_sys::window()
            .and_then(|w| w.match_media(DARK_QUERY).ok().flatten())
            .map(|mql| mql.matches())
            .unwrap_or(false)
    }
}

/// Applies the initial theme and wires both toggle buttons and the ambient
/// colour-scheme listener.
pub fn mount_theme(config: &WidgetConfig) -> Rc<SiteTheme> {
    let theme = Rc::new(ThemeController::init(
        LocalStorageStore,
        DocumentThemeSurface,
        config.theme_key.clone(),
    ));

    for id in ["theme-toggle", "mobile-theme-toggle"] {
        if let Some(button) = by_id(id) {
            let theme = theme.clone();
            listen(&button, "click", move |_| {
                theme.toggle();
            });
        }
    }

    if let Some(mql) = web_sys::window().and_then(|w| w.match_media(DARK_QUERY).ok().flatten()) {
        let theme = theme.clone();
        listen(&mql, "change", move |event| {
            if let Ok(event) = event.dyn_into::<MediaQueryListEvent>() {
                theme.on_ambient_change(event.matches());
            }
        });
    }

    theme
}
