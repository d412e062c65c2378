use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys;
use web_sys::{
    Element, FormData, HtmlElement, HtmlFormElement, HtmlInputElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollToOptions,
};

use super::{by_id, document, event_inside, listen, swap_classes};
use crate::chat::HttpBackend;
use crate::config::WidgetConfig;
use crate::page::contact::{ContactForm, ContactSubmission, ContactView};
use crate::page::images::LogoState;
use crate::page::mobile_menu::MobileMenu;
use crate::page::navbar::{anchor_scroll_top, NavbarTracker, NavbarUpdate, SectionRect};
use crate::page::reveal::{RevealTracker, ROOT_MARGIN, THRESHOLD};
use crate::page::scroll_top::ScrollTopButton;
use crate::page::tabs::TabGroup;
use crate::page::ClickTarget;

fn query_all(root: Option<&Element>, selector: &str) -> Vec<Element> {
    let list = match root {
        Some(root) => root.query_selector_all(selector),
        None => match document() {
            Some(doc) => doc.query_selector_all(selector),
            None => return Vec::new(),
        },
    };
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn scroll_y() -> f64 {
    web_sys::window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0)
}

fn smooth_scroll_to(top: f64) {
    if let Some(window) = web_sys::window() {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        window.scroll_to_with_scroll_to_options(&options);
    }
}

fn set_style(element: &Element, property: &str, value: &str) {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property(property, value);
    }
}

pub fn mount_page(config: &WidgetConfig) -> Result<(), JsValue> {
    mount_navbar();
    mount_anchor_links();
    mount_reveal()?;
    mount_tabs();
    mount_scroll_to_top();
    mount_contact_form(config)?;
    mount_mobile_menu();
    mount_logos();
    Ok(())
}

fn render_navbar(update: &NavbarUpdate) {
    if let Some(scrolled) = update.scrolled {
        if let Some(navbar) = by_id("navbar") {
            let compact = [
                "py-3",
                "backdrop-blur-lg",
                "bg-white/80",
                "dark:bg-gray-900/80",
                "shadow-lg",
            ];
            let expanded = ["py-6", "bg-transparent"];
            if scrolled {
                swap_classes(&navbar, &compact, &expanded);
            } else {
                swap_classes(&navbar, &expanded, &compact);
            }
        }
        if let Some(line) = by_id("navbar-line") {
            let _ = line.class_list().toggle_with_force("opacity-100", scrolled);
        }
    }

    for link in query_all(None, ".nav-link") {
        let active =
            link.get_attribute("data-section").as_deref() == Some(update.active_section.as_str());
        let on = ["text-red-600", "dark:text-red-400"];
        let off = ["text-gray-600", "dark:text-gray-300"];
        if active {
            swap_classes(&link, &on, &off);
        } else {
            swap_classes(&link, &off, &on);
        }
        if let Some(indicator) = link.query_selector(".nav-indicator").ok().flatten() {
            let _ = indicator.class_list().toggle_with_force("opacity-100", active);
        }
    }
}

fn mount_navbar() {
    if by_id("navbar").is_none() {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let tracker = Rc::new(RefCell::new(NavbarTracker::new()));
    listen(&window, "scroll", move |_| {
        if !tracker.borrow_mut().on_scroll() {
            return;
        }
        let tracker = tracker.clone();
        let frame = Closure::once_into_js(move || {
            let sections: Vec<SectionRect> = query_all(None, "section[id]")
                .into_iter()
                .map(|section| {
                    let rect = section.get_bounding_client_rect();
                    SectionRect {
                        id: section.id(),
                        top: rect.top(),
                        bottom: rect.bottom(),
                    }
                })
                .collect();
            let update = tracker.borrow_mut().on_frame(scroll_y(), &sections);
            render_navbar(&update);
        });
        if let Some(window) = web_sys::window() {
            let _ = window.request_animation_frame(frame.unchecked_ref());
        }
    });
}

fn mount_anchor_links() {
    for link in query_all(None, "a[href^=\"#\"]") {
        let href = link.get_attribute("href").unwrap_or_default();
        listen(&link, "click", move |event| {
            event.prevent_default();
            let target = by_id(href.trim_start_matches('#'))
                .and_then(|e| e.dyn_into::<HtmlElement>().ok());
            if let Some(target) = target {
                smooth_scroll_to(anchor_scroll_top(target.offset_top() as f64));
            }
        });
    }
}

fn mount_reveal() -> Result<(), JsValue> {
    let elements = query_all(None, ".reveal-element");
    if elements.is_empty() {
        return Ok(());
    }
    let tracker = Rc::new(RefCell::new(RevealTracker::<String>::new()));
    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let target = entry.target();
                let key = target.get_attribute("data-reveal-key").unwrap_or_default();
                let children = query_all(Some(&target), ".reveal-element");
                let plan = tracker
                    .borrow_mut()
                    .on_intersection(key, entry.is_intersecting(), children.len());
                let Some(plan) = plan else {
                    continue;
                };
                let _ = target.class_list().add_1("revealed");
                for (child, delay) in children.into_iter().zip(plan.child_delays) {
                    Timeout::new(delay.as_millis() as u32, move || {
                        let _ = child.class_list().add_1("revealed");
                    })
                    .forget();
                }
                observer.unobserve(&target);
            }
        },
    );

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(THRESHOLD));
    options.set_root_margin(ROOT_MARGIN);
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    callback.forget();

    for (i, element) in elements.iter().enumerate() {
        let _ = element.set_attribute("data-reveal-key", &i.to_string());
        observer.observe(element);
    }
    Ok(())
}

fn mount_tabs() {
    let triggers = query_all(None, ".tab-trigger");
    if triggers.is_empty() {
        return;
    }
    let panels = query_all(None, ".tab-content");
    let group = Rc::new(RefCell::new(TabGroup::new(
        triggers
            .iter()
            .map(|t| t.get_attribute("data-target").unwrap_or_default())
            .collect(),
        panels.iter().map(|p| p.id()).collect(),
    )));
    let triggers = Rc::new(triggers);
    let panels = Rc::new(panels);

    for (index, trigger) in triggers.iter().enumerate() {
        let group = group.clone();
        let triggers = triggers.clone();
        let panels = panels.clone();
        listen(trigger, "click", move |_| {
            let Some(selection) = group.borrow_mut().select(index) else {
                return;
            };
            let on = [
                "active",
                "text-red-600",
                "dark:text-red-400",
                "border-b-2",
                "border-red-600",
                "dark:border-red-400",
            ];
            let off = ["text-gray-600", "dark:text-gray-400"];
            for (i, t) in triggers.iter().enumerate() {
                if i == selection.active_trigger {
                    swap_classes(t, &on, &off);
                } else {
                    swap_classes(t, &off, &on);
                }
            }
            for panel in panels.iter() {
                let visible = selection.visible_panel.as_deref() == Some(panel.id().as_str());
                let _ = panel.class_list().toggle_with_force("hidden", !visible);
            }
        });
    }
}

fn mount_scroll_to_top() {
    let (Some(button), Some(window)) = (by_id("scroll-to-top"), web_sys::window()) else {
        return;
    };
    let state = Rc::new(RefCell::new(ScrollTopButton::new()));
    {
        let button = button.clone();
        listen(&window, "scroll", move |_| {
            let Some(visible) = state.borrow_mut().on_scroll(scroll_y()) else {
                return;
            };
            let shown = ["opacity-100", "translate-y-0"];
            let hidden = ["opacity-0", "translate-y-10", "pointer-events-none"];
            if visible {
                swap_classes(&button, &shown, &hidden);
            } else {
                swap_classes(&button, &hidden, &shown);
            }
        });
    }
    listen(&button, "click", |_| smooth_scroll_to(0.0));
}

const SEND_LABEL: &str = r#"<svg class="w-5 h-5" fill="none" stroke="currentColor" viewBox="0 0 24 24"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M12 19l9 2-9-18-9 18 9-2zm0 0v-8"></path></svg><span>Send Message</span>"#;
const SENDING_LABEL: &str = r#"<svg class="w-5 h-5 animate-spin" fill="none" stroke="currentColor" viewBox="0 0 24 24"><circle cx="12" cy="12" r="10" stroke="currentColor" stroke-width="4" class="opacity-25"></circle><path fill="currentColor" d="M4 12a8 8 0 018-8V0C5.373 0 0 5.373 0 12h4zm2 5.291A7.962 7.962 0 014 12H0c0 3.042 1.135 5.824 3 7.938l3-2.647z" class="opacity-75"></path></svg><span>Sending...</span>"#;

struct DomContactView {
    form: HtmlFormElement,
}

impl DomContactView {
    fn toggle_hidden(id: &str, hidden: bool) {
        if let Some(element) = by_id(id) {
            let _ = element.class_list().toggle_with_force("hidden", hidden);
        }
    }
}

impl ContactView for DomContactView {
    fn show_captcha_error(&self, message: &str) {
        if let Some(error) = by_id("captcha-error") {
            let _ = error.class_list().remove_1("hidden");
            error.set_text_content(Some(message));
        }
    }

    fn set_sending(&self, sending: bool) {
        if let Some(button) = by_id("submit-btn") {
            let _ = button.toggle_attribute_with_force("disabled", sending);
            button.set_inner_html(if sending { SENDING_LABEL } else { SEND_LABEL });
        }
    }

    fn show_success(&self) {
        Self::toggle_hidden("contact-form-container", true);
        Self::toggle_hidden("success-message", false);
    }

    fn show_error(&self) {
        Self::toggle_hidden("contact-form-container", true);
        Self::toggle_hidden("error-message", false);
    }

    fn reset_captcha(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let reset = js_sys::Reflect::get(&window, &JsValue::from_str("_captchaReset"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        if let Some(reset) = reset {
            let _ = reset.call0(&JsValue::NULL);
        }
    }

    fn reset(&self) {
        self.form.reset();
        Self::toggle_hidden("contact-form-container", false);
        Self::toggle_hidden("success-message", true);
        Self::toggle_hidden("error-message", true);
    }
}

fn form_fields(form: &HtmlFormElement, skip: &str) -> Vec<(String, String)> {
    let Ok(data) = FormData::new_with_form(form) else {
        return Vec::new();
    };
    let Ok(Some(entries)) = js_sys::try_iter(&data) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let pair = js_sys::Array::from(&entry);
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .filter(|(name, _)| name != skip)
        .collect()
}

fn mount_contact_form(config: &WidgetConfig) -> Result<(), JsValue> {
    let Some(form) = by_id("contact-form").and_then(|e| e.dyn_into::<HtmlFormElement>().ok()) else {
        return Ok(());
    };
    let transport =
        HttpBackend::new(&config.backend_url).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let action = form
        .get_attribute("action")
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| config.contact_action.clone());
    let captcha_field = config.captcha_field.clone();
    let contact = Rc::new(ContactForm::new(
        transport,
        DomContactView { form: form.clone() },
        action,
        captcha_field.clone(),
    ));

    {
        let contact = contact.clone();
        let form_for_submit = form.clone();
        listen(&form, "submit", move |event| {
            event.prevent_default();
            let submission = ContactSubmission {
                fields: form_fields(&form_for_submit, &captcha_field),
                captcha_token: by_id("captcha-token")
                    .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value()),
            };
            let contact = contact.clone();
            spawn_local(async move {
                contact.submit(submission).await;
            });
        });
    }
    for id in ["send-another", "try-again"] {
        if let Some(button) = by_id(id) {
            let contact = contact.clone();
            listen(&button, "click", move |_| contact.reset());
        }
    }
    Ok(())
}

fn mount_mobile_menu() {
    let (Some(toggle), Some(menu)) = (by_id("mobile-menu-toggle"), by_id("mobile-menu")) else {
        return;
    };
    let state = Rc::new(RefCell::new(MobileMenu::new()));
    let lines = Rc::new(query_all(None, ".mobile-menu-line"));

    let render = {
        let menu = menu.clone();
        let lines = lines.clone();
        Rc::new(move |open: bool| {
            let shown = ["translate-x-0", "opacity-100"];
            let hidden = ["translate-x-full", "opacity-0", "pointer-events-none"];
            if open {
                swap_classes(&menu, &shown, &hidden);
            } else {
                swap_classes(&menu, &hidden, &shown);
            }
            if lines.len() >= 3 {
                let top = if open { "rotate(45deg) translateY(6px)" } else { "" };
                set_style(&lines[0], "transform", top);
                set_style(&lines[1], "opacity", if open { "0" } else { "" });
                let bottom = if open { "rotate(-45deg) translateY(-6px)" } else { "" };
                set_style(&lines[2], "transform", bottom);
            }
        })
    };

    {
        let state = state.clone();
        let render = render.clone();
        listen(&toggle, "click", move |_| {
            let open = state.borrow_mut().toggle();
            render(open);
        });
    }
    for link in query_all(None, ".mobile-nav-link") {
        let state = state.clone();
        let render = render.clone();
        listen(&link, "click", move |_| {
            if state.borrow_mut().on_nav_link() {
                render(false);
            }
        });
    }
    if let Some(doc) = document() {
        listen(&doc, "click", move |event| {
            let target = if event_inside(&event, &menu) {
                ClickTarget::Panel
            } else if event_inside(&event, &toggle) {
                ClickTarget::ToggleButton
            } else {
                ClickTarget::Outside
            };
            if state.borrow_mut().on_document_click(target) {
                render(false);
            }
        });
    }
}

fn render_logo(image: &Element, state: LogoState) {
    let display = state.display();
    if display.image_visible {
        set_style(image, "opacity", "1");
    } else {
        set_style(image, "display", "none");
    }
    let fallback = image
        .parent_element()
        .and_then(|parent| parent.query_selector(".company-fallback").ok().flatten());
    if let Some(fallback) = fallback {
        set_style(&fallback, "display", if display.fallback_visible { "block" } else { "none" });
    }
}

fn mount_logos() {
    for logo in query_all(None, ".company-logo") {
        {
            let image = logo.clone();
            listen(&logo, "load", move |_| render_logo(&image, LogoState::Loaded));
        }
        let image = logo.clone();
        listen(&logo, "error", move |_| render_logo(&image, LogoState::Failed));
    }
}
