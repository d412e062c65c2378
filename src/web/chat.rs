use std::rc::Rc;

use chrono::Local;
use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent};

use super::{by_id, document, event_inside, is_dark, listen, GlooTimer, SiteTheme};
use crate::chat::models::{Message, Rating};
use crate::chat::view::PromptAction;
use crate::chat::{ChatController, ChatView, SiteBackend};
use crate::config::WidgetConfig;
use crate::page::ClickTarget;

const TYPING_ID: &str = "typing-indicator";
const SATISFACTION_ID: &str = "satisfaction-prompt";
const FEEDBACK_ID: &str = "feedback-prompt";
const FEEDBACK_TEXT_ID: &str = "feedback-text";

type SiteChat = ChatController<SiteBackend, DomChatView, GlooTimer>;

fn create(tag: &str, class: &str) -> Option<Element> {
    let element = document()?.create_element(tag).ok()?;
    element.set_class_name(class);
    Some(element)
}

fn remove_by_id(id: &str) {
    if let Some(element) = by_id(id) {
        element.remove();
    }
}

/// Renders the chat into the widget markup. Every method re-checks that its
/// elements still exist.
pub struct DomChatView {
    button: Element,
    window: Element,
    messages: Option<Element>,
    input: Option<HtmlInputElement>,
}

impl DomChatView {
    pub fn from_document() -> Option<Self> {
        Some(Self {
            button: by_id("chatbot-button")?,
            window: by_id("chatbot-window")?,
            messages: by_id("chatbot-messages"),
            input: by_id("chatbot-input").and_then(|e| e.dyn_into::<HtmlInputElement>().ok()),
        })
    }

    fn append(&self, element: &Element) {
        if let Some(messages) = &self.messages {
            let _ = messages.append_child(element);
        }
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&self) {
        if let Some(messages) = self.messages.clone() {
            Timeout::new(100, move || {
                messages.set_scroll_top(messages.scroll_height());
            })
            .forget();
        }
    }

    fn input_value(&self) -> String {
        self.input.as_ref().map(|i| i.value()).unwrap_or_default()
    }

    fn set_style(element: &Element, property: &str, value: &str) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property(property, value);
        }
    }

    fn bubble_class(is_from_bot: bool, dark: bool) -> &'static str {
        match (is_from_bot, dark) {
            (true, true) => "bg-gray-700 border border-gray-600 text-gray-100",
            (true, false) => "bg-white border border-gray-200 text-gray-800",
            (false, true) => "bg-accent text-white",
            (false, false) => "bg-red-600 text-white",
        }
    }
}

impl ChatView for DomChatView {
    fn set_open(&self, open: bool) {
        if open {
            let _ = self.window.class_list().add_1("chatbot-open");
            Self::set_style(&self.window, "opacity", "1");
            Self::set_style(&self.window, "visibility", "visible");
            Self::set_style(&self.window, "transform", "scale(1) translateY(0)");
            Self::set_style(&self.window, "pointer-events", "auto");
            Self::set_style(&self.button, "transform", "scale(0)");
            Self::set_style(&self.button, "opacity", "0");
            if let Some(input) = self.input.clone() {
                Timeout::new(300, move || {
                    let _ = input.focus();
                })
                .forget();
            }
        } else {
            let _ = self.window.class_list().remove_1("chatbot-open");
            Self::set_style(&self.window, "opacity", "0");
            Self::set_style(&self.window, "visibility", "hidden");
            Self::set_style(&self.window, "transform", "scale(0.8) translateY(20px)");
            Self::set_style(&self.window, "pointer-events", "none");
            Self::set_style(&self.button, "transform", "scale(1)");
            Self::set_style(&self.button, "opacity", "1");
        }
    }

    fn render_message(&self, message: &Message) {
        let dark = is_dark();
        let justify = if message.is_from_bot { "justify-start" } else { "justify-end" };
        let Some(row) = create("div", &format!("mb-2 flex {}", justify)) else {
            return;
        };
        let bubble_class = format!(
            "max-w-[80%] rounded-lg p-2.5 {}",
            Self::bubble_class(message.is_from_bot, dark)
        );
        let (Some(bubble), Some(text), Some(time)) = (
            create("div", &bubble_class),
            create("p", "text-sm leading-snug"),
            create("p", if dark { "text-xs mt-0.5 opacity-50" } else { "text-xs mt-0.5 opacity-70" }),
        ) else {
            return;
        };
        text.set_text_content(Some(&message.text));
        let local = message.timestamp.with_timezone(&Local);
        time.set_text_content(Some(&local.format("%H:%M").to_string()));
        let _ = bubble.append_child(&text);
        let _ = bubble.append_child(&time);
        let _ = row.append_child(&bubble);
        self.append(&row);
    }

    fn clear_input(&self) {
        if let Some(input) = &self.input {
            input.set_value("");
        }
    }

    fn show_typing(&self) {
        let dark = is_dark();
        let Some(row) = create("div", "flex justify-start mb-4") else {
            return;
        };
        row.set_id(TYPING_ID);
        let bubble_class = if dark {
            "bg-gray-700 border border-gray-600 rounded-lg p-3"
        } else {
            "bg-white border border-gray-200 rounded-lg p-3"
        };
        let dot_class = if dark {
            "w-2 h-2 rounded-full bg-gray-500 animate-bounce"
        } else {
            "w-2 h-2 rounded-full bg-gray-300 animate-bounce"
        };
        let (Some(bubble), Some(dots)) =
            (create("div", bubble_class), create("div", "flex space-x-2"))
        else {
            return;
        };
        for delay in ["0ms", "150ms", "300ms"] {
            if let Some(dot) = create("div", dot_class) {
                Self::set_style(&dot, "animation-delay", delay);
                let _ = dots.append_child(&dot);
            }
        }
        let _ = bubble.append_child(&dots);
        let _ = row.append_child(&bubble);
        self.append(&row);
    }

    fn hide_typing(&self) {
        remove_by_id(TYPING_ID);
    }

    fn show_satisfaction_prompt(&self, question: &str, options: &[Rating]) {
        let dark = is_dark();
        let Some(row) = create("div", "mb-4 flex justify-start") else {
            return;
        };
        row.set_id(SATISFACTION_ID);
        let (Some(card), Some(heading), Some(choices)) = (
            create("div", "p-3 max-w-[90%]"),
            create(
                "p",
                if dark {
                    "text-sm text-gray-100 mb-3 font-semibold"
                } else {
                    "text-sm text-gray-800 mb-3 font-semibold"
                },
            ),
            create("div", "flex gap-2 mb-2 justify-center"),
        ) else {
            return;
        };
        heading.set_text_content(Some(question));
        for rating in options {
            let Some(option) = create("div", "satisfaction-option") else {
                continue;
            };
            let _ = option.set_attribute("data-rating", &rating.value().to_string());
            let _ = option.set_attribute("title", rating.label());
            if dark {
                Self::set_style(&option, "color", "white");
            }
            if let (Some(emoji), Some(number)) =
                (create("span", "text-2xl"), create("span", "text-xs mt-1"))
            {
                emoji.set_text_content(Some(rating.emoji()));
                number.set_text_content(Some(&rating.value().to_string()));
                let _ = option.append_child(&emoji);
                let _ = option.append_child(&number);
            }
            let _ = choices.append_child(&option);
        }
        let _ = card.append_child(&heading);
        let _ = card.append_child(&choices);
        let _ = row.append_child(&card);
        self.append(&row);
    }

    fn remove_satisfaction_prompt(&self) {
        remove_by_id(SATISFACTION_ID);
    }

    fn show_feedback_prompt(&self, question: &str) {
        let dark = is_dark();
        let Some(row) = create("div", "mb-4 flex justify-start") else {
            return;
        };
        row.set_id(FEEDBACK_ID);
        let card_class = if dark {
            "bg-gray-700 border border-gray-600 rounded-lg p-3 max-w-[85%]"
        } else {
            "bg-white border border-gray-200 rounded-lg p-3 max-w-[85%]"
        };
        let (Some(card), Some(heading), Some(text), Some(buttons)) = (
            create("div", card_class),
            create(
                "p",
                if dark { "text-sm text-gray-100 mb-2" } else { "text-sm text-gray-800 mb-2" },
            ),
            create(
                "textarea",
                if dark {
                    "w-full p-2 rounded-lg border bg-gray-800 border-gray-600 text-white text-sm resize-none"
                } else {
                    "w-full p-2 rounded-lg border bg-white border-gray-300 text-gray-900 text-sm resize-none"
                },
            ),
            create("div", "flex gap-2 mt-2"),
        ) else {
            return;
        };
        heading.set_text_content(Some(question));
        text.set_id(FEEDBACK_TEXT_ID);
        let _ = text.set_attribute("rows", "3");
        let _ = text.set_attribute("placeholder", "Your feedback helps us improve...");
        for (action, label, class) in [
            ("submit", "Submit", "px-3 py-1 rounded-lg text-sm font-semibold bg-red-600 hover:bg-red-700 text-white"),
            ("skip", "Skip", "px-3 py-1 rounded-lg text-sm font-semibold bg-gray-300 hover:bg-gray-400 text-gray-800"),
        ] {
            if let Some(button) = create("button", class) {
                let _ = button.set_attribute("type", "button");
                let _ = button.set_attribute("data-feedback-action", action);
                button.set_text_content(Some(label));
                let _ = buttons.append_child(&button);
            }
        }
        let _ = card.append_child(&heading);
        let _ = card.append_child(&text);
        let _ = card.append_child(&buttons);
        let _ = row.append_child(&card);
        self.append(&row);
    }

    fn remove_feedback_prompt(&self) {
        remove_by_id(FEEDBACK_ID);
    }
}

fn feedback_text() -> String {
    by_id(FEEDBACK_TEXT_ID)
        .and_then(|e| e.dyn_into::<HtmlTextAreaElement>().ok())
        .map(|t| t.value())
        .unwrap_or_default()
}

fn submit_current_input(chat: &Rc<SiteChat>) {
    let text = chat.view().input_value();
    let chat = chat.clone();
    spawn_local(async move {
        chat.submit_user_message(&text).await;
    });
}

/// Binds the chat widget markup to a new controller. Pages without the
/// widget are left alone.
pub fn mount_chat(config: WidgetConfig, theme: Rc<SiteTheme>) -> Result<(), JsValue> {
    let Some(view) = DomChatView::from_document() else {
        tracing::debug!("No chatbot markup on this page");
        return Ok(());
    };
    let backend = SiteBackend::from_config(&config).map_err(|e| JsValue::from_str(&e.to_string()))?;

    if let Some(stamp) = by_id("initial-timestamp") {
        stamp.set_text_content(Some(&Local::now().format("%H:%M").to_string()));
    }

    let button = view.button.clone();
    let panel = view.window.clone();
    let messages = view.messages.clone();
    let input = view.input.clone();
    let chat: Rc<SiteChat> = Rc::new(ChatController::new(backend, view, GlooTimer, theme, config));

    {
        let chat = chat.clone();
        listen(&button, "click", move |_| chat.toggle());
    }
    if let Some(close) = by_id("chatbot-close") {
        let chat = chat.clone();
        listen(&close, "click", move |_| chat.toggle());
    }
    if let Some(form) = by_id("chatbot-form") {
        let chat = chat.clone();
        listen(&form, "submit", move |event| {
            event.prevent_default();
            submit_current_input(&chat);
        });
    }
    if let Some(input) = input {
        let submit_button = by_id("chatbot-form")
            .and_then(|f| f.query_selector("button[type=\"submit\"]").ok().flatten());
        let update = {
            let input = input.clone();
            move || {
                if let Some(button) = &submit_button {
                    let disabled = input.value().trim().is_empty();
                    let _ = button.toggle_attribute_with_force("disabled", disabled);
                }
            }
        };
        update();
        listen(&input, "input", move |_| update());

        let chat = chat.clone();
        listen(&input, "keypress", move |event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                if key.key() == "Enter" && !key.shift_key() {
                    event.prevent_default();
                    submit_current_input(&chat);
                }
            }
        });
    }
    if let Some(messages) = messages {
        let chat = chat.clone();
        listen(&messages, "click", move |event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let rating = target.closest("[data-rating]").ok().flatten();
            let feedback = target.closest("[data-feedback-action]").ok().flatten();
            let action = PromptAction::from_attributes(
                rating.and_then(|e| e.get_attribute("data-rating")).as_deref(),
                feedback.and_then(|e| e.get_attribute("data-feedback-action")).as_deref(),
            );
            let Some(action) = action else {
                return;
            };
            // The prompt is removed before the document listener would see
            // this click, which would then count as outside the panel.
            event.stop_propagation();
            let text = match action {
                PromptAction::SubmitFeedback => feedback_text(),
                _ => String::new(),
            };
            let chat = chat.clone();
            spawn_local(async move {
                chat.handle_prompt_action(action, &text).await;
            });
        });
    }
    if let Some(doc) = document() {
        let chat = chat.clone();
        listen(&doc, "click", move |event| {
            let target = if event_inside(&event, &panel) {
                ClickTarget::Panel
            } else if event_inside(&event, &button) {
                ClickTarget::ToggleButton
            } else {
                ClickTarget::Outside
            };
            chat.handle_click(target);
        });
    }

    Ok(())
}
