use std::future::Future;
use std::time::Duration;

use crate::chat::models::{Message, Rating};

pub const SATISFACTION_QUESTION: &str = "Before we start, how would you rate our website so far?";
pub const FEEDBACK_QUESTION: &str = "Would you like to share any additional feedback? 💭";

/// Everything the controller does to the page. Implementations must tolerate
/// calls after the underlying elements are gone.
pub trait ChatView {
    fn set_open(&self, open: bool);
    fn render_message(&self, message: &Message);
    fn clear_input(&self);
    fn show_typing(&self);
    fn hide_typing(&self);
    fn show_satisfaction_prompt(&self, question: &str, options: &[Rating]);
    fn remove_satisfaction_prompt(&self);
    fn show_feedback_prompt(&self, question: &str);
    fn remove_feedback_prompt(&self);
}

/// A click on a control inside the satisfaction or feedback prompt. The host
/// must stop such clicks from bubbling on: the prompt is gone by the time an
/// outer listener looks at the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    Rate(Rating),
    SubmitFeedback,
    SkipFeedback,
}

impl PromptAction {
    /// Reads the `data-rating` / `data-feedback-action` values of the clicked
    /// control. Anything else is not a prompt action.
    pub fn from_attributes(rating: Option<&str>, feedback_action: Option<&str>) -> Option<Self> {
        if let Some(value) = rating {
            return value.trim().parse::<u8>().ok().and_then(Rating::from_value).map(Self::Rate);
        }
        match feedback_action? {
            "submit" => Some(Self::SubmitFeedback),
            "skip" => Some(Self::SkipFeedback),
            _ => None,
        }
    }
}

/// Fire-once delays.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimer;

#[cfg(not(target_arch = "wasm32"))]
impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}
