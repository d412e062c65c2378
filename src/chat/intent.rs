use crate::theme::Theme;

const DARK_PHRASES: &[&str] = &[
    "dark",
    "night",
    "dark mode",
    "i want dark",
    "switch to dark",
    "make it dark",
];

const LIGHT_PHRASES: &[&str] = &[
    "light",
    "day",
    "light mode",
    "i want light",
    "switch to light",
    "make it light",
];

const FEEDBACK_WORDS: &[&str] = &["feedback", "complain", "suggest", "improve"];

pub const DARK_CONFIRMATION: &str = "Switching to dark mode! 🌙 Enjoy the darker interface.";
pub const LIGHT_CONFIRMATION: &str = "Switching to light mode! ☀️ Enjoy the brighter interface.";

/// Dark phrases are checked before light ones.
pub fn theme_command(input: &str) -> Option<Theme> {
    let normalized = input.trim().to_lowercase();
    if DARK_PHRASES.iter().any(|p| normalized.contains(p)) {
        return Some(Theme::Dark);
    }
    if LIGHT_PHRASES.iter().any(|p| normalized.contains(p)) {
        return Some(Theme::Light);
    }
    None
}

pub fn theme_confirmation(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => DARK_CONFIRMATION,
        Theme::Light => LIGHT_CONFIRMATION,
    }
}

pub fn wants_to_give_feedback(input: &str) -> bool {
    let lowered = input.to_lowercase();
    FEEDBACK_WORDS.iter().any(|w| lowered.contains(w))
}
