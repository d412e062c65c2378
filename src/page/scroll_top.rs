pub const SHOW_AFTER: f64 = 500.0;

#[derive(Debug, Default)]
pub struct ScrollTopButton {
    visible: bool,
}

impl ScrollTopButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns the new visibility when it changes.
    pub fn on_scroll(&mut self, scroll_y: f64) -> Option<bool> {
        let visible = scroll_y > SHOW_AFTER;
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        Some(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appears_past_threshold() {
        let mut button = ScrollTopButton::new();
        assert_eq!(button.on_scroll(500.0), None);
        assert_eq!(button.on_scroll(501.0), Some(true));
        assert_eq!(button.on_scroll(900.0), None);
        assert_eq!(button.on_scroll(0.0), Some(false));
    }
}
