pub const SCROLLED_AFTER: f64 = 20.0;
/// A section is active while it spans this line, measured from the viewport top.
pub const ACTIVE_LINE: f64 = 100.0;
pub const ANCHOR_OFFSET: f64 = 80.0;
pub const DEFAULT_SECTION: &str = "home";

#[derive(Debug, Clone, PartialEq)]
pub struct SectionRect {
    pub id: String,
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavbarUpdate {
    /// `Some` only when the compact/expanded look has to change.
    pub scrolled: Option<bool>,
    pub active_section: String,
}

#[derive(Debug)]
pub struct NavbarTracker {
    scrolled: bool,
    active_section: String,
    frame_pending: bool,
}

impl Default for NavbarTracker {
    fn default() -> Self {
        Self {
            scrolled: false,
            active_section: DEFAULT_SECTION.to_string(),
            frame_pending: false,
        }
    }
}

impl NavbarTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    pub fn active_section(&self) -> &str {
        &self.active_section
    }

    /// Called on every scroll event. Returns true when the host should request
    /// an animation frame; further scrolls before that frame are coalesced.
    pub fn on_scroll(&mut self) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    pub fn on_frame(&mut self, scroll_y: f64, sections: &[SectionRect]) -> NavbarUpdate {
        self.frame_pending = false;

        let should_be_scrolled = scroll_y > SCROLLED_AFTER;
        let scrolled = if should_be_scrolled != self.scrolled {
            self.scrolled = should_be_scrolled;
            Some(should_be_scrolled)
        } else {
            None
        };

        self.active_section = sections
            .iter()
            .filter(|s| s.top <= ACTIVE_LINE && s.bottom >= ACTIVE_LINE)
            .last()
            .map(|s| s.id.clone())
            .unwrap_or_else(|| DEFAULT_SECTION.to_string());

        NavbarUpdate {
            scrolled,
            active_section: self.active_section.clone(),
        }
    }
}

/// Scroll position for an in-page anchor, leaving room for the fixed navbar.
pub fn anchor_scroll_top(target_offset_top: f64) -> f64 {
    target_offset_top - ANCHOR_OFFSET
}
