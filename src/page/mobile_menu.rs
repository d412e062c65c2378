use super::ClickTarget;

#[derive(Debug, Default)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Returns true when the menu closed.
    pub fn on_nav_link(&mut self) -> bool {
        self.close_if_open()
    }

    /// Returns true when the menu closed.
    pub fn on_document_click(&mut self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Outside => self.close_if_open(),
            ClickTarget::Panel | ClickTarget::ToggleButton => false,
        }
    }

    fn close_if_open(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        true
    }
}
