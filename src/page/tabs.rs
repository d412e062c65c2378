/// The solutions section: one trigger per panel, one panel visible.
#[derive(Debug, Clone)]
pub struct TabGroup {
    triggers: Vec<String>,
    panels: Vec<String>,
    active: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSelection {
    pub active_trigger: usize,
    /// `None` when the trigger points at a panel that does not exist; every
    /// panel is hidden in that case.
    pub visible_panel: Option<String>,
}

impl TabGroup {
    /// `triggers[i]` is the panel id trigger `i` targets.
    pub fn new(triggers: Vec<String>, panels: Vec<String>) -> Self {
        Self {
            triggers,
            panels,
            active: None,
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn select(&mut self, trigger: usize) -> Option<TabSelection> {
        let target = self.triggers.get(trigger)?;
        self.active = Some(trigger);
        let visible_panel = self.panels.iter().find(|p| *p == target).cloned();
        Some(TabSelection {
            active_trigger: trigger,
            visible_panel,
        })
    }
}
