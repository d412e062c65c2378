#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoState {
    Loading,
    Loaded,
    Failed,
}

/// Company logos fade in when loaded and fall back to a text badge on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoDisplay {
    pub image_visible: bool,
    pub fallback_visible: bool,
}

impl LogoState {
    pub fn display(self) -> LogoDisplay {
        match self {
            LogoState::Loading => LogoDisplay {
                image_visible: false,
                fallback_visible: true,
            },
            LogoState::Loaded => LogoDisplay {
                image_visible: true,
                fallback_visible: false,
            },
            LogoState::Failed => LogoDisplay {
                image_visible: false,
                fallback_visible: true,
            },
        }
    }
}
