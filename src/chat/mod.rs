pub mod backend;
pub mod controller;
pub mod intent;
pub mod models;
pub mod offline;
pub mod view;

pub use backend::{ChatBackend, HttpBackend, SiteBackend};
pub use controller::{BotReply, ChatController, ChatPhase};
pub use models::{Message, Rating, Session};
pub use offline::OfflineBackend;
pub use view::{ChatView, PromptAction, Timer};
