use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::chat::backend::ChatBackend;
use crate::chat::models::{ChatAnswer, ChatRequest, FeedbackPayload, SatisfactionPayload, SubmitAck};
use crate::error::WidgetError;

/// Keyword categories in match order.
const KEYWORDS: &[(&str, &[&str])] = &[
    ("service", &["service", "offer", "provide"]),
    ("automation", &["automat", "workflow", "process"]),
    ("price", &["price", "cost", "much"]),
    ("contact", &["contact", "reach", "talk"]),
];

const SERVICE: &[&str] = &[
    "E-click offers custom software development, cloud solutions, business automation, enterprise integration, and technical consultancy services.",
    "Our services include tailored software solutions, cloud infrastructure, process automation, system integration, and expert technical advice.",
];

const AUTOMATION: &[&str] = &[
    "Our automation services help businesses streamline workflows, reduce manual tasks, and increase efficiency through intelligent process automation.",
    "We create custom automation solutions that digitize your business processes, saving time and reducing human error.",
];

const PRICE: &[&str] = &[
    "Our pricing varies based on project requirements. We'd be happy to provide a custom quote - please contact our team at contact@eclick.com.",
    "We offer competitive pricing tailored to your specific needs. Reach out through our contact form for a detailed estimate.",
];

const CONTACT: &[&str] = &[
    "You can reach us through the contact form on our website, by email at contact@eclick.com, or by phone at (555) 123-4567.",
    "Our team is available Monday to Friday, 9am-5pm. Feel free to use the contact section on this website!",
];

const DEFAULT: &[&str] = &[
    "I don't have that information right now. Would you like to speak with a member of our team?",
    "Great question! For more detailed information, I recommend reaching out to our team through the contact form.",
    "I'm a simple bot with limited knowledge. For more specific assistance, please contact our human team.",
];

pub const TYPING_DELAY_MIN: Duration = Duration::from_millis(1000);
pub const TYPING_DELAY_MAX: Duration = Duration::from_millis(2000);

/// Canned-answer responder for deployments without the AI backend.
#[derive(Debug, Default, Clone)]
pub struct OfflineBackend;

impl OfflineBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn category(query: &str) -> &'static str {
        let lowered = query.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lowered.contains(w)))
            .map(|(category, _)| *category)
            .unwrap_or("default")
    }

    pub fn responses(category: &str) -> &'static [&'static str] {
        match category {
            "service" => SERVICE,
            "automation" => AUTOMATION,
            "price" => PRICE,
            "contact" => CONTACT,
            _ => DEFAULT,
        }
    }

    pub fn respond(&self, query: &str) -> String {
        let responses = Self::responses(Self::category(query));
        responses
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(DEFAULT[0])
            .to_string()
    }
}

impl ChatBackend for OfflineBackend {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatAnswer, WidgetError> {
        Ok(ChatAnswer {
            answer: Some(self.respond(&request.question)),
        })
    }

    async fn submit_satisfaction(
        &self,
        _payload: &SatisfactionPayload,
    ) -> Result<SubmitAck, WidgetError> {
        Err(WidgetError::Unsupported("satisfaction ratings"))
    }

    async fn submit_feedback(&self, _payload: &FeedbackPayload) -> Result<SubmitAck, WidgetError> {
        Err(WidgetError::Unsupported("text feedback"))
    }

    fn collects_feedback(&self) -> bool {
        false
    }

    /// Canned answers are instant, so the bot pretends to type for a moment.
    fn typing_delay(&self) -> Duration {
        rand::thread_rng().gen_range(TYPING_DELAY_MIN..TYPING_DELAY_MAX)
    }
}
