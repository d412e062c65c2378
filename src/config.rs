use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::error::WidgetError;
use crate::logging::DEFAULT_FILTER;

/// What the user sees when a satisfaction or feedback submission fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureNotice {
    /// Append nothing.
    Silent,
    /// Append a thank-you as if the submission went through.
    ThankAnyway,
    /// Append an apology.
    Apologize,
}

impl FromStr for FailureNotice {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "thank" | "thank_anyway" => Ok(Self::ThankAnyway),
            "apologize" | "apologise" => Ok(Self::Apologize),
            other => Err(WidgetError::Config(format!("unknown failure notice '{}'", other))),
        }
    }
}

/// Which deployment variant answers chat questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderKind {
    Ai,
    Offline,
}

impl FromStr for ResponderKind {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ai" => Ok(Self::Ai),
            "offline" | "keyword" => Ok(Self::Offline),
            other => Err(WidgetError::Config(format!("unknown responder '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub backend_url: String,
    pub responder: ResponderKind,
    /// A satisfaction prompt follows the 1st user message and then every
    /// `satisfaction_interval` messages. Zero disables the survey.
    pub satisfaction_interval: u32,
    pub satisfaction_delay: Duration,
    pub feedback_after_rating_delay: Duration,
    pub feedback_after_intent_delay: Duration,
    pub context_window: usize,
    pub theme_key: String,
    pub contact_action: String,
    pub captcha_field: String,
    pub satisfaction_failure: FailureNotice,
    pub feedback_failure: FailureNotice,
    /// `tracing` filter directives.
    pub log_filter: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            responder: ResponderKind::Ai,
            satisfaction_interval: 6,
            satisfaction_delay: Duration::from_millis(1500),
            feedback_after_rating_delay: Duration::from_millis(1500),
            feedback_after_intent_delay: Duration::from_millis(1000),
            context_window: 5,
            theme_key: "theme".to_string(),
            contact_action: "/contact/".to_string(),
            captcha_field: "captcha_token".to_string(),
            satisfaction_failure: FailureNotice::Silent,
            feedback_failure: FailureNotice::ThankAnyway,
            log_filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Applies `SITE_*` overrides on top of the defaults. The browser host
    /// reads them from `data-*` attributes, see [`data_attribute`].
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SITE_BACKEND_URL") {
            url::Url::parse(&url)
                .with_context(|| format!("SITE_BACKEND_URL is not a URL: {}", url))?;
            config.backend_url = url;
        }
        if let Some(v) = lookup("SITE_RESPONDER") {
            config.responder = v.parse().context("SITE_RESPONDER")?;
        }
        if let Some(v) = lookup("SITE_SATISFACTION_INTERVAL") {
            config.satisfaction_interval = v.trim().parse().context("SITE_SATISFACTION_INTERVAL")?;
        }
        if let Some(v) = lookup("SITE_SATISFACTION_DELAY_MS") {
            config.satisfaction_delay = parse_millis(&v).context("SITE_SATISFACTION_DELAY_MS")?;
        }
        if let Some(v) = lookup("SITE_FEEDBACK_DELAY_MS") {
            config.feedback_after_rating_delay =
                parse_millis(&v).context("SITE_FEEDBACK_DELAY_MS")?;
        }
        if let Some(v) = lookup("SITE_INTENT_FEEDBACK_DELAY_MS") {
            config.feedback_after_intent_delay =
                parse_millis(&v).context("SITE_INTENT_FEEDBACK_DELAY_MS")?;
        }
        if let Some(v) = lookup("SITE_CONTEXT_WINDOW") {
            config.context_window = v.trim().parse().context("SITE_CONTEXT_WINDOW")?;
        }
        if let Some(v) = lookup("SITE_THEME_KEY") {
            config.theme_key = v;
        }
        if let Some(v) = lookup("SITE_CONTACT_ACTION") {
            config.contact_action = v;
        }
        if let Some(v) = lookup("SITE_CAPTCHA_FIELD") {
            config.captcha_field = v;
        }
        if let Some(v) = lookup("SITE_SATISFACTION_FAILURE") {
            config.satisfaction_failure = v.parse().context("SITE_SATISFACTION_FAILURE")?;
        }
        if let Some(v) = lookup("SITE_FEEDBACK_FAILURE") {
            config.feedback_failure = v.parse().context("SITE_FEEDBACK_FAILURE")?;
        }
        if let Some(v) = lookup("SITE_LOG") {
            config.log_filter = v;
        }

        Ok(config)
    }
}

/// `SITE_SATISFACTION_DELAY_MS` is read from `data-satisfaction-delay-ms`.
pub fn data_attribute(key: &str) -> String {
    let name = key.strip_prefix("SITE_").unwrap_or(key);
    format!("data-{}", name.to_lowercase().replace('_', "-"))
}

fn parse_millis(value: &str) -> Result<Duration, std::num::ParseIntError> {
    value.trim().parse::<u64>().map(Duration::from_millis)
}
