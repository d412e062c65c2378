use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::chat::models::{ChatAnswer, ChatRequest, FeedbackPayload, SatisfactionPayload, SubmitAck};
use crate::chat::offline::OfflineBackend;
use crate::config::{ResponderKind, WidgetConfig};
use crate::error::WidgetError;

pub const CHAT_PATH: &str = "/ai/chat/";
pub const SATISFACTION_PATH: &str = "/chatbot/satisfaction/";
pub const FEEDBACK_PATH: &str = "/chatbot/feedback/";

/// The server side of the widget. Futures are not `Send`: in the browser
/// everything runs on one thread.
#[allow(async_fn_in_trait)]
pub trait ChatBackend {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatAnswer, WidgetError>;

    async fn submit_satisfaction(
        &self,
        payload: &SatisfactionPayload,
    ) -> Result<SubmitAck, WidgetError>;

    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<SubmitAck, WidgetError>;

    /// Whether ratings and text feedback reach anyone. When false the widget
    /// never asks for them.
    fn collects_feedback(&self) -> bool {
        true
    }

    /// How long the typing indicator stays up before the reply is resolved.
    fn typing_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// JSON-over-HTTP client for the site backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, WidgetError> {
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, WidgetError> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, WidgetError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        if !response.status().is_success() {
            tracing::debug!("{} answered with status {}", path, response.status());
        }
        // The backend reports failures in the body, so the status alone decides nothing.
        Ok(response.json::<R>().await?)
    }
}

impl ChatBackend for HttpBackend {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatAnswer, WidgetError> {
        self.post_json(CHAT_PATH, request).await
    }

    async fn submit_satisfaction(
        &self,
        payload: &SatisfactionPayload,
    ) -> Result<SubmitAck, WidgetError> {
        self.post_json(SATISFACTION_PATH, payload).await
    }

    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<SubmitAck, WidgetError> {
        self.post_json(FEEDBACK_PATH, payload).await
    }
}

/// Backend chosen at startup from [`WidgetConfig::responder`].
pub enum SiteBackend {
    Http(HttpBackend),
    Offline(OfflineBackend),
}

impl SiteBackend {
    pub fn from_config(config: &WidgetConfig) -> Result<Self, WidgetError> {
        match config.responder {
            ResponderKind::Ai => Ok(Self::Http(HttpBackend::new(&config.backend_url)?)),
            ResponderKind::Offline => Ok(Self::Offline(OfflineBackend::new())),
        }
    }
}

impl ChatBackend for SiteBackend {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatAnswer, WidgetError> {
        match self {
            Self::Http(b) => b.ask(request).await,
            Self::Offline(b) => b.ask(request).await,
        }
    }

    async fn submit_satisfaction(
        &self,
        payload: &SatisfactionPayload,
    ) -> Result<SubmitAck, WidgetError> {
        match self {
            Self::Http(b) => b.submit_satisfaction(payload).await,
            Self::Offline(b) => b.submit_satisfaction(payload).await,
        }
    }

    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<SubmitAck, WidgetError> {
        match self {
            Self::Http(b) => b.submit_feedback(payload).await,
            Self::Offline(b) => b.submit_feedback(payload).await,
        }
    }

    fn collects_feedback(&self) -> bool {
        match self {
            Self::Http(b) => b.collects_feedback(),
            Self::Offline(b) => b.collects_feedback(),
        }
    }

    fn typing_delay(&self) -> Duration {
        match self {
            Self::Http(b) => b.typing_delay(),
            Self::Offline(b) => b.typing_delay(),
        }
    }
}
