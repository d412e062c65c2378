use std::cell::Cell;

use serde::Deserialize;
use serde_json::Value;

use crate::chat::backend::HttpBackend;
use crate::dispatch::{Dispatch, Ignored};
use crate::error::WidgetError;

pub const CAPTCHA_MISSING: &str = "Please verify you are not a robot.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub captcha_error: Option<Value>,
}

impl ContactResponse {
    pub fn captcha_rejected(&self) -> bool {
        match &self.captcha_error {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait ContactTransport {
    async fn send(
        &self,
        action: &str,
        fields: &[(String, String)],
    ) -> Result<ContactResponse, WidgetError>;
}

impl ContactTransport for HttpBackend {
    async fn send(
        &self,
        action: &str,
        fields: &[(String, String)],
    ) -> Result<ContactResponse, WidgetError> {
        let url = self.endpoint(action)?;
        tracing::debug!("Submitting contact form to {}", url);
        let response = self
            .client()
            .post(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(fields)
            .send()
            .await?;
        Ok(response.json::<ContactResponse>().await?)
    }
}

pub trait ContactView {
    fn show_captcha_error(&self, message: &str);
    fn set_sending(&self, sending: bool);
    fn show_success(&self);
    fn show_error(&self);
    fn reset_captcha(&self);
    /// Clears the fields and shows the form again.
    fn reset(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactState {
    Editing,
    Sending,
    Sent,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct ContactSubmission {
    pub fields: Vec<(String, String)>,
    /// `None` when the page has no CAPTCHA widget.
    pub captcha_token: Option<String>,
}

pub struct ContactForm<T, V> {
    transport: T,
    view: V,
    action: String,
    captcha_field: String,
    state: Cell<ContactState>,
}

impl<T: ContactTransport, V: ContactView> ContactForm<T, V> {
    pub fn new(
        transport: T,
        view: V,
        action: impl Into<String>,
        captcha_field: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            view,
            action: action.into(),
            captcha_field: captcha_field.into(),
            state: Cell::new(ContactState::Editing),
        }
    }

    pub fn state(&self) -> ContactState {
        self.state.get()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub async fn submit(&self, submission: ContactSubmission) -> Dispatch {
        if self.state.get() == ContactState::Sending {
            return Dispatch::Ignored(Ignored::Busy);
        }

        let mut fields = submission.fields;
        if let Some(token) = submission.captcha_token {
            if token.is_empty() {
                self.view.show_captcha_error(CAPTCHA_MISSING);
                return Dispatch::Ignored(Ignored::Blank);
            }
            fields.push((self.captcha_field.clone(), token));
        }

        self.state.set(ContactState::Sending);
        self.view.set_sending(true);

        match self.transport.send(&self.action, &fields).await {
            Ok(response) if response.success => {
                self.state.set(ContactState::Sent);
                self.view.show_success();
            }
            Ok(response) if response.captcha_rejected() => {
                tracing::debug!("Contact form CAPTCHA rejected by server");
                self.state.set(ContactState::Editing);
                self.view.set_sending(false);
                self.view.reset_captcha();
            }
            Ok(response) => {
                tracing::error!(
                    "Contact form submission failed: {}",
                    response.message.as_deref().unwrap_or("Form submission failed")
                );
                self.state.set(ContactState::Failed);
                self.view.show_error();
            }
            Err(e) => {
                tracing::error!("Contact form submission failed: {}", e);
                self.state.set(ContactState::Failed);
                self.view.show_error();
            }
        }
        Dispatch::Handled
    }

    /// "Send another" and "try again" both land here.
    pub fn reset(&self) {
        self.state.set(ContactState::Editing);
        self.view.set_sending(false);
        self.view.reset();
    }
}
