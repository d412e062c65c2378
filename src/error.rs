use thiserror::Error;

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("{endpoint} reported failure")]
    Rejected { endpoint: &'static str },
    #[error("Not supported by this responder: {0}")]
    Unsupported(&'static str),
    #[error("Configuration error: {0}")]
    Config(String),
}
