use thiserror::Error;

/// Message returned for any missing generation field.
pub const MISSING_FIELDS: &str = "All fields are required";
/// Message returned when there is no text to humanize or publish.
pub const CONTENT_REQUIRED: &str = "Content is required";

#[derive(Error, Debug)]
pub enum BlogError {
    /// Missing or malformed caller input. The message is safe to show.
    #[error("{0}")]
    Validation(String),

    /// Non-2xx response or transport failure from an external service.
    #[error("upstream failure (status {status:?}): {detail}")]
    Upstream { status: Option<u16>, detail: String },

    /// The service answered 2xx but the expected field was not there.
    #[error("content not found in response structure")]
    ContentExtraction { raw: String },

    #[error("request timed out")]
    Timeout,

    #[error("a request is already in progress")]
    Busy,
}

impl BlogError {
    pub fn validation(message: impl Into<String>) -> Self {
        BlogError::Validation(message.into())
    }

    pub fn upstream(status: Option<u16>, detail: impl Into<String>) -> Self {
        BlogError::Upstream {
            status,
            detail: detail.into(),
        }
    }

    /// Caller-facing text. Never includes upstream bodies or response shapes.
    pub fn user_message(&self) -> String {
        match self {
            BlogError::Validation(message) => message.clone(),
            BlogError::Upstream { .. } => "Blog generation failed. Please try again.".to_string(),
            BlogError::ContentExtraction { .. } => {
                "Temporary issue with AI service. Please try again.".to_string()
            }
            BlogError::Timeout => {
                "Generation is taking longer than expected. Please try again.".to_string()
            }
            BlogError::Busy => "A request is already in progress.".to_string(),
        }
    }
}

impl From<reqwest::Error> for BlogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BlogError::Timeout
        } else {
            BlogError::Upstream {
                status: err.status().map(|status| status.as_u16()),
                detail: err.to_string(),
            }
        }
    }
}
