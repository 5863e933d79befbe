use lumina_core::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    /// Could not reach the provider (DNS, TLS, connection reset).
    #[error("Connection error: {0}")]
    Transport(reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    /// Non-2xx response. `message` comes from the provider's error envelope
    /// when it has one, else the raw body.
    #[error("HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for LLMError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LLMError::Timeout
        } else {
            LLMError::Transport(e)
        }
    }
}

impl LLMError {
    /// Failure to reach the provider at all, as opposed to a bad answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, LLMError::Transport(_) | LLMError::Timeout)
    }

    /// Stable identifier used in error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            LLMError::Transport(_) => "transport_error",
            LLMError::Timeout => "timeout",
            LLMError::Upstream { .. } => "upstream_error",
            LLMError::MalformedResponse(_) | LLMError::Json(_) => "malformed_response",
            LLMError::Configuration(_) => "configuration_error",
            LLMError::Cancelled => "cancelled",
        }
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;
