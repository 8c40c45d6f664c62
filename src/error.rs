use thiserror::Error;

/// Why a provider could not be built from its options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option `{0}`")]
    Missing(&'static str),

    #[error("invalid port `{0}`: expected an integer between 1 and 65535")]
    InvalidPort(String),

    #[error("invalid address `{value}` for `{key}`: {reason}")]
    InvalidAddress {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot prepare SMTP relay for `{host}`: {reason}")]
    Smtp { host: String, reason: String },
}

/// Failure of a single delivery attempt.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("cannot build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("cannot encode payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("call to {provider} returned status code {status}: {body}")]
    Rejected {
        provider: &'static str,
        status: u16,
        body: String,
    },
}

impl NotifyError {
    /// True when the remote endpoint answered but refused the message.
    pub fn is_rejection(&self) -> bool {
        matches!(self, NotifyError::Rejected { .. })
    }
}
