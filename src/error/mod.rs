//! Error types for authdance.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for every consumer, dance and provider operation.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Authorization callback is missing the code parameter")]
    MissingCode,

    #[error("Provider returned error '{error}'")]
    ProviderError {
        error: String,
        description: Option<String>,
    },

    #[error("No handshake state stashed under '{0}'")]
    MissingHandshakeState(String),

    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Access token expired")]
    TokenExpired,

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Stash error: {0}")]
    Stash(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Build a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) | Self::Status { .. } => ErrorCategory::Transport,
            Self::TokenExpired => ErrorCategory::TokenExpired,
            Self::NotImplemented(_) => ErrorCategory::NotImplemented,
            Self::Stash(_) => ErrorCategory::Storage,
            Self::Configuration(_) | Self::InvalidUrl(_) => ErrorCategory::Configuration,
            Self::Protocol(_)
            | Self::StateMismatch
            | Self::MissingCode
            | Self::ProviderError { .. }
            | Self::MissingHandshakeState(_)
            | Self::MissingRefreshToken
            | Self::UnsupportedContentType(_)
            | Self::Serialization(_) => ErrorCategory::Protocol,
        }
    }

    /// Only an expired token can be recovered from, and only by refreshing it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            Self::TokenExpired => RecoverySuggestion::RefreshToken,
            Self::StateMismatch
            | Self::MissingCode
            | Self::MissingHandshakeState(_)
            | Self::MissingRefreshToken
            | Self::ProviderError { .. } => RecoverySuggestion::RestartDance,
            Self::Transport(_) | Self::Status { .. } => RecoverySuggestion::CheckTransport,
            Self::NotImplemented(_) | Self::Configuration(_) | Self::InvalidUrl(_) => {
                RecoverySuggestion::CheckConfiguration
            }
            _ => RecoverySuggestion::None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<url::ParseError> for AuthError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidUrl(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AuthError>;
