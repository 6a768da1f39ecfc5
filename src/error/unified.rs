//! Error classification and recovery hints.

use strum::Display;

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// The HTTP round-trip failed or the provider answered with a non-2xx status.
    Transport,
    /// The provider (or the callback) sent something this crate cannot accept.
    Protocol,
    /// The held OAuth2 access token is past its expiry.
    TokenExpired,
    /// A provider capability was never configured.
    NotImplemented,
    /// The caller-supplied stash failed.
    Storage,
    Configuration,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Refresh the token and retry the request once.
    RefreshToken,
    /// Send the user through the authorization dance again.
    RestartDance,
    CheckConfiguration,
    CheckTransport,
    None,
}
