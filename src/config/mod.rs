//! Consumer configuration: client credentials and per-protocol settings.
//!
//! Every record is immutable once built. Default parameter maps are owned
//! per instance and merged with call-time values, never mutated.

use std::collections::BTreeMap;
use std::fmt;

use bon::Builder;

use crate::error::{AuthError, Result};
use crate::http::HttpMethod;
use crate::oauth2::client::{parse_token_body, TokenResponseFixup};

/// OAuth client credentials issued by the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"..")
            .finish()
    }
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Load `<PREFIX>_CLIENT_ID` and `<PREFIX>_CLIENT_SECRET`, reading `.env`
    /// first when present.
    pub fn from_env(prefix: &str) -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let prefix = prefix.to_uppercase();
        let read = |suffix: &str| {
            let var = format!("{prefix}_{suffix}");
            std::env::var(&var)
                .map_err(|_| AuthError::Configuration(format!("{var} is not set")))
        };
        Ok(Self {
            client_id: read("CLIENT_ID")?,
            client_secret: read("CLIENT_SECRET")?,
        })
    }
}

/// Settings for an OAuth1 (three-legged, HMAC-SHA1) consumer.
///
/// # Example
/// ```
/// use authdance::config::OAuth1Config;
///
/// let config = OAuth1Config::builder()
///     .name("example")
///     .verbose_name("Example")
///     .request_token_url("https://example.org/oauth/request_token")
///     .authorization_url("https://example.org/oauth/authorize")
///     .access_token_url("https://example.org/oauth/token")
///     .build();
/// assert_eq!(config.token_method, authdance::http::HttpMethod::Get);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct OAuth1Config {
    /// Lower-case identifier, used in stash keys.
    pub name: String,
    pub verbose_name: String,
    pub request_token_url: String,
    pub authorization_url: String,
    pub access_token_url: String,
    #[builder(default = HttpMethod::Get)]
    pub token_method: HttpMethod,
    #[builder(default = HttpMethod::Get)]
    pub request_method: HttpMethod,
    #[builder(default)]
    pub request_extra_params: BTreeMap<String, String>,
}

/// Settings for an OAuth2 authorization-code consumer.
///
/// # Example
/// ```
/// use authdance::config::OAuth2Config;
///
/// let config = OAuth2Config::builder()
///     .name("example")
///     .verbose_name("Example")
///     .authorization_url("https://example.org/oauth/authorize")
///     .access_token_url("https://example.org/oauth/token")
///     .scope(vec!["email".to_string()])
///     .build();
/// assert_eq!(config.token_method, authdance::http::HttpMethod::Post);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct OAuth2Config {
    /// Lower-case identifier, used in stash keys.
    pub name: String,
    pub verbose_name: String,
    pub authorization_url: String,
    pub access_token_url: String,
    #[builder(default = HttpMethod::Post)]
    pub token_method: HttpMethod,
    #[builder(default = HttpMethod::Get)]
    pub request_method: HttpMethod,
    #[builder(default)]
    pub scope: Vec<String>,
    #[builder(default)]
    pub authorization_params: BTreeMap<String, String>,
    #[builder(default)]
    pub request_extra_params: BTreeMap<String, String>,
    /// Turns a token-endpoint response into the JSON the generic parser expects.
    #[builder(default = parse_token_body as TokenResponseFixup)]
    pub token_response: TokenResponseFixup,
}

/// Defaults overlaid with call-time values; call-time wins per key.
pub fn merge_params(
    defaults: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = defaults.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Build a parameter map from string pairs.
pub fn params<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
