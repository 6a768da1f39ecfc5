//! Two-call handshake driver that keeps the intermediate state in a stash.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::auth::{stash_key, NormalizedToken, RequestToken, Stash};
use crate::error::{AuthError, Result};
use crate::oauth1::OAuth1Consumer;
use crate::oauth2::OAuth2Consumer;

/// Produces the OAuth2 `state` value for a new handshake.
pub type StateGenerator = fn() -> String;

enum DanceTarget<'a> {
    OAuth1(&'a mut OAuth1Consumer),
    OAuth2(&'a mut OAuth2Consumer),
}

/// One authorization handshake: [`get_authorization_url`](Self::get_authorization_url)
/// before the redirect, [`get_access_token`](Self::get_access_token) on the
/// callback. The two calls may happen on different `Dance` values as long as
/// they share the stash, the consumer name and the redirect URI.
///
/// # Example
/// ```
/// use authdance::auth::{InMemoryStash, Stash};
/// use authdance::config::{ClientCredentials, OAuth2Config};
/// use authdance::oauth2::OAuth2Consumer;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), authdance::error::AuthError> {
/// let config = OAuth2Config::builder()
///     .name("example")
///     .verbose_name("Example")
///     .authorization_url("https://example.org/oauth/authorize")
///     .access_token_url("https://example.org/oauth/token")
///     .build();
/// let mut consumer = OAuth2Consumer::new(config, ClientCredentials::new("id", "secret"), None);
/// let stash = InMemoryStash::new();
/// let mut dance = consumer.dance(&stash, "https://app.test/callback");
/// let url = dance.get_authorization_url().await?;
/// let state = stash.get("oauth2_state_example")?.unwrap_or_default();
/// assert!(url.ends_with(&format!("state={state}")));
/// # Ok(())
/// # }
/// ```
pub struct Dance<'a> {
    target: DanceTarget<'a>,
    stash: &'a dyn Stash,
    redirect_uri: String,
    state_generator: StateGenerator,
}

impl fmt::Debug for Dance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dance")
            .field("stash_key", &self.stash_key())
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

impl<'a> Dance<'a> {
    pub fn oauth1(
        consumer: &'a mut OAuth1Consumer,
        stash: &'a dyn Stash,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            target: DanceTarget::OAuth1(consumer),
            stash,
            redirect_uri: redirect_uri.into(),
            state_generator: generate_state,
        }
    }

    pub fn oauth2(
        consumer: &'a mut OAuth2Consumer,
        stash: &'a dyn Stash,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            target: DanceTarget::OAuth2(consumer),
            stash,
            redirect_uri: redirect_uri.into(),
            state_generator: generate_state,
        }
    }

    /// Replace the random OAuth2 state source.
    pub fn with_state_generator(mut self, generator: StateGenerator) -> Self {
        self.state_generator = generator;
        self
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Key under which this handshake's state is stashed.
    pub fn stash_key(&self) -> String {
        match &self.target {
            DanceTarget::OAuth1(consumer) => stash_key("oauth1", "request_token", consumer.name()),
            DanceTarget::OAuth2(consumer) => stash_key("oauth2", "state", consumer.name()),
        }
    }

    pub async fn get_authorization_url(&mut self) -> Result<String> {
        self.get_authorization_url_with(&BTreeMap::new()).await
    }

    /// Start the handshake and stash its state. OAuth1 performs the
    /// request-token round-trip here and ignores `extra_params`.
    pub async fn get_authorization_url_with(
        &mut self,
        extra_params: &BTreeMap<String, String>,
    ) -> Result<String> {
        let key = self.stash_key();
        match &mut self.target {
            DanceTarget::OAuth1(consumer) => {
                let request_token = consumer.get_request_token(&self.redirect_uri).await?;
                self.stash.set(&key, serde_json::to_string(&request_token)?)?;
                consumer.get_authorization_url(&request_token)
            }
            DanceTarget::OAuth2(consumer) => {
                let state = (self.state_generator)();
                self.stash.set(&key, state.clone())?;
                consumer.get_authorization_url(&self.redirect_uri, &state, extra_params)
            }
        }
    }

    /// Complete the handshake from the provider's callback URI. The stashed
    /// state is consumed whether or not the exchange succeeds.
    pub async fn get_access_token(&mut self, callback_uri: &str) -> Result<NormalizedToken> {
        let key = self.stash_key();
        let stashed = self
            .stash
            .pop(&key)?
            .ok_or_else(|| AuthError::MissingHandshakeState(key.clone()))?;
        debug!(stash_key = %key, "resuming handshake");

        match &mut self.target {
            DanceTarget::OAuth1(consumer) => {
                let request_token: RequestToken = serde_json::from_str(&stashed)?;
                consumer.get_access_token(callback_uri, &request_token).await
            }
            DanceTarget::OAuth2(consumer) => {
                consumer
                    .get_access_token(&self.redirect_uri, &stashed, callback_uri)
                    .await
            }
        }
    }
}

/// 32 hex chars from a v4 UUID (122 random bits).
pub fn generate_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
