use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::{NormalizedToken, OAuth2WireToken, Stash};
use crate::config::{merge_params, ClientCredentials, OAuth2Config};
use crate::dance::Dance;
use crate::error::{AuthError, Result};
use crate::http::{
    add_params_to_uri, ensure_success, query_pairs, HttpClient, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};
use crate::request::{RefreshCallback, RequestOptions};

use super::client::BearerClient;

/// OAuth2 authorization-code consumer with transparent token refresh.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use authdance::config::{ClientCredentials, OAuth2Config};
/// use authdance::oauth2::OAuth2Consumer;
///
/// let config = OAuth2Config::builder()
///     .name("example")
///     .verbose_name("Example")
///     .authorization_url("https://example.org/oauth/authorize")
///     .access_token_url("https://example.org/oauth/token")
///     .build();
/// let consumer = OAuth2Consumer::new(config, ClientCredentials::new("id", "secret"), None);
/// let url = consumer.get_authorization_url("https://app.test/cb", "xyz", &BTreeMap::new())?;
/// assert!(url.ends_with("state=xyz"));
/// assert!(consumer.get_token().is_none());
/// # Ok::<(), authdance::error::AuthError>(())
/// ```
pub struct OAuth2Consumer {
    config: OAuth2Config,
    credentials: ClientCredentials,
    client: BearerClient,
    refresh_token_callback: Option<RefreshCallback>,
    http: Arc<dyn HttpClient>,
}

impl fmt::Debug for OAuth2Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Consumer")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("has_token", &self.client.token().is_some())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for OAuth2Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.config.verbose_name)
    }
}

impl OAuth2Consumer {
    pub fn new(
        config: OAuth2Config,
        credentials: ClientCredentials,
        token: Option<&NormalizedToken>,
    ) -> Self {
        let client = BearerClient::new(
            credentials.client_id.clone(),
            token.map(OAuth2WireToken::denormalize),
        );
        Self {
            config,
            credentials,
            client,
            refresh_token_callback: None,
            http: Arc::new(ReqwestHttpClient::new()),
        }
    }

    /// Called with every silently refreshed token unless a request supplies
    /// its own callback.
    pub fn with_refresh_token_callback(mut self, callback: RefreshCallback) -> Self {
        self.refresh_token_callback = Some(callback);
        self
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = http;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn verbose_name(&self) -> &str {
        &self.config.verbose_name
    }

    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }

    pub fn client(&self) -> &BearerClient {
        &self.client
    }

    /// Start a resumable handshake bound to `stash` and `redirect_uri`.
    pub fn dance<'a>(&'a mut self, stash: &'a dyn Stash, redirect_uri: impl Into<String>) -> Dance<'a> {
        Dance::oauth2(self, stash, redirect_uri)
    }

    /// Authorization URL for `state`. `extra_params` override the configured
    /// `authorization_params` per key. No I/O.
    pub fn get_authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
        extra_params: &BTreeMap<String, String>,
    ) -> Result<String> {
        let params = merge_params(&self.config.authorization_params, extra_params);
        self.client.prepare_authorization_uri(
            &self.config.authorization_url,
            redirect_uri,
            &self.config.scope,
            state,
            &params,
        )
    }

    /// Validate the callback against `state`, exchange its code and adopt the
    /// resulting token.
    pub async fn get_access_token(
        &mut self,
        redirect_uri: &str,
        state: &str,
        callback_uri: &str,
    ) -> Result<NormalizedToken> {
        let callback = query_pairs(callback_uri)?;
        if state.is_empty() || callback.get("state").map(String::as_str) != Some(state) {
            warn!(consumer = %self.config.name, "OAuth2 callback state mismatch");
            return Err(AuthError::StateMismatch);
        }
        if let Some(error) = callback.get("error") {
            return Err(AuthError::ProviderError {
                error: error.clone(),
                description: callback.get("error_description").cloned(),
            });
        }
        let code = callback.get("code").ok_or(AuthError::MissingCode)?;

        let body = self.client.prepare_token_request_body(
            code,
            redirect_uri,
            &self.credentials.client_secret,
        );
        let token = self.token_round_trip(body).await?;
        Ok(self.adopt(token))
    }

    /// Exchange the held refresh token for a new access token. A response
    /// without `refresh_token` keeps the one already held.
    pub async fn refresh_token(&mut self) -> Result<NormalizedToken> {
        let refresh_token = self
            .client
            .refresh_token()
            .ok_or(AuthError::MissingRefreshToken)?
            .to_string();
        let body = self
            .client
            .prepare_refresh_body(&refresh_token, &self.credentials.client_secret);
        let mut token = self.token_round_trip(body).await?;
        token.refresh_token.get_or_insert(refresh_token);
        Ok(self.adopt(token))
    }

    /// Bearer-authenticated resource request.
    ///
    /// An expired token is refreshed at most once and the request retried,
    /// provided `auto_refresh_token` is set and a refresh token is held.
    pub async fn request(&mut self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        match self.send(url, &options).await {
            Err(AuthError::TokenExpired)
                if options.auto_refresh_token && self.client.refresh_token().is_some() =>
            {
                warn!(consumer = %self.config.name, "access token expired, refreshing");
                let token = self.refresh_token().await?;
                if let Some(callback) = options
                    .refresh_token_callback
                    .as_ref()
                    .or(self.refresh_token_callback.as_ref())
                {
                    callback(&token);
                }
                self.send(url, &options).await
            }
            result => result,
        }
    }

    /// Normalized form of the adopted token, `None` before any adoption.
    pub fn get_token(&self) -> Option<NormalizedToken> {
        self.client.token().map(OAuth2WireToken::normalize)
    }

    pub fn set_token(&mut self, token: Option<&NormalizedToken>) {
        self.client.set_token(token.map(OAuth2WireToken::denormalize));
    }

    pub fn is_token_expired(&self) -> bool {
        self.client.is_expired()
    }

    async fn send(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse> {
        let mut headers = options.headers.clone();
        self.client.add_token(&mut headers)?;

        let method = options.method.unwrap_or(self.config.request_method);
        let params = merge_params(&self.config.request_extra_params, &options.params);
        let uri = add_params_to_uri(url, params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

        debug!(consumer = %self.config.name, %method, url = %url, "OAuth2 resource request");
        let response = self
            .http
            .execute(HttpRequest {
                method,
                url: uri,
                headers,
                body: options.body.clone(),
            })
            .await?;
        ensure_success(response)
    }

    async fn token_round_trip(&self, body: String) -> Result<OAuth2WireToken> {
        debug!(
            consumer = %self.config.name,
            method = %self.config.token_method,
            url = %self.config.access_token_url,
            "OAuth2 token request"
        );
        let request = HttpRequest::new(self.config.token_method, &self.config.access_token_url)
            .header("Accept", "application/json")
            .form(body);
        let response = ensure_success(self.http.execute(request).await?)?;
        let value = (self.config.token_response)(&response)?;
        self.client.parse_token_response(value)
    }

    fn adopt(&mut self, token: OAuth2WireToken) -> NormalizedToken {
        let normalized = token.normalize();
        self.client.set_token(Some(token));
        debug!(consumer = %self.config.name, "OAuth2 token adopted");
        normalized
    }
}
