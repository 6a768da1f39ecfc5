use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::auth::{NormalizedToken, OAuth1WireToken, RequestToken, Stash};
use crate::config::{merge_params, ClientCredentials, OAuth1Config};
use crate::dance::Dance;
use crate::error::{AuthError, Result};
use crate::http::{
    add_params_to_uri, ensure_success, query_pairs, HttpClient, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};
use crate::request::RequestOptions;

use super::signer::OAuth1Signer;

/// Three-legged OAuth1 consumer.
///
/// Flow: [`get_request_token`](Self::get_request_token) ->
/// [`get_authorization_url`](Self::get_authorization_url) -> user approves at
/// the provider -> [`get_access_token`](Self::get_access_token). Usually
/// driven through [`dance`](Self::dance).
///
/// # Example
/// ```
/// use authdance::auth::RequestToken;
/// use authdance::config::{ClientCredentials, OAuth1Config};
/// use authdance::oauth1::OAuth1Consumer;
///
/// let config = OAuth1Config::builder()
///     .name("example")
///     .verbose_name("Example")
///     .request_token_url("https://example.org/oauth/request_token")
///     .authorization_url("https://example.org/oauth/authorize")
///     .access_token_url("https://example.org/oauth/token")
///     .build();
/// let consumer = OAuth1Consumer::new(config, ClientCredentials::new("id", "secret"), None);
/// let request_token = RequestToken { oauth_token: "token".into(), ..Default::default() };
/// assert_eq!(
///     consumer.get_authorization_url(&request_token)?,
///     "https://example.org/oauth/authorize?oauth_token=token"
/// );
/// # Ok::<(), authdance::error::AuthError>(())
/// ```
pub struct OAuth1Consumer {
    config: OAuth1Config,
    signer: OAuth1Signer,
    http: Arc<dyn HttpClient>,
}

impl fmt::Debug for OAuth1Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Consumer")
            .field("config", &self.config)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for OAuth1Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.config.verbose_name)
    }
}

impl OAuth1Consumer {
    pub fn new(
        config: OAuth1Config,
        credentials: ClientCredentials,
        token: Option<&NormalizedToken>,
    ) -> Self {
        let signer = OAuth1Signer::new(credentials.client_id, credentials.client_secret);
        let mut consumer = Self {
            config,
            signer,
            http: Arc::new(ReqwestHttpClient::new()),
        };
        consumer.set_token(token.map(OAuth1WireToken::denormalize));
        consumer
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

    pub fn config(&self) -> &OAuth1Config {
        &self.config
    }

    pub fn signer(&self) -> &OAuth1Signer {
        &self.signer
    }

    /// Start a resumable handshake bound to `stash` and `redirect_uri`.
    pub fn dance<'a>(&'a mut self, stash: &'a dyn Stash, redirect_uri: impl Into<String>) -> Dance<'a> {
        Dance::oauth1(self, stash, redirect_uri)
    }

    /// Adopt a token as the resource-owner credentials. `None` is a no-op.
    pub fn set_token(&mut self, token: Option<OAuth1WireToken>) {
        let Some(token) = token else {
            return;
        };
        self.signer.resource_owner_key = token.oauth_token;
        self.signer.resource_owner_secret = token.oauth_token_secret;
    }

    /// Step 1: obtain temporary credentials bound to `redirect_uri`.
    pub async fn get_request_token(&self, redirect_uri: &str) -> Result<RequestToken> {
        let mut signer = self.signer.clone();
        signer.callback_uri = Some(redirect_uri.to_string());
        let uri = signer.sign(self.config.token_method, &self.config.request_token_url, None)?;

        debug!(consumer = %self.config.name, url = %self.config.request_token_url, "OAuth1 request token");
        let response = self
            .http
            .execute(HttpRequest::new(self.config.token_method, uri))
            .await?;
        let response = ensure_success(response)?;
        RequestToken::from_form(response.text())
    }

    /// Step 2: where to send the user. No I/O.
    pub fn get_authorization_url(&self, request_token: &RequestToken) -> Result<String> {
        add_params_to_uri(
            &self.config.authorization_url,
            [("oauth_token", request_token.oauth_token.as_str())],
        )
    }

    /// Step 3: trade the verifier from `callback_uri` for an access token and
    /// adopt it.
    pub async fn get_access_token(
        &mut self,
        callback_uri: &str,
        request_token: &RequestToken,
    ) -> Result<NormalizedToken> {
        let callback = query_pairs(callback_uri)?;
        let verifier = callback
            .get("oauth_verifier")
            .cloned()
            .ok_or_else(|| AuthError::protocol("callback is missing oauth_verifier"))?;

        // The verifier and request token only live on this copy of the signer.
        let mut signer = self.signer.clone();
        signer.verifier = Some(verifier);
        signer.resource_owner_key = Some(request_token.oauth_token.clone());
        signer.resource_owner_secret = Some(request_token.oauth_token_secret.clone());
        let uri = signer.sign(self.config.token_method, &self.config.access_token_url, None)?;

        debug!(consumer = %self.config.name, url = %self.config.access_token_url, "OAuth1 access token");
        let response = self
            .http
            .execute(HttpRequest::new(self.config.token_method, uri))
            .await?;
        let response = ensure_success(response)?;

        let token = OAuth1WireToken::from_form(response.text());
        if token.oauth_token.is_none() {
            return Err(AuthError::protocol(
                "access token response is missing oauth_token",
            ));
        }
        let normalized = token.normalize();
        self.set_token(Some(token));
        debug!(consumer = %self.config.name, "OAuth1 token adopted");
        Ok(normalized)
    }

    /// Signed resource request with the adopted token. OAuth1 tokens do not
    /// expire, so there is no refresh path.
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        let method = options.method.unwrap_or(self.config.request_method);
        let params = merge_params(&self.config.request_extra_params, &options.params);
        let uri = add_params_to_uri(url, params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        let form_body = if options.has_form_body() {
            options.body.as_deref()
        } else {
            None
        };
        let signed = self.signer.sign(method, &uri, form_body)?;

        debug!(consumer = %self.config.name, %method, url = %url, "OAuth1 resource request");
        let response = self
            .http
            .execute(HttpRequest {
                method,
                url: signed,
                headers: options.headers,
                body: options.body,
            })
            .await?;
        ensure_success(response)
    }

    /// Normalized form of the adopted token, `None` before any adoption.
    pub fn get_token(&self) -> Option<NormalizedToken> {
        self.signer.resource_owner_key.as_ref()?;
        Some(
            OAuth1WireToken {
                oauth_token: self.signer.resource_owner_key.clone(),
                oauth_token_secret: self.signer.resource_owner_secret.clone(),
            }
            .normalize(),
        )
    }
}
