//! Per-call options for resource requests.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bon::Builder;

use crate::auth::NormalizedToken;
use crate::http::HttpMethod;

/// Invoked with the new token whenever an expired OAuth2 token is silently
/// refreshed, so the caller can persist it.
pub type RefreshCallback = Arc<dyn Fn(&NormalizedToken) + Send + Sync>;

/// Options for [`Consumer::request`](crate::consumer::Consumer::request).
///
/// `auto_refresh_token` and `refresh_token_callback` only matter for OAuth2.
///
/// # Example
/// ```
/// use authdance::http::HttpMethod;
/// use authdance::request::RequestOptions;
///
/// let options = RequestOptions::builder()
///     .method(HttpMethod::Post)
///     .body("{}".to_string())
///     .headers(vec![("Content-Type".to_string(), "application/json".to_string())])
///     .auto_refresh_token(false)
///     .build();
/// assert!(!options.auto_refresh_token);
/// ```
#[derive(Clone, Builder)]
#[builder(on(String, into))]
pub struct RequestOptions {
    /// Overrides the consumer's configured request method.
    pub method: Option<HttpMethod>,
    #[builder(default)]
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Extra query parameters, merged over the consumer defaults.
    #[builder(default)]
    pub params: BTreeMap<String, String>,
    #[builder(default = true)]
    pub auto_refresh_token: bool,
    /// Takes precedence over the consumer-level callback.
    pub refresh_token_callback: Option<RefreshCallback>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: None,
            headers: Vec::new(),
            body: None,
            params: BTreeMap::new(),
            auto_refresh_token: true,
            refresh_token_callback: None,
        }
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("params", &self.params)
            .field("auto_refresh_token", &self.auto_refresh_token)
            .field(
                "refresh_token_callback",
                &self.refresh_token_callback.as_ref().map(|_| ".."),
            )
            .finish()
    }
}

impl RequestOptions {
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn without_auto_refresh(mut self) -> Self {
        self.auto_refresh_token = false;
        self
    }

    pub fn with_refresh_token_callback(mut self, callback: RefreshCallback) -> Self {
        self.refresh_token_callback = Some(callback);
        self
    }

    /// True when the body should be included in an OAuth1 signature.
    pub(crate) fn has_form_body(&self) -> bool {
        self.body.is_some()
            && self.headers.iter().any(|(name, value)| {
                name.eq_ignore_ascii_case("content-type")
                    && value.starts_with("application/x-www-form-urlencoded")
            })
    }
}
