//! RFC 6749 web-application client: holds the bearer token, detects expiry
//! and encodes authorization/token requests.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::{Map, Value};
use url::Url;

use crate::auth::OAuth2WireToken;
use crate::error::{AuthError, Result};
use crate::http::{parse_form, HttpResponse};

pub const BEARER: &str = "Bearer";

/// Converts a token-endpoint response into the JSON object the generic
/// parser reads. Providers with non-standard responses supply their own.
pub type TokenResponseFixup = fn(&HttpResponse) -> Result<Value>;

/// Default fixup: JSON, falling back to a url-encoded body.
pub fn parse_token_body(response: &HttpResponse) -> Result<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(response.text()) {
        if value.is_object() {
            return Ok(value);
        }
    }
    Ok(form_to_json(response.text()))
}

/// Url-encoded pairs as a JSON object of strings; the last duplicate wins.
pub fn form_to_json(body: &str) -> Value {
    let map: Map<String, Value> = parse_form(body)
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    Value::Object(map)
}

#[derive(Debug, Clone)]
pub struct BearerClient {
    client_id: String,
    token_type: String,
    token: Option<OAuth2WireToken>,
}

impl BearerClient {
    pub fn new(client_id: impl Into<String>, token: Option<OAuth2WireToken>) -> Self {
        Self {
            client_id: client_id.into(),
            token_type: BEARER.to_string(),
            token,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn token(&self) -> Option<&OAuth2WireToken> {
        self.token.as_ref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.token.as_ref()?.refresh_token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<OAuth2WireToken>) {
        self.token = token;
    }

    pub fn is_expired(&self) -> bool {
        self.token.as_ref().is_some_and(OAuth2WireToken::is_expired)
    }

    /// Append the `Authorization` header, refusing expired tokens.
    pub fn add_token(&self, headers: &mut Vec<(String, String)>) -> Result<()> {
        let token = self
            .token
            .as_ref()
            .filter(|token| !token.access_token.is_empty())
            .ok_or_else(|| AuthError::protocol("no access token adopted"))?;
        if token.is_expired() {
            return Err(AuthError::TokenExpired);
        }
        headers.push((
            "Authorization".to_string(),
            format!("{} {}", self.token_type, token.access_token),
        ));
        Ok(())
    }

    /// Authorization-code request URI. Parameter order is fixed:
    /// `response_type`, `client_id`, `redirect_uri`, `scope`, `state`, extras.
    pub fn prepare_authorization_uri(
        &self,
        authorization_url: &str,
        redirect_uri: &str,
        scope: &[String],
        state: &str,
        extra_params: &BTreeMap<String, String>,
    ) -> Result<String> {
        let mut url = Url::parse(authorization_url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", redirect_uri);
            if !scope.is_empty() {
                query.append_pair("scope", &scope.join(" "));
            }
            query.append_pair("state", state);
            for (key, value) in extra_params {
                query.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    pub fn prepare_token_request_body(
        &self,
        code: &str,
        redirect_uri: &str,
        client_secret: &str,
    ) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "authorization_code")
            .append_pair("code", code)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", client_secret)
            .finish()
    }

    pub fn prepare_refresh_body(&self, refresh_token: &str, client_secret: &str) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", refresh_token)
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", client_secret)
            .finish()
    }

    /// Validate a token response. Does not adopt it.
    pub fn parse_token_response(&self, value: Value) -> Result<OAuth2WireToken> {
        let object = value
            .as_object()
            .ok_or_else(|| AuthError::protocol("token response is not an object"))?;
        if let Some(error) = object.get("error") {
            return Err(AuthError::ProviderError {
                error: value_as_string(error),
                description: object.get("error_description").map(value_as_string),
            });
        }
        let mut token: OAuth2WireToken = serde_json::from_value(value)?;
        if token.access_token.is_empty() {
            return Err(AuthError::protocol("token response is missing access_token"));
        }
        token.resolve_expiry(Utc::now());
        Ok(token)
    }
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
