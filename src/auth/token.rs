use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AuthError, Result};
use crate::http::parse_form;

/// Protocol-agnostic token, the only token shape callers ever see.
///
/// # Example
/// ```
/// use authdance::auth::NormalizedToken;
///
/// let token = NormalizedToken {
///     token: "access".to_string(),
///     extra: Some("refresh".to_string()),
///     scope: Some("openid email".to_string()),
///     expires_at: None,
/// };
/// assert!(!token.is_expired());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedToken {
    /// OAuth2 `access_token` or OAuth1 `oauth_token`.
    pub token: String,
    /// OAuth2 `refresh_token` or OAuth1 `oauth_token_secret`.
    pub extra: Option<String>,
    /// Space-joined scope list. Always `None` for OAuth1.
    pub scope: Option<String>,
    /// OAuth2 only; OAuth1 tokens never expire.
    pub expires_at: Option<DateTime<Utc>>,
}

impl NormalizedToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            extra: None,
            scope: None,
            expires_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at < Utc::now())
    }
}

/// OAuth1 temporary credentials returned by the request-token endpoint.
///
/// Lives in the stash between the authorization redirect and the
/// access-token exchange; never exposed as a [`NormalizedToken`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
    pub oauth_token: String,
    #[serde(default)]
    pub oauth_token_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_callback_confirmed: Option<String>,
}

impl RequestToken {
    /// Parse a url-encoded request-token response body.
    pub fn from_form(body: &str) -> Result<Self> {
        let mut token = RequestToken::default();
        let mut has_token = false;
        for (key, value) in parse_form(body) {
            match key.as_str() {
                "oauth_token" => {
                    token.oauth_token = value;
                    has_token = true;
                }
                "oauth_token_secret" => token.oauth_token_secret = value,
                "oauth_callback_confirmed" => token.oauth_callback_confirmed = Some(value),
                _ => {}
            }
        }
        if !has_token {
            return Err(AuthError::protocol(
                "request token response is missing oauth_token",
            ));
        }
        Ok(token)
    }
}

/// OAuth1 token as the signer understands it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuth1WireToken {
    pub oauth_token: Option<String>,
    pub oauth_token_secret: Option<String>,
}

impl OAuth1WireToken {
    /// Parse a url-encoded access-token response body.
    pub fn from_form(body: &str) -> Self {
        let mut token = OAuth1WireToken::default();
        for (key, value) in parse_form(body) {
            match key.as_str() {
                "oauth_token" => token.oauth_token = Some(value),
                "oauth_token_secret" => token.oauth_token_secret = Some(value),
                _ => {}
            }
        }
        token
    }

    /// Scope and expiry are dropped, OAuth1 has neither.
    pub fn denormalize(token: &NormalizedToken) -> Self {
        Self {
            oauth_token: Some(token.token.clone()),
            oauth_token_secret: token.extra.clone(),
        }
    }

    pub fn normalize(&self) -> NormalizedToken {
        NormalizedToken {
            token: self.oauth_token.clone().unwrap_or_default(),
            extra: self.oauth_token_secret.clone(),
            scope: None,
            expires_at: None,
        }
    }
}

/// OAuth2 token as returned by a token endpoint and held by the bearer client.
///
/// `expires_at` and `expires_in` accept integers, floats and numeric strings;
/// `scope` accepts a space-separated string or a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuth2WireToken {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, deserialize_with = "de_seconds", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, deserialize_with = "de_seconds", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, deserialize_with = "de_scope")]
    pub scope: Vec<String>,
    /// Provider-specific fields (e.g. `id_token`) kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl OAuth2WireToken {
    /// `expires_at` becomes epoch seconds, 0 when the token has no expiry.
    pub fn denormalize(token: &NormalizedToken) -> Self {
        Self {
            access_token: token.token.clone(),
            refresh_token: token.extra.clone(),
            expires_at: Some(token.expires_at.map(|at| at.timestamp()).unwrap_or(0)),
            scope: token.scope.as_deref().map(split_scope).unwrap_or_default(),
            ..Default::default()
        }
    }

    /// A relative `expires_in` wins over an absolute `expires_at`.
    pub fn normalize(&self) -> NormalizedToken {
        let expires_at = match (self.expires_in, self.expires_at) {
            (Some(secs), _) if secs != 0 => expiry_after(Utc::now(), secs),
            (_, Some(epoch)) if epoch != 0 => DateTime::<Utc>::from_timestamp(epoch, 0),
            _ => None,
        };
        NormalizedToken {
            token: self.access_token.clone(),
            extra: self.refresh_token.clone(),
            scope: Some(self.scope.join(" ")),
            expires_at,
        }
    }

    /// Replace a relative `expires_in` with the absolute `expires_at` it implies.
    pub fn resolve_expiry(&mut self, now: DateTime<Utc>) {
        if let Some(secs) = self.expires_in.take().filter(|secs| *secs != 0) {
            self.expires_at = expiry_after(now, secs).map(|at| at.timestamp());
        }
    }

    pub fn expires_at_datetime(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .filter(|epoch| *epoch != 0)
            .and_then(|epoch| DateTime::<Utc>::from_timestamp(epoch, 0))
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at_datetime().is_some_and(|at| at < Utc::now())
    }
}

/// `now + secs`, or `None` when the provider's lifetime is out of range.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|delta| now.checked_add_signed(delta))
}

/// Split a space-joined scope string, keeping empty segments so joining
/// reproduces the input exactly.
pub fn split_scope(scope: &str) -> Vec<String> {
    if scope.is_empty() {
        return Vec::new();
    }
    scope.split(' ').map(str::to_string).collect()
}

fn seconds_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

fn de_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(seconds_from_value))
}

fn de_scope<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => split_scope(&s),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn future() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(Utc::now().timestamp() + 86_400, 0).unwrap()
    }

    #[test]
    fn oauth1_round_trip_preserves_token_and_secret() {
        let token = NormalizedToken {
            token: "AT".into(),
            extra: Some("RT".into()),
            scope: None,
            expires_at: None,
        };
        assert_eq!(OAuth1WireToken::denormalize(&token).normalize(), token);
    }

    #[test]
    fn oauth1_normalize_drops_scope_and_expiry() {
        let wire = OAuth1WireToken::from_form("oauth_token=token&oauth_token_secret=secret");
        assert_eq!(
            wire.normalize(),
            NormalizedToken {
                token: "token".into(),
                extra: Some("secret".into()),
                scope: None,
                expires_at: None,
            }
        );
    }

    #[test]
    fn oauth2_round_trip_preserves_fields() {
        let token = NormalizedToken {
            token: "AT".into(),
            extra: Some("RT".into()),
            scope: Some("scope1 scope2".into()),
            expires_at: Some(future()),
        };
        assert_eq!(OAuth2WireToken::denormalize(&token).normalize(), token);
    }

    #[test]
    fn oauth2_denormalize_without_expiry_uses_zero() {
        let token = NormalizedToken::new("AT");
        let wire = OAuth2WireToken::denormalize(&token);
        assert_eq!(wire.expires_at, Some(0));
        assert!(wire.scope.is_empty());
        assert!(!wire.is_expired());
        assert_eq!(wire.normalize().expires_at, None);
        assert_eq!(wire.normalize().scope.as_deref(), Some(""));
    }

    #[test]
    fn oauth2_normalize_computes_expiry_from_expires_in() {
        let wire: OAuth2WireToken = serde_json::from_value(json!({
            "access_token": "AT",
            "refresh_token": "RT",
            "expires_in": 86400.0,
            "scope": "scope1 scope2"
        }))
        .unwrap();
        let normalized = wire.normalize();
        let expected = Utc::now() + Duration::seconds(86_400);
        let delta = (normalized.expires_at.unwrap() - expected).num_seconds().abs();
        assert!(delta < 5);
        assert_eq!(normalized.scope.as_deref(), Some("scope1 scope2"));
    }

    #[test]
    fn out_of_range_expires_in_means_no_expiry() {
        for secs in [9_000_000_000_000_000, i64::MAX, i64::MIN] {
            let mut wire = OAuth2WireToken {
                access_token: "AT".into(),
                expires_in: Some(secs),
                ..Default::default()
            };
            assert_eq!(wire.normalize().expires_at, None);
            wire.resolve_expiry(Utc::now());
            assert_eq!(wire.expires_in, None);
            assert_eq!(wire.expires_at, None);
            assert!(!wire.is_expired());
        }
    }

    #[test]
    fn oauth2_wire_accepts_string_seconds_and_scope_list() {
        let wire: OAuth2WireToken = serde_json::from_value(json!({
            "access_token": "AT",
            "expires_in": "3600",
            "scope": ["a", "b"],
            "id_token": "jwt"
        }))
        .unwrap();
        assert_eq!(wire.expires_in, Some(3600));
        assert_eq!(wire.scope, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(wire.extra.get("id_token"), Some(&json!("jwt")));
    }

    #[test]
    fn resolve_expiry_moves_relative_to_absolute() {
        let now = Utc::now();
        let mut wire = OAuth2WireToken {
            access_token: "AT".into(),
            expires_in: Some(60),
            ..Default::default()
        };
        wire.resolve_expiry(now);
        assert_eq!(wire.expires_in, None);
        assert_eq!(wire.expires_at, Some(now.timestamp() + 60));
    }

    #[test]
    fn past_expiry_is_expired() {
        let wire = OAuth2WireToken {
            access_token: "AT".into(),
            expires_at: Some(Utc::now().timestamp() - 60),
            ..Default::default()
        };
        assert!(wire.is_expired());
    }

    #[test]
    fn request_token_requires_oauth_token() {
        let token = RequestToken::from_form(
            "oauth_token=token&oauth_token_secret=secret&oauth_callback_confirmed=true",
        )
        .unwrap();
        assert_eq!(token.oauth_token, "token");
        assert_eq!(token.oauth_callback_confirmed.as_deref(), Some("true"));

        let err = RequestToken::from_form("oauth_token_secret=secret").unwrap_err();
        assert!(matches!(err, AuthError::Protocol(_)));
    }

    #[test]
    fn split_scope_keeps_exact_spacing() {
        assert_eq!(split_scope("a  b").join(" "), "a  b");
        assert!(split_scope("").is_empty());
    }
}
