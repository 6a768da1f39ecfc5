#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use authdance::auth::NormalizedToken;
use authdance::config::{ClientCredentials, OAuth1Config, OAuth2Config};
use authdance::consumer::Consumer;
use authdance::error::Result;
use authdance::http::HttpMethod;
use authdance::oauth1::{OAuth1Consumer, OAuth1Signer};
use authdance::oauth2::OAuth2Consumer;
use authdance::profile::{value_to_string, Profile, ProfileCapable};
use authdance::request::RefreshCallback;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use wiremock::{MockServer, Request};

pub const REDIRECT_URI: &str = "https://example.org/callback";

pub fn credentials() -> ClientCredentials {
    ClientCredentials::new("client_id", "client_secret")
}

pub fn scope() -> Vec<String> {
    vec!["scope1".to_string(), "scope2".to_string()]
}

pub fn oauth1_config(server: &MockServer) -> OAuth1Config {
    OAuth1Config::builder()
        .name("mockoauth1provider")
        .verbose_name("Mock OAuth1 Provider")
        .request_token_url(format!("{}/oauth/request_token", server.uri()))
        .authorization_url("https://example.org/oauth/authorize")
        .access_token_url(format!("{}/oauth/token", server.uri()))
        .build()
}

pub fn oauth2_config(server: &MockServer) -> OAuth2Config {
    OAuth2Config::builder()
        .name("mockoauth2provider")
        .verbose_name("Mock OAuth2 Provider")
        .authorization_url("https://example.org/oauth/authorize")
        .access_token_url(format!("{}/oauth/token", server.uri()))
        .scope(scope())
        .build()
}

pub fn oauth1_consumer(server: &MockServer, token: Option<&NormalizedToken>) -> OAuth1Consumer {
    OAuth1Consumer::new(oauth1_config(server), credentials(), token)
}

pub fn oauth2_consumer(server: &MockServer, token: Option<&NormalizedToken>) -> OAuth2Consumer {
    OAuth2Consumer::new(oauth2_config(server), credentials(), token)
}

/// Whole-second timestamp a day ahead, so it survives an epoch round-trip.
pub fn future() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(Utc::now().timestamp() + 86_400, 0)
        .unwrap_or_else(Utc::now)
}

pub fn past() -> DateTime<Utc> {
    Utc::now() - Duration::days(1)
}

pub fn oauth1_token() -> NormalizedToken {
    NormalizedToken {
        token: "AT".to_string(),
        extra: Some("RT".to_string()),
        scope: None,
        expires_at: None,
    }
}

pub fn valid_oauth2_token() -> NormalizedToken {
    NormalizedToken {
        token: "AT".to_string(),
        extra: Some("RT".to_string()),
        scope: Some("scope1 scope2".to_string()),
        expires_at: Some(future()),
    }
}

pub fn expired_oauth2_token() -> NormalizedToken {
    NormalizedToken {
        expires_at: Some(past()),
        ..valid_oauth2_token()
    }
}

pub fn token_expires_at_json(expires_at: DateTime<Utc>) -> Value {
    json!({
        "access_token": "AT",
        "refresh_token": "RT",
        "expires_at": expires_at.timestamp(),
        "scope": "scope1 scope2"
    })
}

pub fn profile_json() -> Value {
    json!({"id": "1", "first_name": "John", "last_name": "Carter", "email": "john.carter@fromearth.org"})
}

pub fn expected_profile() -> Profile {
    Profile {
        uid: Some("1".to_string()),
        email: Some("john.carter@fromearth.org".to_string()),
        first_name: Some("John".to_string()),
        last_name: Some("Carter".to_string()),
        ..Profile::default()
    }
}

/// Consumer with a custom profile endpoint, the way an application would
/// add a provider the registry does not know.
pub struct MockProfileProvider {
    pub consumer: Consumer,
    pub profile_url: String,
}

#[async_trait]
impl ProfileCapable for MockProfileProvider {
    fn consumer_mut(&mut self) -> &mut Consumer {
        &mut self.consumer
    }

    fn profile_url(&self) -> Result<String> {
        Ok(self.profile_url.clone())
    }

    async fn normalize_profile_data(&mut self, data: Value) -> Result<Profile> {
        Ok(Profile {
            uid: value_to_string(data.get("id")),
            email: value_to_string(data.get("email")),
            first_name: value_to_string(data.get("first_name")),
            last_name: value_to_string(data.get("last_name")),
            ..Profile::default()
        })
    }
}

/// Records every token handed to it.
pub fn recording_callback() -> (RefreshCallback, Arc<Mutex<Vec<NormalizedToken>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: RefreshCallback = Arc::new(move |token: &NormalizedToken| {
        sink.lock().expect("callback lock poisoned").push(token.clone());
    });
    (callback, seen)
}

pub fn query_value(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

/// Re-sign a received OAuth1 request with its own nonce and timestamp and
/// compare signatures.
pub fn assert_oauth1_signature(request: &Request, token: Option<(&str, &str)>) {
    let mut unsigned = request.url.clone();
    let kept: Vec<(String, String)> = request
        .url
        .query_pairs()
        .filter(|(k, _)| !k.starts_with("oauth_"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    unsigned.set_query(None);
    if !kept.is_empty() {
        unsigned.query_pairs_mut().extend_pairs(kept);
    }

    let mut signer = OAuth1Signer::new("client_id", "client_secret");
    if let Some((key, secret)) = token {
        signer.resource_owner_key = Some(key.to_string());
        signer.resource_owner_secret = Some(secret.to_string());
    }
    signer.callback_uri = query_value(request, "oauth_callback");
    signer.verifier = query_value(request, "oauth_verifier");

    let method: HttpMethod = request.method.as_str().parse().expect("known method");
    let resigned = signer
        .sign_with(
            method,
            unsigned.as_str(),
            None,
            &query_value(request, "oauth_nonce").expect("nonce"),
            &query_value(request, "oauth_timestamp").expect("timestamp"),
        )
        .expect("re-sign");
    let expected = url::Url::parse(&resigned)
        .expect("signed url")
        .query_pairs()
        .find(|(k, _)| k == "oauth_signature")
        .map(|(_, v)| v.into_owned());
    assert_eq!(query_value(request, "oauth_signature"), expected);
}
