mod support;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use authdance::auth::InMemoryStash;
use authdance::consumer::Protocol;
use authdance::error::{AuthError, Result};
use authdance::http::{HttpClient, HttpRequest, HttpResponse};
use authdance::profile::{Profile, ProfileCapable};
use authdance::providers::{Provider, ProviderEndpoints, ProviderKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{credentials, oauth1_token, valid_oauth2_token, REDIRECT_URI};

/// Answers every request with one canned response and records what it saw.
struct CannedHttpClient {
    response: HttpResponse,
    seen: Mutex<Vec<HttpRequest>>,
}

#[async_trait]
impl HttpClient for CannedHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.seen.lock().expect("lock").push(request);
        Ok(self.response.clone())
    }
}

fn mock_endpoints(server: &MockServer, kind: ProviderKind) -> ProviderEndpoints {
    let base = server.uri();
    ProviderEndpoints {
        request_token_url: (kind.protocol() == Protocol::OAuth1)
            .then(|| format!("{base}/oauth/request_token")),
        authorization_url: "https://example.org/oauth/authorize".to_string(),
        access_token_url: format!("{base}/oauth/token"),
        profile_url: format!("{base}/profile"),
        emails_url: Some(format!("{base}/emails")),
    }
}

#[test]
fn provider_names() {
    let cases = [
        (ProviderKind::Google, "google", "Google"),
        (ProviderKind::Facebook, "facebook", "Facebook"),
        (ProviderKind::LinkedIn, "linkedin", "LinkedIn"),
        (ProviderKind::GitHub, "github", "GitHub"),
        (ProviderKind::Bitbucket, "bitbucket", "Bitbucket"),
    ];
    for (kind, name, verbose_name) in cases {
        let consumer = kind
            .consumer(credentials(), vec![], None)
            .expect("consumer");
        assert_eq!(consumer.name(), name);
        assert_eq!(consumer.verbose_name(), verbose_name);
        assert_eq!(consumer.to_string(), verbose_name);
    }
}

#[tokio::test]
async fn google_authorization_url_carries_approval_prompt() {
    let stash = InMemoryStash::new();
    let mut consumer = ProviderKind::Google
        .consumer(credentials(), vec!["email".to_string()], None)
        .expect("consumer");
    let url = consumer
        .dance(&stash, REDIRECT_URI)
        .with_state_generator(|| "nonce".to_string())
        .get_authorization_url()
        .await
        .expect("authorization url");
    assert_eq!(
        url,
        "https://accounts.google.com/o/oauth2/auth?response_type=code&client_id=client_id\
         &redirect_uri=https%3A%2F%2Fexample.org%2Fcallback&scope=email&state=nonce&approval_prompt=auto"
    );
}

#[tokio::test]
async fn google_profile_requests_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(query_param("alt", "json"))
        .and(header("authorization", "Bearer AT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1",
            "email": "john.carter@fromearth.org",
            "verified_email": true,
            "given_name": "John",
            "family_name": "Carter",
            "gender": "male"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = valid_oauth2_token();
    let mut provider = Provider::with_endpoints(
        ProviderKind::Google,
        mock_endpoints(&server, ProviderKind::Google),
        credentials(),
        vec![],
        Some(&token),
    )
    .expect("provider");
    let profile = provider.get_profile().await.expect("profile");

    assert_eq!(
        profile,
        Profile {
            uid: Some("1".to_string()),
            email: Some("john.carter@fromearth.org".to_string()),
            username: Some("john.carter@fromearth.org".to_string()),
            first_name: Some("John".to_string()),
            last_name: Some("Carter".to_string()),
            gender: Some("m".to_string()),
            birthdate: None,
            avatar_url: None,
            is_verified: true,
        }
    );
}

#[tokio::test]
async fn facebook_plain_text_token_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("access_token=AT&expires=3600")
                .insert_header("content-type", "text/plain; charset=UTF-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let stash = InMemoryStash::new();
    let mut provider = Provider::with_endpoints(
        ProviderKind::Facebook,
        mock_endpoints(&server, ProviderKind::Facebook),
        credentials(),
        vec![],
        None,
    )
    .expect("provider");
    let mut dance = provider
        .consumer_mut()
        .dance(&stash, REDIRECT_URI)
        .with_state_generator(|| "nonce".to_string());
    dance.get_authorization_url().await.expect("authorization url");
    let token = dance
        .get_access_token("https://example.org/callback?code=code&state=nonce")
        .await
        .expect("access token");

    assert_eq!(token.token, "AT");
    assert_eq!(token.extra, None);
    assert!(token.expires_at.is_some());
}

#[tokio::test]
async fn facebook_html_token_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut consumer = ProviderKind::Facebook
        .consumer_with_endpoints(
            &mock_endpoints(&server, ProviderKind::Facebook),
            credentials(),
            vec![],
            None,
        )
        .expect("consumer");
    let stash = InMemoryStash::new();
    let mut dance = consumer
        .dance(&stash, REDIRECT_URI)
        .with_state_generator(|| "nonce".to_string());
    dance.get_authorization_url().await.expect("authorization url");
    let err = dance
        .get_access_token("https://example.org/callback?code=code&state=nonce")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::UnsupportedContentType(_)));
    drop(dance);
    assert!(consumer.get_token().is_none());
}

#[tokio::test]
async fn github_profile_stringifies_numeric_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "login": "octocat",
            "email": "octocat@github.com",
            "avatar_url": "https://github.com/images/error/octocat_happy.gif"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = valid_oauth2_token();
    let mut provider = Provider::with_endpoints(
        ProviderKind::GitHub,
        mock_endpoints(&server, ProviderKind::GitHub),
        credentials(),
        vec![],
        Some(&token),
    )
    .expect("provider");
    let profile = provider.get_profile().await.expect("profile");

    assert_eq!(profile.uid.as_deref(), Some("1"));
    assert_eq!(profile.username.as_deref(), Some("octocat"));
    assert!(!profile.is_verified);
}

#[tokio::test]
async fn bitbucket_profile_fetches_primary_email() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "username": "jcarter",
                "first_name": "John",
                "last_name": "Carter",
                "avatar": "https://bitbucket.org/account/jcarter/avatar/32/"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/emails"))
        .and(query_param("oauth_token", "AT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"email": "old@fromearth.org", "primary": false},
            {"email": "john.carter@fromearth.org", "primary": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let token = oauth1_token();
    let mut provider = Provider::with_endpoints(
        ProviderKind::Bitbucket,
        mock_endpoints(&server, ProviderKind::Bitbucket),
        credentials(),
        vec![],
        Some(&token),
    )
    .expect("provider");
    let profile = provider.get_profile().await.expect("profile");

    assert_eq!(
        profile,
        Profile {
            uid: Some("jcarter".to_string()),
            email: Some("john.carter@fromearth.org".to_string()),
            username: Some("jcarter".to_string()),
            first_name: Some("John".to_string()),
            last_name: Some("Carter".to_string()),
            avatar_url: Some("https://bitbucket.org/account/jcarter/avatar/32/".to_string()),
            ..Profile::default()
        }
    );
}

#[test]
fn bitbucket_without_request_token_endpoint_is_misconfigured() {
    let endpoints = ProviderEndpoints {
        request_token_url: None,
        ..ProviderKind::Bitbucket.endpoints()
    };
    let err = Provider::with_endpoints(ProviderKind::Bitbucket, endpoints, credentials(), vec![], None)
        .unwrap_err();
    assert!(matches!(err, AuthError::Configuration(_)));
}

#[tokio::test]
async fn provider_requests_go_through_injected_http_client() {
    let http = Arc::new(CannedHttpClient {
        response: HttpResponse::new(200, r#"{"id": 7, "login": "octocat"}"#),
        seen: Mutex::new(Vec::new()),
    });
    let token = valid_oauth2_token();
    let mut provider = Provider::new(ProviderKind::GitHub, credentials(), vec![], Some(&token))
        .expect("provider")
        .with_http_client(http.clone());

    let profile = provider.get_profile().await.expect("profile");
    assert_eq!(profile.uid.as_deref(), Some("7"));

    let seen = http.seen.lock().expect("lock");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].url, "https://api.github.com/user");
    assert!(seen[0]
        .headers
        .contains(&("Authorization".to_string(), "Bearer AT".to_string())));
}
