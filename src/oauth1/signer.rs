//! RFC 5849 request signing: HMAC-SHA1, signature delivered in the query.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::Url;

use crate::error::{AuthError, Result};
use crate::http::{parse_form, HttpMethod};

pub const SIGNATURE_HMAC_SHA1: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Signs requests on behalf of a client and, once a token is adopted, a
/// resource owner.
#[derive(Clone)]
pub struct OAuth1Signer {
    client_key: String,
    client_secret: String,
    pub resource_owner_key: Option<String>,
    pub resource_owner_secret: Option<String>,
    pub callback_uri: Option<String>,
    pub verifier: Option<String>,
}

impl std::fmt::Debug for OAuth1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Signer")
            .field("client_key", &self.client_key)
            .field("resource_owner_key", &self.resource_owner_key)
            .field("callback_uri", &self.callback_uri)
            .finish_non_exhaustive()
    }
}

impl OAuth1Signer {
    pub fn new(client_key: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_key: client_key.into(),
            client_secret: client_secret.into(),
            resource_owner_key: None,
            resource_owner_secret: None,
            callback_uri: None,
            verifier: None,
        }
    }

    pub fn client_key(&self) -> &str {
        &self.client_key
    }

    /// Sign `uri` with a fresh nonce and the current timestamp.
    ///
    /// `form_body` is included in the signature base string when the request
    /// carries an `application/x-www-form-urlencoded` body.
    pub fn sign(&self, method: HttpMethod, uri: &str, form_body: Option<&str>) -> Result<String> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = Utc::now().timestamp().to_string();
        self.sign_with(method, uri, form_body, &nonce, &timestamp)
    }

    /// Deterministic signing, for a caller-chosen nonce and timestamp.
    pub fn sign_with(
        &self,
        method: HttpMethod,
        uri: &str,
        form_body: Option<&str>,
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let oauth_params = self.oauth_params(nonce, timestamp);
        let base = signature_base_string(method, uri, &oauth_params, form_body)?;
        let signature = self.hmac_sha1(&base)?;

        let mut url = Url::parse(uri)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &oauth_params {
                query.append_pair(key, value);
            }
            query.append_pair("oauth_signature", &signature);
        }
        Ok(url.into())
    }

    fn oauth_params(&self, nonce: &str, timestamp: &str) -> Vec<(String, String)> {
        let mut params = vec![
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
            (
                "oauth_signature_method".to_string(),
                SIGNATURE_HMAC_SHA1.to_string(),
            ),
            ("oauth_consumer_key".to_string(), self.client_key.clone()),
        ];
        if let Some(key) = &self.resource_owner_key {
            params.push(("oauth_token".to_string(), key.clone()));
        }
        if let Some(callback) = &self.callback_uri {
            params.push(("oauth_callback".to_string(), callback.clone()));
        }
        if let Some(verifier) = &self.verifier {
            params.push(("oauth_verifier".to_string(), verifier.clone()));
        }
        params
    }

    fn hmac_sha1(&self, base: &str) -> Result<String> {
        let key = format!(
            "{}&{}",
            percent_encode(&self.client_secret),
            percent_encode(self.resource_owner_secret.as_deref().unwrap_or_default())
        );
        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .map_err(|e| AuthError::Configuration(format!("invalid signing key: {e}")))?;
        mac.update(base.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// RFC 3986 percent-encoding: everything but unreserved characters.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build the signature base string: `METHOD&uri&params`.
pub fn signature_base_string(
    method: HttpMethod,
    uri: &str,
    oauth_params: &[(String, String)],
    form_body: Option<&str>,
) -> Result<String> {
    let url = Url::parse(uri)?;
    let host = url
        .host_str()
        .ok_or_else(|| AuthError::InvalidUrl(format!("{uri} has no host")))?
        .to_ascii_lowercase();
    let base_uri = match url.port() {
        Some(port) => format!("{}://{host}:{port}{}", url.scheme(), url.path()),
        None => format!("{}://{host}{}", url.scheme(), url.path()),
    };

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (percent_encode(&k), percent_encode(&v)))
        .collect();
    params.extend(
        oauth_params
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v))),
    );
    if let Some(body) = form_body {
        params.extend(
            parse_form(body)
                .into_iter()
                .map(|(k, v)| (percent_encode(&k), percent_encode(&v))),
        );
    }
    params.sort();
    let normalized = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method,
        percent_encode(&base_uri),
        percent_encode(&normalized)
    ))
}
