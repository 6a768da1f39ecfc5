use serde_json::Value;

use crate::config::OAuth2Config;
use crate::error::{AuthError, Result};
use crate::http::HttpResponse;
use crate::oauth2::client::{form_to_json, TokenResponseFixup, BEARER};
use crate::profile::{flag, gender_initial, value_to_string, Profile};

use super::{ProviderEndpoints, ProviderKind};

const GRAPH_URL: &str = "https://graph.facebook.com";

pub fn endpoints() -> ProviderEndpoints {
    ProviderEndpoints {
        request_token_url: None,
        authorization_url: "https://www.facebook.com/dialog/oauth".to_string(),
        access_token_url: format!("{GRAPH_URL}/oauth/access_token"),
        profile_url: format!("{GRAPH_URL}/me"),
        emails_url: None,
    }
}

pub fn config(endpoints: &ProviderEndpoints, scope: Vec<String>) -> OAuth2Config {
    let kind = ProviderKind::Facebook;
    OAuth2Config::builder()
        .name(kind.name())
        .verbose_name(kind.verbose_name())
        .authorization_url(endpoints.authorization_url.clone())
        .access_token_url(endpoints.access_token_url.clone())
        .scope(scope)
        .token_response(normalize_token_response as TokenResponseFixup)
        .build()
}

/// The Graph API answers token requests with JSON or a `text/plain`
/// url-encoded body, names the lifetime `expires` and may omit `token_type`.
pub fn normalize_token_response(response: &HttpResponse) -> Result<Value> {
    let content_type = response.content_type().unwrap_or_default();
    let mut data = if content_type.contains("application/json") {
        serde_json::from_str::<Value>(response.text())?
    } else if content_type.contains("text/plain") {
        form_to_json(response.text())
    } else {
        return Err(AuthError::UnsupportedContentType(content_type.to_string()));
    };

    let object = data
        .as_object_mut()
        .ok_or_else(|| AuthError::protocol("facebook token response is not an object"))?;
    if let Some(expires) = object.remove("expires") {
        object.insert("expires_in".to_string(), expires);
    }
    object
        .entry("token_type")
        .or_insert_with(|| Value::String(BEARER.to_string()));
    Ok(data)
}

pub fn normalize_profile(data: &Value) -> Profile {
    let uid = value_to_string(data.get("id"));
    Profile {
        avatar_url: uid.as_ref().map(|id| {
            format!("{GRAPH_URL}/{id}/picture?type=large&return_ssl_resources=1")
        }),
        uid,
        email: value_to_string(data.get("email")),
        username: value_to_string(data.get("username")),
        first_name: value_to_string(data.get("first_name")),
        last_name: value_to_string(data.get("last_name")),
        gender: gender_initial(data.get("gender")),
        birthdate: value_to_string(data.get("dob")),
        is_verified: flag(data.get("verified")),
    }
}
