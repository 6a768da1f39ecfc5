use serde::Deserialize;
use serde_json::Value;

use crate::config::OAuth1Config;
use crate::consumer::Consumer;
use crate::error::{AuthError, Result};
use crate::profile::{value_to_string, Profile};
use crate::request::RequestOptions;

use super::{ProviderEndpoints, ProviderKind};

const API_URL: &str = "https://bitbucket.org/api/1.0";

pub fn endpoints() -> ProviderEndpoints {
    ProviderEndpoints {
        request_token_url: Some(format!("{API_URL}/oauth/request_token")),
        authorization_url: format!("{API_URL}/oauth/authenticate"),
        access_token_url: format!("{API_URL}/oauth/access_token"),
        profile_url: format!("{API_URL}/user"),
        emails_url: Some(format!("{API_URL}/emails")),
    }
}

pub fn config(endpoints: &ProviderEndpoints) -> Result<OAuth1Config> {
    let kind = ProviderKind::Bitbucket;
    let request_token_url = endpoints.request_token_url.clone().ok_or_else(|| {
        AuthError::Configuration("bitbucket requires a request token endpoint".to_string())
    })?;
    Ok(OAuth1Config::builder()
        .name(kind.name())
        .verbose_name(kind.verbose_name())
        .request_token_url(request_token_url)
        .authorization_url(endpoints.authorization_url.clone())
        .access_token_url(endpoints.access_token_url.clone())
        .build())
}

#[derive(Debug, Deserialize)]
struct EmailEntry {
    email: Option<String>,
    #[serde(default)]
    primary: bool,
}

/// The profile endpoint omits e-mail; it is listed separately.
pub async fn primary_email(consumer: &mut Consumer, emails_url: &str) -> Result<Option<String>> {
    let response = consumer
        .request(emails_url, RequestOptions::default())
        .await?;
    let entries: Vec<EmailEntry> = response.json()?;
    Ok(entries
        .into_iter()
        .find(|entry| entry.primary)
        .and_then(|entry| entry.email))
}

pub fn normalize_profile(data: &Value, email: Option<String>) -> Profile {
    let user = data.get("user").unwrap_or(&Value::Null);
    Profile {
        uid: value_to_string(user.get("username")),
        email,
        username: value_to_string(user.get("username")),
        first_name: value_to_string(user.get("first_name")),
        last_name: value_to_string(user.get("last_name")),
        avatar_url: value_to_string(user.get("avatar")),
        ..Profile::default()
    }
}
