use serde_json::Value;

use crate::config::OAuth2Config;
use crate::profile::{value_to_string, Profile};

use super::{ProviderEndpoints, ProviderKind};

pub fn endpoints() -> ProviderEndpoints {
    ProviderEndpoints {
        request_token_url: None,
        authorization_url: "https://github.com/login/oauth/authorize".to_string(),
        access_token_url: "https://github.com/login/oauth/access_token".to_string(),
        profile_url: "https://api.github.com/user".to_string(),
        emails_url: None,
    }
}

/// GitHub answers token requests url-encoded unless JSON is accepted; the
/// default token parser handles both.
pub fn config(endpoints: &ProviderEndpoints, scope: Vec<String>) -> OAuth2Config {
    let kind = ProviderKind::GitHub;
    OAuth2Config::builder()
        .name(kind.name())
        .verbose_name(kind.verbose_name())
        .authorization_url(endpoints.authorization_url.clone())
        .access_token_url(endpoints.access_token_url.clone())
        .scope(scope)
        .build()
}

pub fn normalize_profile(data: &Value) -> Profile {
    Profile {
        uid: value_to_string(data.get("id")),
        email: value_to_string(data.get("email")),
        username: value_to_string(data.get("login")),
        avatar_url: value_to_string(data.get("avatar_url")),
        ..Profile::default()
    }
}
