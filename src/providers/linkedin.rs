use serde_json::Value;

use crate::config::{params, OAuth2Config};
use crate::profile::{value_to_string, Profile};

use super::{ProviderEndpoints, ProviderKind};

pub fn endpoints() -> ProviderEndpoints {
    ProviderEndpoints {
        request_token_url: None,
        authorization_url: "https://www.linkedin.com/uas/oauth2/authorization".to_string(),
        access_token_url: "https://api.linkedin.com/uas/oauth2/accessToken".to_string(),
        profile_url:
            "https://api.linkedin.com/v1/people/~:(id,first-name,last-name,picture-url,email-address)"
                .to_string(),
        emails_url: None,
    }
}

pub fn config(endpoints: &ProviderEndpoints, scope: Vec<String>) -> OAuth2Config {
    let kind = ProviderKind::LinkedIn;
    OAuth2Config::builder()
        .name(kind.name())
        .verbose_name(kind.verbose_name())
        .authorization_url(endpoints.authorization_url.clone())
        .access_token_url(endpoints.access_token_url.clone())
        .scope(scope)
        .request_extra_params(params([("format", "json")]))
        .build()
}

pub fn normalize_profile(data: &Value) -> Profile {
    Profile {
        uid: value_to_string(data.get("id")),
        email: value_to_string(data.get("emailAddress")),
        username: value_to_string(data.get("emailAddress")),
        first_name: value_to_string(data.get("firstName")),
        last_name: value_to_string(data.get("lastName")),
        avatar_url: value_to_string(data.get("pictureUrl")),
        ..Profile::default()
    }
}
