use serde_json::Value;

use crate::config::{params, OAuth2Config};
use crate::profile::{flag, gender_initial, value_to_string, Profile};

use super::{ProviderEndpoints, ProviderKind};

pub fn endpoints() -> ProviderEndpoints {
    ProviderEndpoints {
        request_token_url: None,
        authorization_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
        access_token_url: "https://accounts.google.com/o/oauth2/token".to_string(),
        profile_url: "https://www.googleapis.com/oauth2/v1/userinfo".to_string(),
        emails_url: None,
    }
}

pub fn config(endpoints: &ProviderEndpoints, scope: Vec<String>) -> OAuth2Config {
    let kind = ProviderKind::Google;
    OAuth2Config::builder()
        .name(kind.name())
        .verbose_name(kind.verbose_name())
        .authorization_url(endpoints.authorization_url.clone())
        .access_token_url(endpoints.access_token_url.clone())
        .scope(scope)
        .authorization_params(params([("approval_prompt", "auto")]))
        .request_extra_params(params([("alt", "json")]))
        .build()
}

pub fn normalize_profile(data: &Value) -> Profile {
    Profile {
        uid: value_to_string(data.get("id")),
        email: value_to_string(data.get("email")),
        username: value_to_string(data.get("email")),
        first_name: value_to_string(data.get("given_name")),
        last_name: value_to_string(data.get("family_name")),
        gender: gender_initial(data.get("gender")),
        birthdate: value_to_string(data.get("dob")),
        avatar_url: value_to_string(data.get("picture")),
        is_verified: flag(data.get("verified_email")),
    }
}
