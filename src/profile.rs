//! User profile retrieval, normalized across providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::consumer::Consumer;
use crate::error::{AuthError, Result};
use crate::request::RequestOptions;

/// Provider-independent user profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// First character of the provider's value, e.g. `m` or `f`.
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
}

/// Fetch and normalize the authenticated user's profile.
///
/// Implementors supply the profile endpoint and the normalizer; the defaults
/// report [`AuthError::NotImplemented`].
#[async_trait]
pub trait ProfileCapable: Send {
    fn consumer_mut(&mut self) -> &mut Consumer;

    fn profile_url(&self) -> Result<String> {
        Err(AuthError::NotImplemented("profile_url".to_string()))
    }

    /// May issue further requests through [`consumer_mut`](Self::consumer_mut).
    async fn normalize_profile_data(&mut self, _data: Value) -> Result<Profile> {
        Err(AuthError::NotImplemented(
            "normalize_profile_data".to_string(),
        ))
    }

    async fn get_profile(&mut self) -> Result<Profile> {
        let url = self.profile_url()?;
        debug!(url = %url, "fetching profile");
        let response = self
            .consumer_mut()
            .request(&url, RequestOptions::default())
            .await?;
        let data: Value = response.json()?;
        self.normalize_profile_data(data).await
    }
}

/// A bare consumer knows no profile endpoint.
#[async_trait]
impl ProfileCapable for Consumer {
    fn consumer_mut(&mut self) -> &mut Consumer {
        self
    }
}

/// Strings pass through, numbers are rendered, null and absent are `None`.
pub fn value_to_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn gender_initial(value: Option<&Value>) -> Option<String> {
    value?.as_str()?.chars().next().map(String::from)
}

pub fn flag(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}
