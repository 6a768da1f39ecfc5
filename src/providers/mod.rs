//! Built-in identity providers.

pub mod bitbucket;
pub mod facebook;
pub mod github;
pub mod google;
pub mod linkedin;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

use crate::auth::NormalizedToken;
use crate::config::ClientCredentials;
use crate::consumer::{Consumer, Protocol};
use crate::error::{AuthError, Result};
use crate::http::HttpClient;
use crate::oauth1::OAuth1Consumer;
use crate::oauth2::OAuth2Consumer;
use crate::profile::{Profile, ProfileCapable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    Google,
    Facebook,
    LinkedIn,
    GitHub,
    Bitbucket,
}

impl ProviderKind {
    /// Lower-case identifier, also the stash-key suffix.
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn verbose_name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Facebook => "Facebook",
            Self::LinkedIn => "LinkedIn",
            Self::GitHub => "GitHub",
            Self::Bitbucket => "Bitbucket",
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Bitbucket => Protocol::OAuth1,
            _ => Protocol::OAuth2,
        }
    }

    /// Production endpoints.
    pub fn endpoints(&self) -> ProviderEndpoints {
        match self {
            Self::Google => google::endpoints(),
            Self::Facebook => facebook::endpoints(),
            Self::LinkedIn => linkedin::endpoints(),
            Self::GitHub => github::endpoints(),
            Self::Bitbucket => bitbucket::endpoints(),
        }
    }

    /// Consumer for this provider. `scope` is ignored by OAuth1 providers.
    pub fn consumer(
        &self,
        credentials: ClientCredentials,
        scope: Vec<String>,
        token: Option<&NormalizedToken>,
    ) -> Result<Consumer> {
        self.consumer_with_endpoints(&self.endpoints(), credentials, scope, token)
    }

    pub fn consumer_with_endpoints(
        &self,
        endpoints: &ProviderEndpoints,
        credentials: ClientCredentials,
        scope: Vec<String>,
        token: Option<&NormalizedToken>,
    ) -> Result<Consumer> {
        let consumer = match self {
            Self::Google => OAuth2Consumer::new(google::config(endpoints, scope), credentials, token).into(),
            Self::Facebook => OAuth2Consumer::new(facebook::config(endpoints, scope), credentials, token).into(),
            Self::LinkedIn => OAuth2Consumer::new(linkedin::config(endpoints, scope), credentials, token).into(),
            Self::GitHub => OAuth2Consumer::new(github::config(endpoints, scope), credentials, token).into(),
            Self::Bitbucket => OAuth1Consumer::new(bitbucket::config(endpoints)?, credentials, token).into(),
        };
        Ok(consumer)
    }
}

/// Provider URLs. `request_token_url` is OAuth1 only; `emails_url` is used
/// by providers that serve e-mail addresses separately from the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub request_token_url: Option<String>,
    pub authorization_url: String,
    pub access_token_url: String,
    pub profile_url: String,
    pub emails_url: Option<String>,
}

/// A configured consumer for a built-in provider, with profile support.
#[derive(Debug)]
pub struct Provider {
    kind: ProviderKind,
    endpoints: ProviderEndpoints,
    consumer: Consumer,
}

impl Provider {
    pub fn new(
        kind: ProviderKind,
        credentials: ClientCredentials,
        scope: Vec<String>,
        token: Option<&NormalizedToken>,
    ) -> Result<Self> {
        Self::with_endpoints(kind, kind.endpoints(), credentials, scope, token)
    }

    /// Same provider behavior against different URLs (staging, mocks).
    pub fn with_endpoints(
        kind: ProviderKind,
        endpoints: ProviderEndpoints,
        credentials: ClientCredentials,
        scope: Vec<String>,
        token: Option<&NormalizedToken>,
    ) -> Result<Self> {
        let consumer = kind.consumer_with_endpoints(&endpoints, credentials, scope, token)?;
        Ok(Self {
            kind,
            endpoints,
            consumer,
        })
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.consumer = self.consumer.with_http_client(http);
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    pub fn consumer(&self) -> &Consumer {
        &self.consumer
    }

    pub fn into_consumer(self) -> Consumer {
        self.consumer
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind.verbose_name())
    }
}

#[async_trait]
impl ProfileCapable for Provider {
    fn consumer_mut(&mut self) -> &mut Consumer {
        &mut self.consumer
    }

    fn profile_url(&self) -> Result<String> {
        Ok(self.endpoints.profile_url.clone())
    }

    async fn normalize_profile_data(&mut self, data: Value) -> Result<Profile> {
        match self.kind {
            ProviderKind::Google => Ok(google::normalize_profile(&data)),
            ProviderKind::Facebook => Ok(facebook::normalize_profile(&data)),
            ProviderKind::LinkedIn => Ok(linkedin::normalize_profile(&data)),
            ProviderKind::GitHub => Ok(github::normalize_profile(&data)),
            ProviderKind::Bitbucket => {
                let emails_url = self.endpoints.emails_url.clone().ok_or_else(|| {
                    AuthError::Configuration("bitbucket requires an emails endpoint".to_string())
                })?;
                let email = bitbucket::primary_email(&mut self.consumer, &emails_url).await?;
                Ok(bitbucket::normalize_profile(&data, email))
            }
        }
    }
}
