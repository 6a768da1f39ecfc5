//! Protocol-agnostic consumer facade.

use std::fmt;
use std::sync::Arc;

use strum::{Display, EnumString};

use crate::auth::{NormalizedToken, Stash};
use crate::dance::Dance;
use crate::error::Result;
use crate::http::{HttpClient, HttpResponse};
use crate::oauth1::OAuth1Consumer;
use crate::oauth2::OAuth2Consumer;
use crate::request::RequestOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    OAuth1,
    OAuth2,
}

/// Either protocol behind the common capability set: handshake, token
/// access and authenticated requests.
#[derive(Debug)]
pub enum Consumer {
    OAuth1(OAuth1Consumer),
    OAuth2(OAuth2Consumer),
}

impl Consumer {
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::OAuth1(_) => Protocol::OAuth1,
            Self::OAuth2(_) => Protocol::OAuth2,
        }
    }

    /// Route this consumer's requests through `http`.
    pub fn with_http_client(self, http: Arc<dyn HttpClient>) -> Self {
        match self {
            Self::OAuth1(c) => Self::OAuth1(c.with_http_client(http)),
            Self::OAuth2(c) => Self::OAuth2(c.with_http_client(http)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::OAuth1(c) => c.name(),
            Self::OAuth2(c) => c.name(),
        }
    }

    pub fn verbose_name(&self) -> &str {
        match self {
            Self::OAuth1(c) => c.verbose_name(),
            Self::OAuth2(c) => c.verbose_name(),
        }
    }

    pub fn dance<'a>(&'a mut self, stash: &'a dyn Stash, redirect_uri: impl Into<String>) -> Dance<'a> {
        match self {
            Self::OAuth1(c) => c.dance(stash, redirect_uri),
            Self::OAuth2(c) => c.dance(stash, redirect_uri),
        }
    }

    pub fn get_token(&self) -> Option<NormalizedToken> {
        match self {
            Self::OAuth1(c) => c.get_token(),
            Self::OAuth2(c) => c.get_token(),
        }
    }

    /// Authenticated request. OAuth2 consumers refresh an expired token once.
    pub async fn request(&mut self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        match self {
            Self::OAuth1(c) => c.request(url, options).await,
            Self::OAuth2(c) => c.request(url, options).await,
        }
    }

    pub fn as_oauth1(&self) -> Option<&OAuth1Consumer> {
        match self {
            Self::OAuth1(c) => Some(c),
            Self::OAuth2(_) => None,
        }
    }

    pub fn as_oauth2(&self) -> Option<&OAuth2Consumer> {
        match self {
            Self::OAuth2(c) => Some(c),
            Self::OAuth1(_) => None,
        }
    }

    pub fn as_oauth2_mut(&mut self) -> Option<&mut OAuth2Consumer> {
        match self {
            Self::OAuth2(c) => Some(c),
            Self::OAuth1(_) => None,
        }
    }
}

impl From<OAuth1Consumer> for Consumer {
    fn from(consumer: OAuth1Consumer) -> Self {
        Self::OAuth1(consumer)
    }
}

impl From<OAuth2Consumer> for Consumer {
    fn from(consumer: OAuth2Consumer) -> Self {
        Self::OAuth2(consumer)
    }
}

impl fmt::Display for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verbose_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientCredentials, OAuth1Config};

    #[test]
    fn protocol_round_trips_through_strings() {
        assert_eq!(Protocol::OAuth1.to_string(), "oauth1");
        assert_eq!("oauth2".parse::<Protocol>().unwrap(), Protocol::OAuth2);
    }

    #[test]
    fn facade_delegates_identity() {
        let config = OAuth1Config::builder()
            .name("mock")
            .verbose_name("Mock Provider")
            .request_token_url("https://example.org/oauth/request_token")
            .authorization_url("https://example.org/oauth/authorize")
            .access_token_url("https://example.org/oauth/token")
            .build();
        let consumer: Consumer =
            OAuth1Consumer::new(config, ClientCredentials::new("id", "secret"), None).into();
        assert_eq!(consumer.protocol(), Protocol::OAuth1);
        assert_eq!(consumer.name(), "mock");
        assert_eq!(consumer.to_string(), "Mock Provider");
        assert!(consumer.get_token().is_none());
        assert!(consumer.as_oauth2().is_none());
    }
}
