//! authdance: OAuth1/OAuth2 consumers for third-party identity providers.
//!
//! Drives the authorization handshake ("dance"), exchanges and refreshes
//! access tokens, and performs authenticated resource requests. Provider
//! token formats are normalized into one [`NormalizedToken`](auth::NormalizedToken).
//!
//! # Quick Start
//!
//! ```no_run
//! use authdance::prelude::*;
//!
//! # async fn example() -> authdance::error::Result<()> {
//! let stash = InMemoryStash::new();
//! let mut consumer = ProviderKind::GitHub.consumer(
//!     ClientCredentials::from_env("github")?,
//!     vec!["user:email".to_string()],
//!     None,
//! )?;
//!
//! // Before redirecting the user:
//! let url = consumer
//!     .dance(&stash, "https://app.example/callback")
//!     .get_authorization_url()
//!     .await?;
//! println!("visit {url}");
//!
//! // On the callback:
//! let callback = "https://app.example/callback?code=...&state=...";
//! let token = consumer
//!     .dance(&stash, "https://app.example/callback")
//!     .get_access_token(callback)
//!     .await?;
//! let user = consumer
//!     .request("https://api.github.com/user", RequestOptions::default())
//!     .await?;
//! println!("{} -> {}", token.token, user.text());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod consumer;
pub mod dance;
pub mod error;
pub mod http;
pub mod oauth1;
pub mod oauth2;
pub mod prelude;
pub mod profile;
pub mod providers;
pub mod request;
