//! Convenience re-exports for common use.

pub use crate::auth::{InMemoryStash, NormalizedToken, Stash};
pub use crate::config::{ClientCredentials, OAuth1Config, OAuth2Config};
pub use crate::consumer::{Consumer, Protocol};
pub use crate::dance::Dance;
pub use crate::error::{AuthError, Result};
pub use crate::http::{HttpClient, HttpMethod, HttpResponse};
pub use crate::oauth1::OAuth1Consumer;
pub use crate::oauth2::OAuth2Consumer;
pub use crate::profile::{Profile, ProfileCapable};
pub use crate::providers::{Provider, ProviderKind};
pub use crate::request::{RefreshCallback, RequestOptions};
