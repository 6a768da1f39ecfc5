//! Token model and handshake stash.

pub mod stash;
pub mod token;

pub use stash::{stash_key, InMemoryStash, Stash};
pub use token::{NormalizedToken, OAuth1WireToken, OAuth2WireToken, RequestToken};
