//! OAuth1 three-legged consumer and HMAC-SHA1 query signing.

pub mod consumer;
pub mod signer;

pub use consumer::OAuth1Consumer;
pub use signer::OAuth1Signer;
