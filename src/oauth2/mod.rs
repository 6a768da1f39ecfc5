//! OAuth2 authorization-code consumer and its bearer-token client.

pub mod client;
pub mod consumer;

pub use client::{parse_token_body, BearerClient, TokenResponseFixup};
pub use consumer::OAuth2Consumer;
