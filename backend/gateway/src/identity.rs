//! Client identity extraction.
//!
//! Requests are attributed to the first `X-Forwarded-For` entry, then the
//! peer socket address, then `"unknown"`.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl ClientIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_parts(parts: &Parts) -> Self {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.split(',').next())
            .map(str::trim)
            .filter(|val| !val.is_empty());

        if let Some(client) = forwarded {
            return Self(client.to_string());
        }

        match parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => Self(addr.ip().to_string()),
            None => Self(UNKNOWN_CLIENT.to_string()),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
