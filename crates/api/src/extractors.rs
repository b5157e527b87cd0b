//! Request extractors.
//!
//! Handlers receive everything they need about a request through these
//! explicit pieces (address, header metadata, cookies) rather than
//! reaching into ambient request state, so tests can drive them without
//! a live network stack.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

/// Client address resolved through the proxy chain: CDN header first,
/// then X-Forwarded-For (first hop), X-Real-IP, and finally the socket
/// peer address.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

const IP_HEADERS: [&str; 3] = ["CF-Connecting-IP", "X-Forwarded-For", "X-Real-IP"];

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        for name in IP_HEADERS {
            let candidate = parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .and_then(|value| value.parse::<IpAddr>().ok());
            if let Some(ip) = candidate {
                return Ok(ClientIp(Some(ip)));
            }
        }

        let socket_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(ClientIp(socket_ip))
    }
}

/// User-agent and referrer headers, empty strings when absent.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub user_agent: String,
    pub referrer: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_string = |name: header::HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        Ok(RequestMeta {
            user_agent: header_string(header::USER_AGENT),
            referrer: header_string(header::REFERER),
        })
    }
}

/// Cookies sent with the request, by name.
#[derive(Debug, Clone, Default)]
pub struct CookieMap(HashMap<String, String>);

impl CookieMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CookieMap
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let mut map = HashMap::new();
        for value in parts.headers.get_all(header::COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            for cookie in cookie::Cookie::split_parse(raw).flatten() {
                map.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
        Ok(CookieMap(map))
    }
}
