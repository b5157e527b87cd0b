//! Destination validation for outbound redirects.
//!
//! The checks run in order and stop at the first failure: scheme, then
//! dangerous hosts (localhost and private/loopback address literals),
//! then the static domain allow-list. The address-range checks block
//! SSRF-style targets even though the allow-list would reject most of
//! them anyway.

use url::{Host, Url};

use crate::error::{Error, Result};
use crate::ip::{is_blocked_ipv4, is_blocked_ipv6};

/// Static outbound-redirect policy, read-only after startup.
#[derive(Debug, Clone, Default)]
pub struct DestinationPolicy {
    allowed_domains: Vec<String>,
}

impl DestinationPolicy {
    pub fn new(domains: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed_domains: domains
                .into_iter()
                .map(|d| d.trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn is_allowed_domain(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.allowed_domains.iter().any(|d| *d == host)
    }

    /// Runs the full validation pipeline over a raw `dest` value and
    /// returns the parsed destination.
    pub fn validate(&self, raw: &str) -> Result<Url> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::validation("Missing destination parameter."));
        }

        let url = Url::parse(raw)
            .map_err(|_| Error::validation("Destination is not a valid URL."))?;

        match url.scheme() {
            "http" | "https" => {}
            _ => return Err(Error::validation("Destination protocol not allowed.")),
        }

        let host = url
            .host()
            .ok_or_else(|| Error::validation("Destination host is missing."))?;

        let dangerous = match &host {
            Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
            Host::Ipv4(ip) => is_blocked_ipv4(*ip),
            Host::Ipv6(ip) => is_blocked_ipv6(*ip),
        };
        if dangerous {
            return Err(Error::validation(
                "Destination to IP/localhost/private network is not allowed.",
            ));
        }

        let host = host.to_string();
        if !self.is_allowed_domain(&host) {
            return Err(Error::validation("Destination domain is not allowed."));
        }

        Ok(url)
    }
}
