//! Best-effort IP geolocation.
//!
//! The lookup sits on the redirect's critical path, so the client is
//! built with a short timeout and every failure mode degrades to empty
//! geo fields. Private and reserved addresses are never sent out.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;
use telemetry::metrics;
use tracing::debug;

use tracker_core::ip::is_public;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lookup service base URL (ip-api.com wire format).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_base_url() -> String {
    "http://ip-api.com".to_string()
}

fn default_timeout_ms() -> u64 {
    1500
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Country and city of a resolved address; either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    pub country: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

pub struct GeoClient {
    config: GeoConfig,
    http: reqwest::Client,
}

impl GeoClient {
    pub fn new(config: GeoConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to create HTTP client");
        Self { config, http }
    }

    /// Looks up country and city for a public address. Returns `None` for
    /// private/reserved addresses, disabled lookups, and every failure.
    pub async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo> {
        if !self.config.enabled || !is_public(ip) {
            return None;
        }

        let url = format!(
            "{}/json/{}?fields=status,country,city",
            self.config.base_url, ip
        );
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                metrics().geo_lookup_failures.inc();
                debug!(%ip, error = %e, "geo lookup request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            metrics().geo_lookup_failures.inc();
            debug!(%ip, status = %response.status(), "geo lookup returned error status");
            return None;
        }
        let body: GeoResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                metrics().geo_lookup_failures.inc();
                debug!(%ip, error = %e, "geo lookup body unreadable");
                return None;
            }
        };
        parse_geo(body)
    }
}

fn parse_geo(body: GeoResponse) -> Option<GeoInfo> {
    if body.status != "success" {
        return None;
    }
    Some(GeoInfo {
        country: body.country.filter(|c| !c.is_empty()),
        city: body.city.filter(|c| !c.is_empty()),
    })
}
