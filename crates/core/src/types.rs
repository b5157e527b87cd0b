//! Typed records for the click log and the split-test catalog.
//!
//! These are the rows the audit store persists. Fields that the wire may
//! omit are plain `String`s defaulting to empty, mirroring the columns
//! they land in; genuinely optional enrichment data uses `Option`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// One outbound click through the `/go` endpoint. Written once, immutable
/// afterwards except for the one-time bot-flag backfill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
    pub ts: DateTime<Utc>,
    pub client_ip: Option<IpAddr>,
    pub user_agent: String,
    pub referrer: String,
    /// Validated destination, before tracking parameters are appended.
    pub dest: String,
    pub dest_host: String,
    pub plp: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub utm_content: String,
    pub utm_term: String,
    pub fbclid: String,
    pub gclid: String,
    pub is_bot: bool,
}

/// A split test. The slug is referenced from public URLs and sticky
/// cookies and never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitTest {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A variant of a split test, pointing at a publishable content entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub test_id: i64,
    /// Opaque reference resolved through the content collaborator.
    pub content_id: i64,
    pub weight: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    /// Weight as used in selection; anything below 1 counts as 1.
    pub fn effective_weight(&self) -> u64 {
        u64::from(self.weight.max(1))
    }
}

/// Device category recorded on split hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Desktop,
    Mobile,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }
}

/// One request through `/split/{slug}` that resolved to a redirect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitHit {
    pub ts: DateTime<Utc>,
    pub test_slug: String,
    pub variant_id: i64,
    /// Anonymous cookie-derived correlation token.
    pub client_id: String,
    pub client_ip: Option<IpAddr>,
    pub user_agent: String,
    pub referrer: String,
    pub geo_country: Option<String>,
    pub geo_city: Option<String>,
    pub device_type: DeviceType,
    pub is_bot: bool,
}

/// The fixed set of tracking parameters the click handler records and
/// forwards onto the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingParams {
    pub plp: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
    pub fbclid: Option<String>,
    pub gclid: Option<String>,
}

impl TrackingParams {
    /// Collects tracked keys from a parsed query string. Empty values are
    /// treated as absent; on duplicate keys the last value wins.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_str() {
                "plp" => &mut params.plp,
                "utm_source" => &mut params.utm_source,
                "utm_medium" => &mut params.utm_medium,
                "utm_campaign" => &mut params.utm_campaign,
                "utm_content" => &mut params.utm_content,
                "utm_term" => &mut params.utm_term,
                "fbclid" => &mut params.fbclid,
                "gclid" => &mut params.gclid,
                _ => continue,
            };
            *slot = Some(value.clone());
        }
        params
    }

    /// Present parameters in propagation order.
    pub fn present(&self) -> Vec<(&'static str, &str)> {
        [
            ("plp", &self.plp),
            ("utm_source", &self.utm_source),
            ("utm_medium", &self.utm_medium),
            ("utm_campaign", &self.utm_campaign),
            ("utm_content", &self.utm_content),
            ("utm_term", &self.utm_term),
            ("fbclid", &self.fbclid),
            ("gclid", &self.gclid),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}
