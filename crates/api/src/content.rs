//! Content-resolution collaborator.
//!
//! The publishing platform owns pages and permalinks; this client treats
//! it as an opaque lookup service: content id to published URL, and site
//! URL back to a content slug for referrer attribution. Responses are
//! cached briefly to keep the hot path off the platform.

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use tracker_core::Result;

/// Resolves opaque content references for the redirect handlers.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    async fn is_published(&self, content_id: i64) -> Result<bool>;

    /// Permalink of the content, when it is currently published.
    async fn published_url(&self, content_id: i64) -> Result<Option<String>>;

    /// Slug of the page living at `url`, when the platform knows it.
    async fn slug_for_url(&self, url: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Platform lookup endpoint; empty or "mock" enables mock mode.
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_timeout_ms() -> u64 {
    2000
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Wire format of the platform's content lookup.
#[derive(Debug, Clone, Deserialize)]
struct ContentRecord {
    #[serde(default)]
    status: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    slug: Option<String>,
}

impl ContentRecord {
    fn is_published(&self) -> bool {
        self.status == "publish"
    }
}

/// HTTP-backed resolver with a short-TTL cache.
///
/// Mock mode (no base URL configured) serves deterministic published
/// URLs so the service can run without a platform behind it.
pub struct HttpContentResolver {
    config: ContentConfig,
    http: reqwest::Client,
    cache: Cache<i64, Option<ContentRecord>>,
    mock_mode: bool,
}

/// Maximum cached content records.
const CONTENT_CACHE_MAX_CAPACITY: u64 = 10_000;

impl HttpContentResolver {
    pub fn new(config: ContentConfig) -> Self {
        let mock_mode = config.base_url.is_empty() || config.base_url == "mock";
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to create HTTP client");
        let cache = Cache::builder()
            .max_capacity(CONTENT_CACHE_MAX_CAPACITY)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Self {
            config,
            http,
            cache,
            mock_mode,
        }
    }

    async fn fetch(&self, content_id: i64) -> Option<ContentRecord> {
        if let Some(cached) = self.cache.get(&content_id).await {
            debug!(content_id, "content cache hit");
            return cached;
        }

        let record = if self.mock_mode {
            Some(self.mock_record(content_id))
        } else {
            self.remote_fetch(content_id).await
        };

        self.cache.insert(content_id, record.clone()).await;
        record
    }

    async fn remote_fetch(&self, content_id: i64) -> Option<ContentRecord> {
        let url = format!("{}/content/{}", self.config.base_url, content_id);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(content_id, error = %e, "content lookup failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(content_id, status = %response.status(), "content lookup miss");
            return None;
        }
        match response.json().await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(content_id, error = %e, "content lookup body unreadable");
                None
            }
        }
    }

    fn mock_record(&self, content_id: i64) -> ContentRecord {
        ContentRecord {
            status: "publish".to_string(),
            url: Some(format!("https://site.invalid/content/{content_id}")),
            slug: Some(format!("content-{content_id}")),
        }
    }
}

#[async_trait]
impl ContentResolver for HttpContentResolver {
    async fn is_published(&self, content_id: i64) -> Result<bool> {
        Ok(self
            .fetch(content_id)
            .await
            .map(|r| r.is_published())
            .unwrap_or(false))
    }

    async fn published_url(&self, content_id: i64) -> Result<Option<String>> {
        Ok(self
            .fetch(content_id)
            .await
            .filter(ContentRecord::is_published)
            .and_then(|r| r.url))
    }

    async fn slug_for_url(&self, url: &str) -> Result<Option<String>> {
        if self.mock_mode {
            return Ok(None);
        }
        let endpoint = format!("{}/resolve", self.config.base_url);
        let response = match self.http.get(&endpoint).query(&[("url", url)]).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "referrer slug lookup failed");
                return Ok(None);
            }
        };
        if !response.status().is_success() {
            return Ok(None);
        }
        let record: ContentRecord = match response.json().await {
            Ok(record) => record,
            Err(_) => return Ok(None),
        };
        Ok(record.slug)
    }
}
