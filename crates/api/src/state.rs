//! Application state shared across handlers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use enrich::{BotClassifier, DeviceParser, GeoClient};
use store::{AuditStore, TestCatalog};
use tracker_core::DestinationPolicy;

use crate::content::ContentResolver;

/// Redirect policy configuration, read-only after startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Domains outbound clicks may target.
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    /// Host of the publishing site, for same-site referrer checks.
    /// Empty disables referrer-based PLP inference.
    #[serde(default)]
    pub site_host: String,
    /// Mark cookies Secure; set when TLS terminates upstream.
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub audit: Arc<dyn AuditStore>,
    pub catalog: Arc<dyn TestCatalog>,
    pub content: Arc<dyn ContentResolver>,
    pub classifier: Arc<BotClassifier>,
    pub devices: Arc<DeviceParser>,
    pub geo: Arc<GeoClient>,
    pub policy: Arc<DestinationPolicy>,
    pub config: Arc<RedirectConfig>,
}

impl AppState {
    pub fn new(
        audit: Arc<dyn AuditStore>,
        catalog: Arc<dyn TestCatalog>,
        content: Arc<dyn ContentResolver>,
        classifier: Arc<BotClassifier>,
        geo: Arc<GeoClient>,
        config: RedirectConfig,
    ) -> Self {
        let policy = Arc::new(DestinationPolicy::new(config.allowed_domains.clone()));
        Self {
            audit,
            catalog,
            content,
            classifier,
            devices: Arc::new(DeviceParser::new()),
            geo,
            policy,
            config: Arc::new(config),
        }
    }
}
