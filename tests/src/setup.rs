//! Common test setup.

use std::sync::Arc;

use api::{router, AppState, RedirectConfig};
use axum::Router;
use enrich::{BotClassifier, BotConfig, GeoClient, GeoConfig};

use crate::fixtures::{ALLOWED_DOMAIN, SITE_HOST};
use crate::mocks::{MemoryStore, MockContent};

/// Test context: the real router over in-memory mocks.
///
/// Reverse-DNS and geolocation are disabled so classification is a pure
/// function of the user agent and every request is deterministic.
pub struct TestContext {
    pub store: MemoryStore,
    pub content: MockContent,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(default_redirect_config())
    }

    pub fn with_config(config: RedirectConfig) -> Self {
        let store = MemoryStore::new();
        let content = MockContent::new();
        let classifier = Arc::new(BotClassifier::new(BotConfig::default()));
        let geo = Arc::new(GeoClient::new(GeoConfig {
            enabled: false,
            ..Default::default()
        }));

        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(content.clone()),
            classifier,
            geo,
            config,
        );
        let router = router(state);

        Self {
            store,
            content,
            router,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Location header of a redirect response.
pub fn location(response: &axum_test::TestResponse) -> String {
    response
        .headers()
        .get(axum::http::header::LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// All Set-Cookie headers of a response.
pub fn set_cookies(response: &axum_test::TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

pub fn default_redirect_config() -> RedirectConfig {
    RedirectConfig {
        allowed_domains: vec![ALLOWED_DOMAIN.to_string(), "shop.example.com".to_string()],
        site_host: SITE_HOST.to_string(),
        secure_cookies: false,
    }
}
