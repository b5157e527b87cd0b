//! Route table.

pub mod go;
pub mod health;
pub mod split;

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Creates the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // any() so the handler sees HEAD and friends itself; axum's get()
        // would answer HEAD before the method gate runs.
        .route("/go", any(go::go_handler))
        .route("/split/:slug", get(split::split_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parses a raw query string into ordered key/value pairs.
pub(crate) fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}

/// Last occurrence of a key, the way PHP-style query parsing resolves
/// duplicates.
pub(crate) fn last_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
