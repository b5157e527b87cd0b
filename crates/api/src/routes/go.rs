//! Outbound-click endpoint.
//!
//! Validates a caller-supplied destination against the allow-list and
//! private-network blocklist, records one click event, propagates the
//! tracked parameters and answers with a 302.

use axum::extract::{RawQuery, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, info, warn};
use url::Url;

use tracker_core::botsig::{matches_signatures, CRAWLER_SIGNATURES};
use tracker_core::params::merge_query_params;
use tracker_core::{ClickEvent, Error, TrackingParams};

use crate::extractors::{ClientIp, RequestMeta};
use crate::response::{Found, HandlerError};
use crate::routes::{last_value, parse_query};
use crate::state::AppState;

/// GET /go?dest=... — validate, record, redirect.
pub async fn go_handler(
    State(state): State<AppState>,
    method: Method,
    ClientIp(client_ip): ClientIp,
    meta: RequestMeta,
    RawQuery(query): RawQuery,
) -> Result<Response, HandlerError> {
    let start = Instant::now();

    if method == Method::HEAD {
        metrics().clicks_rejected.inc();
        return Err(Error::rejected("Forbidden: HEAD requests disallowed.").into());
    }
    if method != Method::GET {
        metrics().clicks_rejected.inc();
        return Err(Error::rejected("Forbidden: method not allowed.").into());
    }
    if state.classifier.blocks_click(&meta.user_agent, client_ip).await {
        metrics().clicks_rejected.inc();
        debug!(user_agent = %meta.user_agent, "blocked bot click");
        return Err(Error::rejected("Forbidden: Bot traffic disallowed.").into());
    }

    let pairs = parse_query(query.as_deref());
    let dest_raw = last_value(&pairs, "dest").unwrap_or_default();
    let mut dest = state.policy.validate(dest_raw).map_err(|e| {
        metrics().click_validation_failures.inc();
        e
    })?;
    let dest_host = dest.host_str().unwrap_or_default().to_string();

    let mut tracking = TrackingParams::from_pairs(&pairs);
    if tracking.plp.is_none() {
        tracking.plp = infer_plp(&state, &meta.referrer).await;
    }

    let event = click_event(&dest, &dest_host, client_ip, &meta, &tracking);
    if let Err(e) = state.audit.insert_click_event(&event).await {
        // The redirect is the user-facing contract; a lost audit row is
        // logged, never surfaced.
        metrics().store_write_errors.inc();
        warn!(error = %e, "failed to record click event");
    } else {
        metrics().clicks_recorded.inc();
    }

    merge_query_params(&mut dest, &tracking.present());

    metrics().redirects_issued.inc();
    metrics()
        .redirect_latency_ms
        .observe(start.elapsed().as_millis() as u64);
    info!(dest_host = %dest_host, plp = %event.plp, "outbound click");
    Ok(Found::to(dest.to_string()).into_response())
}

fn click_event(
    dest: &Url,
    dest_host: &str,
    client_ip: Option<std::net::IpAddr>,
    meta: &RequestMeta,
    tracking: &TrackingParams,
) -> ClickEvent {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    ClickEvent {
        ts: Utc::now(),
        client_ip,
        user_agent: meta.user_agent.clone(),
        referrer: meta.referrer.clone(),
        dest: dest.to_string(),
        dest_host: dest_host.to_string(),
        plp: field(&tracking.plp),
        utm_source: field(&tracking.utm_source),
        utm_medium: field(&tracking.utm_medium),
        utm_campaign: field(&tracking.utm_campaign),
        utm_content: field(&tracking.utm_content),
        utm_term: field(&tracking.utm_term),
        fbclid: field(&tracking.fbclid),
        gclid: field(&tracking.gclid),
        // The enforcement gate already ran; this advisory flag catches
        // the broad-list agents (HTTP libraries etc.) it lets through.
        is_bot: matches_signatures(&meta.user_agent, CRAWLER_SIGNATURES),
    }
}

/// Same-site referrer → content slug, best effort. Failures of any kind
/// leave the plp absent.
async fn infer_plp(state: &AppState, referrer: &str) -> Option<String> {
    if referrer.is_empty() || state.config.site_host.is_empty() {
        return None;
    }
    let referrer_url = Url::parse(referrer).ok()?;
    let referrer_host = referrer_url.host_str()?;
    if !referrer_host.eq_ignore_ascii_case(&state.config.site_host) {
        return None;
    }
    match state.content.slug_for_url(referrer).await {
        Ok(slug) => slug,
        Err(e) => {
            debug!(error = %e, "referrer slug lookup failed");
            None
        }
    }
}
