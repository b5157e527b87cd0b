//! Split-test endpoint.
//!
//! Weighted rotation across a test's published variants with per-client
//! sticky affinity. Bots are recorded, never blocked: ad and social
//! link-preview crawlers must be able to reach the landing pages.

use axum::extract::{Path, RawQuery, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use tracker_core::params::merge_query_params;
use tracker_core::select::pick_weighted;
use tracker_core::slug::normalize_slug;
use tracker_core::{Error, SplitHit, Variant};

use crate::cookies::{client_id_cookie, split_cookie_name, sticky_cookie, CLIENT_ID_COOKIE};
use crate::extractors::{ClientIp, CookieMap, RequestMeta};
use crate::response::{Found, HandlerError};
use crate::routes::parse_query;
use crate::state::AppState;

/// GET /split/{slug} — select a variant, record the hit, redirect.
pub async fn split_handler(
    State(state): State<AppState>,
    Path(raw_slug): Path<String>,
    ClientIp(client_ip): ClientIp,
    meta: RequestMeta,
    cookies: CookieMap,
    RawQuery(query): RawQuery,
) -> Result<Response, HandlerError> {
    let start = Instant::now();
    let slug = normalize_slug(&raw_slug);

    let test = state.catalog.find_active_test(&slug).await?.ok_or_else(|| {
        metrics().split_not_found.inc();
        Error::not_found("Split test not found or not active.")
    })?;

    let variants = state.catalog.variants_for_test(test.id).await?;
    if variants.is_empty() {
        metrics().split_not_found.inc();
        return Err(Error::not_found("No variants found for this test.").into());
    }

    let valid = published_variants(&state, variants).await;
    if valid.is_empty() {
        metrics().split_not_found.inc();
        return Err(Error::not_found("No published variants available.").into());
    }

    // Sticky affinity: an existing assignment wins while its variant is
    // still in the valid set; otherwise it is ignored and overwritten.
    let sticky_id = cookies
        .get(&split_cookie_name(&slug))
        .and_then(|value| value.parse::<i64>().ok());
    let (choice, fresh_pick) = match sticky_id.and_then(|id| valid.iter().find(|v| v.id == id)) {
        Some(variant) => {
            metrics().sticky_hits.inc();
            (variant, false)
        }
        None => {
            let mut rng = rand::rng();
            let picked = pick_weighted(&valid, &mut rng)
                .ok_or_else(|| Error::internal("variant selection failed"))?;
            (picked, true)
        }
    };

    let dest_url = state
        .content
        .published_url(choice.content_id)
        .await?
        .ok_or_else(|| {
            metrics().split_not_found.inc();
            Error::not_found("Could not resolve destination permalink.")
        })?;
    let mut dest = Url::parse(&dest_url)
        .map_err(|_| Error::internal("resolved destination is not a valid URL"))?;

    let (client_id, new_client) = match cookies.get(CLIENT_ID_COOKIE) {
        Some(value) if !value.is_empty() => (value.to_string(), false),
        _ => (Uuid::new_v4().simple().to_string(), true),
    };

    let device_type = state.devices.device_type(&meta.user_agent);
    let geo = match client_ip {
        Some(ip) => state.geo.lookup(ip).await,
        None => None,
    };
    let is_bot = state.classifier.classify(&meta.user_agent, client_ip).await;

    let hit = SplitHit {
        ts: Utc::now(),
        test_slug: slug.clone(),
        variant_id: choice.id,
        client_id: client_id.clone(),
        client_ip,
        user_agent: meta.user_agent.clone(),
        referrer: meta.referrer.clone(),
        geo_country: geo.as_ref().and_then(|g| g.country.clone()),
        geo_city: geo.as_ref().and_then(|g| g.city.clone()),
        device_type,
        is_bot,
    };
    if let Err(e) = state.audit.insert_split_hit(&hit).await {
        metrics().store_write_errors.inc();
        warn!(error = %e, "failed to record split hit");
    } else {
        metrics().split_hits_recorded.inc();
    }

    let pairs = parse_query(query.as_deref());
    merge_query_params(&mut dest, &pairs);

    let secure = state.config.secure_cookies;
    let mut response = Found::to(dest.to_string()).no_store();
    if fresh_pick {
        response = response.with_cookie(sticky_cookie(&slug, choice.id, secure));
    }
    if new_client {
        response = response.with_cookie(client_id_cookie(&client_id, secure));
    }

    metrics().redirects_issued.inc();
    metrics()
        .redirect_latency_ms
        .observe(start.elapsed().as_millis() as u64);
    info!(
        slug = %slug,
        variant_id = choice.id,
        sticky = !fresh_pick,
        is_bot,
        "split redirect"
    );
    Ok(response.into_response())
}

/// Variants whose content is currently published. A failed publish check
/// drops the variant for this request only.
async fn published_variants(state: &AppState, variants: Vec<Variant>) -> Vec<Variant> {
    let mut valid = Vec::with_capacity(variants.len());
    for variant in variants {
        match state.content.is_published(variant.content_id).await {
            Ok(true) => valid.push(variant),
            Ok(false) => {}
            Err(e) => {
                debug!(content_id = variant.content_id, error = %e, "publish check failed");
            }
        }
    }
    valid
}
