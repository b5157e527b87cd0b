//! Tests for the one-time bot-flag backfill job.

use std::sync::Arc;

use chrono::Utc;
use enrich::{BotClassifier, BotConfig, BotFlagBackfill};
use integration_tests::fixtures::{CHROME_UA, CURL_UA, GOOGLEBOT_UA};
use integration_tests::mocks::MemoryStore;
use store::AuditStore;
use tracker_core::{ClickEvent, DeviceType, SplitHit};

fn click(ua: &str) -> ClickEvent {
    ClickEvent {
        ts: Utc::now(),
        client_ip: None,
        user_agent: ua.to_string(),
        referrer: String::new(),
        dest: "https://good.partner.example/p".to_string(),
        dest_host: "good.partner.example".to_string(),
        plp: String::new(),
        utm_source: String::new(),
        utm_medium: String::new(),
        utm_campaign: String::new(),
        utm_content: String::new(),
        utm_term: String::new(),
        fbclid: String::new(),
        gclid: String::new(),
        is_bot: false,
    }
}

fn hit(ua: &str) -> SplitHit {
    SplitHit {
        ts: Utc::now(),
        test_slug: "summer-sale".to_string(),
        variant_id: 1,
        client_id: "cid".to_string(),
        client_ip: None,
        user_agent: ua.to_string(),
        referrer: String::new(),
        geo_country: None,
        geo_city: None,
        device_type: DeviceType::Desktop,
        is_bot: false,
    }
}

fn backfill(store: &MemoryStore) -> BotFlagBackfill {
    BotFlagBackfill::new(
        Arc::new(store.clone()),
        Arc::new(BotClassifier::new(BotConfig::default())),
    )
}

#[tokio::test]
async fn flags_bot_rows_and_sets_the_gate() {
    let store = MemoryStore::new();
    store.insert_click_event(&click(CHROME_UA)).await.unwrap();
    store.insert_click_event(&click(CURL_UA)).await.unwrap();
    store.insert_split_hit(&hit(CHROME_UA)).await.unwrap();
    store.insert_split_hit(&hit(GOOGLEBOT_UA)).await.unwrap();

    let outcome = backfill(&store).run().await.unwrap();

    assert!(!outcome.already_done);
    assert_eq!(outcome.rows_scanned, 4);
    assert_eq!(outcome.clicks_flagged, 1);
    assert_eq!(outcome.hits_flagged, 1);

    let clicks = store.clicks();
    assert!(!clicks[0].is_bot);
    assert!(clicks[1].is_bot);
    let hits = store.hits();
    assert!(!hits[0].is_bot);
    assert!(hits[1].is_bot);
    assert!(store.backfill_done().await.unwrap());
}

#[tokio::test]
async fn second_run_is_a_gated_noop() {
    let store = MemoryStore::new();
    store.insert_split_hit(&hit(GOOGLEBOT_UA)).await.unwrap();

    let first = backfill(&store).run().await.unwrap();
    assert_eq!(first.hits_flagged, 1);

    // New rows after completion are untouched until the gate is reset.
    store.insert_split_hit(&hit(CURL_UA)).await.unwrap();
    let second = backfill(&store).run().await.unwrap();
    assert!(second.already_done);
    assert_eq!(second.rows_scanned, 0);
    assert!(!store.hits()[1].is_bot);
}

#[tokio::test]
async fn clearing_the_gate_rearms_the_job() {
    let store = MemoryStore::new();
    store.insert_split_hit(&hit(GOOGLEBOT_UA)).await.unwrap();
    backfill(&store).run().await.unwrap();

    store.insert_split_hit(&hit(CURL_UA)).await.unwrap();
    store.set_backfill_done(false).await.unwrap();

    let outcome = backfill(&store).run().await.unwrap();
    assert!(!outcome.already_done);
    assert_eq!(outcome.hits_flagged, 1);
    assert!(store.hits()[1].is_bot);
}

#[tokio::test]
async fn already_flagged_rows_are_not_rescanned() {
    let store = MemoryStore::new();
    let mut flagged = hit(GOOGLEBOT_UA);
    flagged.is_bot = true;
    store.insert_split_hit(&flagged).await.unwrap();
    store.insert_split_hit(&hit(CHROME_UA)).await.unwrap();

    let outcome = backfill(&store).run().await.unwrap();
    assert_eq!(outcome.rows_scanned, 1);
    assert_eq!(outcome.hits_flagged, 0);
}
