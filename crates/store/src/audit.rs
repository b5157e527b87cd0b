//! Audit-log contract: append-only click and hit records.

use async_trait::async_trait;
use std::net::IpAddr;
use tracker_core::{ClickEvent, Result, SplitHit};

/// Row handed to the bot-flag backfill.
#[derive(Debug, Clone)]
pub struct UnflaggedRow {
    pub id: i64,
    pub user_agent: String,
    pub client_ip: Option<IpAddr>,
}

/// Append-only event log consumed by the redirect handlers and the
/// bot-flag backfill.
///
/// Slugs and user agents arrive straight off the network; implementations
/// must parameterize every lookup.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert_click_event(&self, event: &ClickEvent) -> Result<()>;

    async fn insert_split_hit(&self, hit: &SplitHit) -> Result<()>;

    /// Deletes all hits of one test (stats reset). Returns the row count.
    async fn delete_split_hits(&self, test_slug: &str) -> Result<u64>;

    /// Hit rows whose bot flag was never computed.
    async fn select_unflagged_hits(&self) -> Result<Vec<UnflaggedRow>>;

    async fn update_hit_bot_flag(&self, id: i64, is_bot: bool) -> Result<()>;

    /// Click rows whose bot flag was never computed.
    async fn select_unflagged_clicks(&self) -> Result<Vec<UnflaggedRow>>;

    async fn update_click_bot_flag(&self, id: i64, is_bot: bool) -> Result<()>;

    /// One-time gate for the backfill job; clearing it re-arms the job.
    async fn backfill_done(&self) -> Result<bool>;

    async fn set_backfill_done(&self, done: bool) -> Result<()>;
}
