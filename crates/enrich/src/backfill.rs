//! One-time bot-flag backfill over the audit log.

use std::sync::Arc;
use tracing::info;

use store::AuditStore;
use tracker_core::Result;

use crate::bot::BotClassifier;

/// Summary of one backfill run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BackfillOutcome {
    pub already_done: bool,
    pub rows_scanned: u64,
    pub clicks_flagged: u64,
    pub hits_flagged: u64,
}

/// Reclassifies historical click and hit rows whose bot flag predates the
/// classifier.
///
/// The job is gated by a persisted flag: once set, runs are no-ops until
/// the flag is explicitly cleared. Interrupting a run is safe, the next
/// start picks up the remaining unflagged rows.
pub struct BotFlagBackfill {
    audit: Arc<dyn AuditStore>,
    classifier: Arc<BotClassifier>,
}

impl BotFlagBackfill {
    pub fn new(audit: Arc<dyn AuditStore>, classifier: Arc<BotClassifier>) -> Self {
        Self { audit, classifier }
    }

    pub async fn run(&self) -> Result<BackfillOutcome> {
        if self.audit.backfill_done().await? {
            info!("bot-flag backfill already completed, skipping");
            return Ok(BackfillOutcome {
                already_done: true,
                ..Default::default()
            });
        }

        let mut outcome = BackfillOutcome::default();

        for row in self.audit.select_unflagged_clicks().await? {
            outcome.rows_scanned += 1;
            if self.classifier.classify(&row.user_agent, row.client_ip).await {
                self.audit.update_click_bot_flag(row.id, true).await?;
                outcome.clicks_flagged += 1;
            }
        }

        for row in self.audit.select_unflagged_hits().await? {
            outcome.rows_scanned += 1;
            if self.classifier.classify(&row.user_agent, row.client_ip).await {
                self.audit.update_hit_bot_flag(row.id, true).await?;
                outcome.hits_flagged += 1;
            }
        }

        self.audit.set_backfill_done(true).await?;
        info!(
            scanned = outcome.rows_scanned,
            clicks = outcome.clicks_flagged,
            hits = outcome.hits_flagged,
            "bot-flag backfill complete"
        );
        Ok(outcome)
    }
}
