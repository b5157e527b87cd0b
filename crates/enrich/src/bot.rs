//! Composed bot classification.
//!
//! The user-agent scan is always on. The reverse-DNS signal is an
//! independent switch per path: enforcement on `/go`, advisory on
//! `/split`, either, or neither.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;
use tracing::warn;

use tracker_core::botsig::{matches_signatures, CLICK_BLOCK_SIGNALS, CRAWLER_SIGNATURES};

use crate::rdns::ReverseDns;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub rdns_on_click: bool,
    #[serde(default)]
    pub rdns_on_split: bool,
    #[serde(default = "default_rdns_timeout_ms")]
    pub rdns_timeout_ms: u64,
}

fn default_rdns_timeout_ms() -> u64 {
    500
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            rdns_on_click: false,
            rdns_on_split: false,
            rdns_timeout_ms: default_rdns_timeout_ms(),
        }
    }
}

pub struct BotClassifier {
    config: BotConfig,
    rdns: Option<ReverseDns>,
}

impl BotClassifier {
    /// Builds the classifier; the resolver is only constructed when a
    /// reverse-DNS switch is armed. A resolver that cannot be built
    /// downgrades to user-agent-only classification.
    pub fn new(config: BotConfig) -> Self {
        let rdns = if config.rdns_on_click || config.rdns_on_split {
            match ReverseDns::from_system_conf(Duration::from_millis(config.rdns_timeout_ms)) {
                Ok(rdns) => Some(rdns),
                Err(e) => {
                    warn!(error = %e, "reverse-DNS probe unavailable, using UA signatures only");
                    None
                }
            }
        } else {
            None
        };
        Self { config, rdns }
    }

    /// Enforcement check for the outbound-click path.
    pub async fn blocks_click(&self, user_agent: &str, ip: Option<IpAddr>) -> bool {
        if user_agent.is_empty() {
            return false;
        }
        if matches_signatures(user_agent, CLICK_BLOCK_SIGNALS) {
            return true;
        }
        if self.config.rdns_on_click {
            return self.ptr_signal(ip).await;
        }
        false
    }

    /// Advisory classification recorded on the split path and used by the
    /// bot-flag backfill.
    pub async fn classify(&self, user_agent: &str, ip: Option<IpAddr>) -> bool {
        if user_agent.is_empty() {
            return false;
        }
        if matches_signatures(user_agent, CRAWLER_SIGNATURES) {
            return true;
        }
        if self.config.rdns_on_split {
            return self.ptr_signal(ip).await;
        }
        false
    }

    async fn ptr_signal(&self, ip: Option<IpAddr>) -> bool {
        match (&self.rdns, ip) {
            (Some(rdns), Some(ip)) => rdns.missing_ptr(ip).await,
            _ => false,
        }
    }
}
