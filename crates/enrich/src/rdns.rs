//! Bounded reverse-DNS probing.

use hickory_resolver::TokioResolver;
use std::net::IpAddr;
use std::time::Duration;
use telemetry::metrics;
use tracing::debug;

use tracker_core::{Error, Result};

/// PTR probe used as a supplementary bot signal. Each lookup is bounded
/// by a short timeout and fails open, so a slow resolver never stalls a
/// redirect.
pub struct ReverseDns {
    resolver: TokioResolver,
    timeout: Duration,
}

impl ReverseDns {
    pub fn from_system_conf(timeout: Duration) -> Result<Self> {
        let resolver = TokioResolver::builder_tokio()
            .map_err(|e| Error::internal(format!("resolver init: {e}")))?
            .build();
        Ok(Self { resolver, timeout })
    }

    /// True when the address has no PTR record, the classic
    /// gethostbyaddr-returns-its-input heuristic. Timeouts and transport
    /// errors return false.
    pub async fn missing_ptr(&self, ip: IpAddr) -> bool {
        match tokio::time::timeout(self.timeout, self.resolver.reverse_lookup(ip)).await {
            Ok(Ok(names)) => names.iter().next().is_none(),
            Ok(Err(e)) => {
                debug!(%ip, error = %e, "reverse lookup yielded no PTR");
                true
            }
            Err(_) => {
                metrics().rdns_timeouts.inc();
                debug!(%ip, "reverse lookup timed out");
                false
            }
        }
    }
}
