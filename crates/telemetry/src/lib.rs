//! Internal telemetry: structured logging setup, in-process counters and
//! a component health registry.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::{health, ComponentHealth, ComponentReport, HealthRegistry};
pub use metrics::{metrics, Counter, LatencyStat, Metrics, MetricsSnapshot};
pub use tracing_setup::{init_tracing, init_tracing_from_env};
