//! Request enrichment and classification:
//! - device-type detection from user agents
//! - best-effort IP geolocation
//! - bounded reverse-DNS probing
//! - the composed bot classifier
//! - the one-time bot-flag backfill over the audit log

pub mod backfill;
pub mod bot;
pub mod device;
pub mod geo;
pub mod rdns;

pub use backfill::{BackfillOutcome, BotFlagBackfill};
pub use bot::{BotClassifier, BotConfig};
pub use device::DeviceParser;
pub use geo::{GeoClient, GeoConfig, GeoInfo};
pub use rdns::ReverseDns;
