//! Persistence layer: the audit log and split-test catalog over SQLite.
//!
//! Handlers only see the `AuditStore` and `TestCatalog` traits; the
//! SQLite implementation is wired in at startup and swapped for an
//! in-memory fake in tests.

pub mod audit;
pub mod catalog;
pub mod config;
pub mod schema;
pub mod sqlite;

pub use audit::{AuditStore, UnflaggedRow};
pub use catalog::{TestCatalog, VariantSpec};
pub use config::StoreConfig;
pub use sqlite::SqliteStore;
