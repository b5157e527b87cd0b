//! Split-test catalog contract.
//!
//! Reads sit on the redirect hot path; the write operations back the
//! administrative surface, which lives outside this service.

use async_trait::async_trait;
use tracker_core::{Result, SplitTest, Variant};

/// Variant definition used when (re)writing a test's variant set.
#[derive(Debug, Clone, Copy)]
pub struct VariantSpec {
    pub content_id: i64,
    /// Coerced to at least 1 at the store boundary.
    pub weight: u32,
}

#[async_trait]
pub trait TestCatalog: Send + Sync {
    /// Active test by (already normalized) slug.
    async fn find_active_test(&self, slug: &str) -> Result<Option<SplitTest>>;

    /// All variants of a test, in stored order.
    async fn variants_for_test(&self, test_id: i64) -> Result<Vec<Variant>>;

    async fn create_test(&self, slug: &str, name: &str, active: bool) -> Result<SplitTest>;

    async fn set_test_active(&self, id: i64, active: bool) -> Result<()>;

    /// Replaces a test's entire variant set.
    async fn replace_variants(&self, test_id: i64, variants: &[VariantSpec]) -> Result<()>;

    /// Removes a test and its variants. Recorded hits stay until a stats
    /// reset deletes them by slug.
    async fn delete_test(&self, id: i64) -> Result<()>;
}
