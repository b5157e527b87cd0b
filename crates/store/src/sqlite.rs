//! SQLite implementation of the audit store and test catalog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use tracker_core::ip::{from_binary16, to_binary16};
use tracker_core::{ClickEvent, Error, Result, SplitHit, SplitTest, Variant};

use crate::audit::{AuditStore, UnflaggedRow};
use crate::catalog::{TestCatalog, VariantSpec};
use crate::config::StoreConfig;
use crate::schema;

const BACKFILL_FLAG: &str = "bot_backfill_done";

/// SQLite-backed store. WAL mode keeps the write-heavy click log from
/// blocking concurrent reads.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (and creates, if missing) the database.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let in_memory = config.path == ":memory:";
        let options = if in_memory {
            SqliteConnectOptions::new().in_memory(true).shared_cache(true)
        } else {
            SqliteConnectOptions::new()
                .filename(&config.path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { config.max_connections })
            .connect_with(options)
            .await
            .map_err(db_err)?;

        info!(path = %config.path, "Opened SQLite store");
        Ok(Self { pool })
    }

    /// Creates tables and indexes if they do not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        schema::init_schema(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> Error {
    Error::store(e.to_string())
}

fn ip_blob(ip: Option<std::net::IpAddr>) -> Option<Vec<u8>> {
    ip.map(|ip| to_binary16(ip).to_vec())
}

fn unflagged_row(row: (i64, String, Option<Vec<u8>>)) -> UnflaggedRow {
    UnflaggedRow {
        id: row.0,
        user_agent: row.1,
        client_ip: row.2.as_deref().and_then(from_binary16),
    }
}

#[async_trait]
impl AuditStore for SqliteStore {
    async fn insert_click_event(&self, event: &ClickEvent) -> Result<()> {
        sqlx::query(
            "INSERT INTO go_clicks (
                ts, ip, ua, referrer, dest, dest_host, plp,
                utm_source, utm_medium, utm_campaign, utm_content, utm_term,
                fbclid, gclid, is_bot
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.ts)
        .bind(ip_blob(event.client_ip))
        .bind(&event.user_agent)
        .bind(&event.referrer)
        .bind(&event.dest)
        .bind(&event.dest_host)
        .bind(&event.plp)
        .bind(&event.utm_source)
        .bind(&event.utm_medium)
        .bind(&event.utm_campaign)
        .bind(&event.utm_content)
        .bind(&event.utm_term)
        .bind(&event.fbclid)
        .bind(&event.gclid)
        .bind(event.is_bot)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn insert_split_hit(&self, hit: &SplitHit) -> Result<()> {
        sqlx::query(
            "INSERT INTO split_hits (
                ts, test_slug, variant_id, client_id, ip, ua, referrer,
                geo_country, geo_city, device_type, is_bot
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(hit.ts)
        .bind(&hit.test_slug)
        .bind(hit.variant_id)
        .bind(&hit.client_id)
        .bind(ip_blob(hit.client_ip))
        .bind(&hit.user_agent)
        .bind(&hit.referrer)
        .bind(&hit.geo_country)
        .bind(&hit.geo_city)
        .bind(hit.device_type.as_str())
        .bind(hit.is_bot)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete_split_hits(&self, test_slug: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM split_hits WHERE test_slug = ?")
            .bind(test_slug)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn select_unflagged_hits(&self) -> Result<Vec<UnflaggedRow>> {
        let rows: Vec<(i64, String, Option<Vec<u8>>)> =
            sqlx::query_as("SELECT id, ua, ip FROM split_hits WHERE is_bot = 0")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows.into_iter().map(unflagged_row).collect())
    }

    async fn update_hit_bot_flag(&self, id: i64, is_bot: bool) -> Result<()> {
        sqlx::query("UPDATE split_hits SET is_bot = ? WHERE id = ?")
            .bind(is_bot)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn select_unflagged_clicks(&self) -> Result<Vec<UnflaggedRow>> {
        let rows: Vec<(i64, String, Option<Vec<u8>>)> =
            sqlx::query_as("SELECT id, ua, ip FROM go_clicks WHERE is_bot = 0")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows.into_iter().map(unflagged_row).collect())
    }

    async fn update_click_bot_flag(&self, id: i64, is_bot: bool) -> Result<()> {
        sqlx::query("UPDATE go_clicks SET is_bot = ? WHERE id = ?")
            .bind(is_bot)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn backfill_done(&self) -> Result<bool> {
        let value: Option<(String,)> = sqlx::query_as("SELECT value FROM meta WHERE key = ?")
            .bind(BACKFILL_FLAG)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(value.map(|(v,)| v == "1").unwrap_or(false))
    }

    async fn set_backfill_done(&self, done: bool) -> Result<()> {
        sqlx::query(
            "INSERT INTO meta (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(BACKFILL_FLAG)
        .bind(if done { "1" } else { "0" })
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

type TestRow = (i64, String, String, bool, DateTime<Utc>, DateTime<Utc>);
type VariantRow = (i64, i64, i64, i64, DateTime<Utc>, DateTime<Utc>);

fn test_from_row(row: TestRow) -> SplitTest {
    SplitTest {
        id: row.0,
        slug: row.1,
        name: row.2,
        active: row.3,
        created_at: row.4,
        updated_at: row.5,
    }
}

fn variant_from_row(row: VariantRow) -> Variant {
    Variant {
        id: row.0,
        test_id: row.1,
        content_id: row.2,
        // Validation at the store boundary: the selection algorithm
        // assumes weights of at least 1.
        weight: row.3.max(1) as u32,
        created_at: row.4,
        updated_at: row.5,
    }
}

#[async_trait]
impl TestCatalog for SqliteStore {
    async fn find_active_test(&self, slug: &str) -> Result<Option<SplitTest>> {
        let row: Option<TestRow> = sqlx::query_as(
            "SELECT id, slug, name, active, created_at, updated_at
             FROM split_tests WHERE slug = ? AND active = 1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(test_from_row))
    }

    async fn variants_for_test(&self, test_id: i64) -> Result<Vec<Variant>> {
        let rows: Vec<VariantRow> = sqlx::query_as(
            "SELECT id, test_id, content_id, weight, created_at, updated_at
             FROM split_variants WHERE test_id = ? ORDER BY id",
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(variant_from_row).collect())
    }

    async fn create_test(&self, slug: &str, name: &str, active: bool) -> Result<SplitTest> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO split_tests (slug, name, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(slug)
        .bind(name)
        .bind(active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(SplitTest {
            id: result.last_insert_rowid(),
            slug: slug.to_string(),
            name: name.to_string(),
            active,
            created_at: now,
            updated_at: now,
        })
    }

    async fn set_test_active(&self, id: i64, active: bool) -> Result<()> {
        sqlx::query("UPDATE split_tests SET active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn replace_variants(&self, test_id: i64, variants: &[VariantSpec]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query("DELETE FROM split_variants WHERE test_id = ?")
            .bind(test_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let now = Utc::now();
        for spec in variants {
            sqlx::query(
                "INSERT INTO split_variants (test_id, content_id, weight, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(test_id)
            .bind(spec.content_id)
            .bind(i64::from(spec.weight.max(1)))
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn delete_test(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query("DELETE FROM split_variants WHERE test_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM split_tests WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }
}
