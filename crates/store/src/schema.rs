//! Schema bootstrap for the SQLite store.

use sqlx::SqlitePool;
use tracker_core::{Error, Result};

const DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS go_clicks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ts TEXT NOT NULL,
        ip BLOB,
        ua TEXT NOT NULL DEFAULT '',
        referrer TEXT NOT NULL DEFAULT '',
        dest TEXT NOT NULL,
        dest_host TEXT NOT NULL,
        plp TEXT NOT NULL DEFAULT '',
        utm_source TEXT NOT NULL DEFAULT '',
        utm_medium TEXT NOT NULL DEFAULT '',
        utm_campaign TEXT NOT NULL DEFAULT '',
        utm_content TEXT NOT NULL DEFAULT '',
        utm_term TEXT NOT NULL DEFAULT '',
        fbclid TEXT NOT NULL DEFAULT '',
        gclid TEXT NOT NULL DEFAULT '',
        is_bot INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_clicks_ts ON go_clicks (ts)",
    "CREATE INDEX IF NOT EXISTS idx_clicks_plp ON go_clicks (plp)",
    "CREATE INDEX IF NOT EXISTS idx_clicks_dest_host ON go_clicks (dest_host)",
    "CREATE TABLE IF NOT EXISTS split_tests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slug TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS split_variants (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        test_id INTEGER NOT NULL,
        content_id INTEGER NOT NULL,
        weight INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_variants_test ON split_variants (test_id)",
    "CREATE INDEX IF NOT EXISTS idx_variants_content ON split_variants (content_id)",
    "CREATE TABLE IF NOT EXISTS split_hits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ts TEXT NOT NULL,
        test_slug TEXT NOT NULL,
        variant_id INTEGER NOT NULL,
        client_id TEXT,
        ip BLOB,
        ua TEXT NOT NULL DEFAULT '',
        referrer TEXT NOT NULL DEFAULT '',
        geo_country TEXT,
        geo_city TEXT,
        device_type TEXT,
        is_bot INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_hits_ts ON split_hits (ts)",
    "CREATE INDEX IF NOT EXISTS idx_hits_test ON split_hits (test_slug)",
    "CREATE INDEX IF NOT EXISTS idx_hits_variant ON split_hits (variant_id)",
    "CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
];

/// Creates all tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in DDL {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| Error::store(format!("schema init: {e}")))?;
    }
    Ok(())
}
