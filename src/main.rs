//! gotrack — outbound-click tracking and A/B split-test redirector.
//!
//! Two endpoints share the pipeline: `/go` validates and records
//! outbound clicks before redirecting to an allow-listed destination;
//! `/split/{slug}` performs weighted variant rotation with sticky
//! affinity, records each hit with geo/device/bot attributes, and
//! redirects to the winning variant's page.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use api::content::{ContentConfig, HttpContentResolver};
use api::{router, AppState, RedirectConfig};
use enrich::{BotClassifier, BotConfig, BotFlagBackfill, GeoClient, GeoConfig};
use store::{SqliteStore, StoreConfig};
use telemetry::{health, init_tracing_from_env};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Run the one-time bot-flag backfill before serving.
    #[serde(default)]
    run_bot_backfill: bool,

    #[serde(default)]
    redirect: RedirectConfig,

    #[serde(default)]
    store: StoreConfig,

    #[serde(default)]
    content: ContentConfig,

    #[serde(default)]
    geo: GeoConfig,

    #[serde(default)]
    bot: BotConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            run_bot_backfill: false,
            redirect: RedirectConfig::default(),
            store: StoreConfig::default(),
            content: ContentConfig::default(),
            geo: GeoConfig::default(),
            bot: BotConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting gotrack v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        allowed_domains = ?config.redirect.allowed_domains,
        store = %config.store.path,
        "Loaded configuration"
    );

    let store = Arc::new(
        SqliteStore::connect(&config.store)
            .await
            .context("Failed to open store")?,
    );
    store
        .init_schema()
        .await
        .context("Failed to initialize store schema")?;
    health().store.set_healthy();

    let content = Arc::new(HttpContentResolver::new(config.content.clone()));
    health().content_resolver.set_healthy();

    let classifier = Arc::new(BotClassifier::new(config.bot.clone()));
    let geo = Arc::new(GeoClient::new(config.geo.clone()));

    // Out of the hot path: reclassify historical bot flags once, gated
    // by a persisted done-flag.
    if config.run_bot_backfill {
        let backfill = BotFlagBackfill::new(store.clone(), classifier.clone());
        match backfill.run().await {
            Ok(outcome) if outcome.already_done => {
                info!("Bot-flag backfill previously completed")
            }
            Ok(outcome) => info!(
                scanned = outcome.rows_scanned,
                clicks = outcome.clicks_flagged,
                hits = outcome.hits_flagged,
                "Bot-flag backfill finished"
            ),
            Err(e) => error!("Bot-flag backfill failed: {}", e),
        }
    }

    let state = AppState::new(
        store.clone(),
        store.clone(),
        content,
        classifier,
        geo,
        config.redirect.clone(),
    );
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from defaults, optional config file, and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("GOTRACK")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested sections; the config crate's nested
    // parsing is unreliable with underscored field names.
    if let Ok(domains) = std::env::var("GOTRACK_ALLOWED_DOMAINS") {
        config.redirect.allowed_domains =
            domains.split(',').map(|d| d.trim().to_string()).collect();
    }
    if let Ok(site_host) = std::env::var("GOTRACK_SITE_HOST") {
        config.redirect.site_host = site_host;
    }
    if let Ok(path) = std::env::var("GOTRACK_STORE_PATH") {
        config.store.path = path;
    }
    if let Ok(base_url) = std::env::var("GOTRACK_CONTENT_BASE_URL") {
        config.content.base_url = base_url;
    }
    if let Ok(value) = std::env::var("GOTRACK_RUN_BOT_BACKFILL") {
        config.run_bot_backfill = value == "1" || value.eq_ignore_ascii_case("true");
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
