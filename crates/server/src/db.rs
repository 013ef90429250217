use axum::extract::FromRef;
use shared_types::{AppConfig, AppError, DatabaseConfig};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::ai_client::AiClient;

/// Shared application state passed to Axum handlers via `State`.
/// Derives `FromRef` so handlers can extract `State<SqlitePool>`,
/// `State<Arc<AppConfig>>` or `State<AiClient>` directly.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub ai: AiClient,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Result<Self, AppError> {
        let ai = AiClient::new(&config.ai)?;
        Ok(Self {
            pool,
            config: Arc::new(config),
            ai,
        })
    }
}

/// Open a connection pool for the configured database URL.
///
/// In-memory databases are pinned to a single connection, since every
/// new SQLite connection would otherwise see its own empty database. File
/// databases run in WAL mode so readers never block the single writer.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = config.url.contains(":memory:");
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(5));
    if in_memory {
        // Closing the only connection would discard the database.
        pool.max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
    } else {
        pool.max_connections(config.max_connections.max(1))
            .connect_with(options.journal_mode(SqliteJournalMode::Wal))
            .await
    }
}

/// Run database migrations against the given pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
