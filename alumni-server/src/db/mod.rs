//! Database Module
//!
//! Lazily opened SQLite pool shared by every request. The pool is created on
//! the first `ensure_connected()` call; callers that arrive while that first
//! attempt is in flight wait on the same attempt instead of opening their own.

pub mod members;

pub use members::{MemberStore, SqliteMemberStore, StoreError};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("DATABASE_URL is not configured")]
    Configuration,

    #[error("Failed to connect to database: {0}")]
    Connection(String),
}

/// Process-wide database handle
///
/// Cloning is cheap and every clone shares the same cached pool.
#[derive(Clone)]
pub struct Database {
    url: Option<String>,
    max_connections: u32,
    pool: Arc<OnceCell<SqlitePool>>,
    attempts: Arc<AtomicUsize>,
}

impl Database {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            max_connections: 5,
            pool: Arc::new(OnceCell::new()),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// Return the cached pool, opening it (and applying migrations) on first use.
    ///
    /// A failed attempt is not retried here; the cell stays empty so the next
    /// caller starts a fresh attempt.
    pub async fn ensure_connected(&self) -> Result<&SqlitePool, DbError> {
        self.pool.get_or_try_init(|| self.connect()).await
    }

    /// Whether the pool has been opened
    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    /// Number of connection attempts started so far
    pub fn connect_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<SqlitePool, DbError> {
        let url = self
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or(DbError::Configuration)?;

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(attempt, "Opening database pool");

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbError::Connection(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Wait on write contention instead of failing immediately
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DbError::Connection(format!("Failed to apply migrations: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");
        Ok(pool)
    }
}
