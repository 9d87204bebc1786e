//! SQLite-backed store: one database file, scoped transactional sessions.
//!
//! Every write goes through a [`Session`]: a pooled connection inside a
//! transaction, holding the store-wide write lock. A session that is dropped
//! without [`Session::commit`] rolls back and hands its connection back to
//! the pool, so an early return or a `?` can never leave a half-applied
//! write behind.

use mrweather_core::{config::StoreConfig, error::MrWeatherError, shellexpand};
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

/// Future returned by a [`Store::with_connection`] closure.
pub type SessionFuture<'s, T> =
    Pin<Box<dyn Future<Output = Result<T, MrWeatherError>> + Send + 's>>;

/// Persistent store backed by a single SQLite file.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    /// Open (or create) the database file named by `config.db_path`.
    pub async fn new(config: &StoreConfig) -> Result<Self, MrWeatherError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MrWeatherError::Store(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| MrWeatherError::Store(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| MrWeatherError::Store(format!("failed to connect to sqlite: {e}")))?;

        info!("Store opened at {db_path}");

        Ok(Self::from_pool(pool))
    }

    /// Open a private in-memory database.
    ///
    /// Uses a single connection that is never recycled: an in-memory SQLite
    /// database lives exactly as long as its connection.
    pub async fn open_in_memory() -> Result<Self, MrWeatherError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| MrWeatherError::Store(format!("invalid db path: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .map_err(|e| MrWeatherError::Store(format!("failed to open in-memory db: {e}")))?;

        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get a reference to the underlying connection pool (for reads).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a write session.
    ///
    /// Waits for any other open session to finish first.
    pub async fn begin(&self) -> Result<Session, MrWeatherError> {
        let write_guard = Arc::clone(&self.write_lock).lock_owned().await;
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| MrWeatherError::Store(format!("begin failed: {e}")))?;
        Ok(Session {
            tx,
            _write_guard: write_guard,
        })
    }

    /// Run `f` inside a session.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`. The
    /// connection is released on both paths.
    pub async fn with_connection<T, F>(&self, f: F) -> Result<T, MrWeatherError>
    where
        F: for<'s> FnOnce(&'s mut Session) -> SessionFuture<'s, T>,
    {
        let mut session = self.begin().await?;
        let result = f(&mut session).await;
        match result {
            Ok(value) => {
                session.commit().await?;
                Ok(value)
            }
            Err(e) => {
                // A rollback failure is dropped in favor of `e`.
                let _ = session.rollback().await;
                Err(e)
            }
        }
    }
}

/// An open transaction on one pooled connection.
pub struct Session {
    tx: Transaction<'static, Sqlite>,
    _write_guard: OwnedMutexGuard<()>,
}

impl Session {
    /// Run one parameterized statement. Returns the number of rows affected.
    pub async fn execute<'q>(
        &mut self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Result<u64, MrWeatherError> {
        query
            .execute(&mut *self.tx)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| MrWeatherError::Store(format!("execute failed: {e}")))
    }

    /// Run a fixed multi-statement script (schema DDL).
    pub async fn execute_script(&mut self, sql: &str) -> Result<(), MrWeatherError> {
        sqlx::raw_sql(sql)
            .execute(&mut *self.tx)
            .await
            .map(|_| ())
            .map_err(|e| MrWeatherError::Store(format!("script failed: {e}")))
    }

    /// Fetch exactly one row.
    pub async fn fetch_one<'q, O>(
        &mut self,
        query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> Result<O, MrWeatherError>
    where
        O: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        query
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| MrWeatherError::Store(format!("query failed: {e}")))
    }

    /// Fetch at most one row.
    pub async fn fetch_optional<'q, O>(
        &mut self,
        query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> Result<Option<O>, MrWeatherError>
    where
        O: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        query
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| MrWeatherError::Store(format!("query failed: {e}")))
    }

    /// Flush pending writes and end the session.
    pub async fn commit(self) -> Result<(), MrWeatherError> {
        self.tx
            .commit()
            .await
            .map_err(|e| MrWeatherError::Store(format!("commit failed: {e}")))
    }

    /// Discard pending writes and end the session.
    pub async fn rollback(self) -> Result<(), MrWeatherError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| MrWeatherError::Store(format!("rollback failed: {e}")))
    }
}
