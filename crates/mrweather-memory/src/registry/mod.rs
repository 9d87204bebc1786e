//! User registry: users and their ordered reminder lists.
//!
//! Split into focused submodules:
//! - `users`: user lookup, creation, and preference updates
//! - `reminders`: reminder append, removal with index compaction, listing
//!
//! Store failures are logged here, then returned as typed errors so callers
//! can tell "empty" apart from "the store failed".

mod reminders;
mod users;

use crate::store::Store;
use mrweather_core::error::MrWeatherError;
use tracing::{debug, info, warn};

/// A bot user and their preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Platform user ID.
    pub id: i64,
    pub display_name: String,
    pub display_avatar: String,
    /// Default location for forecasts.
    pub location: String,
    /// Whether the user receives the daily digest.
    pub is_signed_up: bool,
}

impl User {
    /// A new user who has not signed up for the daily digest.
    pub fn new(
        id: i64,
        display_name: impl Into<String>,
        display_avatar: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            display_avatar: display_avatar.into(),
            location: location.into(),
            is_signed_up: false,
        }
    }

    pub fn signed_up(mut self, is_signed_up: bool) -> Self {
        self.is_signed_up = is_signed_up;
        self
    }
}

/// One entry of a user's reminder list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub owner_id: i64,
    /// Zero-based position; an owner's indices are always `0..count`.
    pub index: i64,
    pub text: String,
}

/// Schema migrations, applied in order and tracked in `_migrations`.
const MIGRATIONS: &[(&str, &str)] = &[
    ("001_init", include_str!("../../migrations/001_init.sql")),
    (
        "002_reminder_index",
        include_str!("../../migrations/002_reminder_index.sql"),
    ),
];

/// CRUD access to users and reminders.
#[derive(Clone)]
pub struct UserRegistry {
    store: Store,
}

impl UserRegistry {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Create the `users` and `reminders` tables if absent.
    ///
    /// Idempotent: already-applied migrations are skipped.
    pub async fn ensure_tables(&self) -> Result<(), MrWeatherError> {
        let applied = self
            .apply_migrations()
            .await
            .inspect_err(|e| log_failure("ensure_tables", String::new(), e))?;

        if applied.is_empty() {
            debug!("schema up to date");
        } else {
            info!("applied migrations: {}", applied.join(", "));
        }
        Ok(())
    }

    /// Apply pending migrations in one session; returns the names applied.
    async fn apply_migrations(&self) -> Result<Vec<&'static str>, MrWeatherError> {
        let mut session = self.store.begin().await?;
        session
            .execute_script(
                "CREATE TABLE IF NOT EXISTS _migrations (
                    name TEXT PRIMARY KEY,
                    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
                );",
            )
            .await?;

        let mut applied = Vec::new();
        for (name, sql) in MIGRATIONS {
            let done: Option<(String,)> = session
                .fetch_optional(
                    sqlx::query_as("SELECT name FROM _migrations WHERE name = ?").bind(*name),
                )
                .await?;
            if done.is_some() {
                continue;
            }

            session.execute_script(sql).await?;
            session
                .execute(sqlx::query("INSERT INTO _migrations (name) VALUES (?)").bind(*name))
                .await?;
            applied.push(*name);
        }

        session.commit().await?;
        Ok(applied)
    }
}

/// Log a failed registry operation.
///
/// Store failures are warnings; domain outcomes (`NotFound`, `OutOfRange`,
/// `AlreadyExists`) are expected and only traced at debug level.
fn log_failure(op: &str, args: String, err: &MrWeatherError) {
    match err {
        MrWeatherError::Store(_) => warn!("{op}({args}) failed: {err}"),
        _ => debug!("{op}({args}): {err}"),
    }
}
