//! User lookup, creation, and preference updates.

use super::{log_failure, User, UserRegistry};
use mrweather_core::error::MrWeatherError;

type UserRow = (i64, String, String, String, bool);

fn user_from_row((id, display_name, display_avatar, location, is_signed_up): UserRow) -> User {
    User {
        id,
        display_name,
        display_avatar,
        location,
        is_signed_up,
    }
}

impl UserRegistry {
    /// Look up a user by ID.
    pub async fn get_user(&self, id: i64) -> Result<User, MrWeatherError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, display_name, display_avatar, location, is_signed_up \
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await
        .map_err(|e| MrWeatherError::Store(format!("get user failed: {e}")))
        .inspect_err(|e| log_failure("get_user", format!("id={id}"), e))?;

        row.map(user_from_row)
            .ok_or_else(|| MrWeatherError::NotFound(format!("user {id}")))
    }

    /// Whether a user with this ID exists.
    pub async fn user_exists(&self, id: i64) -> Result<bool, MrWeatherError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(|e| MrWeatherError::Store(format!("user lookup failed: {e}")))
            .inspect_err(|e| log_failure("user_exists", format!("id={id}"), e))?;
        Ok(row.is_some())
    }

    /// Insert a new user. Fails with `AlreadyExists` if the ID is taken.
    pub async fn add_user(&self, user: &User) -> Result<(), MrWeatherError> {
        self.try_add_user(user)
            .await
            .inspect_err(|e| log_failure("add_user", format!("id={}", user.id), e))
    }

    async fn try_add_user(&self, user: &User) -> Result<(), MrWeatherError> {
        let mut session = self.store.begin().await?;

        let existing: Option<(i64,)> = session
            .fetch_optional(sqlx::query_as("SELECT 1 FROM users WHERE id = ?").bind(user.id))
            .await?;
        if existing.is_some() {
            return Err(MrWeatherError::AlreadyExists(format!("user {}", user.id)));
        }

        session
            .execute(
                sqlx::query(
                    "INSERT INTO users (id, display_name, display_avatar, location, is_signed_up) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(user.id)
                .bind(&user.display_name)
                .bind(&user.display_avatar)
                .bind(&user.location)
                .bind(user.is_signed_up),
            )
            .await?;

        session.commit().await
    }

    /// Create the user unless it already exists. Returns `true` if created.
    ///
    /// Every command calls this first, so users appear on first interaction.
    pub async fn ensure_user(&self, user: &User) -> Result<bool, MrWeatherError> {
        match self.add_user(user).await {
            Ok(()) => Ok(true),
            Err(MrWeatherError::AlreadyExists(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Set a user's default location. No-op if the user does not exist.
    pub async fn update_location(&self, id: i64, location: &str) -> Result<(), MrWeatherError> {
        let mut session = self.store.begin().await?;
        session
            .execute(
                sqlx::query("UPDATE users SET location = ? WHERE id = ?")
                    .bind(location)
                    .bind(id),
            )
            .await
            .inspect_err(|e| {
                log_failure(
                    "update_location",
                    format!("id={id}, location={location}"),
                    e,
                )
            })?;
        session.commit().await
    }

    /// Sign a user up for (or out of) the daily digest. No-op if the user does not exist.
    pub async fn update_signup(&self, id: i64, is_signed_up: bool) -> Result<(), MrWeatherError> {
        let mut session = self.store.begin().await?;
        session
            .execute(
                sqlx::query("UPDATE users SET is_signed_up = ? WHERE id = ?")
                    .bind(is_signed_up)
                    .bind(id),
            )
            .await
            .inspect_err(|e| {
                log_failure(
                    "update_signup",
                    format!("id={id}, is_signed_up={is_signed_up}"),
                    e,
                )
            })?;
        session.commit().await
    }

    /// IDs of every user signed up for the daily digest.
    pub async fn get_signed_up_user_ids(&self) -> Result<Vec<i64>, MrWeatherError> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE is_signed_up = 1 ORDER BY id")
                .fetch_all(self.store.pool())
                .await
                .map_err(|e| MrWeatherError::Store(format!("signed-up query failed: {e}")))
                .inspect_err(|e| log_failure("get_signed_up_user_ids", String::new(), e))?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
