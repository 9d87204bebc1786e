//! Reminder append, removal with index compaction, and listing.
//!
//! An owner's reminders always occupy indices `0..count` with no gaps.
//! Appending writes at `count`; removing index `k` deletes that row and
//! shifts every later row down by one, all inside one session so a failure
//! part-way through leaves the list exactly as it was.

use super::{log_failure, Reminder, UserRegistry};
use crate::store::Session;
use mrweather_core::error::MrWeatherError;

/// Current number of reminders for `owner_id`, read inside the session.
async fn reminder_count(session: &mut Session, owner_id: i64) -> Result<i64, MrWeatherError> {
    let (count,): (i64,) = session
        .fetch_one(
            sqlx::query_as("SELECT COUNT(*) FROM reminders WHERE owner_id = ?").bind(owner_id),
        )
        .await?;
    Ok(count)
}

impl UserRegistry {
    /// Append a reminder to the owner's list. Empty text is ignored.
    pub async fn add_reminder(&self, owner_id: i64, text: &str) -> Result<(), MrWeatherError> {
        if text.is_empty() {
            return Ok(());
        }
        self.try_add_reminder(owner_id, text).await.inspect_err(|e| {
            log_failure(
                "add_reminder",
                format!("owner_id={owner_id}, reminder={text}"),
                e,
            )
        })
    }

    async fn try_add_reminder(&self, owner_id: i64, text: &str) -> Result<(), MrWeatherError> {
        let mut session = self.store.begin().await?;
        let next_index = reminder_count(&mut session, owner_id).await?;
        session
            .execute(
                sqlx::query("INSERT INTO reminders (owner_id, r_index, reminder) VALUES (?, ?, ?)")
                    .bind(owner_id)
                    .bind(next_index)
                    .bind(text),
            )
            .await?;
        session.commit().await
    }

    /// Remove the reminder at `index` and close the gap.
    ///
    /// Fails with `OutOfRange` if `index` is not in `0..count`; the list is
    /// left untouched in that case.
    pub async fn remove_reminder(&self, owner_id: i64, index: i64) -> Result<(), MrWeatherError> {
        self.try_remove_reminder(owner_id, index)
            .await
            .inspect_err(|e| {
                log_failure(
                    "remove_reminder",
                    format!("owner_id={owner_id}, index={index}"),
                    e,
                )
            })
    }

    async fn try_remove_reminder(&self, owner_id: i64, index: i64) -> Result<(), MrWeatherError> {
        let mut session = self.store.begin().await?;
        let count = reminder_count(&mut session, owner_id).await?;
        if index < 0 || index >= count {
            return Err(MrWeatherError::OutOfRange { index, count });
        }

        let deleted = session
            .execute(
                sqlx::query("DELETE FROM reminders WHERE owner_id = ? AND r_index = ?")
                    .bind(owner_id)
                    .bind(index),
            )
            .await?;
        if deleted != 1 {
            return Err(MrWeatherError::Store(format!(
                "reminder {index} of owner {owner_id} missing (count {count}); indices are not dense"
            )));
        }

        // Ascending point updates: slot i-1 is always free when row i moves.
        for i in (index + 1)..count {
            session
                .execute(
                    sqlx::query(
                        "UPDATE reminders SET r_index = ? WHERE owner_id = ? AND r_index = ?",
                    )
                    .bind(i - 1)
                    .bind(owner_id)
                    .bind(i),
                )
                .await?;
        }

        session.commit().await
    }

    /// Remove every reminder the owner has. Returns how many were removed.
    pub async fn clear_reminders(&self, owner_id: i64) -> Result<u64, MrWeatherError> {
        let mut session = self.store.begin().await?;
        let removed = session
            .execute(sqlx::query("DELETE FROM reminders WHERE owner_id = ?").bind(owner_id))
            .await
            .inspect_err(|e| log_failure("clear_reminders", format!("owner_id={owner_id}"), e))?;
        session.commit().await?;
        Ok(removed)
    }

    /// The owner's reminder texts, in index order. Empty if there are none.
    pub async fn get_reminders(&self, owner_id: i64) -> Result<Vec<String>, MrWeatherError> {
        Ok(self
            .get_reminder_entries(owner_id)
            .await?
            .into_iter()
            .map(|r| r.text)
            .collect())
    }

    /// The owner's reminders with their indices, in index order.
    pub async fn get_reminder_entries(
        &self,
        owner_id: i64,
    ) -> Result<Vec<Reminder>, MrWeatherError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT r_index, reminder FROM reminders WHERE owner_id = ? ORDER BY r_index ASC",
        )
        .bind(owner_id)
        .fetch_all(self.store.pool())
        .await
        .map_err(|e| MrWeatherError::Store(format!("get reminders failed: {e}")))
        .inspect_err(|e| log_failure("get_reminders", format!("owner_id={owner_id}"), e))?;

        Ok(rows
            .into_iter()
            .map(|(index, text)| Reminder {
                owner_id,
                index,
                text,
            })
            .collect())
    }
}
