//! Daily digest: cat picture, reminders, forecast, and a motivational quote
//! for every signed-up user.

use super::Gateway;
use crate::commands::motivation_prompt;
use crate::render;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mrweather_core::{error::MrWeatherError, message::OutgoingMessage};
use tracing::{info, warn};

/// First occurrence of `at` (UTC) strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

/// Whether a trigger at `now` is due, given the UTC date of the last digest.
/// A wall clock set backwards must not produce a second digest that day.
pub fn is_due(last_sent: Option<NaiveDate>, now: DateTime<Utc>) -> bool {
    last_sent != Some(now.date_naive())
}

impl Gateway {
    /// Background task: send the digest once a day at `at`.
    pub(super) async fn dispatch_loop(&self, at: NaiveTime) {
        let mut last_sent: Option<NaiveDate> = None;
        loop {
            let now = Utc::now();
            let next = next_run_after(now, at);
            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            let fired_at = Utc::now();
            if !is_due(last_sent, fired_at) {
                warn!("dispatch: digest for {} already sent, skipping", fired_at.date_naive());
                continue;
            }
            let sent = self.dispatch_once().await;
            last_sent = Some(fired_at.date_naive());
            info!("dispatch: daily digest sent to {sent} user(s)");
        }
    }

    /// Send the digest to every signed-up user. Returns how many were
    /// delivered; per-user failures are logged and skipped.
    pub async fn dispatch_once(&self) -> usize {
        let ids = match self.registry.get_signed_up_user_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("dispatch: cannot list signed-up users: {e}");
                return 0;
            }
        };

        let mut sent = 0;
        for id in ids {
            let digest = match self.build_digest(id).await {
                Ok(digest) => digest,
                Err(e) => {
                    warn!("dispatch: skipping user {id}: {e}");
                    continue;
                }
            };
            match self.channel.send(digest).await {
                Ok(()) => sent += 1,
                Err(e) => warn!("dispatch: delivery to {id} failed: {e}"),
            }
        }
        sent
    }

    /// Assemble one user's digest. Only a missing user is fatal; every
    /// other section degrades to a short notice.
    pub(super) async fn build_digest(&self, user_id: i64) -> Result<OutgoingMessage, MrWeatherError> {
        let user = self.registry.get_user(user_id).await?;
        let mut sections = vec![format!("Good morning, {}!", user.display_name)];

        let cat = self.cat.fetch(&()).await;
        if let Some(ref image) = cat {
            sections.push(format!("Daily cat (source: {})", image.source));
        }

        let reminders = self.registry.get_reminders(user_id).await.unwrap_or_else(|e| {
            warn!("dispatch: reminders for {user_id} unavailable: {e}");
            Vec::new()
        });
        sections.push(render::reminders(&user, &reminders));

        sections.push(match self.weather.fetch(&user.location).await {
            Some(forecast) => render::forecast(&forecast),
            None => format!("No forecast available for {} today.", user.location),
        });

        if let Some(reply) = self.text.fetch(&motivation_prompt(&self.prompts)).await {
            sections.push(render::motivation(&reply));
        }

        Ok(OutgoingMessage {
            target: user_id,
            text: sections.join("\n\n"),
            image_url: cat.map(|image| image.url),
        })
    }
}
