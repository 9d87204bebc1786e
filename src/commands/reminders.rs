use super::{CommandContext, STORE_UNAVAILABLE};
use crate::render;
use mrweather_core::error::MrWeatherError;
use tracing::warn;

/// `/add-reminders a | b | c`: append each non-empty entry in order.
pub(super) async fn handle_add(ctx: &CommandContext<'_>) -> String {
    let entries: Vec<&str> = ctx
        .args()
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if entries.is_empty() {
        return "Error: usage: /add-reminders <reminder> [| reminder] [| reminder]".to_string();
    }

    for entry in entries {
        if let Err(e) = ctx.registry.add_reminder(ctx.sender_id(), entry).await {
            warn!("add-reminders: stopped after a failed insert: {e}");
            return STORE_UNAVAILABLE.to_string();
        }
    }
    "Success: added reminders!".to_string()
}

pub(super) async fn handle_view(ctx: &CommandContext<'_>) -> String {
    let user = match ctx.registry.get_user(ctx.sender_id()).await {
        Ok(user) => user,
        Err(_) => return STORE_UNAVAILABLE.to_string(),
    };
    match ctx.registry.get_reminders(ctx.sender_id()).await {
        Ok(list) => render::reminders(&user, &list),
        Err(_) => STORE_UNAVAILABLE.to_string(),
    }
}

/// `/remove-reminders <n|all>`, with `n` counted from 1.
pub(super) async fn handle_remove(ctx: &CommandContext<'_>, new_user: bool) -> String {
    if new_user {
        return "Error: you have no reminders.".to_string();
    }

    let arg = ctx.args();
    if arg.eq_ignore_ascii_case("all") {
        return match ctx.registry.clear_reminders(ctx.sender_id()).await {
            Ok(0) => "Error: you have no reminders.".to_string(),
            Ok(_) => "Success: reminders removed!".to_string(),
            Err(_) => STORE_UNAVAILABLE.to_string(),
        };
    }

    let Ok(position) = arg.parse::<i64>() else {
        return "Error: invalid index.".to_string();
    };
    match ctx.registry.remove_reminder(ctx.sender_id(), position.saturating_sub(1)).await {
        Ok(()) => "Success: reminder removed!".to_string(),
        Err(MrWeatherError::OutOfRange { .. }) => "Error: invalid index.".to_string(),
        Err(_) => STORE_UNAVAILABLE.to_string(),
    }
}
