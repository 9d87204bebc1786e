//! Built-in bot commands: sign-up, forecasts, reminders, motivation.

mod reminders;

#[cfg(test)]
mod tests;

use crate::gateway::{TextSource, WeatherSource};
use crate::render;
use mrweather_core::{config::TextConfig, message::IncomingMessage};
use mrweather_memory::{User, UserRegistry};
use tracing::warn;

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub registry: &'a UserRegistry,
    pub weather: &'a WeatherSource,
    pub text: &'a TextSource,
    pub prompts: &'a TextConfig,
    pub default_location: &'a str,
    pub message: &'a IncomingMessage,
}

impl CommandContext<'_> {
    fn sender_id(&self) -> i64 {
        self.message.sender_id
    }

    /// Everything after the command word.
    fn args(&self) -> &str {
        let text = self.message.text.trim_start();
        match text.find(char::is_whitespace) {
            Some(pos) => text[pos..].trim(),
            None => "",
        }
    }
}

/// Known bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SignUp,
    OptOut,
    Forecast,
    AddReminders,
    ViewReminders,
    RemoveReminders,
    Motivation,
    Help,
    /// A `/word` that names no command.
    Unknown,
}

impl Command {
    /// Parse a command from message text. Returns `None` for plain text,
    /// which goes to chat.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        // Strip @botname suffix (e.g. "/help@mrweather_bot" → "/help").
        let cmd = first.split('@').next().unwrap_or(first);
        match cmd {
            "/sign-up" | "/signup" => Some(Self::SignUp),
            "/opt-out" | "/optout" => Some(Self::OptOut),
            "/forecast" => Some(Self::Forecast),
            "/add-reminders" | "/add-reminder" => Some(Self::AddReminders),
            "/view-reminders" | "/reminders" => Some(Self::ViewReminders),
            "/remove-reminders" | "/remove-reminder" => Some(Self::RemoveReminders),
            "/motivation" => Some(Self::Motivation),
            "/help" | "/help-commands" => Some(Self::Help),
            _ if cmd.starts_with('/') => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Create the sender's user row on first contact. Returns `Some(true)` if
/// the user is new, `None` if the store is unreachable.
async fn ensure_sender(ctx: &CommandContext<'_>) -> Option<bool> {
    let user = User::new(
        ctx.message.sender_id,
        ctx.message.sender_name.as_str(),
        ctx.message.sender_avatar.as_str(),
        ctx.default_location,
    );
    ctx.registry.ensure_user(&user).await.ok()
}

/// Handle a command and return the response text.
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) -> String {
    let Some(created) = ensure_sender(ctx).await else {
        return STORE_UNAVAILABLE.to_string();
    };
    match cmd {
        Command::SignUp => set_signup(ctx, true).await,
        Command::OptOut => set_signup(ctx, false).await,
        Command::Forecast => handle_forecast(ctx).await,
        Command::AddReminders => reminders::handle_add(ctx).await,
        Command::ViewReminders => reminders::handle_view(ctx).await,
        Command::RemoveReminders => reminders::handle_remove(ctx, created).await,
        Command::Motivation => handle_motivation(ctx).await,
        Command::Help => help_text(),
        Command::Unknown => "Error: unknown command, see /help.".to_string(),
    }
}

/// Free-form chat: the message goes to the text provider behind the
/// configured personality.
pub async fn handle_chat(ctx: &CommandContext<'_>) -> String {
    if ensure_sender(ctx).await.is_none() {
        return STORE_UNAVAILABLE.to_string();
    }
    let prompt = format!("{} {}", ctx.prompts.personality.trim_end(), ctx.message.text.trim());
    match ctx.text.fetch(&prompt).await {
        Some(reply) => reply.text,
        None => "Error.".to_string(),
    }
}

const STORE_UNAVAILABLE: &str = "Error: your data is unavailable right now, try again later.";

async fn set_signup(ctx: &CommandContext<'_>, is_signed_up: bool) -> String {
    match ctx.registry.update_signup(ctx.sender_id(), is_signed_up).await {
        Ok(()) if is_signed_up => "Success: signed up!".to_string(),
        Ok(()) => "Success: opted out!".to_string(),
        Err(_) => STORE_UNAVAILABLE.to_string(),
    }
}

/// `/forecast [location] [--default]`.
///
/// Without a location the user's saved one is used. `--default` saves a
/// recognized location as the user's new default.
async fn handle_forecast(ctx: &CommandContext<'_>) -> String {
    let mut set_default = false;
    let mut words = Vec::new();
    for word in ctx.args().split_whitespace() {
        if word == "--default" {
            set_default = true;
        } else {
            words.push(word);
        }
    }
    let location = words.join(" ");

    if location.is_empty() {
        let saved = match ctx.registry.get_user(ctx.sender_id()).await {
            Ok(user) => user.location,
            Err(_) => return STORE_UNAVAILABLE.to_string(),
        };
        return match ctx.weather.fetch(&saved).await {
            Some(forecast) => render::forecast(&forecast),
            None => format!("Error: no forecast available for {saved}."),
        };
    }

    let Some(forecast) = ctx.weather.fetch(&location).await else {
        return format!("Error: {location} was not recognized.");
    };
    if set_default {
        if let Err(e) = ctx.registry.update_location(ctx.sender_id(), &location).await {
            warn!("forecast: could not save default location: {e}");
            return STORE_UNAVAILABLE.to_string();
        }
    }
    render::forecast(&forecast)
}

/// Prompt for the daily quote, seeded with the current time so repeated
/// requests differ.
pub fn motivation_prompt(prompts: &TextConfig) -> String {
    format!(
        "{} Use {} as a random seed.",
        prompts.motivation_prompt.trim_end(),
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.f")
    )
}

async fn handle_motivation(ctx: &CommandContext<'_>) -> String {
    match ctx.text.fetch(&motivation_prompt(ctx.prompts)).await {
        Some(reply) => render::motivation(&reply),
        None => "Error: no motivation available right now.".to_string(),
    }
}

fn help_text() -> String {
    [
        "Commands",
        "/sign-up: receive the daily digest",
        "/opt-out: stop the daily digest",
        "/forecast [location] [--default]: today's forecast",
        "/add-reminders <reminder> [| reminder] [| reminder]",
        "/view-reminders: list your reminders",
        "/remove-reminders <number|all>",
        "/motivation: a quote to start the day",
        "/help: this list",
        "Anything else: chat with Mr. Weather",
    ]
    .join("\n")
}
