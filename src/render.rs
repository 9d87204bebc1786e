//! Plain-text rendering of forecasts, reminders, and generated text.

use mrweather_core::message::{Forecast, TextReply};
use mrweather_memory::User;

pub fn forecast(f: &Forecast) -> String {
    format!(
        "Today's forecast for {}\n\
         {}\n\
         High: {:.0}°F | Wind: {:.0} mph | Rain: {}%\n\
         Source: {}",
        f.location, f.summary, f.highest_temperature, f.wind, f.rain, f.source
    )
}

/// Reminder list numbered from 1, the way users address entries.
pub fn reminders(user: &User, reminders: &[String]) -> String {
    if reminders.is_empty() {
        return format!("{}'s reminders\nYou have no reminders.", user.display_name);
    }
    let mut out = format!("{}'s reminders", user.display_name);
    for (i, text) in reminders.iter().enumerate() {
        out.push_str(&format!("\n{}. {text}", i + 1));
    }
    out
}

pub fn motivation(reply: &TextReply) -> String {
    format!("Daily motivation\n{}\nSource: {}", reply.text, reply.source)
}
