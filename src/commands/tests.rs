use super::*;
use crate::gateway::{TextSource, WeatherSource};
use crate::testing::{self, StubText, StubWeather};
use mrweather_core::message::IncomingMessage;
use std::sync::Arc;

struct Harness {
    registry: UserRegistry,
    weather: WeatherSource,
    text: TextSource,
    text_stub: Arc<StubText>,
    prompts: TextConfig,
}

impl Harness {
    async fn new() -> Self {
        let text_stub = Arc::new(StubText::new(Some("Stay curious.")));
        Self {
            registry: testing::registry().await,
            weather: Arc::new(StubWeather::new(&["Irvine", "Boston"])),
            text: text_stub.clone(),
            text_stub,
            prompts: TextConfig::default(),
        }
    }

    async fn run(&self, sender_id: i64, text: &str) -> String {
        let message = IncomingMessage {
            sender_id,
            sender_name: format!("user{sender_id}"),
            sender_avatar: String::new(),
            text: text.to_string(),
        };
        let ctx = CommandContext {
            registry: &self.registry,
            weather: &self.weather,
            text: &self.text,
            prompts: &self.prompts,
            default_location: "Irvine",
            message: &message,
        };
        match Command::parse(text) {
            Some(cmd) => handle(cmd, &ctx).await,
            None => handle_chat(&ctx).await,
        }
    }
}

// --- parsing ---

#[test]
fn test_parse_all_commands() {
    assert_eq!(Command::parse("/sign-up"), Some(Command::SignUp));
    assert_eq!(Command::parse("/opt-out"), Some(Command::OptOut));
    assert_eq!(Command::parse("/forecast Boston"), Some(Command::Forecast));
    assert_eq!(
        Command::parse("/add-reminders a | b"),
        Some(Command::AddReminders)
    );
    assert_eq!(
        Command::parse("/view-reminders"),
        Some(Command::ViewReminders)
    );
    assert_eq!(
        Command::parse("/remove-reminders 2"),
        Some(Command::RemoveReminders)
    );
    assert_eq!(Command::parse("/motivation"), Some(Command::Motivation));
    assert_eq!(Command::parse("/help"), Some(Command::Help));
    assert_eq!(Command::parse("/help-commands"), Some(Command::Help));
}

#[test]
fn test_parse_strips_bot_suffix() {
    assert_eq!(Command::parse("/help@mrweather_bot"), Some(Command::Help));
}

#[test]
fn test_parse_plain_text() {
    assert_eq!(Command::parse("what should I wear today?"), None);
    assert_eq!(Command::parse(""), None);
    assert_eq!(Command::parse("   "), None);
}

#[test]
fn test_parse_unknown_slash_command() {
    assert_eq!(Command::parse("/forcast Boston"), Some(Command::Unknown));
    assert_eq!(Command::parse("/nonsense@mrweather_bot"), Some(Command::Unknown));
    assert_eq!(Command::parse("/"), Some(Command::Unknown));
}

// --- users ---

#[tokio::test]
async fn test_any_command_creates_user() {
    let h = Harness::new().await;
    assert!(!h.registry.user_exists(7).await.unwrap());
    h.run(7, "/help").await;
    let user = h.registry.get_user(7).await.unwrap();
    assert_eq!(user.display_name, "user7");
    assert_eq!(user.location, "Irvine");
    assert!(!user.is_signed_up);
}

#[tokio::test]
async fn test_sign_up_and_opt_out() {
    let h = Harness::new().await;
    assert_eq!(h.run(1, "/sign-up").await, "Success: signed up!");
    assert_eq!(h.registry.get_signed_up_user_ids().await.unwrap(), vec![1]);

    assert_eq!(h.run(1, "/opt-out").await, "Success: opted out!");
    assert!(h.registry.get_signed_up_user_ids().await.unwrap().is_empty());
}

// --- forecast ---

#[tokio::test]
async fn test_forecast_uses_saved_location() {
    let h = Harness::new().await;
    let reply = h.run(1, "/forecast").await;
    assert!(reply.starts_with("Today's forecast for Irvine"), "{reply}");
}

#[tokio::test]
async fn test_forecast_for_other_location_keeps_default() {
    let h = Harness::new().await;
    let reply = h.run(1, "/forecast boston").await;
    assert!(reply.contains("Boston"), "{reply}");
    assert_eq!(h.registry.get_user(1).await.unwrap().location, "Irvine");
}

#[tokio::test]
async fn test_forecast_default_flag_saves_location() {
    let h = Harness::new().await;
    h.run(1, "/forecast Boston --default").await;
    assert_eq!(h.registry.get_user(1).await.unwrap().location, "Boston");

    let reply = h.run(1, "/forecast").await;
    assert!(reply.contains("Boston"), "{reply}");
}

#[tokio::test]
async fn test_forecast_unknown_location() {
    let h = Harness::new().await;
    assert_eq!(
        h.run(1, "/forecast Atlantis --default").await,
        "Error: Atlantis was not recognized."
    );
    assert_eq!(h.registry.get_user(1).await.unwrap().location, "Irvine");
}

// --- reminders ---

#[tokio::test]
async fn test_add_and_view_reminders() {
    let h = Harness::new().await;
    assert_eq!(
        h.run(1, "/add-reminders water plants |  | call mom").await,
        "Success: added reminders!"
    );
    assert_eq!(
        h.registry.get_reminders(1).await.unwrap(),
        vec!["water plants", "call mom"]
    );
    assert_eq!(
        h.run(1, "/view-reminders").await,
        "user1's reminders\n1. water plants\n2. call mom"
    );
}

#[tokio::test]
async fn test_add_reminders_without_text() {
    let h = Harness::new().await;
    assert!(h.run(1, "/add-reminders").await.starts_with("Error:"));
    assert!(h.registry.get_reminders(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_reminder_is_one_based() {
    let h = Harness::new().await;
    h.run(1, "/add-reminders a | b | c").await;
    assert_eq!(
        h.run(1, "/remove-reminders 2").await,
        "Success: reminder removed!"
    );
    assert_eq!(h.registry.get_reminders(1).await.unwrap(), vec!["a", "c"]);
}

#[tokio::test]
async fn test_remove_reminder_invalid_index() {
    let h = Harness::new().await;
    h.run(1, "/add-reminders a | b").await;
    for arg in ["0", "3", "-1", "two", ""] {
        assert_eq!(
            h.run(1, &format!("/remove-reminders {arg}")).await,
            "Error: invalid index.",
            "arg {arg:?}"
        );
    }
    assert_eq!(h.registry.get_reminders(1).await.unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_remove_reminder_for_new_user() {
    let h = Harness::new().await;
    assert_eq!(
        h.run(9, "/remove-reminders 1").await,
        "Error: you have no reminders."
    );
    assert!(h.registry.user_exists(9).await.unwrap());
}

#[tokio::test]
async fn test_remove_all_reminders() {
    let h = Harness::new().await;
    h.run(1, "/add-reminders a | b").await;
    assert_eq!(
        h.run(1, "/remove-reminders all").await,
        "Success: reminders removed!"
    );
    assert!(h.registry.get_reminders(1).await.unwrap().is_empty());
    assert_eq!(
        h.run(1, "/remove-reminders all").await,
        "Error: you have no reminders."
    );
}

// --- text ---

#[tokio::test]
async fn test_motivation_reply() {
    let h = Harness::new().await;
    let reply = h.run(1, "/motivation").await;
    assert!(reply.contains("Stay curious."), "{reply}");
    let prompts = h.text_stub.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("random seed"));
}

#[tokio::test]
async fn test_chat_uses_personality_prefix() {
    let h = Harness::new().await;
    assert_eq!(h.run(1, "how are you?").await, "Stay curious.");
    let prompts = h.text_stub.prompts();
    assert!(prompts[0].starts_with("Take on the personality"));
    assert!(prompts[0].ends_with(" how are you?"));
    assert!(h.registry.user_exists(1).await.unwrap());
}

#[tokio::test]
async fn test_chat_when_text_provider_fails() {
    let mut h = Harness::new().await;
    h.text = Arc::new(StubText::new(None));
    assert_eq!(h.run(1, "hello").await, "Error.");
}

#[tokio::test]
async fn test_unknown_command_is_not_sent_to_chat() {
    let h = Harness::new().await;
    assert_eq!(
        h.run(1, "/forcast Boston").await,
        "Error: unknown command, see /help."
    );
    assert!(h.text_stub.prompts().is_empty());
}

#[tokio::test]
async fn test_help_lists_commands() {
    let h = Harness::new().await;
    let reply = h.run(1, "/help").await;
    for cmd in ["/sign-up", "/forecast", "/remove-reminders", "/motivation"] {
        assert!(reply.contains(cmd), "missing {cmd}");
    }
}
