//! Terminal channel: reads lines from stdin as one local user and prints
//! replies and digests to stdout.

use async_trait::async_trait;
use mrweather_core::{
    error::MrWeatherError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

pub struct ConsoleChannel;

impl ConsoleChannel {
    /// Forward stdin lines as messages from `sender_id` until EOF.
    pub fn listen(&self, sender_id: i64, sender_name: String) -> mpsc::Receiver<IncomingMessage> {
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let msg = IncomingMessage {
                    sender_id,
                    sender_name: sender_name.clone(),
                    sender_avatar: String::new(),
                    text: line,
                };
                if tx.send(msg).await.is_err() {
                    break;
                }
            }
            debug!("console: stdin closed");
        });
        rx
    }
}

/// Terminal rendering of one outgoing message.
pub fn format_message(message: &OutgoingMessage) -> String {
    match message.image_url {
        Some(ref url) => format!("[to {}] {}\n[image] {url}", message.target, message.text),
        None => format!("[to {}] {}", message.target, message.text),
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), MrWeatherError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}\n", format_message(&message))?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_text_only() {
        let msg = OutgoingMessage::text(5, "Success: signed up!");
        assert_eq!(format_message(&msg), "[to 5] Success: signed up!");
    }

    #[test]
    fn test_format_with_image() {
        let msg = OutgoingMessage {
            target: 5,
            text: "Good morning".into(),
            image_url: Some("https://cats/1.jpg".into()),
        };
        assert_eq!(
            format_message(&msg),
            "[to 5] Good morning\n[image] https://cats/1.jpg"
        );
    }
}
