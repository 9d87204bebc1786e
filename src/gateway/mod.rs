//! Gateway: routes incoming messages to commands and runs the daily digest.

mod dispatch;


pub use dispatch::next_run_after;

use crate::commands::{self, Command, CommandContext};
use chrono::NaiveTime;
use mrweather_core::{
    config::TextConfig,
    message::{CatImage, Forecast, IncomingMessage, OutgoingMessage, TextReply},
    traits::{Channel, Provider},
};
use mrweather_memory::UserRegistry;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub type WeatherSource = Arc<dyn Provider<Request = str, Output = Forecast>>;
pub type TextSource = Arc<dyn Provider<Request = str, Output = TextReply>>;
pub type CatSource = Arc<dyn Provider<Request = (), Output = CatImage>>;

/// Ties the registry, the providers, and the delivery channel together.
pub struct Gateway {
    registry: UserRegistry,
    weather: WeatherSource,
    text: TextSource,
    cat: CatSource,
    channel: Arc<dyn Channel>,
    prompts: TextConfig,
    default_location: String,
}

impl Gateway {
    pub fn new(
        registry: UserRegistry,
        weather: WeatherSource,
        text: TextSource,
        cat: CatSource,
        channel: Arc<dyn Channel>,
        prompts: TextConfig,
        default_location: String,
    ) -> Self {
        Self {
            registry,
            weather,
            text,
            cat,
            channel,
            prompts,
            default_location,
        }
    }

    /// Produce the reply for one incoming message.
    pub async fn handle_message(&self, message: &IncomingMessage) -> String {
        let ctx = CommandContext {
            registry: &self.registry,
            weather: &self.weather,
            text: &self.text,
            prompts: &self.prompts,
            default_location: &self.default_location,
            message,
        };
        match Command::parse(&message.text) {
            Some(cmd) => {
                info!("command {cmd:?} from {}", message.sender_id);
                commands::handle(cmd, &ctx).await
            }
            None => commands::handle_chat(&ctx).await,
        }
    }

    /// Serve `incoming` until it closes or Ctrl-C, running the daily digest
    /// at `dispatch_at` (UTC) in the background when set.
    pub async fn run(
        self: Arc<Self>,
        mut incoming: mpsc::Receiver<IncomingMessage>,
        dispatch_at: Option<NaiveTime>,
    ) -> anyhow::Result<()> {
        let dispatch_handle = dispatch_at.map(|at| {
            info!("daily digest scheduled at {} UTC", at.format("%H:%M"));
            let gw = Arc::clone(&self);
            tokio::spawn(async move { gw.dispatch_loop(at).await })
        });

        info!("gateway running on {}", self.channel.name());
        loop {
            tokio::select! {
                msg = incoming.recv() => {
                    let Some(msg) = msg else { break };
                    if msg.text.trim().is_empty() {
                        continue;
                    }
                    let reply = self.handle_message(&msg).await;
                    if let Err(e) = self.channel.send(OutgoingMessage::text(msg.sender_id, reply)).await {
                        warn!("failed to deliver reply to {}: {e}", msg.sender_id);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested");
                    break;
                }
            }
        }

        if let Some(handle) = dispatch_handle {
            handle.abort();
        }
        info!("gateway stopped");
        Ok(())
    }
}
