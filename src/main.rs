mod commands;
mod console;
mod gateway;
mod render;
#[cfg(test)]
mod testing;

use clap::{Parser, Subcommand};
use console::ConsoleChannel;
use gateway::Gateway;
use mrweather_core::{
    config::{self, shellexpand, Config},
    message::IncomingMessage,
};
use mrweather_memory::{Store, UserRegistry};
use mrweather_providers::{CatProvider, GeminiProvider, WeatherProvider};
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "mrweather",
    version,
    about = "Mr. Weather: daily forecasts, reminders and motivation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml", env = "MRWEATHER_CONFIG")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the terminal, with the daily digest in the background.
    Start {
        /// User id the terminal speaks as.
        #[arg(long, default_value_t = 1)]
        user_id: i64,
        /// Display name for that user.
        #[arg(long, default_value = "console")]
        name: String,
    },
    /// Show configuration, provider keys, and store contents.
    Status,
    /// Send a single message or command and print the reply.
    Ask {
        #[arg(long, default_value_t = 1)]
        user_id: i64,
        #[arg(long, default_value = "console")]
        name: String,
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_tracing(&cfg)?;

    match cli.command {
        Commands::Start { user_id, name } => {
            let channel = Arc::new(ConsoleChannel);
            let incoming = channel.listen(user_id, name);
            let gw = Arc::new(build_gateway(&cfg, channel).await?);

            let dispatch_at = if cfg.dispatch.enabled {
                Some(cfg.dispatch.time_utc()?)
            } else {
                None
            };
            println!("{} is up. Type /help for commands, Ctrl-D to quit.", cfg.bot.name);
            gw.run(incoming, dispatch_at).await?;
        }
        Commands::Status => print_status(&cli.config, &cfg).await?,
        Commands::Ask {
            user_id,
            name,
            message,
        } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: mrweather ask <message>");
            }
            let gw = build_gateway(&cfg, Arc::new(ConsoleChannel)).await?;
            let reply = gw
                .handle_message(&IncomingMessage {
                    sender_id: user_id,
                    sender_name: name,
                    sender_avatar: String::new(),
                    text: message.join(" "),
                })
                .await;
            println!("{reply}");
        }
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `bot.log_level`.
/// The returned guard flushes the file writer on drop.
fn init_tracing(cfg: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.bot.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = if cfg.bot.log_to_file {
        let dir = cfg.log_dir();
        std::fs::create_dir_all(&dir)?;
        let appender = tracing_appender::rolling::daily(&dir, "mrweather.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(guard)
}

async fn open_registry(cfg: &Config) -> anyhow::Result<UserRegistry> {
    let registry = UserRegistry::new(Store::new(&cfg.store).await?);
    registry.ensure_tables().await?;
    Ok(registry)
}

async fn build_gateway(
    cfg: &Config,
    channel: Arc<dyn mrweather_core::traits::Channel>,
) -> anyhow::Result<Gateway> {
    let registry = open_registry(cfg).await?;
    let providers = &cfg.provider;
    Ok(Gateway::new(
        registry,
        Arc::new(WeatherProvider::from_config(&providers.weather)),
        Arc::new(GeminiProvider::from_config(&providers.text)),
        Arc::new(CatProvider::from_config(&providers.cat)),
        channel,
        providers.text.clone(),
        cfg.bot.default_location.clone(),
    ))
}

async fn print_status(config_path: &str, cfg: &Config) -> anyhow::Result<()> {
    let key_state = |key: &str| if key.is_empty() { "missing" } else { "configured" };

    println!("{} status\n", cfg.bot.name);
    println!("Config: {config_path}");
    println!("Database: {}", shellexpand(&cfg.store.db_path));
    if cfg.dispatch.enabled {
        let at = cfg.dispatch.time_utc()?;
        println!(
            "Daily digest: {} UTC (next {})",
            at.format("%H:%M"),
            gateway::next_run_after(chrono::Utc::now(), at).format("%Y-%m-%d %H:%M")
        );
    } else {
        println!("Daily digest: disabled");
    }
    println!();
    println!("  weather: {}", key_state(&cfg.provider.weather.api_key));
    println!("  text:    {}", key_state(&cfg.provider.text.api_key));
    println!("  cat:     {}", key_state(&cfg.provider.cat.api_key));
    println!();

    if Path::new(&shellexpand(&cfg.store.db_path)).exists() {
        let registry = open_registry(cfg).await?;
        let signed_up = registry.get_signed_up_user_ids().await?;
        println!("Signed-up users: {}", signed_up.len());
    } else {
        println!("Signed-up users: 0 (no database yet)");
    }
    Ok(())
}
