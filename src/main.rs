mod api;
mod commands;
mod gateway;

use anyhow::Context;
use clap::{Parser, Subcommand};
use habitbot_channels::telegram::TelegramClient;
use habitbot_core::{
    config::{self, Config},
    error::{BotError, ErrorKind},
    shellexpand,
};
use habitbot_store::Store;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "habitbot", version, about = "Telegram habit tracker bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Print the effective configuration and check the bot token.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    match cli.command {
        Commands::Start => {
            let _guard = init_logging(&cfg, true);
            cfg.validate()?;

            let store = Store::new(&cfg.store)
                .await
                .context("failed to open habit store")?;

            let client = TelegramClient::new(&cfg.telegram);
            let me = client.get_me().await.map_err(|e| {
                BotError::new(
                    ErrorKind::Startup,
                    "can't reach Telegram with the configured token",
                )
                .with_source(e)
            })?;
            tracing::info!("authorized as @{}", me.username.as_deref().unwrap_or("?"));

            gateway::Gateway::new(cfg, client, store).run().await?;
        }
        Commands::Status => {
            let _guard = init_logging(&cfg, false);
            print_status(&cli.config, &cfg).await;
        }
    }
    Ok(())
}

/// Stderr logging plus, when `to_file` is set, `{data_dir}/logs/habitbot.log`.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(cfg: &Config, to_file: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.bot.log_level));

    let log_dir = PathBuf::from(shellexpand(&cfg.bot.data_dir)).join("logs");
    let file = if to_file {
        match std::fs::create_dir_all(&log_dir) {
            Ok(()) => Some(tracing_appender::non_blocking(
                tracing_appender::rolling::never(&log_dir, "habitbot.log"),
            )),
            Err(e) => {
                eprintln!(
                    "can't create {}: {e}; logging to stderr only",
                    log_dir.display()
                );
                None
            }
        }
    } else {
        None
    };
    let (file_layer, guard) = match file {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    guard
}

async fn print_status(path: &str, cfg: &Config) {
    println!("habitbot — Status Check\n");
    println!("Config: {path}");
    println!("Name: {}", cfg.bot.name);
    println!("Data dir: {}", shellexpand(&cfg.bot.data_dir));
    println!("Database: {}", shellexpand(&cfg.store.db_path));
    if cfg.api.enabled {
        println!("API: http://{}:{}", cfg.api.host, cfg.api.port);
    } else {
        println!("API: disabled");
    }
    println!(
        "Dialog timeout: {}s, inbox {}",
        cfg.dialog.timeout_secs, cfg.dialog.inbox_capacity
    );
    println!();

    if let Err(e) = cfg.validate() {
        println!("  config: {e}");
        return;
    }
    println!("  config: ok");

    match TelegramClient::new(&cfg.telegram).get_me().await {
        Ok(me) => println!(
            "  telegram: authorized as @{}",
            me.username.as_deref().unwrap_or("?")
        ),
        Err(e) => println!("  telegram: {e}"),
    }
}
