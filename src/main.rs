//! Message Relay Bot - Main Entry Point
//!
//! A Telegram bot that relays text and media to arbitrary recipients
//! on command and schedules deferred message deliveries.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use message_relay_bot::bot::{self, BotIdentity};
use message_relay_bot::cache::LastMessageCache;
use message_relay_bot::commands::{CommandDispatcher, CommandRegistry, RelayContext};
use message_relay_bot::config::{BotConfig, RelaySettings};
use message_relay_bot::scheduler::{DeferredScheduler, SchedulerMessage};
use message_relay_bot::telegram::{TelegramSender, Transport};

/// Telegram bot for command-driven message relay and deferred delivery.
#[derive(Parser, Debug)]
#[command(name = "relay_bot")]
#[command(about = "Relay messages and media to Telegram users on command")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let config =
        BotConfig::from_env().context("Failed to load bot configuration from environment")?;

    let settings = RelaySettings::from_env_with_defaults();

    // Connect to Telegram
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());

    let me = bot
        .get_me()
        .await
        .context("Failed to authenticate with Telegram")?;

    let identity = BotIdentity {
        username: me.username().to_owned(),
    };

    info!("Authenticated as @{}", identity.username);

    let transport: Arc<dyn Transport> = Arc::new(TelegramSender::new(bot.clone()));

    // Create scheduler channel
    let (scheduler_tx, scheduler_rx) = mpsc::channel::<SchedulerMessage>(32);

    // Create scheduler
    let scheduler = DeferredScheduler::new(Arc::clone(&transport))
        .with_check_interval(settings.scheduler_tick());

    // Spawn scheduler task
    let scheduler_handle = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move {
            scheduler.run(scheduler_rx).await;
        })
    };

    let ctx = RelayContext {
        transport,
        scheduler,
        last_messages: LastMessageCache::default(),
    };

    let dispatcher = Arc::new(CommandDispatcher::new(
        CommandRegistry::with_default_commands(),
        ctx,
    ));

    info!("Starting relay bot (scheduler tick: {:?})", settings.scheduler_tick());

    // Blocks until the dispatcher stops (Ctrl-C)
    bot::run(bot, dispatcher, identity).await;

    // Cleanup
    info!("Shutting down...");
    let _ = scheduler_tx.send(SchedulerMessage::Shutdown).await;
    let _ = scheduler_handle.await;

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
