use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;

use kinogate::cli::{Cli, Commands};
use kinogate::core::{init_logger, web_server, AppConfig};
use kinogate::gate::GateFlow;
use kinogate::storage::RecordStore;
use kinogate::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TelegramMessenger};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenvy::dotenv();

    let config = AppConfig::load(&cli.config)?;

    // Initialize logger (console + file)
    init_logger(&config.log_file_path)?;

    // Log panics in handlers instead of losing them to stderr only
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {}", panic_info);
    }));

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(config).await,
        Commands::CheckConfig => {
            config.log_summary();
            log::info!("✅ Configuration is valid");
            Ok(())
        }
    }
}

/// Start the liveness server and poll Telegram until Ctrl+C
async fn run_bot(config: AppConfig) -> Result<()> {
    config.log_summary();

    let bot = create_bot(&config)?;

    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = web_server::start_web_server(port).await {
            log::error!("Liveness server stopped: {}", e);
        }
    });

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let store = Arc::new(RecordStore::new(&config.store_path));
    let flow = Arc::new(GateFlow::from_config(messenger, store, &config));
    let handler = schema(HandlerDeps::new(flow));

    log::info!("Start polling...");
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Bot stopped");
    Ok(())
}
