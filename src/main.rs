// src/main.rs

//! bulletin: Jobs & News Channel Notifier CLI
//!
//! Polls the government-jobs listing and the news collection on a fixed
//! interval and posts anything not seen before to one Telegram channel.

mod error;
mod models;
mod pipeline;
mod services;
mod storage;
mod utils;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::models::{Config, Secrets};
use crate::pipeline::{TelegramDispatcher, run_pass, run_scheduler};
use crate::services::{ChannelClient, ContentSource, JobsSource, LinkShortener, NewsSource};
use crate::storage::LocalDedupStore;

#[derive(Parser, Debug)]
#[command(
    name = "bulletin",
    version = "0.1.0",
    about = "Jobs & News Channel Notifier"
)]

/// CLI Arguments
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

/// CLI Commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Run the polling loop until terminated
    Run,
    /// Run a single polling pass, then exit
    Once,
    /// Validate configuration and credentials without touching the network
    Validate,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    match cli.command {
        Command::Validate => {
            Secrets::from_env()?;
            log::info!("Configuration and credentials OK");
            Ok(())
        }
        Command::Once => {
            let app = App::build(&config).await?;
            let outcome = run_pass(&app.sources, &app.store, &app.dispatcher).await?;
            log::info!(
                "Pass complete: {} fetched, {} delivered, {} failed, {} already seen",
                outcome.fetched,
                outcome.delivered,
                outcome.failed,
                outcome.skipped_seen
            );
            Ok(())
        }
        Command::Run => {
            let app = App::build(&config).await?;
            tokio::select! {
                result = run_scheduler(
                    &config.scheduler,
                    &app.sources,
                    &app.store,
                    &app.dispatcher,
                    &app.channel,
                ) => result,
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Received shutdown signal, stopping.");
                    Ok(())
                }
            }
        }
    }
}

/// Wired-up application components.
struct App {
    sources: Vec<Box<dyn ContentSource>>,
    store: LocalDedupStore,
    dispatcher: TelegramDispatcher,
    channel: ChannelClient,
}

impl App {
    /// Build every component from configuration and environment secrets.
    async fn build(config: &Config) -> Result<Self> {
        let secrets = Secrets::from_env()?;
        let client = utils::create_async_client(&config.http)?;

        let channel = ChannelClient::new(client.clone(), &secrets.bot_token, &secrets.channel_id);
        let shortener = LinkShortener::new(
            &config.shortener,
            secrets.shortener_token.clone(),
            client.clone(),
        );
        let dispatcher = TelegramDispatcher::new(
            channel.clone(),
            shortener,
            client.clone(),
            config.news.referer.clone(),
        );
        let store = LocalDedupStore::open(&config.storage.seen_path).await?;

        // Jobs run to completion before news begins; order matters here.
        let sources: Vec<Box<dyn ContentSource>> = vec![
            Box::new(JobsSource::new(config.jobs.clone(), client.clone())),
            Box::new(NewsSource::new(config.news.clone(), client)),
        ];

        Ok(Self {
            sources,
            store,
            dispatcher,
            channel,
        })
    }
}
