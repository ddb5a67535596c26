//! rollcall - weekly schedule sync and check-in verification CLI

use clap::Parser;

mod auth;
mod cache;
mod calendar;
mod cli;
mod client;
mod config;
mod error;
mod notify;
mod output;
mod schedule;
mod watch;

use cli::{CacheCommands, CalendarCommands, Cli, Commands, CommandContext};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match cli.command {
        Commands::Init => cli::init::run(cli.config.as_deref()),
        Commands::Version => {
            println!("rollcall version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Cache(CacheCommands::Path) => cli::cache::path(),
        command => {
            let ctx = CommandContext::new(cli.format, cli.config.as_deref())?;
            match command {
                Commands::Status => cli::status::run(&ctx, cli.config.as_deref()),
                Commands::Sync { force } => cli::sync::run(&ctx, force).await,
                Commands::Clean { demo } => cli::clean::run(&ctx, demo),
                Commands::Watch {
                    interval,
                    once,
                    notify,
                } => cli::watch::run(&ctx, interval, once, notify).await,
                Commands::Log { limit } => cli::log::run(&ctx, limit),
                Commands::Cache(CacheCommands::Status) => cli::cache::status(&ctx),
                Commands::Cache(CacheCommands::Clear) => cli::cache::clear(&ctx),
                Commands::Calendar(CalendarCommands::Sync) => cli::calendar::sync(&ctx),
                Commands::Init | Commands::Version | Commands::Cache(CacheCommands::Path) => {
                    unreachable!("handled above")
                }
            }
        }
    }
}
