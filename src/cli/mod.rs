//! CLI command definitions and handlers

use clap::{Parser, Subcommand, ValueEnum};

pub mod cache;
pub mod calendar;
pub mod clean;
pub mod context;
pub mod init;
pub mod log;
pub mod status;
pub mod sync;
pub mod watch;

pub use context::CommandContext;

/// Output format for list-style commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// rollcall - weekly schedule sync and check-in verification
#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "ROLLCALL_FORMAT",
        default_value = "table",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "ROLLCALL_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "ROLLCALL_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize rollcall configuration and credentials
    Init,

    /// Show configuration, credential, and cache status
    Status,

    /// Refresh the weekly schedule (cache-first) and regenerate timeslots
    Sync {
        /// Fetch even when the cache is still valid
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Regenerate the normalized timeslot map from the cached raw feed
    Clean {
        /// Fall back to the bundled sample dataset when no raw cache exists
        #[arg(long)]
        demo: bool,
    },

    /// Periodically verify check-ins for today's timeslots
    Watch {
        /// Seconds between verification passes
        #[arg(long, default_value_t = 300)]
        interval: u64,

        /// Run a single pass and exit
        #[arg(long)]
        once: bool,

        /// Raise desktop notifications instead of log-only alerts
        #[arg(long)]
        notify: bool,
    },

    /// Show the verification query log
    Log {
        /// Only show the most recent N records
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Manage the local feed cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Export timeslots to the calendar store
    #[command(subcommand)]
    Calendar(CalendarCommands),

    /// Display version information
    Version,
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show weekly cache status
    Status,
    /// Delete all cached feed data
    Clear,
    /// Print cache directory path
    Path,
}

/// Calendar subcommands
#[derive(Subcommand, Debug)]
pub enum CalendarCommands {
    /// Write cleaned timeslots into the calendar store
    Sync,
}
