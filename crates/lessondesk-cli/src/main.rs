//! lessondesk - terminal admin console for the language-learning platform.
//!
//! Logs an admin in, then shows platform statistics, students, content and
//! subscriptions. Reads are cached on disk between runs; `--refresh`
//! bypasses the cache.

mod commands;
mod render;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lessondesk_core::models::SubscriptionFilters;
use lessondesk_core::Config;

#[derive(Debug, Parser)]
#[command(name = "lessondesk", version, about = "Admin console for the lessondesk backend")]
struct Cli {
    /// Ignore cached data and fetch fresh copies
    #[arg(long, global = true)]
    refresh: bool,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in with an admin phone number and password
    Login {
        /// Phone number, +998XXXXXXXXX (defaults to the last one used)
        #[arg(long)]
        phone: Option<String>,
    },
    /// Forget the saved session and cached data
    Logout,
    /// Show backend, cache and session status
    Status,
    /// Platform and revenue statistics
    Stats,
    /// List registered students
    Students {
        /// Filter by name or phone number
        #[arg(long)]
        search: Option<String>,
    },
    /// Top learners by points
    Leaderboard,
    /// Modules, lessons, quiz packs and grammar topics
    Content,
    /// Paid subscriptions
    Subscriptions {
        #[arg(long)]
        active_only: bool,
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Manage the local response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// Remove every cached response
    Clear,
    /// Remove cached responses whose key contains PATTERN
    Invalidate { pattern: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: bool) {
    // RUST_LOG controls the level unless --verbose forces debug
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    info!(backend = %config.base_url(), "lessondesk starting");

    let mut ctx = commands::open_session(&config)?;
    let refresh = cli.refresh;

    match cli.command {
        Command::Login { phone } => commands::login(&mut ctx, &mut config, phone).await?,
        Command::Logout => commands::logout(&mut ctx),
        Command::Status => commands::status(&mut ctx, &config).await?,
        Command::Stats => commands::stats(&mut ctx, refresh).await?,
        Command::Students { search } => {
            commands::students(&mut ctx, search.as_deref(), refresh).await?
        }
        Command::Leaderboard => commands::leaderboard(&mut ctx, refresh).await?,
        Command::Content => commands::content(&mut ctx, refresh).await?,
        Command::Subscriptions {
            active_only,
            skip,
            limit,
        } => {
            let filters = SubscriptionFilters {
                active_only,
                skip,
                limit,
            };
            commands::subscriptions(&mut ctx, filters).await?
        }
        Command::Cache { action } => match action {
            CacheAction::Clear => commands::cache_clear(&ctx),
            CacheAction::Invalidate { pattern } => commands::cache_invalidate(&ctx, &pattern),
        },
    }

    Ok(())
}
