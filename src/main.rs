//! # Community Guide CLI (`cguide`)
//!
//! ## Usage
//!
//! ```bash
//! cguide --config ./config/cguide.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cguide init` | Create the SQLite database and run schema migrations |
//! | `cguide seed` | Load the sample Richmond community (or `--file data.json`) |
//! | `cguide clear` | Delete every record |
//! | `cguide ask "<question>"` | Route a question and print the results as JSON |
//! | `cguide ask "<question>" --context '<json>'` | Full answer, as `POST /ask` returns it |
//! | `cguide summary` | Print the community summary as JSON |
//! | `cguide health` | Store and model health, as `GET /health` reports it |
//! | `cguide stats` | Record counts per kind |
//! | `cguide serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! cguide init
//! cguide seed --clear
//! cguide ask "When is the next Python meetup?"
//! cguide ask "Any AWS events?" --context '{"user": "new to town"}'
//! cguide health
//! RUST_LOG=debug cguide serve --json-logs
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use community_guide::{ask, config, migrate, seed, server, stats};

/// Community Guide: answers questions about a local tech community from a
/// partitioned key-value store.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/cguide.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "cguide",
    about = "Community Guide: tech meetups, events, venues and companies for one city",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/cguide.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Idempotent.
    Init,

    /// Load community data.
    ///
    /// Without `--file`, loads the built-in sample community with events
    /// scheduled relative to today.
    Seed {
        /// JSON file with `venues`, `companies`, `meetups` and `events` arrays.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Delete existing records before loading.
        #[arg(long)]
        clear: bool,
    },

    /// Delete every record.
    Clear,

    /// Ask a natural-language question and print the routed results.
    Ask {
        /// The question, e.g. "What's the next Python meetup?".
        query: String,

        /// Caller context as JSON. When given, the answer is phrased by the
        /// configured model exactly as `POST /ask` would.
        #[arg(long)]
        context: Option<String>,
    },

    /// Print the tech community summary.
    Summary,

    /// Show record counts per kind.
    Stats,

    /// Check the store and the model. Exits non-zero when unhealthy.
    Health,

    /// Start the HTTP server (`POST /ask`, `GET /health`).
    Serve,
}

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Seed { file, clear } => {
            seed::run_seed(&cfg, file.as_deref(), clear).await?;
        }
        Commands::Clear => {
            seed::run_clear(&cfg).await?;
        }
        Commands::Ask { query, context } => {
            ask::run_ask(&cfg, &query, context.as_deref()).await?;
        }
        Commands::Summary => {
            ask::run_summary(&cfg).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Health => {
            ask::run_health(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
