//! CLI definitions using clap.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands;
use crate::config::{StoreSettings, DEFAULT_BIND_ADDR};
use crate::storage::{BackendKind, CorruptionPolicy};


/// Pomo Tracker - monthly Pomodoro session counts
#[derive(Parser)]
#[command(name = "pomo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Data file (default: ~/.pomo/pomo_data.json, or pomo_data.db for sqlite)
    #[arg(long, global = true, env = "POMO_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Storage backend
    #[arg(long, global = true, env = "POMO_BACKEND", value_enum, default_value_t = BackendKind::Json)]
    backend: BackendKind,

    /// What to do when the data file exists but cannot be read
    #[arg(long, global = true, env = "POMO_ON_CORRUPT", value_enum, default_value_t = CorruptionPolicy::Fail)]
    on_corrupt: CorruptionPolicy,

    #[command(subcommand)]
    command: Option<Commands>,
}


#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "POMO_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
        bind: SocketAddr,
    },

    /// Show the record for a month
    Get {
        /// Year (2020-2100)
        year: i64,

        /// Month (1-12)
        month: i64,
    },

    /// Replace the record for a month
    #[command(allow_negative_numbers = true)]
    Put {
        /// Year (2020-2100)
        year: i64,

        /// Month (1-12)
        month: i64,

        /// Pomodoros completed
        #[arg(long)]
        pomodoros: i64,

        /// Short breaks taken
        #[arg(long)]
        short_breaks: i64,

        /// Long breaks taken
        #[arg(long)]
        long_breaks: i64,
    },

    /// Add completed pomodoros (default: one, to the current month)
    Increment {
        /// Year (2020-2100)
        #[arg(requires = "month")]
        year: Option<i64>,

        /// Month (1-12)
        month: Option<i64>,

        /// How many pomodoros to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        count: i64,
    },

    /// Show totals and monthly breakdown
    Stats {
        /// Filter by year
        #[arg(short, long)]
        year: Option<i64>,

        /// Filter by month
        #[arg(short, long)]
        month: Option<i64>,
    },

    /// Delete the data file (a backup is kept)
    Remove {
        /// Force deletion without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Restore the data file from its backup
    Restore,
}


/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Some(Commands::Serve { .. }) => "pomo=info,tower_http=info",
        _ => "pomo=warn",
    };
    init_tracing(default_filter);

    let settings = StoreSettings::new(cli.backend, cli.data_file, cli.on_corrupt);

    match cli.command {
        Some(Commands::Serve { bind }) => commands::serve::run(&settings, bind)?,
        Some(Commands::Get { year, month }) => commands::record::get(&settings, year, month)?,
        Some(Commands::Put { year, month, pomodoros, short_breaks, long_breaks }) => {
            commands::record::put(&settings, year, month, pomodoros, short_breaks, long_breaks)?
        }
        Some(Commands::Increment { year, month, count }) => {
            commands::record::increment(&settings, year.zip(month), count)?
        }
        Some(Commands::Stats { year, month }) => commands::stats::run(&settings, year, month)?,
        Some(Commands::Remove { force }) => commands::remove::run(&settings, force)?,
        Some(Commands::Restore) => commands::restore::run(&settings)?,
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}


/// Log to stderr so command output on stdout stays clean. `RUST_LOG` wins
/// over `default_filter`.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
