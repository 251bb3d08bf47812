mod client;
mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use schooldesk_core::SessionManager;
use schooldesk_core::config::Settings;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schooldesk")]
#[command(about = "Browse the school calendar and manage your API session")]
struct Cli {
    /// Extra config file, applied on top of ~/.config/schooldesk/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password and print the bearer token
    Login {
        #[arg(short, long)]
        email: String,
    },
    /// Show the expanded schedule calendar
    Calendar {
        /// Read schedules from a JSON file instead of the API
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Bearer token for the API
        #[arg(long, env = "SCHOOLDESK_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Only show the events of this day (YYYY-MM-DD)
        #[arg(long)]
        day: Option<String>,

        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Show when a bearer token expires
    Token { token: String },
    /// Keep a session open until its token expires
    Watch {
        #[arg(long, env = "SCHOOLDESK_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Write a commented default config file
    Init {
        /// Where to write it (defaults to ~/.config/schooldesk/config.toml)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(&settings.logging.level);

    let session = SessionManager::default();

    match cli.command {
        Commands::Login { email } => commands::login::run(&settings, &session, &email).await,
        Commands::Calendar {
            file,
            token,
            day,
            json,
        } => {
            let args = commands::calendar::CalendarArgs {
                file,
                token,
                day,
                json,
            };
            commands::calendar::run(&settings, &session, args).await
        }
        Commands::Token { token } => commands::token::run(&session, token),
        Commands::Watch { token } => commands::watch::run(&settings, &session, token).await,
        Commands::Init { path } => commands::init::run(path),
    }
}

/// Logs go to stderr so `--json` output stays clean. `RUST_LOG` wins over the
/// configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
