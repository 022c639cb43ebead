//! Botnet Scan Client - Main Entry Point
//!
//! Uploads capture files to the analysis backend, follows the detection
//! phases and browses the scan history.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use botnet_scan_client::api;
use botnet_scan_client::constants;
use botnet_scan_client::logic::config::{DashboardConfig, PhaseReveal};
use botnet_scan_client::logic::history::VerdictFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the analysis backend
    #[arg(long, global = true, help = "Base URL of the analysis backend (env BOTNET_API_URL)")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, help = "Request timeout in seconds (env BOTNET_API_TIMEOUT_SECS)")]
    timeout: Option<u64>,

    /// Use canned demo data instead of the backend
    #[arg(long, global = true, help = "Use canned demo data instead of the backend")]
    mock: bool,

    /// How detection phases are revealed
    #[arg(long, global = true, value_enum, help = "How detection phases are revealed (env BOTNET_PHASE_REVEAL)")]
    reveal: Option<RevealMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a .csv or .json capture and show the verdict
    Analyze {
        file: PathBuf,

        /// Print the final session snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Resubmit the file up to N times after a failed run
        #[arg(long, default_value_t = 0)]
        retry: u32,
    },
    /// List past scans
    History {
        /// all, CLEAN, SUSPICIOUS or INFECTED
        #[arg(long, default_value = "all")]
        verdict: VerdictFilter,

        /// Only scans from this day (YYYY-MM-DD, local time)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Show every sub-report of row N (1-based) of the listed scans
        #[arg(long, value_name = "N")]
        details: Option<usize>,
    },
    /// Check that the backend answers
    Health,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RevealMode {
    Immediate,
    Staggered,
}

impl Cli {
    /// Environment defaults, overridden by flags
    fn config(&self) -> DashboardConfig {
        let mut config = DashboardConfig::default();

        if let Some(url) = &self.api_url {
            config.api.server_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = self.timeout.filter(|secs| *secs > 0) {
            config.api.timeout_seconds = secs;
        }
        if self.mock {
            config.use_mock = true;
        }
        match self.reveal {
            Some(RevealMode::Immediate) => config.reveal = PhaseReveal::Immediate,
            Some(RevealMode::Staggered) => config.reveal = PhaseReveal::staggered(),
            None => {}
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config();

    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    match cli.command {
        Command::Analyze { file, json, retry } => api::analyze(&config, &file, json, retry).await,
        Command::History { verdict, date, details } => api::history(&config, verdict, date, details).await,
        Command::Health => api::health(&config).await,
    }
}
