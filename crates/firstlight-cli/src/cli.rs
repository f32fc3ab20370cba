use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for the `firstlight` binary.
#[derive(Debug, Parser)]
#[command(name = "firstlight", version, about = "Firstlight N1 pipeline (Fink → TNS)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the near-real-time daemon.
    Run(RunArgs),
    /// One pass over a directory of saved alert JSON files (no daemon).
    RunOnce(RunOnceArgs),
    /// TNS utilities.
    Tns {
        #[command(subcommand)]
        action: TnsCommands,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Stream topics to accept; the first is the fallback label for alerts
    /// that do not carry their own topic.
    #[arg(long, num_args = 1.., required = true)]
    pub topics: Vec<String>,

    /// SQLite path for the audit log.
    #[arg(long, default_value = "firstlight.sqlite")]
    pub db: String,

    /// TOML config path for thresholds and credentials.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory watched for decoded alert JSON files.
    #[arg(long, default_value = "spool")]
    pub spool: PathBuf,

    /// Do everything except TNS submission.
    #[arg(long)]
    pub dry_run: bool,

    /// Poll timeout in seconds.
    #[arg(long, default_value_t = 5)]
    pub poll_timeout: u64,
}

#[derive(Debug, Args)]
pub struct RunOnceArgs {
    /// Directory of saved alert JSON files.
    pub dir: PathBuf,

    /// TOML config path for thresholds.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Optionally record alerts and decisions into this audit database.
    #[arg(long)]
    pub db: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum TnsCommands {
    /// Probe TNS API endpoints and print what works.
    Probe,
    /// Report which TNS credentials are configured (masked).
    Envcheck {
        /// Also print the User-Agent bot marker.
        #[arg(long)]
        show_ua: bool,
    },
}
