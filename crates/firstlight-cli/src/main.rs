use clap::Parser;

mod cli;
mod commands;
mod dedup;
mod runner;
mod source;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("firstlight error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    match &cli.command {
        cli::Commands::Run(args) => commands::run::handle(args).await,
        cli::Commands::RunOnce(args) => commands::run_once::handle(args).await,
        cli::Commands::Tns { action } => commands::tns::handle(action).await,
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("FIRSTLIGHT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
