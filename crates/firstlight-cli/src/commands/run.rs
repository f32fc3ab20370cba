//! The `run` command: the near-real-time daemon loop.

use std::time::Duration;

use anyhow::Context;

use firstlight_config::FirstlightConfig;
use firstlight_pipeline::NullStampAnalyzer;
use firstlight_store::AuditStore;
use firstlight_tns::{FinkResolver, TnsClient};

use crate::cli::RunArgs;
use crate::runner::Runner;
use crate::source::DirSource;

pub async fn handle(args: &RunArgs) -> anyhow::Result<()> {
    let config = FirstlightConfig::load_with_dotenv(args.config.as_deref())
        .context("loading configuration")?;

    let store = AuditStore::open_local(&args.db)
        .await
        .with_context(|| format!("opening audit database {}", args.db))?;

    let tns = TnsClient::new(config.tns.clone());
    let resolver = FinkResolver::new(config.dedup.resolver_url.clone());

    let fallback_topic = args
        .topics
        .first()
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());
    let source = DirSource::watching(&args.spool, fallback_topic);

    tracing::info!(
        topics = ?args.topics,
        dry_run = args.dry_run,
        db = %args.db,
        spool = %args.spool.display(),
        "started"
    );

    let mut runner = Runner::new(
        source,
        store,
        tns,
        resolver,
        NullStampAnalyzer,
        config,
        args.dry_run,
        Duration::from_secs(args.poll_timeout),
    );
    runner.run().await
}
