//! The `run-once` command: filter a directory of saved alert JSON files
//! and print PASS/FAIL per alert. Optionally records into an audit
//! database; never contacts the registry.

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use serde_json::Value;

use firstlight_config::FirstlightConfig;
use firstlight_core::entities::Decision;
use firstlight_pipeline::{evaluate, normalize};
use firstlight_store::AuditStore;

use crate::cli::RunOnceArgs;
use crate::source::{AlertSource, DirSource};

pub async fn handle(args: &RunOnceArgs) -> anyhow::Result<()> {
    let config = FirstlightConfig::load_with_dotenv(args.config.as_deref())
        .context("loading configuration")?;

    let store = match &args.db {
        Some(path) => Some(
            AuditStore::open_local(path)
                .await
                .with_context(|| format!("opening audit database {path}"))?,
        ),
        None => None,
    };

    let mut source = DirSource::one_shot(&args.dir, "unknown");
    while let Some((topic, raw)) = source.poll(Duration::ZERO).await? {
        let alert = match normalize(&raw, &topic) {
            Ok(alert) => alert,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed alert");
                continue;
            }
        };

        let verdict = evaluate(&alert, &config.n1);
        if let Some(store) = &store {
            store.record_alert(&alert, Utc::now()).await?;
            store
                .record_decision(&Decision {
                    object_id: alert.object_id.clone(),
                    candid: alert.candid.clone(),
                    topic: alert.topic.clone(),
                    passed: verdict.passed,
                    reason: verdict.reason,
                    metrics: Value::Object(verdict.metrics.clone()),
                    decided_at: Utc::now(),
                })
                .await?;
        }

        if verdict.passed {
            let metrics = Value::Object(verdict.metrics).to_string();
            println!("PASS {} {} {metrics}", alert.object_id, alert.candid);
        } else {
            println!("FAIL {} {} {}", alert.object_id, alert.candid, verdict.reason);
        }
    }

    Ok(())
}
