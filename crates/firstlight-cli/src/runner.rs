//! The orchestrator: drives one alert at a time through normalize → filter
//! → audit → dedup → submit.
//!
//! Alerts are pulled and fully processed to completion before the next
//! poll. Because submission for an object is checked and recorded before
//! the next alert is touched, no duplicate-submission race exists within a
//! process; across processes the audit store's commit semantics serialize
//! the check-then-log sequence.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use firstlight_config::FirstlightConfig;
use firstlight_core::entities::{Decision, RegistryAction};
use firstlight_core::enums::{ActionKind, ActionOutcome, ReasonCode};
use firstlight_pipeline::stamp;
use firstlight_pipeline::{StampAnalyzer, evaluate, normalize};
use firstlight_store::{AuditStore, error::StoreError};
use firstlight_tns::{AtReport, ReverseResolver, TnsClient};

use crate::dedup::{self, DedupOutcome};
use crate::source::AlertSource;

/// Terminal state of one alert's trip through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Normalization failed; the alert was skipped and logged.
    Malformed,
    /// The gate chain rejected the alert.
    Rejected(ReasonCode),
    /// The local dedup layer found a prior submission.
    DupLocal,
    /// The remote dedup layer found (or fail-closed into) a counterpart.
    DupRemote,
    /// Submission skipped: dry-run mode.
    SkippedDryRun,
    /// Submission skipped: credentials missing or startup probe failed.
    SkippedNoEndpoint,
    /// Report accepted by the registry.
    Submitted,
    /// Submission attempted and failed; recorded, not retried.
    SubmitFailed,
}

pub struct Runner<S, R, A> {
    source: S,
    store: AuditStore,
    tns: TnsClient,
    resolver: R,
    stamps: A,
    config: FirstlightConfig,
    dry_run: bool,
    poll_timeout: Duration,
    submit_url: Option<String>,
}

impl<S: AlertSource, R: ReverseResolver, A: StampAnalyzer> Runner<S, R, A> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: S,
        store: AuditStore,
        tns: TnsClient,
        resolver: R,
        stamps: A,
        config: FirstlightConfig,
        dry_run: bool,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            source,
            store,
            tns,
            resolver,
            stamps,
            config,
            dry_run,
            poll_timeout,
            submit_url: None,
        }
    }

    /// Probe endpoints once and cache the submit URL for the process
    /// lifetime. Never crashes: a failed probe downgrades submissions to
    /// logged-but-skipped.
    pub async fn startup_probe(&mut self) {
        if self.dry_run {
            tracing::info!("dry-run: skipping TNS endpoint probe");
            return;
        }
        if !self.tns.is_enabled() {
            tracing::warn!("TNS disabled (missing credentials); submissions will be skipped");
            return;
        }
        match self.tns.probe_endpoints().await {
            Ok(report) => {
                if let Some(url) = report.submit_url {
                    tracing::info!(%url, "TNS endpoint OK");
                    self.submit_url = Some(url);
                } else {
                    tracing::error!(
                        notes = ?report.notes,
                        "TNS endpoint probe failed; will NOT submit (effectively dry-run)"
                    );
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "TNS probe error; will NOT submit");
            }
        }
    }

    /// The daemon loop. Returns only on a storage failure, which is fatal;
    /// restart recovers idempotently from the audit log.
    ///
    /// # Errors
    ///
    /// Propagates storage failures and source errors.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.startup_probe().await;
        loop {
            let Some((topic, raw)) = self.source.poll(self.poll_timeout).await? else {
                continue;
            };
            self.process_one(&topic, &raw).await?;
        }
    }

    /// Drive a single alert through the full state machine.
    ///
    /// # Errors
    ///
    /// Only storage failures propagate; everything else becomes a logged
    /// terminal outcome.
    pub async fn process_one(
        &mut self,
        topic: &str,
        raw: &Value,
    ) -> Result<ProcessOutcome, StoreError> {
        let received = Utc::now();

        let alert = match normalize(raw, topic) {
            Ok(alert) => alert,
            Err(e) => {
                tracing::warn!(topic, error = %e, "skipping malformed alert");
                return Ok(ProcessOutcome::Malformed);
            }
        };

        let mut verdict = evaluate(&alert, &self.config.n1);
        match self.stamps.metrics(raw) {
            Ok(metrics) => stamp::merge_into(&mut verdict.metrics, &metrics),
            Err(e) => {
                tracing::debug!(object_id = %alert.object_id, error = %e, "no stamp metrics");
            }
        }

        self.store.record_alert(&alert, received).await?;
        self.store
            .record_decision(&Decision {
                object_id: alert.object_id.clone(),
                candid: alert.candid.clone(),
                topic: alert.topic.clone(),
                passed: verdict.passed,
                reason: verdict.reason,
                metrics: Value::Object(verdict.metrics),
                decided_at: Utc::now(),
            })
            .await?;

        if !verdict.passed {
            tracing::debug!(
                object_id = %alert.object_id,
                reason = %verdict.reason,
                "alert rejected"
            );
            return Ok(ProcessOutcome::Rejected(verdict.reason));
        }

        match dedup::resolve(
            &self.store,
            &self.resolver,
            self.config.dedup.policy,
            &alert.object_id,
            &alert.candid,
        )
        .await?
        {
            DedupOutcome::AlreadySubmitted => {
                tracing::info!(object_id = %alert.object_id, "duplicate: already submitted");
                return Ok(ProcessOutcome::DupLocal);
            }
            DedupOutcome::RemoteMatch => {
                tracing::info!(object_id = %alert.object_id, "duplicate: registry counterpart exists");
                return Ok(ProcessOutcome::DupRemote);
            }
            DedupOutcome::Clear => {}
        }

        if self.dry_run || self.submit_url.is_none() {
            let (detail, outcome) = if self.dry_run {
                ("dry_run", ProcessOutcome::SkippedDryRun)
            } else if self.tns.is_enabled() {
                ("tns_endpoint_unknown_probe_failed", ProcessOutcome::SkippedNoEndpoint)
            } else {
                ("tns_disabled_missing_credentials", ProcessOutcome::SkippedNoEndpoint)
            };
            self.record_submit(&alert.object_id, &alert.candid, ActionOutcome::Skip, detail)
                .await?;
            tracing::info!(
                object_id = %alert.object_id,
                candid = %alert.candid,
                mag = alert.mag,
                jd = alert.jd,
                "CANDIDATE PASS (not submitted)"
            );
            return Ok(outcome);
        }

        let fallback = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let report = AtReport::from_alert(&alert, self.tns.config(), "Fink/ZTF", &fallback);
        match self
            .tns
            .submit_at_report(&report, self.submit_url.as_deref())
            .await
        {
            Ok(detail) => {
                self.record_submit(
                    &alert.object_id,
                    &alert.candid,
                    ActionOutcome::Ok,
                    &detail.to_string(),
                )
                .await?;
                tracing::info!(object_id = %alert.object_id, candid = %alert.candid, "SUBMITTED");
                Ok(ProcessOutcome::Submitted)
            }
            Err(e) => {
                self.record_submit(
                    &alert.object_id,
                    &alert.candid,
                    ActionOutcome::Error,
                    &e.to_string(),
                )
                .await?;
                tracing::error!(object_id = %alert.object_id, error = %e, "SUBMIT FAILED");
                Ok(ProcessOutcome::SubmitFailed)
            }
        }
    }

    async fn record_submit(
        &self,
        object_id: &str,
        candid: &str,
        outcome: ActionOutcome,
        detail: &str,
    ) -> Result<(), StoreError> {
        self.store
            .record_registry_action(&RegistryAction {
                object_id: object_id.to_string(),
                candid: candid.to_string(),
                kind: ActionKind::Submit,
                outcome,
                detail: detail.to_string(),
                at: Utc::now(),
            })
            .await
    }

    #[cfg(test)]
    pub const fn store(&self) -> &AuditStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firstlight_config::TnsConfig;
    use firstlight_core::enums::DedupPolicy;
    use firstlight_pipeline::{NullStampAnalyzer, StampError};
    use firstlight_tns::RegistryError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Source that never yields; the runner tests drive `process_one`
    /// directly.
    struct EmptySource;

    impl AlertSource for EmptySource {
        async fn poll(&mut self, _timeout: Duration) -> anyhow::Result<Option<(String, Value)>> {
            Ok(None)
        }
    }

    /// Scripted resolver covering all three remote-layer branches.
    enum FakeResolver {
        NoMatch,
        Match(Value),
        Broken,
    }

    impl ReverseResolver for FakeResolver {
        async fn reverse_lookup(&self, _object_id: &str) -> Result<Option<Value>, RegistryError> {
            match self {
                Self::NoMatch => Ok(None),
                Self::Match(v) => Ok(Some(v.clone())),
                Self::Broken => Err(RegistryError::Exhausted {
                    last: "connection refused".into(),
                }),
            }
        }
    }

    fn passing_raw(object_id: &str) -> Value {
        json!({
            "objectId": object_id,
            "candidate": {
                "candid": 1_640_000_001_i64,
                "jd": 2_459_000.6,
                "ra": 12.3,
                "dec": -5.0,
                "fid": 1,
                "magpsf": 18.0,
                "sigmapsf": 0.07,
                "diffmaglim": 20.3,
                "drb": 0.95,
                "isdiffpos": "t",
                "distpsnr1": -999.0,
                "srmag1": -999.0,
                "nmtchps": 2,
                "ndethist": 1
            },
            "prv_candidates": [
                { "jd": 2_459_000.1, "diffmaglim": 20.0 }
            ]
        })
    }

    async fn test_runner(
        resolver: FakeResolver,
        policy: DedupPolicy,
    ) -> Runner<EmptySource, FakeResolver, NullStampAnalyzer> {
        let store = AuditStore::open_local(":memory:").await.unwrap();
        let config = FirstlightConfig {
            dedup: firstlight_config::DedupConfig {
                policy,
                ..Default::default()
            },
            ..Default::default()
        };
        Runner::new(
            EmptySource,
            store,
            TnsClient::new(TnsConfig::default()),
            resolver,
            NullStampAnalyzer,
            config,
            true, // dry-run: no network
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn passing_alert_lands_as_dry_run_skip() {
        let mut runner = test_runner(FakeResolver::NoMatch, DedupPolicy::FailOpen).await;
        let outcome = runner
            .process_one("fink_hostless", &passing_raw("ZTF21abc"))
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::SkippedDryRun);

        let decisions = runner.store().recent_decisions(10).await.unwrap();
        assert_eq!(decisions.len(), 1);
        assert!(decisions[0].passed);
        assert_eq!(decisions[0].reason, ReasonCode::Pass);

        let actions = runner.store().actions_for_object("ZTF21abc").await.unwrap();
        let summary: Vec<(ActionKind, ActionOutcome, &str)> = actions
            .iter()
            .map(|a| (a.kind, a.outcome, a.detail.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ActionKind::Check, ActionOutcome::Ok, "no_prior_submission"),
                (ActionKind::Check, ActionOutcome::Ok, "resolver_no_match"),
                (ActionKind::Submit, ActionOutcome::Skip, "dry_run"),
            ]
        );
    }

    #[tokio::test]
    async fn second_alert_for_same_object_short_circuits_locally() {
        let mut runner = test_runner(FakeResolver::NoMatch, DedupPolicy::FailOpen).await;
        let first = runner
            .process_one("t", &passing_raw("ZTF21abc"))
            .await
            .unwrap();
        assert_eq!(first, ProcessOutcome::SkippedDryRun);

        // Same object id again: the dry-run submit marker blocks it.
        let second = runner
            .process_one("t", &passing_raw("ZTF21abc"))
            .await
            .unwrap();
        assert_eq!(second, ProcessOutcome::DupLocal);

        // A different object is unaffected.
        let other = runner
            .process_one("t", &passing_raw("ZTF21xyz"))
            .await
            .unwrap();
        assert_eq!(other, ProcessOutcome::SkippedDryRun);
    }

    #[tokio::test]
    async fn remote_counterpart_blocks_submission() {
        let mut runner = test_runner(
            FakeResolver::Match(json!([{"d:tns": "SN 2021abc"}])),
            DedupPolicy::FailOpen,
        )
        .await;
        let outcome = runner
            .process_one("t", &passing_raw("ZTF21abc"))
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::DupRemote);

        let actions = runner.store().actions_for_object("ZTF21abc").await.unwrap();
        assert!(actions.iter().any(|a| {
            a.kind == ActionKind::Check
                && a.outcome == ActionOutcome::Skip
                && a.detail.contains("resolver_found_tns=")
        }));
        // No submit action of any outcome.
        assert!(actions.iter().all(|a| a.kind != ActionKind::Submit));
    }

    #[tokio::test]
    async fn resolver_failure_fail_open_continues() {
        let mut runner = test_runner(FakeResolver::Broken, DedupPolicy::FailOpen).await;
        let outcome = runner
            .process_one("t", &passing_raw("ZTF21abc"))
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::SkippedDryRun);
    }

    #[tokio::test]
    async fn resolver_failure_fail_closed_skips() {
        let mut runner = test_runner(FakeResolver::Broken, DedupPolicy::FailClosed).await;
        let outcome = runner
            .process_one("t", &passing_raw("ZTF21abc"))
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::DupRemote);

        let actions = runner.store().actions_for_object("ZTF21abc").await.unwrap();
        assert!(actions.iter().any(|a| a.detail.contains("resolver_error_fail_closed")));
    }

    #[tokio::test]
    async fn rejected_alert_stops_before_dedup() {
        let mut runner = test_runner(FakeResolver::NoMatch, DedupPolicy::FailOpen).await;
        let mut raw = passing_raw("ZTF21abc");
        raw["candidate"]["drb"] = json!(0.2);

        let outcome = runner.process_one("t", &raw).await.unwrap();
        assert_eq!(outcome, ProcessOutcome::Rejected(ReasonCode::RbFail));

        let decisions = runner.store().recent_decisions(10).await.unwrap();
        assert_eq!(decisions.len(), 1);
        assert!(!decisions[0].passed);
        assert_eq!(decisions[0].reason, ReasonCode::RbFail);

        // Failing alerts never touch the registry action log.
        let actions = runner.store().actions_for_object("ZTF21abc").await.unwrap();
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn malformed_alert_is_skipped_without_rows() {
        let mut runner = test_runner(FakeResolver::NoMatch, DedupPolicy::FailOpen).await;
        let outcome = runner
            .process_one("t", &json!({"not_an_alert": true}))
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::Malformed);
        assert!(runner.store().recent_decisions(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stamp_failure_does_not_drop_metrics() {
        /// Analyzer that always fails, like a corrupt cutout.
        struct BrokenStamps;
        impl StampAnalyzer for BrokenStamps {
            fn metrics(
                &self,
                _alert: &Value,
            ) -> Result<firstlight_core::entities::StampMetrics, StampError> {
                Err(StampError::Decode("truncated gzip stream".into()))
            }
        }

        let store = AuditStore::open_local(":memory:").await.unwrap();
        let mut runner = Runner::new(
            EmptySource,
            store,
            TnsClient::new(TnsConfig::default()),
            FakeResolver::NoMatch,
            BrokenStamps,
            FirstlightConfig::default(),
            true,
            Duration::from_secs(1),
        );

        let outcome = runner
            .process_one("t", &passing_raw("ZTF21abc"))
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::SkippedDryRun);

        let decisions = runner.store().recent_decisions(10).await.unwrap();
        // Filter metrics are present, stamp keys simply absent.
        assert!(decisions[0].metrics.get("days_since_nondet").is_some());
        assert!(decisions[0].metrics.get("stamp_peak").is_none());
    }
}
