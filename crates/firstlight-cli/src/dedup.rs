//! Two-layer duplicate suppression, keyed on object id.
//!
//! The registry tracks objects, not observations, so an object that already
//! generated a submission must never generate another — layer 1 reads the
//! durable audit log and holds across restarts. Layer 2 asks the reverse
//! resolver whether a counterpart registry entry already exists; how its
//! failures are treated is configuration, not code.
//!
//! Every outcome of both layers is recorded as a `check` action before any
//! submission decision is made.

use chrono::Utc;
use firstlight_core::entities::RegistryAction;
use firstlight_core::enums::{ActionKind, ActionOutcome, DedupPolicy};
use firstlight_store::{AuditStore, error::StoreError};
use firstlight_tns::ReverseResolver;

/// Where the dedup chain stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    /// A prior `submit` action exists in the audit log.
    AlreadySubmitted,
    /// The reverse resolver knows a registry counterpart (or failed under
    /// a fail-closed policy).
    RemoteMatch,
    /// Neither layer objects; submission may proceed.
    Clear,
}

/// Run both layers in order, recording each as a `check` action.
///
/// # Errors
///
/// Only storage failures propagate; resolver failures are folded into the
/// outcome according to `policy`.
pub async fn resolve<R: ReverseResolver>(
    store: &AuditStore,
    resolver: &R,
    policy: DedupPolicy,
    object_id: &str,
    candid: &str,
) -> Result<DedupOutcome, StoreError> {
    // Layer 1: local audit history.
    if store.has_submission(object_id).await? {
        record_check(
            store,
            object_id,
            candid,
            ActionOutcome::Skip,
            "already_submitted_in_audit_log",
        )
        .await?;
        return Ok(DedupOutcome::AlreadySubmitted);
    }
    record_check(
        store,
        object_id,
        candid,
        ActionOutcome::Ok,
        "no_prior_submission",
    )
    .await?;

    // Layer 2: remote reverse lookup.
    match resolver.reverse_lookup(object_id).await {
        Ok(Some(counterpart)) => {
            record_check(
                store,
                object_id,
                candid,
                ActionOutcome::Skip,
                &format!("resolver_found_tns={counterpart}"),
            )
            .await?;
            Ok(DedupOutcome::RemoteMatch)
        }
        Ok(None) => {
            record_check(store, object_id, candid, ActionOutcome::Ok, "resolver_no_match")
                .await?;
            Ok(DedupOutcome::Clear)
        }
        Err(e) => match policy {
            DedupPolicy::FailOpen => {
                tracing::warn!(object_id, error = %e, "resolver failed; continuing (fail-open)");
                record_check(
                    store,
                    object_id,
                    candid,
                    ActionOutcome::Ok,
                    &format!("resolver_error_fail_open: {e}"),
                )
                .await?;
                Ok(DedupOutcome::Clear)
            }
            DedupPolicy::FailClosed => {
                tracing::warn!(object_id, error = %e, "resolver failed; skipping (fail-closed)");
                record_check(
                    store,
                    object_id,
                    candid,
                    ActionOutcome::Skip,
                    &format!("resolver_error_fail_closed: {e}"),
                )
                .await?;
                Ok(DedupOutcome::RemoteMatch)
            }
        },
    }
}

async fn record_check(
    store: &AuditStore,
    object_id: &str,
    candid: &str,
    outcome: ActionOutcome,
    detail: &str,
) -> Result<(), StoreError> {
    store
        .record_registry_action(&RegistryAction {
            object_id: object_id.to_string(),
            candid: candid.to_string(),
            kind: ActionKind::Check,
            outcome,
            detail: detail.to_string(),
            at: Utc::now(),
        })
        .await
}
