//! Append and read operations for the three audit tables.

use chrono::{DateTime, Utc};
use firstlight_core::entities::{Decision, NormalizedAlert, RegistryAction};

use crate::AuditStore;
use crate::error::StoreError;
use crate::helpers::{parse_datetime, parse_enum, parse_json};

impl AuditStore {
    /// Append a received alert with its full raw payload.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the INSERT fails.
    pub async fn record_alert(
        &self,
        alert: &NormalizedAlert,
        received: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&alert.raw)
            .map_err(|e| StoreError::Query(format!("payload serialization: {e}")))?;
        self.conn()
            .execute(
                "INSERT INTO alerts (object_id, candid, topic, emitted_jd, received_utc, payload_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    alert.object_id.as_str(),
                    alert.candid.as_str(),
                    alert.topic.as_str(),
                    alert.jd,
                    received.to_rfc3339(),
                    payload
                ],
            )
            .await?;
        Ok(())
    }

    /// Append a filter decision. Written for every alert, pass or fail.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the INSERT fails.
    pub async fn record_decision(&self, decision: &Decision) -> Result<(), StoreError> {
        let metrics = serde_json::to_string(&decision.metrics)
            .map_err(|e| StoreError::Query(format!("metrics serialization: {e}")))?;
        self.conn()
            .execute(
                "INSERT INTO decisions (object_id, candid, topic, decided_utc, passed, reason, metrics_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    decision.object_id.as_str(),
                    decision.candid.as_str(),
                    decision.topic.as_str(),
                    decision.decided_at.to_rfc3339(),
                    i64::from(decision.passed),
                    decision.reason.as_str(),
                    metrics
                ],
            )
            .await?;
        Ok(())
    }

    /// Append a registry action (`check` or `submit`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the INSERT fails.
    pub async fn record_registry_action(&self, action: &RegistryAction) -> Result<(), StoreError> {
        self.conn()
            .execute(
                "INSERT INTO registry_actions (object_id, candid, action_utc, action, outcome, detail)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    action.object_id.as_str(),
                    action.candid.as_str(),
                    action.at.to_rfc3339(),
                    action.kind.as_str(),
                    action.outcome.as_str(),
                    action.detail.as_str()
                ],
            )
            .await?;
        Ok(())
    }

    /// Whether a `submit` action was ever recorded for this object id.
    ///
    /// This is the duplicate resolver's local layer: once true, it stays
    /// true across process restarts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub async fn has_submission(&self, object_id: &str) -> Result<bool, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT 1 FROM registry_actions WHERE object_id = ?1 AND action = 'submit' LIMIT 1",
                [object_id],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// Most recent decisions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or a row is corrupt.
    pub async fn recent_decisions(&self, limit: u32) -> Result<Vec<Decision>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT object_id, candid, topic, decided_utc, passed, reason, metrics_json
                 FROM decisions ORDER BY id DESC LIMIT ?1",
                [i64::from(limit)],
            )
            .await?;

        let mut decisions = Vec::new();
        while let Some(row) = rows.next().await? {
            decisions.push(Decision {
                object_id: row.get::<String>(0)?,
                candid: row.get::<String>(1)?,
                topic: row.get::<String>(2)?,
                decided_at: parse_datetime(&row.get::<String>(3)?)?,
                passed: row.get::<i64>(4)? != 0,
                reason: parse_enum(&row.get::<String>(5)?)?,
                metrics: parse_json(&row.get::<String>(6)?)?,
            });
        }
        Ok(decisions)
    }

    /// All registry actions for one object id, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or a row is corrupt.
    pub async fn actions_for_object(
        &self,
        object_id: &str,
    ) -> Result<Vec<RegistryAction>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT object_id, candid, action_utc, action, outcome, detail
                 FROM registry_actions WHERE object_id = ?1 ORDER BY id ASC",
                [object_id],
            )
            .await?;

        let mut actions = Vec::new();
        while let Some(row) = rows.next().await? {
            actions.push(RegistryAction {
                object_id: row.get::<String>(0)?,
                candid: row.get::<String>(1)?,
                at: parse_datetime(&row.get::<String>(2)?)?,
                kind: parse_enum(&row.get::<String>(3)?)?,
                outcome: parse_enum(&row.get::<String>(4)?)?,
                detail: row.get::<String>(5)?,
            });
        }
        Ok(actions)
    }
}
