//! Admin dashboard service.
//!
//! Each call is an explicit fetch → triage → report pass against the store.
//! The caller decides when to refresh; nothing is cached between calls.

use crate::store::{RequestStore, StoreError};
use crate::triage::{
    select_most_recent, totals_by_category, triage, CategoryTotals, LatestRequest, Region,
    TriagePartition, UrgencyRules,
};
use chrono::{DateTime, Utc};
use ct_common::{ConsultationRequest, RequestId, RequestStatus, SCHEMA_VERSION};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

/// Phrase an operator must type to delete every request.
pub const PURGE_CONFIRMATION: &str = "Delete All";

/// Errors from dashboard actions.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("confirmation text does not match, deletion cancelled")]
    ConfirmationMismatch,
}

impl From<DashboardError> for ct_common::Error {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Store(store) => store.into(),
            DashboardError::ConfirmationMismatch => ct_common::Error::ConfirmationMismatch {
                expected: PURGE_CONFIRMATION.to_string(),
            },
        }
    }
}

/// Everything the dashboard renders after one triage pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub total_requests: usize,
    pub totals: CategoryTotals,
    pub region_totals: BTreeMap<Region, usize>,
    pub latest: Option<LatestRequest>,
    pub partition: TriagePartition,
}

impl DashboardReport {
    /// Triage an already fetched collection.
    pub fn build(rules: &UrgencyRules, requests: &[ConsultationRequest], now: DateTime<Utc>) -> Self {
        let partition = triage(rules, requests, now);
        let totals = totals_by_category(rules, requests, now);
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: now,
            total_requests: requests.len(),
            totals,
            region_totals: partition.region_totals(),
            latest: select_most_recent(rules, requests, now),
            partition,
        }
    }

    pub fn has_overdue(&self) -> bool {
        self.totals.overdue > 0
    }
}

/// Whether a purge actually deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgeMode {
    /// Report what would be deleted; leave the store alone.
    DryRun,
    Execute,
}

/// Result of a purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurgeOutcome {
    pub mode: PurgeMode,
    /// Requests deleted, or that would be deleted in a dry run.
    pub deleted: u32,
}

/// Dashboard operations over a request store.
#[derive(Debug)]
pub struct Dashboard<S> {
    store: S,
    rules: UrgencyRules,
}

impl<S: RequestStore> Dashboard<S> {
    pub fn new(store: S, rules: UrgencyRules) -> Self {
        Self { store, rules }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &UrgencyRules {
        &self.rules
    }

    /// Fetch and triage every request as of `now`.
    pub fn load(&self, now: DateTime<Utc>) -> Result<DashboardReport, StoreError> {
        let requests = self.store.fetch_all()?;
        Ok(DashboardReport::build(&self.rules, &requests, now))
    }

    /// Change a request's status, then re-fetch and re-triage.
    pub fn set_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> Result<DashboardReport, StoreError> {
        if let Err(err) = self.store.update_status(id, status) {
            warn!(%id, error = %err, "failed to update request");
            return Err(err);
        }
        info!(%id, %status, "operator updated request");
        self.load(now)
    }

    pub fn resolve(&self, id: &RequestId, now: DateTime<Utc>) -> Result<DashboardReport, StoreError> {
        self.set_status(id, RequestStatus::Resolved, now)
    }

    pub fn reopen(&self, id: &RequestId, now: DateTime<Utc>) -> Result<DashboardReport, StoreError> {
        self.set_status(id, RequestStatus::Pending, now)
    }

    /// Delete every request once the operator typed [`PURGE_CONFIRMATION`].
    pub fn purge(&self, confirmation: &str, mode: PurgeMode) -> Result<PurgeOutcome, DashboardError> {
        if confirmation != PURGE_CONFIRMATION {
            return Err(DashboardError::ConfirmationMismatch);
        }

        let deleted = match mode {
            PurgeMode::DryRun => {
                let count = self.store.fetch_all()?.len();
                info!(count, "dry run: requests that would be deleted");
                u32::try_from(count).unwrap_or(u32::MAX)
            }
            PurgeMode::Execute => self.store.delete_all()?,
        };

        Ok(PurgeOutcome { mode, deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRequestStore;
    use crate::triage::UrgencyCategory;
    use chrono::{Duration, TimeZone};
    use ct_common::{CreatedAt, Location};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap()
    }

    fn seeded() -> Dashboard<MemoryRequestStore> {
        let t = now();
        let requests = vec![
            ConsultationRequest::new("fresh", RequestStatus::Pending, Some(CreatedAt::deferred(t)))
                .with_location(Location::with_state("", "NY")),
            ConsultationRequest::new(
                "stale",
                RequestStatus::Pending,
                Some((t - Duration::days(21)).into()),
            )
            .with_location(Location::with_state("", "TX")),
            ConsultationRequest::new(
                "done",
                RequestStatus::Resolved,
                Some((t - Duration::days(40)).into()),
            ),
        ];
        Dashboard::new(
            MemoryRequestStore::with_requests(requests),
            UrgencyRules::default(),
        )
    }

    #[test]
    fn test_load_builds_full_report() {
        let report = seeded().load(now()).unwrap();
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.total_requests, 3);
        assert_eq!(report.totals.new, 1);
        assert_eq!(report.totals.overdue, 1);
        assert_eq!(report.totals.resolved, 1);
        assert_eq!(report.totals, report.partition.totals());
        assert_eq!(report.region_totals[&Region::Unknown], 1);
        assert!(report.has_overdue());
        let latest = report.latest.unwrap();
        assert_eq!(latest.request.id.as_str(), "fresh");
        assert_eq!(latest.urgency, UrgencyCategory::New);
    }

    #[test]
    fn test_resolve_retriages() {
        let dashboard = seeded();
        let report = dashboard.resolve(&RequestId::from("stale"), now()).unwrap();
        assert!(!report.has_overdue());
        assert_eq!(report.totals.resolved, 2);
        let resolved = report.partition.bucket(Region::South, UrgencyCategory::Resolved);
        assert_eq!(resolved[0].request.id.as_str(), "stale");
    }

    #[test]
    fn test_reopen_returns_to_sla_bucket() {
        let dashboard = seeded();
        let report = dashboard.reopen(&RequestId::from("done"), now()).unwrap();
        assert_eq!(report.totals.resolved, 0);
        assert_eq!(report.totals.overdue, 2);
    }

    #[test]
    fn test_status_failure_propagates() {
        let dashboard = seeded();
        let err = dashboard.resolve(&RequestId::from("ghost"), now()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let dashboard = Dashboard::new(
            MemoryRequestStore::unavailable("offline"),
            UrgencyRules::default(),
        );
        assert!(matches!(dashboard.load(now()), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_purge_requires_exact_phrase() {
        let dashboard = seeded();
        for phrase in ["delete all", "Delete all", "Delete All ", ""] {
            assert!(matches!(
                dashboard.purge(phrase, PurgeMode::Execute),
                Err(DashboardError::ConfirmationMismatch)
            ));
        }
        assert_eq!(dashboard.load(now()).unwrap().total_requests, 3);
    }

    #[test]
    fn test_purge_dry_run_keeps_requests() {
        let dashboard = seeded();
        let outcome = dashboard.purge(PURGE_CONFIRMATION, PurgeMode::DryRun).unwrap();
        assert_eq!(outcome.deleted, 3);
        assert_eq!(outcome.mode, PurgeMode::DryRun);
        assert_eq!(dashboard.load(now()).unwrap().total_requests, 3);
    }

    #[test]
    fn test_purge_execute_empties_store() {
        let dashboard = seeded();
        let outcome = dashboard.purge(PURGE_CONFIRMATION, PurgeMode::Execute).unwrap();
        assert_eq!(outcome.deleted, 3);
        let report = dashboard.load(now()).unwrap();
        assert_eq!(report.total_requests, 0);
        assert!(report.latest.is_none());
    }
}
