//! Most recently submitted request.

use super::region::{resolve_region, Region};
use super::urgency::{compute_urgency, UrgencyCategory, UrgencyRules};
use chrono::{DateTime, Utc};
use ct_common::{ConsultationRequest, ResolveInstant};
use serde::Serialize;

/// The newest request together with its urgency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestRequest {
    #[serde(flatten)]
    pub request: ConsultationRequest,
    /// The resolved `createdAt` instant.
    pub submitted_at: DateTime<Utc>,
    pub region: Region,
    pub urgency: UrgencyCategory,
    pub business_days_elapsed: Option<u32>,
}

/// Output keys of [`LatestRequest`] that are computed rather than stored.
const LATEST_KEYS: &[&str] = &["submittedAt", "region", "urgency", "businessDaysElapsed"];

/// Select the request with the latest resolvable `createdAt`.
///
/// Requests whose timestamp does not resolve are skipped. On ties the
/// earliest in iteration order wins. `None` when nothing has a usable
/// timestamp.
pub fn select_most_recent(
    rules: &UrgencyRules,
    requests: &[ConsultationRequest],
    now: DateTime<Utc>,
) -> Option<LatestRequest> {
    let mut newest: Option<(&ConsultationRequest, DateTime<Utc>)> = None;
    for request in requests {
        let Some(instant) = request.created_at.resolve_instant() else {
            continue;
        };
        if newest.is_none_or(|(_, best)| instant > best) {
            newest = Some((request, instant));
        }
    }

    let (request, submitted_at) = newest?;
    let urgency = compute_urgency(rules, request.status, &request.created_at, now);
    Some(LatestRequest {
        request: request.without_extra(LATEST_KEYS),
        submitted_at,
        region: resolve_region(request),
        urgency: urgency.category,
        business_days_elapsed: urgency.business_days_elapsed,
    })
}
