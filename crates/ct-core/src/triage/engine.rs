//! Region × urgency partition of a request collection.

use super::region::{resolve_region, Region};
use super::urgency::{compute_urgency, UrgencyCategory, UrgencyRules};
use chrono::{DateTime, Utc};
use ct_common::{ConsultationRequest, ResolveInstant};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A request annotated with the region and age triage computed for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriagedRequest {
    #[serde(flatten)]
    pub request: ConsultationRequest,
    pub region: Region,
    /// Set for pending requests with a resolvable timestamp.
    pub business_days_elapsed: Option<u32>,
}

/// Output keys of [`TriagedRequest`] that are computed rather than stored.
const TRIAGED_KEYS: &[&str] = &["region", "businessDaysElapsed"];

/// Requests of one region, by urgency category.
pub type CategoryBuckets = BTreeMap<UrgencyCategory, Vec<TriagedRequest>>;

/// Every request of a triage pass, grouped by region then urgency.
///
/// All five regions and all four categories are always present. Within a
/// bucket requests keep their input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TriagePartition {
    regions: BTreeMap<Region, CategoryBuckets>,
}

impl TriagePartition {
    /// A partition with every bucket present and empty.
    pub fn empty() -> Self {
        let regions = Region::ALL
            .into_iter()
            .map(|region| {
                let buckets = UrgencyCategory::ALL
                    .into_iter()
                    .map(|category| (category, Vec::new()))
                    .collect();
                (region, buckets)
            })
            .collect();
        Self { regions }
    }

    fn push(&mut self, category: UrgencyCategory, request: TriagedRequest) {
        self.regions
            .entry(request.region)
            .or_default()
            .entry(category)
            .or_default()
            .push(request);
    }

    pub fn bucket(&self, region: Region, category: UrgencyCategory) -> &[TriagedRequest] {
        self.regions
            .get(&region)
            .and_then(|buckets| buckets.get(&category))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn region(&self, region: Region) -> Option<&CategoryBuckets> {
        self.regions.get(&region)
    }

    /// Requests in a region across all categories.
    pub fn region_total(&self, region: Region) -> usize {
        UrgencyCategory::ALL
            .into_iter()
            .map(|category| self.bucket(region, category).len())
            .sum()
    }

    /// Per-region request counts, in region order.
    pub fn region_totals(&self) -> BTreeMap<Region, usize> {
        Region::ALL
            .into_iter()
            .map(|region| (region, self.region_total(region)))
            .collect()
    }

    /// Buckets in region order then category order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, UrgencyCategory, &[TriagedRequest])> + '_ {
        Region::ALL.into_iter().flat_map(move |region| {
            UrgencyCategory::ALL
                .into_iter()
                .map(move |category| (region, category, self.bucket(region, category)))
        })
    }

    /// Total number of requests in the partition.
    pub fn len(&self) -> usize {
        self.iter().map(|(_, _, bucket)| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Category totals aggregated across regions.
    pub fn totals(&self) -> CategoryTotals {
        let mut totals = CategoryTotals::default();
        for (_, category, bucket) in self.iter() {
            totals.add(category, bucket.len());
        }
        totals
    }
}

/// Partition `requests` by region and urgency as of `now`.
pub fn triage(
    rules: &UrgencyRules,
    requests: &[ConsultationRequest],
    now: DateTime<Utc>,
) -> TriagePartition {
    let mut partition = TriagePartition::empty();

    for request in requests {
        let region = resolve_region(request);
        let urgency = compute_urgency(rules, request.status, &request.created_at, now);
        if request.status.is_pending() && request.created_at.resolve_instant().is_none() {
            warn!(id = %request.id, "pending request has no usable createdAt, treating as new");
        }
        partition.push(
            urgency.category,
            TriagedRequest {
                request: request.without_extra(TRIAGED_KEYS),
                region,
                business_days_elapsed: urgency.business_days_elapsed,
            },
        );
    }

    debug!(requests = requests.len(), "triage pass complete");
    partition
}

/// Request counts per urgency category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryTotals {
    pub new: usize,
    pub nearly_due: usize,
    pub overdue: usize,
    pub resolved: usize,
}

impl CategoryTotals {
    pub fn get(&self, category: UrgencyCategory) -> usize {
        match category {
            UrgencyCategory::New => self.new,
            UrgencyCategory::NearlyDue => self.nearly_due,
            UrgencyCategory::Overdue => self.overdue,
            UrgencyCategory::Resolved => self.resolved,
        }
    }

    fn add(&mut self, category: UrgencyCategory, count: usize) {
        let slot = match category {
            UrgencyCategory::New => &mut self.new,
            UrgencyCategory::NearlyDue => &mut self.nearly_due,
            UrgencyCategory::Overdue => &mut self.overdue,
            UrgencyCategory::Resolved => &mut self.resolved,
        };
        *slot += count;
    }

    pub fn total(&self) -> usize {
        self.new + self.nearly_due + self.overdue + self.resolved
    }
}

/// Count requests per urgency category without building a partition.
pub fn totals_by_category(
    rules: &UrgencyRules,
    requests: &[ConsultationRequest],
    now: DateTime<Utc>,
) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    for request in requests {
        let urgency = compute_urgency(rules, request.status, &request.created_at, now);
        totals.add(urgency.category, 1);
    }
    totals
}
