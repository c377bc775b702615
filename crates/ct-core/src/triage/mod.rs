//! Request triage: region classification, SLA urgency, and partitioning.
//!
//! Everything here is a pure function of the requests and a caller-supplied
//! `now`. Nothing is cached between passes.

pub mod business_days;
pub mod engine;
pub mod latest;
pub mod region;
pub mod urgency;

pub use business_days::business_days_between;
pub use engine::{totals_by_category, triage, CategoryBuckets, CategoryTotals, TriagePartition, TriagedRequest};
pub use latest::{select_most_recent, LatestRequest};
pub use region::{classify_region, resolve_region, Region};
pub use urgency::{compute_urgency, Urgency, UrgencyCategory, UrgencyRules};
