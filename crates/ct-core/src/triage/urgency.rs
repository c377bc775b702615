//! SLA urgency of a single request.

use super::business_days::business_days_between;
use chrono::{DateTime, Utc};
use ct_common::{RequestStatus, ResolveInstant};
use ct_config::{BusinessCalendar, Policy, SlaPolicy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency bucket, derived at read time and never stored.
///
/// Declaration order is the display order on the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum UrgencyCategory {
    New,
    NearlyDue,
    Overdue,
    Resolved,
}

impl UrgencyCategory {
    pub const ALL: [UrgencyCategory; 4] = [
        UrgencyCategory::New,
        UrgencyCategory::NearlyDue,
        UrgencyCategory::Overdue,
        UrgencyCategory::Resolved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyCategory::New => "New",
            UrgencyCategory::NearlyDue => "NearlyDue",
            UrgencyCategory::Overdue => "Overdue",
            UrgencyCategory::Resolved => "Resolved",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            UrgencyCategory::NearlyDue => "Nearly Due",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for UrgencyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an urgency computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Urgency {
    pub category: UrgencyCategory,
    /// Only set for pending requests with a resolvable timestamp.
    pub business_days_elapsed: Option<u32>,
}

impl Urgency {
    const RESOLVED: Urgency = Urgency {
        category: UrgencyCategory::Resolved,
        business_days_elapsed: None,
    };

    const UNDATED: Urgency = Urgency {
        category: UrgencyCategory::New,
        business_days_elapsed: None,
    };
}

/// Thresholds and calendar used to compute urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrgencyRules {
    pub sla: SlaPolicy,
    pub calendar: BusinessCalendar,
}

impl UrgencyRules {
    pub fn from_policy(policy: &Policy) -> Self {
        Self {
            sla: policy.sla,
            calendar: policy.calendar,
        }
    }

    /// Bucket for a pending request aged `business_days`.
    pub fn category_for(&self, business_days: u32) -> UrgencyCategory {
        if business_days <= self.sla.new_max_business_days {
            UrgencyCategory::New
        } else if business_days <= self.sla.nearly_due_max_business_days {
            UrgencyCategory::NearlyDue
        } else {
            UrgencyCategory::Overdue
        }
    }
}

/// Compute the urgency of a request.
///
/// Anything not pending is resolved regardless of age. A pending request
/// whose timestamp cannot be resolved is treated as new. Future timestamps
/// are measured the same as past ones.
pub fn compute_urgency<T: ResolveInstant + ?Sized>(
    rules: &UrgencyRules,
    status: RequestStatus,
    created_at: &T,
    now: DateTime<Utc>,
) -> Urgency {
    if !status.is_pending() {
        return Urgency::RESOLVED;
    }
    let Some(created) = created_at.resolve_instant() else {
        return Urgency::UNDATED;
    };
    let days = business_days_between(created, now, &rules.calendar);
    Urgency {
        category: rules.category_for(days),
        business_days_elapsed: Some(days),
    }
}
