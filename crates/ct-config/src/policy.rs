//! Triage policy: SLA thresholds, business calendar, and intake rules.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides. The defaults are the production SLA: five business days of
//! grace, overdue after ten.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Complete policy loaded from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Policy {
    pub schema_version: String,
    pub sla: SlaPolicy,
    pub calendar: BusinessCalendar,
    pub intake: IntakePolicy,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            sla: SlaPolicy::default(),
            calendar: BusinessCalendar::default(),
            intake: IntakePolicy::default(),
        }
    }
}

/// Business-day thresholds separating the urgency buckets.
///
/// Both bounds are inclusive: a pending request aged exactly
/// `new_max_business_days` is still new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SlaPolicy {
    pub new_max_business_days: u32,
    pub nearly_due_max_business_days: u32,
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self {
            new_max_business_days: 5,
            nearly_due_max_business_days: 10,
        }
    }
}

/// Calendar used to turn instants into dates when counting business days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BusinessCalendar {
    /// Fixed offset from UTC, in minutes, of the office whose weekdays count.
    pub utc_offset_minutes: i32,
}

impl BusinessCalendar {
    /// Largest offset accepted by validation (UTC+14:00).
    pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;
}

/// Rules for the public intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IntakePolicy {
    /// Most topics a requester may pick.
    pub max_topics: usize,
    /// Whether a captcha token must accompany a submission.
    pub require_captcha: bool,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            max_topics: 3,
            require_captcha: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_sla() {
        let policy = Policy::default();
        assert_eq!(policy.sla.new_max_business_days, 5);
        assert_eq!(policy.sla.nearly_due_max_business_days, 10);
        assert_eq!(policy.calendar.utc_offset_minutes, 0);
        assert_eq!(policy.intake.max_topics, 3);
        assert!(policy.intake.require_captcha);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let policy: Policy =
            serde_json::from_str(r#"{"sla": {"nearly_due_max_business_days": 15}}"#).unwrap();
        assert_eq!(policy.sla.new_max_business_days, 5);
        assert_eq!(policy.sla.nearly_due_max_business_days, 15);
        assert_eq!(policy.intake, IntakePolicy::default());
        assert_eq!(policy.schema_version, crate::CONFIG_SCHEMA_VERSION);
    }

    #[test]
    fn test_empty_object_is_default() {
        let policy: Policy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy.sla, SlaPolicy::default());
        assert_eq!(policy.calendar, BusinessCalendar::default());
    }
}
