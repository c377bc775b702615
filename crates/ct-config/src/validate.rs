//! Semantic validation of a loaded policy.
//!
//! Parsing already guarantees the shape; this checks the relationships
//! between fields and reports every problem at once.

use crate::policy::{BusinessCalendar, Policy};
use serde::Serialize;

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All validation failures for a policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// All errors on one line, for error messages.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validate a policy.
pub fn validate_policy(policy: &Policy) -> ValidationResult {
    let mut result = ValidationResult::default();

    if major(&policy.schema_version) != major(crate::CONFIG_SCHEMA_VERSION) {
        result.push(
            "schema_version",
            format!(
                "unsupported schema version {} (expected {}.x)",
                policy.schema_version,
                major(crate::CONFIG_SCHEMA_VERSION).unwrap_or(0)
            ),
        );
    }

    let sla = &policy.sla;
    if sla.new_max_business_days >= sla.nearly_due_max_business_days {
        result.push(
            "sla.new_max_business_days",
            format!(
                "must be below sla.nearly_due_max_business_days ({} >= {})",
                sla.new_max_business_days, sla.nearly_due_max_business_days
            ),
        );
    }

    let offset = policy.calendar.utc_offset_minutes;
    if offset.abs() > BusinessCalendar::MAX_OFFSET_MINUTES {
        result.push(
            "calendar.utc_offset_minutes",
            format!(
                "{} is outside ±{} minutes",
                offset,
                BusinessCalendar::MAX_OFFSET_MINUTES
            ),
        );
    }

    if policy.intake.max_topics == 0 {
        result.push("intake.max_topics", "must allow at least one topic");
    }

    result
}

fn major(version: &str) -> Option<u32> {
    version.split('.').next().and_then(|s| s.parse().ok())
}
