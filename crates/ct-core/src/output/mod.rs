//! Report rendering for the CLI.
//!
//! JSON output is the serde form of the report types. Summary output is
//! plain text meant for a terminal; regions without requests are omitted.

use crate::dashboard::{DashboardReport, PurgeMode, PurgeOutcome};
use crate::triage::{CategoryTotals, LatestRequest, Region, TriagePartition, UrgencyCategory};
use serde::Serialize;
use std::fmt::Write;

/// Pretty JSON with a trailing newline.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

pub fn render_totals(totals: &CategoryTotals) -> String {
    let mut out = String::new();
    for category in UrgencyCategory::ALL {
        let _ = writeln!(out, "{:<12} {}", category.display_name(), totals.get(category));
    }
    out
}

pub fn render_latest(latest: Option<&LatestRequest>) -> String {
    let Some(latest) = latest else {
        return "No requests with a submission date.\n".to_string();
    };
    let request = &latest.request;
    let mut out = String::new();
    let _ = writeln!(out, "Latest request: {}", request.id);
    let _ = writeln!(out, "  Submitted: {}", latest.submitted_at.to_rfc3339());
    if !request.name.is_empty() {
        let _ = writeln!(out, "  Name:      {}", request.name);
    }
    if !request.organization.is_empty() {
        let _ = writeln!(out, "  Org:       {}", request.organization);
    }
    let _ = writeln!(out, "  Region:    {}", latest.region);
    let _ = write!(out, "  Urgency:   {}", latest.urgency.display_name());
    if let Some(days) = latest.business_days_elapsed {
        let _ = write!(out, " ({days} business days)");
    }
    out.push('\n');
    out
}

/// One block per region that has requests, listing each non-empty bucket.
pub fn render_partition(partition: &TriagePartition) -> String {
    let mut out = String::new();
    for region in Region::ALL {
        let total = partition.region_total(region);
        if total == 0 {
            continue;
        }
        let _ = writeln!(out, "{region} ({total})");
        for category in UrgencyCategory::ALL {
            let bucket = partition.bucket(region, category);
            if bucket.is_empty() {
                continue;
            }
            let _ = writeln!(out, "  {} ({})", category.display_name(), bucket.len());
            for triaged in bucket {
                let request = &triaged.request;
                let _ = write!(out, "    {}", request.id);
                if !request.name.is_empty() {
                    let _ = write!(out, "  {}", request.name);
                }
                if let Some(days) = triaged.business_days_elapsed {
                    let _ = write!(out, "  {days}d");
                }
                out.push('\n');
            }
        }
    }
    if out.is_empty() {
        out.push_str("No requests.\n");
    }
    out
}

/// Requests per region, skipping empty regions.
pub fn render_region_totals(report: &DashboardReport) -> String {
    let mut out = String::new();
    for (region, count) in &report.region_totals {
        if *count > 0 {
            let _ = writeln!(out, "{:<10} {count}", region.as_str());
        }
    }
    out
}

pub fn render_report(report: &DashboardReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} requests as of {}",
        report.total_requests,
        report.generated_at.to_rfc3339()
    );
    out.push('\n');
    out.push_str(&render_totals(&report.totals));
    out.push('\n');
    out.push_str(&render_latest(report.latest.as_ref()));
    out.push('\n');
    out.push_str(&render_partition(&report.partition));
    out
}

pub fn render_purge(outcome: &PurgeOutcome) -> String {
    match outcome.mode {
        PurgeMode::DryRun => format!("Dry run: {} requests would be deleted.\n", outcome.deleted),
        PurgeMode::Execute => format!("Deleted {} requests.\n", outcome.deleted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::UrgencyRules;
    use chrono::{Duration, TimeZone, Utc};
    use ct_common::{ConsultationRequest, CreatedAt, Location, RequestStatus};

    fn sample_report() -> DashboardReport {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let mut fresh = ConsultationRequest::new(
            "req-new",
            RequestStatus::Pending,
            Some(CreatedAt::from(now - Duration::days(1))),
        )
        .with_location(Location::with_state("Boston, MA", "MA"));
        fresh.name = "Ada".to_string();
        let old = ConsultationRequest::new(
            "req-old",
            RequestStatus::Pending,
            Some(CreatedAt::from(now - Duration::days(30))),
        )
        .with_location(Location::with_state("Austin, TX", "TX"));
        DashboardReport::build(&UrgencyRules::default(), &[fresh, old], now)
    }

    #[test]
    fn test_totals_list_every_category() {
        let text = render_totals(&sample_report().totals);
        assert!(text.contains("New          1"));
        assert!(text.contains("Nearly Due   0"));
        assert!(text.contains("Overdue      1"));
        assert!(text.contains("Resolved     0"));
    }

    #[test]
    fn test_partition_skips_empty_regions() {
        let text = render_partition(&sample_report().partition);
        assert!(text.contains("Northeast (1)"));
        assert!(text.contains("South (1)"));
        assert!(!text.contains("West"));
        assert!(!text.contains("Midwest"));
        assert!(text.contains("req-new  Ada  1d"));
    }

    #[test]
    fn test_empty_partition() {
        assert_eq!(render_partition(&TriagePartition::empty()), "No requests.\n");
    }

    #[test]
    fn test_latest_summary() {
        let report = sample_report();
        let text = render_latest(report.latest.as_ref());
        assert!(text.starts_with("Latest request: req-new"));
        assert!(text.contains("Urgency:   New (1 business days)"));
        assert_eq!(render_latest(None), "No requests with a submission date.\n");
    }

    #[test]
    fn test_json_has_trailing_newline() {
        let json = to_json(&sample_report().totals).unwrap();
        assert!(json.ends_with("}\n"));
        assert!(json.contains("\"Overdue\": 1"));
    }

    #[test]
    fn test_region_totals_skip_zero() {
        let text = render_region_totals(&sample_report());
        assert_eq!(text, "Northeast  1\nSouth      1\n");
    }
}
