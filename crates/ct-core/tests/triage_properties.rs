//! Property-based tests for triage invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ct_common::{ConsultationRequest, CreatedAt, Location, RequestStatus, StoreTimestamp};
use ct_config::{BusinessCalendar, SlaPolicy};
use ct_core::triage::region::{MIDWEST_STATES, NORTHEAST_STATES, SOUTH_STATES, WEST_STATES};
use ct_core::triage::{
    business_days_between, classify_region, compute_urgency, totals_by_category, triage, Region,
    UrgencyCategory, UrgencyRules,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap()
}

#[derive(Debug, Clone)]
enum Stamp {
    Native(i64),
    Deferred(i64),
    Missing,
    Garbage,
}

impl Stamp {
    fn created_at(&self) -> Option<CreatedAt> {
        match self {
            Stamp::Native(age) => Some(CreatedAt::Native(now() - Duration::seconds(*age))),
            Stamp::Deferred(age) => Some(CreatedAt::deferred(now() - Duration::seconds(*age))),
            Stamp::Missing => None,
            Stamp::Garbage => Some(CreatedAt::Unresolvable(serde_json::json!("last tuesday"))),
        }
    }
}

fn stamp_strategy() -> impl Strategy<Value = Stamp> {
    let age = 0i64..(120 * 86_400);
    prop_oneof![
        4 => age.clone().prop_map(Stamp::Native),
        4 => age.prop_map(Stamp::Deferred),
        1 => Just(Stamp::Missing),
        1 => Just(Stamp::Garbage),
    ]
}

fn state_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::sample::select(vec!["MA", "NY", "IL", "OH", "TX", "GA", "CA", "WA", "DC"])
            .prop_map(str::to_string),
        proptest::sample::select(vec!["ma", "tx", " ca ", "PR", "GU", "", "ZZ"]).prop_map(str::to_string),
        "[A-Za-z]{0,3}",
    ]
}

fn stored_region_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        6 => Just(None),
        1 => Just(Some("Northeast".to_string())),
        1 => Just(Some("west".to_string())),
        1 => Just(Some("Atlantis".to_string())),
    ]
}

fn requests_strategy() -> impl Strategy<Value = Vec<ConsultationRequest>> {
    proptest::collection::vec(
        (any::<bool>(), stamp_strategy(), state_strategy(), stored_region_strategy()),
        0..60,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (pending, stamp, state, region))| {
                let status = if pending {
                    RequestStatus::Pending
                } else {
                    RequestStatus::Resolved
                };
                let mut location = Location::with_state("", state);
                location.region = region;
                ConsultationRequest::new(format!("req-{i}"), status, stamp.created_at())
                    .with_location(location)
            })
            .collect()
    })
}

fn index_of(id: &str) -> usize {
    id.trim_start_matches("req-").parse().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn partition_holds_every_request_exactly_once(requests in requests_strategy()) {
        let partition = triage(&UrgencyRules::default(), &requests, now());
        prop_assert_eq!(partition.len(), requests.len());

        let mut seen = HashSet::new();
        for (_, _, bucket) in partition.iter() {
            for triaged in bucket {
                prop_assert!(seen.insert(triaged.request.id.clone()), "duplicate {}", triaged.request.id);
            }
        }
        prop_assert_eq!(seen.len(), requests.len());
    }

    #[test]
    fn buckets_keep_input_order(requests in requests_strategy()) {
        let partition = triage(&UrgencyRules::default(), &requests, now());
        for (_, _, bucket) in partition.iter() {
            let indices: Vec<usize> = bucket.iter().map(|t| index_of(t.request.id.as_str())).collect();
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]), "out of order: {:?}", indices);
        }
    }

    #[test]
    fn triage_is_idempotent(requests in requests_strategy()) {
        let rules = UrgencyRules::default();
        prop_assert_eq!(triage(&rules, &requests, now()), triage(&rules, &requests, now()));
    }

    #[test]
    fn totals_agree_with_partition(requests in requests_strategy()) {
        let rules = UrgencyRules::default();
        let totals = totals_by_category(&rules, &requests, now());
        prop_assert_eq!(totals, triage(&rules, &requests, now()).totals());
        prop_assert_eq!(totals.total(), requests.len());
    }

    #[test]
    fn resolved_status_dominates(requests in requests_strategy()) {
        let partition = triage(&UrgencyRules::default(), &requests, now());
        for (_, category, bucket) in partition.iter() {
            for triaged in bucket {
                let resolved = triaged.request.status == RequestStatus::Resolved;
                prop_assert_eq!(resolved, category == UrgencyCategory::Resolved);
            }
        }
    }

    #[test]
    fn native_and_deferred_timestamps_agree(age in 0i64..(400 * 86_400)) {
        let rules = UrgencyRules::default();
        let instant = now() - Duration::seconds(age);
        let native = compute_urgency(&rules, RequestStatus::Pending, &CreatedAt::Native(instant), now());
        let deferred = compute_urgency(
            &rules,
            RequestStatus::Pending,
            &CreatedAt::Deferred(StoreTimestamp::from_instant(instant)),
            now(),
        );
        prop_assert_eq!(native, deferred);
    }

    #[test]
    fn urgency_never_improves_with_age(a in 0i64..(200 * 86_400), b in 0i64..(200 * 86_400)) {
        let rules = UrgencyRules::default();
        let (younger, older) = if a <= b { (a, b) } else { (b, a) };
        let young = compute_urgency(&rules, RequestStatus::Pending, &(now() - Duration::seconds(younger)), now());
        let old = compute_urgency(&rules, RequestStatus::Pending, &(now() - Duration::seconds(older)), now());
        prop_assert!(young.category <= old.category);
        prop_assert!(young.business_days_elapsed <= old.business_days_elapsed);
    }

    #[test]
    fn business_days_are_symmetric(a in 0i64..(3_000 * 86_400), b in 0i64..(3_000 * 86_400), offset in -840i32..=840) {
        let calendar = BusinessCalendar { utc_offset_minutes: offset };
        let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let x = base + Duration::seconds(a);
        let y = base + Duration::seconds(b);
        prop_assert_eq!(business_days_between(x, y, &calendar), business_days_between(y, x, &calendar));
    }

    #[test]
    fn business_days_bounded_by_calendar_days(age in 0i64..(3_000 * 86_400)) {
        let calendar = BusinessCalendar::default();
        let created = now() - Duration::seconds(age);
        let days = i64::from(business_days_between(created, now(), &calendar));
        let calendar_days = (now().date_naive() - created.date_naive()).num_days();
        prop_assert!(days <= calendar_days);
        prop_assert!(days >= calendar_days * 5 / 7 - 2);
    }

    #[test]
    fn classifier_is_total(code in ".{0,6}") {
        let region = classify_region(Some(code.as_str()));
        prop_assert!(Region::ALL.contains(&region));
    }

    #[test]
    fn custom_thresholds_partition_the_day_range(new_max in 0u32..20, gap in 1u32..20, days in 0u32..60) {
        let rules = UrgencyRules {
            sla: SlaPolicy {
                new_max_business_days: new_max,
                nearly_due_max_business_days: new_max + gap,
            },
            ..UrgencyRules::default()
        };
        let expected = if days <= new_max {
            UrgencyCategory::New
        } else if days <= new_max + gap {
            UrgencyCategory::NearlyDue
        } else {
            UrgencyCategory::Overdue
        };
        prop_assert_eq!(rules.category_for(days), expected);
    }
}

#[test]
fn every_listed_state_has_a_region() {
    let groups = [
        (Region::Northeast, &NORTHEAST_STATES[..]),
        (Region::Midwest, &MIDWEST_STATES[..]),
        (Region::South, &SOUTH_STATES[..]),
        (Region::West, &WEST_STATES[..]),
    ];
    let mut all = HashSet::new();
    for (region, states) in groups {
        for state in states {
            assert_eq!(classify_region(Some(state)), region, "{state}");
            assert!(all.insert(*state), "{state} listed twice");
        }
    }
    assert_eq!(all.len(), 51);
}
