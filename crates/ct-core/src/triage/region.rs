//! US state code → region mapping.

use ct_common::ConsultationRequest;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const NORTHEAST_STATES: [&str; 9] = ["ME", "NH", "VT", "MA", "RI", "CT", "NY", "NJ", "PA"];
pub const MIDWEST_STATES: [&str; 12] = [
    "OH", "IN", "IL", "MI", "WI", "MN", "IA", "MO", "ND", "SD", "NE", "KS",
];
pub const SOUTH_STATES: [&str; 17] = [
    "DE", "MD", "DC", "VA", "WV", "KY", "NC", "SC", "GA", "FL", "AL", "MS", "TN", "AR", "LA", "OK",
    "TX",
];
pub const WEST_STATES: [&str; 13] = [
    "MT", "WY", "CO", "NM", "ID", "UT", "AZ", "NV", "WA", "OR", "CA", "AK", "HI",
];

/// Geographic bucket a request is routed to.
///
/// Declaration order is the display order on the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Region {
    Northeast,
    Midwest,
    South,
    West,
    Unknown,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Northeast,
        Region::Midwest,
        Region::South,
        Region::West,
        Region::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Northeast => "Northeast",
            Region::Midwest => "Midwest",
            Region::South => "South",
            Region::West => "West",
            Region::Unknown => "Unknown",
        }
    }

    /// State codes owned by this region. Empty for `Unknown`.
    pub fn states(self) -> &'static [&'static str] {
        match self {
            Region::Northeast => &NORTHEAST_STATES,
            Region::Midwest => &MIDWEST_STATES,
            Region::South => &SOUTH_STATES,
            Region::West => &WEST_STATES,
            Region::Unknown => &[],
        }
    }

    /// Parse a region name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Region> {
        let name = name.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a state code to its region. Missing, empty and unmapped codes
/// (territories, non-US input) land in `Unknown`.
pub fn classify_region(state_code: Option<&str>) -> Region {
    let Some(code) = state_code.map(str::trim).filter(|c| !c.is_empty()) else {
        return Region::Unknown;
    };
    let code = code.to_ascii_uppercase();
    [Region::Northeast, Region::Midwest, Region::South, Region::West]
        .into_iter()
        .find(|region| region.states().contains(&code.as_str()))
        .unwrap_or(Region::Unknown)
}

/// Region for a stored request.
///
/// A region precomputed at submission (from a full geocode) wins over the
/// state code. A precomputed value that names no known region is ignored.
pub fn resolve_region(request: &ConsultationRequest) -> Region {
    if let Some(raw) = request.precomputed_region() {
        match Region::parse(raw) {
            Some(region) => return region,
            None => debug!(id = %request.id, region = raw, "unrecognized stored region, using state code"),
        }
    }
    classify_region(request.state_code())
}
