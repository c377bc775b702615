//! `createdAt` timestamps as they arrive from the document store.
//!
//! A record's `createdAt` is either already a concrete instant (an RFC 3339
//! string) or a store-native timestamp object that has to be converted first.
//! Everything downstream goes through [`ResolveInstant`] and never looks at the
//! wire representation.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanoseconds per second; store timestamps carry sub-second parts below this.
const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Converts a stored timestamp value into a concrete instant.
///
/// Returns `None` when the value cannot be interpreted; callers decide how to
/// degrade (skip the record, or treat it as least urgent).
pub trait ResolveInstant {
    fn resolve_instant(&self) -> Option<DateTime<Utc>>;
}

impl ResolveInstant for DateTime<Utc> {
    fn resolve_instant(&self) -> Option<DateTime<Utc>> {
        Some(*self)
    }
}

impl<T: ResolveInstant> ResolveInstant for Option<T> {
    fn resolve_instant(&self) -> Option<DateTime<Utc>> {
        self.as_ref().and_then(ResolveInstant::resolve_instant)
    }
}

/// Store-native timestamp: whole seconds since the Unix epoch plus nanoseconds.
///
/// Deserializes from a JSON object only, accepting both `seconds` and the
/// store's `_seconds` spelling. Missing nanoseconds default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct StoreTimestamp {
    pub seconds: i64,
    #[serde(default)]
    pub nanoseconds: u32,
}

impl<'de> Deserialize<'de> for StoreTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StoreTimestampVisitor)
    }
}

struct StoreTimestampVisitor;

impl<'de> Visitor<'de> for StoreTimestampVisitor {
    type Value = StoreTimestamp;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a timestamp object with seconds and nanoseconds")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StoreTimestamp, A::Error> {
        let mut seconds = None;
        let mut nanoseconds = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "seconds" | "_seconds" => {
                    if seconds.is_some() {
                        return Err(de::Error::duplicate_field("seconds"));
                    }
                    seconds = Some(map.next_value::<i64>()?);
                }
                "nanoseconds" | "_nanoseconds" => {
                    if nanoseconds.is_some() {
                        return Err(de::Error::duplicate_field("nanoseconds"));
                    }
                    nanoseconds = Some(map.next_value::<u32>()?);
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(StoreTimestamp {
            seconds: seconds.ok_or_else(|| de::Error::missing_field("seconds"))?,
            nanoseconds: nanoseconds.unwrap_or(0),
        })
    }
}

impl StoreTimestamp {
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self {
            seconds: instant.timestamp(),
            nanoseconds: instant.timestamp_subsec_nanos(),
        }
    }
}

impl ResolveInstant for StoreTimestamp {
    fn resolve_instant(&self) -> Option<DateTime<Utc>> {
        if self.nanoseconds >= NANOS_PER_SEC {
            return None;
        }
        DateTime::from_timestamp(self.seconds, self.nanoseconds)
    }
}

/// A `createdAt` value in any of the shapes the store hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CreatedAt {
    /// Already a concrete instant.
    Native(DateTime<Utc>),
    /// Store timestamp object that needs conversion.
    Deferred(StoreTimestamp),
    /// Anything else; kept verbatim so the record round-trips.
    Unresolvable(serde_json::Value),
}

impl CreatedAt {
    /// A deferred timestamp for `instant`, the shape the store writes on insert.
    pub fn deferred(instant: DateTime<Utc>) -> Self {
        CreatedAt::Deferred(StoreTimestamp::from_instant(instant))
    }
}

impl ResolveInstant for CreatedAt {
    fn resolve_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            CreatedAt::Native(instant) => instant.resolve_instant(),
            CreatedAt::Deferred(ts) => ts.resolve_instant(),
            CreatedAt::Unresolvable(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for CreatedAt {
    fn from(instant: DateTime<Utc>) -> Self {
        CreatedAt::Native(instant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_native_string_parses() {
        let value: CreatedAt = serde_json::from_str("\"2025-06-18T12:00:00Z\"").unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        assert_eq!(value, CreatedAt::Native(expected));
        assert_eq!(value.resolve_instant(), Some(expected));
    }

    #[test]
    fn test_deferred_object_parses_with_aliases() {
        let json = r#"{"_seconds": 1750248000, "_nanoseconds": 500}"#;
        let value: CreatedAt = serde_json::from_str(json).unwrap();
        assert_eq!(
            value,
            CreatedAt::Deferred(StoreTimestamp {
                seconds: 1_750_248_000,
                nanoseconds: 500
            })
        );
        let instant = value.resolve_instant().unwrap();
        assert_eq!(instant.timestamp(), 1_750_248_000);
        assert_eq!(instant.timestamp_subsec_nanos(), 500);
    }

    #[test]
    fn test_deferred_and_native_resolve_to_same_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 2, 29, 8, 30, 15).unwrap();
        assert_eq!(
            CreatedAt::deferred(instant).resolve_instant(),
            CreatedAt::Native(instant).resolve_instant()
        );
    }

    #[test]
    fn test_garbage_is_unresolvable() {
        for json in ["42", "\"last tuesday\"", "true", "[1,2]", r#"{"when": "now"}"#] {
            let value: CreatedAt = serde_json::from_str(json).unwrap();
            assert!(
                matches!(value, CreatedAt::Unresolvable(_)),
                "{json} should be unresolvable"
            );
            assert_eq!(value.resolve_instant(), None);
        }
    }

    #[test]
    fn test_sequence_is_not_a_store_timestamp() {
        assert!(serde_json::from_str::<StoreTimestamp>("[1750248000, 0]").is_err());
        let value: CreatedAt = serde_json::from_str("[1750248000, 0]").unwrap();
        assert_eq!(value, CreatedAt::Unresolvable(serde_json::json!([1_750_248_000, 0])));
        assert_eq!(value.resolve_instant(), None);
    }

    #[test]
    fn test_plain_field_names_and_missing_nanos() {
        let ts: StoreTimestamp = serde_json::from_str(r#"{"seconds": 60}"#).unwrap();
        assert_eq!(
            ts,
            StoreTimestamp {
                seconds: 60,
                nanoseconds: 0
            }
        );
        assert!(serde_json::from_str::<StoreTimestamp>(r#"{"_nanoseconds": 5}"#).is_err());
    }

    #[test]
    fn test_out_of_range_nanos_unresolvable() {
        let ts = StoreTimestamp {
            seconds: 0,
            nanoseconds: NANOS_PER_SEC,
        };
        assert_eq!(ts.resolve_instant(), None);
    }

    #[test]
    fn test_out_of_range_seconds_unresolvable() {
        let ts = StoreTimestamp {
            seconds: i64::MAX,
            nanoseconds: 0,
        };
        assert_eq!(ts.resolve_instant(), None);
    }

    #[test]
    fn test_option_none_resolves_to_none() {
        let missing: Option<CreatedAt> = None;
        assert_eq!(missing.resolve_instant(), None);
    }
}
