//! The consultation request record.
//!
//! Field names follow the document store (camelCase). Only `status`,
//! `createdAt` and `location` drive triage; the descriptive fields are payload
//! and unknown fields are carried through in [`ConsultationRequest::extra`].

use crate::id::RequestId;
use crate::timestamp::CreatedAt;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The stored status string that marks a request as still open.
pub const PENDING_STATUS: &str = "pending";

/// Request status as seen by triage.
///
/// The store only ever checks for `"pending"`; any other value, including a
/// missing field, means the request has already been handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    #[default]
    Resolved,
}

impl RequestStatus {
    /// Translate a raw stored status into the two-state tag.
    pub fn from_stored(raw: &str) -> Self {
        if raw == PENDING_STATUS {
            RequestStatus::Pending
        } else {
            RequestStatus::Resolved
        }
    }

    pub fn is_pending(self) -> bool {
        self == RequestStatus::Pending
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RequestStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw {
            serde_json::Value::String(s) => RequestStatus::from_stored(&s),
            _ => RequestStatus::Resolved,
        })
    }
}

/// Deserialize a field whose stored value may be `null`, falling back to the
/// type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Geographic coordinates attached by the address lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Where the requester is based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    /// Two-letter state code, or empty.
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub zip_code: String,
    /// Region precomputed at submission time from a full geocode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Lookup fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Location {
    /// A minimal location with just an address and state code.
    pub fn with_state(address: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            state: state.into(),
            ..Self::default()
        }
    }
}

/// A consultation request as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    pub id: RequestId,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<CreatedAt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub other_stage_detail: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additional_context: String,
    /// Store fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ConsultationRequest {
    /// A bare record: only identity, status and timestamp set.
    pub fn new(id: impl Into<RequestId>, status: RequestStatus, created_at: Option<CreatedAt>) -> Self {
        Self {
            id: id.into(),
            status,
            created_at,
            location: None,
            name: String::new(),
            organization: String::new(),
            email: String::new(),
            phone: String::new(),
            stage: String::new(),
            other_stage_detail: String::new(),
            topics: Vec::new(),
            additional_context: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// A copy of the record with `keys` dropped from [`Self::extra`].
    ///
    /// Used when the record is serialized next to computed fields of the same
    /// name, so the output never carries a key twice.
    pub fn without_extra(&self, keys: &[&str]) -> Self {
        let mut record = self.clone();
        for key in keys {
            record.extra.remove(*key);
        }
        record
    }

    /// The state code on the record, if any.
    pub fn state_code(&self) -> Option<&str> {
        self.location
            .as_ref()
            .map(|l| l.state.as_str())
            .filter(|s| !s.is_empty())
    }

    /// The precomputed region on the record, if any.
    pub fn precomputed_region(&self) -> Option<&str> {
        self.location
            .as_ref()
            .and_then(|l| l.region.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// The payload of a new submission, before the store assigns identity,
/// status and creation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRequest {
    pub name: String,
    pub organization: String,
    pub email: String,
    pub phone: String,
    pub stage: String,
    pub other_stage_detail: String,
    pub topics: Vec<String>,
    pub additional_context: String,
    pub location: Option<Location>,
}

impl NewRequest {
    /// Stamp the submission with its store identity.
    pub fn into_record(self, id: RequestId, created_at: CreatedAt) -> ConsultationRequest {
        ConsultationRequest {
            id,
            status: RequestStatus::Pending,
            created_at: Some(created_at),
            location: self.location,
            name: self.name,
            organization: self.organization,
            email: self.email,
            phone: self.phone,
            stage: self.stage,
            other_stage_detail: self.other_stage_detail,
            topics: self.topics,
            additional_context: self.additional_context,
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::StoreTimestamp;

    #[test]
    fn test_status_only_exact_pending_is_pending() {
        let cases = [
            (r#""pending""#, RequestStatus::Pending),
            (r#""resolved""#, RequestStatus::Resolved),
            (r#""Pending""#, RequestStatus::Resolved),
            (r#""archived""#, RequestStatus::Resolved),
            ("null", RequestStatus::Resolved),
            ("7", RequestStatus::Resolved),
        ];
        for (json, expected) in cases {
            let status: RequestStatus = serde_json::from_str(json).unwrap();
            assert_eq!(status, expected, "status {json}");
        }
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&RequestStatus::Resolved).unwrap(),
            "\"resolved\""
        );
    }

    #[test]
    fn test_record_from_store_document() {
        let json = r#"{
            "id": "abc",
            "status": "pending",
            "createdAt": {"seconds": 1750248000, "nanoseconds": 0},
            "name": "Ada",
            "email": "ada@example.org",
            "topics": ["Legal Strategy", "Funding Repair"],
            "location": {"address": "Boston, MA", "state": "MA", "city": "Boston"},
            "recaptchaScore": 0.9
        }"#;
        let req: ConsultationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.id.as_str(), "abc");
        assert!(req.status.is_pending());
        assert_eq!(
            req.created_at,
            Some(CreatedAt::Deferred(StoreTimestamp {
                seconds: 1_750_248_000,
                nanoseconds: 0
            }))
        );
        assert_eq!(req.state_code(), Some("MA"));
        assert_eq!(req.precomputed_region(), None);
        assert_eq!(req.topics.len(), 2);
        assert_eq!(req.extra.get("recaptchaScore"), Some(&serde_json::json!(0.9)));
    }

    #[test]
    fn test_missing_status_and_timestamp() {
        let req: ConsultationRequest = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(req.status, RequestStatus::Resolved);
        assert!(req.created_at.is_none());
        assert!(req.location.is_none());
        assert_eq!(req.state_code(), None);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let json = r#"{"id":"x","status":"pending","customField":{"a":1}}"#;
        let req: ConsultationRequest = serde_json::from_str(json).unwrap();
        let back = serde_json::to_value(&req).unwrap();
        assert_eq!(back["customField"]["a"], 1);
    }

    #[test]
    fn test_null_payload_fields_read_as_empty() {
        let json = r#"{
            "id": "n",
            "status": "pending",
            "name": null,
            "phone": null,
            "topics": null,
            "location": {"address": "Somewhere", "state": null, "city": null, "zipCode": null}
        }"#;
        let req: ConsultationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.name, "");
        assert_eq!(req.phone, "");
        assert!(req.topics.is_empty());
        let location = req.location.as_ref().unwrap();
        assert_eq!(location.address, "Somewhere");
        assert_eq!(location.state, "");
        assert_eq!(req.state_code(), None);
    }

    #[test]
    fn test_unknown_location_fields_round_trip() {
        let json = r#"{"id":"x","location":{"state":"MA","placeId":"ChIJ123","bounds":{"n":1}}}"#;
        let req: ConsultationRequest = serde_json::from_str(json).unwrap();
        let location = req.location.as_ref().unwrap();
        assert_eq!(location.extra.get("placeId"), Some(&serde_json::json!("ChIJ123")));
        let back = serde_json::to_value(&req).unwrap();
        assert_eq!(back["location"]["placeId"], "ChIJ123");
        assert_eq!(back["location"]["bounds"]["n"], 1);
        assert_eq!(back["location"]["state"], "MA");
    }

    #[test]
    fn test_without_extra_drops_only_named_keys() {
        let json = r#"{"id":"x","region":"Mars","keep":true}"#;
        let req: ConsultationRequest = serde_json::from_str(json).unwrap();
        let stripped = req.without_extra(&["region", "absent"]);
        assert!(!stripped.extra.contains_key("region"));
        assert_eq!(stripped.extra.get("keep"), Some(&serde_json::json!(true)));
        assert!(req.extra.contains_key("region"));
    }

    #[test]
    fn test_blank_precomputed_region_ignored() {
        let mut location = Location::with_state("", "");
        location.region = Some("  ".to_string());
        let req = ConsultationRequest::new("x", RequestStatus::Pending, None).with_location(location);
        assert_eq!(req.precomputed_region(), None);
        assert_eq!(req.state_code(), None);
    }
}
