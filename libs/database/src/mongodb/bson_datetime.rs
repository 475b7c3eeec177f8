//! Serde adapter storing `chrono::DateTime<Utc>` as a native BSON date.
//!
//! ```ignore
//! #[serde(with = "database::mongodb::bson_datetime")]
//! pub created_at: DateTime<Utc>,
//! ```
//!
//! Reads also accept the RFC 3339 strings written by older records.

use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::{self, Bson};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

/// Current time at BSON date precision (milliseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// The BSON date for `value`, for use in hand-built update documents.
pub fn to_bson(value: &DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_millis(value.timestamp_millis()))
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    bson::DateTime::from_millis(value.timestamp_millis()).serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match Bson::deserialize(deserializer)? {
        Bson::DateTime(date) => DateTime::from_timestamp_millis(date.timestamp_millis())
            .ok_or_else(|| D::Error::custom("date out of range")),
        Bson::String(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|date| date.with_timezone(&Utc))
            .map_err(D::Error::custom),
        other => Err(D::Error::custom(format!(
            "expected a date, found {:?}",
            other.element_type()
        ))),
    }
}
