//! Parcel record and status values.
//!
//! # Invariants
//! - `number` is zero until the store assigns one on insert.
//! - `created_at` is an RFC3339 string and never changes after creation.
//! - Only `ParcelStatus::Registered` parcels accept address changes or deletion.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned primary key of a parcel row.
pub type ParcelNumber = i64;

/// Identifier of the client that owns a parcel. Not validated by the store.
pub type ClientId = i64;

/// Shipment status as stored in `parcel.status`.
///
/// Statuses written by other tools are kept verbatim in `Other`, so reading
/// a row never fails on an unfamiliar status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParcelStatus {
    /// Accepted but not shipped. The only mutable state.
    Registered,
    /// Handed over for delivery.
    Sent,
    /// Received by the addressee.
    Delivered,
    /// Any status text this crate does not know.
    Other(String),
}

impl ParcelStatus {
    /// Returns the text stored in the `status` column.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Returns the status that follows this one in the delivery lifecycle.
    ///
    /// `None` for `Delivered` and for unknown statuses.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered | Self::Other(_) => None,
        }
    }

    /// Whether address changes and deletion are allowed in this status.
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Registered)
    }
}

impl From<&str> for ParcelStatus {
    fn from(value: &str) -> Self {
        match value {
            "registered" => Self::Registered,
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ParcelStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "registered" | "sent" | "delivered" => Self::from(value.as_str()),
            _ => Self::Other(value),
        }
    }
}

impl From<ParcelStatus> for String {
    fn from(value: ParcelStatus) -> Self {
        match value {
            ParcelStatus::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One shipment record from the `parcel` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Primary key. Ignored by `ParcelStore::add`.
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    /// Delivery address; free text.
    pub address: String,
    /// RFC3339 creation timestamp.
    pub created_at: String,
}

impl Parcel {
    /// Creates an unsaved `registered` parcel stamped with the current UTC time.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: now_rfc3339(),
        }
    }
}

/// Formats the current UTC time as RFC3339 with second precision and `Z`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::{Parcel, ParcelStatus};
    use chrono::DateTime;

    #[test]
    fn status_text_roundtrips_for_known_values() {
        for status in [
            ParcelStatus::Registered,
            ParcelStatus::Sent,
            ParcelStatus::Delivered,
        ] {
            assert_eq!(ParcelStatus::from(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let status = ParcelStatus::from("lost");
        assert_eq!(status, ParcelStatus::Other("lost".to_string()));
        assert_eq!(status.as_str(), "lost");
        assert!(status.next().is_none());
        assert!(!status.is_mutable());
    }

    #[test]
    fn lifecycle_advances_registered_sent_delivered() {
        assert_eq!(ParcelStatus::Registered.next(), Some(ParcelStatus::Sent));
        assert_eq!(ParcelStatus::Sent.next(), Some(ParcelStatus::Delivered));
        assert_eq!(ParcelStatus::Delivered.next(), None);
    }

    #[test]
    fn only_registered_is_mutable() {
        assert!(ParcelStatus::Registered.is_mutable());
        assert!(!ParcelStatus::Sent.is_mutable());
        assert!(!ParcelStatus::Delivered.is_mutable());
    }

    #[test]
    fn new_parcel_is_registered_with_rfc3339_timestamp() {
        let parcel = Parcel::new(1000, "test");
        assert_eq!(parcel.number, 0);
        assert_eq!(parcel.client, 1000);
        assert_eq!(parcel.status, ParcelStatus::Registered);
        assert_eq!(parcel.address, "test");
        assert!(parcel.created_at.ends_with('Z'));
        DateTime::parse_from_rfc3339(&parcel.created_at).unwrap();
    }

    #[test]
    fn status_serializes_as_plain_text() {
        let parcel = Parcel {
            number: 3,
            client: 1000,
            status: ParcelStatus::from("lost"),
            address: "test".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&parcel).unwrap();
        assert_eq!(json["status"], "lost");

        let back: Parcel = serde_json::from_value(json).unwrap();
        assert_eq!(back, parcel);
        assert_eq!(
            serde_json::from_str::<ParcelStatus>("\"sent\"").unwrap(),
            ParcelStatus::Sent
        );
    }
}
