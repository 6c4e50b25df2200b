//! Strongly-typed identifiers for domain entities
//!
//! Newtype wrappers around UUIDs prevent accidental mixing of identifier
//! types: a `BedId` can never be passed where a `PatientId` is expected.
//! The human-readable UHID used on patient wristbands and registration
//! desks is a separate value type with its own format.

use chrono::{DateTime, Utc, Datelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Uuid);

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

// Clinical entities
define_id!(PatientId, "PAT");
define_id!(BedId, "BED");
define_id!(AppointmentId, "APT");
define_id!(PrescriptionId, "RX");
define_id!(LabOrderId, "LAB");

// Billing and supply entities
define_id!(BillId, "BIL");
define_id!(InventoryItemId, "ITM");

// Staff (doctors, receptionists) referenced by audit fields
define_id!(StaffId, "STF");

/// Errors parsing a UHID
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UhidError {
    #[error("Invalid UHID format: {0} (expected UHID-YYYYMM-NNNNN)")]
    InvalidFormat(String),
}

/// Unique Hospital Identifier: the human-readable patient id
///
/// Format `UHID-YYYYMM-NNNNN`, where `YYYYMM` is the registration month and
/// `NNNNN` a zero-padded sequence number within that month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uhid(String);

impl Uhid {
    /// Builds a UHID from a registration instant and per-month sequence
    pub fn generate(registered_at: DateTime<Utc>, sequence: u32) -> Self {
        Self(format!(
            "UHID-{:04}{:02}-{:05}",
            registered_at.year(),
            registered_at.month(),
            sequence
        ))
    }

    /// Returns the UHID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uhid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uhid {
    type Err = UhidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        let valid = parts.len() == 3
            && parts[0] == "UHID"
            && parts[1].len() == 6
            && parts[1].chars().all(|c| c.is_ascii_digit())
            && parts[2].len() == 5
            && parts[2].chars().all(|c| c.is_ascii_digit());

        if !valid {
            return Err(UhidError::InvalidFormat(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}
