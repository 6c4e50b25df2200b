//! Chargeable service vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of service a charge line refers to
///
/// Shared by bill items, legacy embedded patient charges, and discharge
/// expense items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    Consultation,
    Medicine,
    LabTest,
    BedCharge,
    Procedure,
    Other,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceType::Consultation => "consultation",
            ServiceType::Medicine => "medicine",
            ServiceType::LabTest => "lab-test",
            ServiceType::BedCharge => "bed-charge",
            ServiceType::Procedure => "procedure",
            ServiceType::Other => "other",
        };
        write!(f, "{}", label)
    }
}
