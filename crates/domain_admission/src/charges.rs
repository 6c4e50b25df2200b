//! Bed charge calculation
//!
//! A stay is billed in whole bed-days: `max(1, ceil(hours / 24))`.
//! Same-day discharge still charges one day.

use chrono::{DateTime, Utc};
use core_kernel::Money;
use rust_decimal::Decimal;

use domain_records::Patient;

const SECONDS_PER_DAY: i64 = 86_400;

/// A computed bed charge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BedCharge {
    pub days: u32,
    pub rate_per_day: Money,
    pub total: Money,
}

/// Number of chargeable bed-days between assignment and discharge
pub fn bed_days(assigned_at: DateTime<Utc>, discharge_at: DateTime<Utc>) -> u32 {
    let seconds = (discharge_at - assigned_at).num_seconds().max(0);
    let days = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    days.max(1) as u32
}

/// Computes the charge for a stay at a daily rate
pub fn bed_charge(
    assigned_at: DateTime<Utc>,
    discharge_at: DateTime<Utc>,
    rate_per_day: Money,
) -> BedCharge {
    let days = bed_days(assigned_at, discharge_at);
    BedCharge {
        days,
        rate_per_day,
        total: rate_per_day.multiply(Decimal::from(days)),
    }
}

/// Computes the bed charge for a patient's current stay
///
/// Returns `None` when the patient has no bed assignment on record.
/// `fallback_rate` covers legacy patient documents assigned before the
/// rate started being stamped at assignment time.
pub fn calculate_bed_charges(
    patient: &Patient,
    discharge_at: DateTime<Utc>,
    fallback_rate: Money,
) -> Option<BedCharge> {
    let assigned_at = patient.bed_assigned_at?;
    patient.assigned_bed.as_ref()?;
    let rate = patient.bed_rate_per_day.unwrap_or(fallback_rate);
    Some(bed_charge(assigned_at, discharge_at, rate))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    proptest! {
        /// charge = max(1, ceil(hours/24)) * rate, for any stay length
        #[test]
        fn bed_days_matches_ceiling_formula(hours in 0i64..24 * 400) {
            let start = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc);
            let days = bed_days(start, start + Duration::hours(hours));

            let expected = std::cmp::max(1, (hours + 23) / 24) as u32;
            prop_assert_eq!(days, expected);
        }

        /// Charging is monotonic: a longer stay never costs less
        #[test]
        fn bed_days_is_monotonic(a in 0i64..10_000, b in 0i64..10_000) {
            let start = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc);
            let (short, long) = if a <= b { (a, b) } else { (b, a) };

            prop_assert!(
                bed_days(start, start + Duration::hours(short))
                    <= bed_days(start, start + Duration::hours(long))
            );
        }
    }
}
