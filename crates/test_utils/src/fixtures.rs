//! Fixed test data
//!
//! Deterministic instants and amounts so scenario tests read like the
//! worked examples in the billing runbook.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::Money;
use rust_decimal::Decimal;

/// Common monetary amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Whole-rupee amount
    pub fn rupees(amount: i64) -> Money {
        Money::inr(Decimal::from(amount))
    }
}

/// Common instants
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// "Day zero" of a scenario: a fixed admission morning
    pub fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()
    }

    /// An instant `days` days after [`Self::day0`]
    pub fn day(days: i64) -> DateTime<Utc> {
        Self::day0() + Duration::days(days)
    }

    /// An instant `hours` hours after [`Self::day0`]
    pub fn hours_after(hours: i64) -> DateTime<Utc> {
        Self::day0() + Duration::hours(hours)
    }
}
