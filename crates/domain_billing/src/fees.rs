//! Fee schedule
//!
//! Consultation fees depend on the appointment type and the doctor's
//! specialization; bed rates and the tax rate round out the schedule.
//! Defaults are compiled in and can be overridden per deployment through
//! `HOSPITAL_*` environment variables.

use core_kernel::{Money, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_records::AppointmentType;

use crate::error::BillingError;

/// The hospital's fee schedule
#[derive(Debug, Clone, PartialEq)]
pub struct FeeSchedule {
    /// Default consultation fee
    pub consultation: Money,
    /// Follow-up visit fee
    pub follow_up: Money,
    /// Emergency visit fee
    pub emergency: Money,
    /// Consultation fee for specialist doctors
    pub specialist: Money,
    /// Specializations billed at the specialist rate
    pub specialist_specialties: Vec<String>,
    /// Bed rate used when assignment does not specify one
    pub default_bed_rate_per_day: Money,
    /// Tax applied to bills (zero: medical services are untaxed by policy)
    pub tax_rate: Rate,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            consultation: Money::inr(dec!(500)),
            follow_up: Money::inr(dec!(300)),
            emergency: Money::inr(dec!(1200)),
            specialist: Money::inr(dec!(800)),
            specialist_specialties: [
                "cardiology",
                "neurology",
                "orthopedics",
                "oncology",
                "nephrology",
                "gastroenterology",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            default_bed_rate_per_day: Money::inr(dec!(200)),
            tax_rate: Rate::zero(),
        }
    }
}

impl FeeSchedule {
    /// Loads the schedule, layering `HOSPITAL_*` environment overrides
    /// over the compiled defaults
    ///
    /// Recognized keys: `HOSPITAL_CONSULTATION_FEE`, `HOSPITAL_FOLLOW_UP_FEE`,
    /// `HOSPITAL_EMERGENCY_FEE`, `HOSPITAL_SPECIALIST_FEE`,
    /// `HOSPITAL_BED_RATE_PER_DAY`, `HOSPITAL_TAX_RATE_PERCENT`.
    pub fn from_env() -> Result<Self, BillingError> {
        dotenvy::dotenv().ok();
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("HOSPITAL"))
            .build()
            .map_err(|e| BillingError::Configuration(e.to_string()))?;

        let mut schedule = Self::default();
        if let Some(v) = Self::amount(&cfg, "consultation_fee")? {
            schedule.consultation = v;
        }
        if let Some(v) = Self::amount(&cfg, "follow_up_fee")? {
            schedule.follow_up = v;
        }
        if let Some(v) = Self::amount(&cfg, "emergency_fee")? {
            schedule.emergency = v;
        }
        if let Some(v) = Self::amount(&cfg, "specialist_fee")? {
            schedule.specialist = v;
        }
        if let Some(v) = Self::amount(&cfg, "bed_rate_per_day")? {
            schedule.default_bed_rate_per_day = v;
        }
        if let Ok(percent) = cfg.get_string("tax_rate_percent") {
            let parsed: Decimal = percent
                .parse()
                .map_err(|_| BillingError::Configuration(format!("bad tax rate: {percent}")))?;
            schedule.tax_rate = Rate::from_percentage(parsed);
        }
        Ok(schedule)
    }

    fn amount(cfg: &config::Config, key: &str) -> Result<Option<Money>, BillingError> {
        match cfg.get_string(key) {
            Ok(raw) => {
                let parsed: Decimal = raw
                    .parse()
                    .map_err(|_| BillingError::Configuration(format!("bad amount for {key}: {raw}")))?;
                Ok(Some(Money::inr(parsed)))
            }
            Err(_) => Ok(None),
        }
    }

    /// Resolves the consultation fee for an appointment
    ///
    /// Follow-up and emergency rates are flat. Standard consultations are
    /// billed at the specialist rate when the doctor's specialization is
    /// on the specialist list.
    pub fn consultation_fee(
        &self,
        appointment_type: AppointmentType,
        doctor_specialization: Option<&str>,
    ) -> Money {
        match appointment_type {
            AppointmentType::FollowUp => self.follow_up,
            AppointmentType::Emergency => self.emergency,
            AppointmentType::Consultation => {
                let is_specialist = doctor_specialization
                    .map(|s| {
                        self.specialist_specialties
                            .iter()
                            .any(|sp| sp.eq_ignore_ascii_case(s.trim()))
                    })
                    .unwrap_or(false);
                if is_specialist {
                    self.specialist
                } else {
                    self.consultation
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_by_appointment_type() {
        let fees = FeeSchedule::default();

        assert_eq!(
            fees.consultation_fee(AppointmentType::FollowUp, None),
            Money::inr(dec!(300))
        );
        assert_eq!(
            fees.consultation_fee(AppointmentType::Emergency, Some("cardiology")),
            Money::inr(dec!(1200))
        );
        assert_eq!(
            fees.consultation_fee(AppointmentType::Consultation, None),
            Money::inr(dec!(500))
        );
    }

    #[test]
    fn test_specialist_rate_matches_list_case_insensitively() {
        let fees = FeeSchedule::default();

        assert_eq!(
            fees.consultation_fee(AppointmentType::Consultation, Some("Cardiology")),
            Money::inr(dec!(800))
        );
        assert_eq!(
            fees.consultation_fee(AppointmentType::Consultation, Some("general medicine")),
            Money::inr(dec!(500))
        );
    }
}
