//! Cross-module kernel behavior: serde shapes and money arithmetic as
//! they occur in real store documents

use core_kernel::{AppointmentId, Currency, Money, PatientId, Rate, TimeSlot, Uhid};
use rust_decimal_macros::dec;
use serde_json::json;

#[test]
fn test_ids_serialize_as_bare_uuids_in_documents() {
    // Documents store the raw UUID; the display prefix is a UI concern.
    let id = PatientId::new();
    let value = serde_json::to_value(id).unwrap();
    assert_eq!(value, json!(id.as_uuid().to_string()));

    let back: PatientId = serde_json::from_value(value).unwrap();
    assert_eq!(back, id);
}

#[test]
fn test_time_slot_round_trips_through_json_string() {
    let slot: TimeSlot = "14:00-14:30".parse().unwrap();
    let value = serde_json::to_value(slot).unwrap();
    assert_eq!(value, json!("14:00-14:30"));

    let back: TimeSlot = serde_json::from_value(value).unwrap();
    assert_eq!(back, slot);

    let bad: Result<TimeSlot, _> = serde_json::from_value(json!("14:30-14:00"));
    assert!(bad.is_err());
}

#[test]
fn test_uhid_survives_document_round_trip() {
    let uhid: Uhid = "UHID-202403-00042".parse().unwrap();
    let value = serde_json::to_value(&uhid).unwrap();
    let back: Uhid = serde_json::from_value(value).unwrap();
    assert_eq!(back, uhid);
}

#[test]
fn test_money_amounts_round_to_two_decimals() {
    let fee = Money::inr(dec!(333.333));
    assert_eq!(fee.amount(), dec!(333.33));

    let scaled = Money::inr(dec!(10)).multiply(dec!(0.333));
    assert_eq!(scaled.amount(), dec!(3.33));
}

#[test]
fn test_money_sum_and_clamp_over_line_items() {
    let items = [
        Money::inr(dec!(2000)),
        Money::inr(dec!(500)),
        Money::inr(dec!(150)),
    ];
    let subtotal: Money = items.into_iter().sum();
    assert_eq!(subtotal, Money::inr(dec!(2650)));

    let discounted = (subtotal - Money::inr(dec!(3000))).clamp_non_negative();
    assert_eq!(discounted, Money::zero(Currency::INR));
}

#[test]
fn test_zero_rate_yields_zero_tax() {
    let subtotal = Money::inr(dec!(2650));
    assert_eq!(Rate::zero().apply(&subtotal), Money::zero(Currency::INR));
    assert_eq!(
        Rate::from_percentage(dec!(18)).apply(&subtotal),
        Money::inr(dec!(477))
    );
}

#[test]
fn test_distinct_id_types_share_display_convention() {
    let appointment = AppointmentId::new();
    assert!(appointment.to_string().starts_with("APT-"));
    let parsed: AppointmentId = appointment.to_string().parse().unwrap();
    assert_eq!(parsed, appointment);
}
