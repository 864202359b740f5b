//! Business calendar tests: timezone normalization and month arithmetic

use chrono::NaiveDate;
use core_kernel::{days_between, last_day_of_month, Timezone, ReferenceMonth};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_days_between_is_signed() {
    assert_eq!(days_between(date(2024, 3, 1), date(2024, 3, 10)), 9);
    assert_eq!(days_between(date(2024, 3, 10), date(2024, 3, 1)), -9);
    assert_eq!(days_between(date(2024, 3, 1), date(2024, 3, 1)), 0);
}

#[test]
fn test_days_between_crosses_leap_day() {
    assert_eq!(days_between(date(2024, 2, 28), date(2024, 3, 1)), 2);
    assert_eq!(days_between(date(2023, 2, 28), date(2023, 3, 1)), 1);
}

#[test]
fn test_offset_timestamp_normalized_to_local_date() {
    let tz = Timezone::default();
    // 02:30 UTC on the 10th is still the 9th in São Paulo
    assert_eq!(tz.parse_date("2024-03-10T02:30:00+00:00").unwrap(), date(2024, 3, 9));
    // same instant expressed with the local offset
    assert_eq!(tz.parse_date("2024-03-09T23:30:00-03:00").unwrap(), date(2024, 3, 9));
}

#[test]
fn test_utc_timezone_keeps_utc_date() {
    let tz: Timezone = "UTC".parse().unwrap();
    assert_eq!(tz.parse_date("2024-03-10T02:30:00Z").unwrap(), date(2024, 3, 10));
}

#[test]
fn test_unknown_timezone_rejected() {
    assert!("Mars/Olympus".parse::<Timezone>().is_err());
}

#[test]
fn test_timezone_serde_uses_name() {
    let tz = Timezone::default();
    let json = serde_json::to_string(&tz).unwrap();
    assert_eq!(json, "\"America/Sao_Paulo\"");
    let back: Timezone = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tz);
}

#[test]
fn test_last_day_of_month_for_every_month_of_2024() {
    let expected = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    for (i, last) in expected.iter().enumerate() {
        assert_eq!(last_day_of_month(date(2024, i as u32 + 1, 15)), *last);
    }
}

#[test]
fn test_reference_month_serde() {
    let month: ReferenceMonth = serde_json::from_str("\"11/2024\"").unwrap();
    assert_eq!(month.first_day(), Some(date(2024, 11, 1)));
    assert!(month.contains(date(2024, 11, 30)));
    assert!(!month.contains(date(2024, 12, 1)));
    assert_eq!(serde_json::to_string(&month).unwrap(), "\"11/2024\"");
}

#[test]
fn test_reference_months_order_chronologically() {
    let a: ReferenceMonth = "12/2023".parse().unwrap();
    let b: ReferenceMonth = "01/2024".parse().unwrap();
    assert!(a < b);
}
