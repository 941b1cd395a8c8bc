//! Adversarial Property-Based Tests for Configuration Parsing
//!
//! # Attack Plan
//!
//! 1. **Timezone Names**: abbreviations, offsets, wrong case, traversal-looking
//!    paths, empty and whitespace values.
//!
//! 2. **Slot Duration Attacks**: negative, float, overflow, scientific notation.
//!
//! 3. **Working Day Lists**: out of range numbers, names, separators, duplicates.
//!
//! 4. **Empty vs Missing Fields**: empty strings behave like missing keys and
//!    take the default.
//!
//! # Invariants
//!
//! - from_getter never panics on any input
//! - validate() never panics (may return Err)
//! - A config that parses only ever holds weekdays 1-7
//! - Partial updates never touch fields they do not name

use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

use slotcheck::config::{BusinessHoursConfig, ConfigUpdate};
use slotcheck::{BusinessHoursValidator, TimeOfDay};

// ============================================================================
// ADVERSARIAL GENERATORS
// ============================================================================

fn suspicious_timezone() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("CET".to_string()),
        Just("UTC".to_string()),
        Just("+01:00".to_string()),
        Just("GMT+1".to_string()),
        Just("europe/paris".to_string()),
        Just("Europe/Paris ".to_string()),
        Just("Europe/Atlantis".to_string()),
        Just("../../etc/localtime".to_string()),
        Just("Europe/Paris\x00".to_string()),
        Just("Paris".to_string()),
    ]
}

fn malformed_duration() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("-30".to_string()),
        Just("30.5".to_string()),
        Just("3e1".to_string()),
        Just("4294967296".to_string()), // u32::MAX + 1
        Just("thirty".to_string()),
        Just("30min".to_string()),
        Just("０".to_string()),
    ]
}

fn malformed_working_days() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("0".to_string()),
        Just("8".to_string()),
        Just("1,2,3,4,5,6,7,8".to_string()),
        Just("-1".to_string()),
        Just("mon,tue".to_string()),
        Just("1;2;3".to_string()),
        Just("1-5".to_string()),
        Just("1.5".to_string()),
    ]
}

// ============================================================================
// INVARIANT: from_getter NEVER PANICS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_timezone_never_panics(tz in suspicious_timezone()) {
        let mut env = HashMap::new();
        env.insert("BUSINESS_TIMEZONE", tz);
        let _ = BusinessHoursConfig::from_getter(|key| env.get(key).cloned());
    }

    #[test]
    fn prop_bad_duration_is_rejected(duration in malformed_duration()) {
        let mut env = HashMap::new();
        env.insert("BUSINESS_SLOT_DURATION", duration);
        let result = BusinessHoursConfig::from_getter(|key| env.get(key).cloned());
        prop_assert!(result.is_err());
    }

    #[test]
    fn prop_bad_working_days_are_rejected(days in malformed_working_days()) {
        let mut env = HashMap::new();
        env.insert("BUSINESS_WORKING_DAYS", days);
        let result = BusinessHoursConfig::from_getter(|key| env.get(key).cloned());
        prop_assert!(result.is_err());
    }

    #[test]
    fn prop_parsed_weekdays_in_range(days in "[0-9, ]{0,20}") {
        let mut env = HashMap::new();
        env.insert("BUSINESS_WORKING_DAYS", days);
        if let Ok(config) = BusinessHoursConfig::from_getter(|key| env.get(key).cloned()) {
            prop_assert!(config.working_days.iter().all(|d| (1..=7).contains(d)));
        }
    }
}

// ============================================================================
// INVARIANT: PARTIAL UPDATES PRESERVE UNNAMED FIELDS
// ============================================================================

proptest! {
    #[test]
    fn prop_update_preserves_other_fields(start in 0u32..(24 * 60), slot in proptest::option::of(1u32..120u32)) {
        let mut v = BusinessHoursValidator::default();
        let before = v.config().clone();

        v.update_config(ConfigUpdate {
            start_time: TimeOfDay::from_minutes(start),
            slot_duration: slot,
            ..Default::default()
        });

        let after = v.config();
        prop_assert_eq!(after.start_time, TimeOfDay::from_minutes(start).unwrap());
        prop_assert_eq!(after.slot_duration, slot.unwrap_or(before.slot_duration));
        prop_assert_eq!(after.end_time, before.end_time);
        prop_assert_eq!(after.timezone, before.timezone);
        prop_assert_eq!(&after.working_days, &before.working_days);
    }
}

// ============================================================================
// NEGATIVE ASSERTIONS
// ============================================================================

#[test]
fn test_timezone_names_are_exact() {
    for tz in ["Europe/Atlantis", "Paris", "+01:00"] {
        let mut env = HashMap::new();
        env.insert("BUSINESS_TIMEZONE", tz);
        assert!(BusinessHoursConfig::from_map(&env).is_err(), "{} should be rejected", tz);
    }

    let mut env = HashMap::new();
    env.insert("BUSINESS_TIMEZONE", "UTC");
    assert_eq!(BusinessHoursConfig::from_map(&env).unwrap().timezone, chrono_tz::UTC);
}

#[test]
fn test_surrounding_whitespace_is_trimmed() {
    let mut env = HashMap::new();
    env.insert("BUSINESS_TIMEZONE", " Europe/Paris ");
    env.insert("BUSINESS_START_TIME", " 09:00\n");
    let config = BusinessHoursConfig::from_map(&env).expect("should parse");
    assert_eq!(config.timezone, chrono_tz::Europe::Paris);
    assert_eq!(config.start_time, TimeOfDay::new(9, 0).unwrap());
}

#[test]
fn test_duplicate_working_days_collapse() {
    let mut env = HashMap::new();
    env.insert("BUSINESS_WORKING_DAYS", "1,1,2,,2");
    let config = BusinessHoursConfig::from_map(&env).expect("should parse");
    assert_eq!(config.working_days, BTreeSet::from([1, 2]));
}

#[test]
fn test_separator_only_working_days_fail_validation() {
    let mut env = HashMap::new();
    env.insert("BUSINESS_WORKING_DAYS", ",,");
    let config = BusinessHoursConfig::from_map(&env).expect("parses to an empty set");
    assert!(config.working_days.is_empty());
    assert!(config.validate().is_err());
}

#[test]
fn test_unknown_update_fields_are_ignored() {
    let update: ConfigUpdate =
        serde_json::from_str(r#"{"slotDuration": 15, "colour": "blue"}"#).expect("should parse");
    assert_eq!(update.slot_duration, Some(15));
}
