//! Property-based tests for rust-common crate.
//!
//! These tests verify universal properties across all inputs using proptest.

use proptest::prelude::*;
use rust_common::{Counter, Gauge, Metric, PlatformError, parse_bool, parse_secs, parse_var, render};
use std::collections::HashMap;
use std::time::Duration;

fn env_with(name: &str, value: &str) -> HashMap<String, String> {
    HashMap::from([(name.to_string(), value.to_string())])
}

// Configuration parsing: set values win, unset values fall back, bad values
// are rejected as configuration errors.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_parse_secs_round_trips(secs in 0u64..1_000_000, default in 0u64..1_000) {
        let env = env_with("TIMEOUT_SECS", &secs.to_string());
        let parsed = parse_secs(&env, "TIMEOUT_SECS", default).unwrap();
        prop_assert_eq!(parsed, Duration::from_secs(secs));

        let empty: HashMap<String, String> = HashMap::new();
        let fallback = parse_secs(&empty, "TIMEOUT_SECS", default).unwrap();
        prop_assert_eq!(fallback, Duration::from_secs(default));
    }

    #[test]
    fn prop_parse_var_tolerates_whitespace(value in any::<u16>(), pad in "[ \t]{0,3}") {
        let env = env_with("PORT", &format!("{pad}{value}{pad}"));
        prop_assert_eq!(parse_var(&env, "PORT", 0u16).unwrap(), value);
    }

    #[test]
    fn prop_non_numeric_values_rejected(value in "[a-zA-Z][a-zA-Z ]{0,20}") {
        let env = env_with("TIMEOUT_SECS", &value);
        let err = parse_secs(&env, "TIMEOUT_SECS", 10).unwrap_err();
        prop_assert!(err.is_config(), "Error {:?} should be a config error", err);
        prop_assert!(err.to_string().contains("TIMEOUT_SECS"));
    }

    #[test]
    fn prop_parse_bool_accepts_any_case(
        truthy in prop::sample::select(vec!["true", "1", "yes", "on"]),
        falsy in prop::sample::select(vec!["false", "0", "no", "off"]),
        upper in any::<bool>(),
    ) {
        let case = |s: &str| if upper { s.to_uppercase() } else { s.to_string() };
        prop_assert!(parse_bool(&env_with("FLAG", &case(truthy)), "FLAG", false).unwrap());
        prop_assert!(!parse_bool(&env_with("FLAG", &case(falsy)), "FLAG", true).unwrap());
    }

    #[test]
    fn prop_parse_bool_rejects_garbage(value in "[a-z]{5,12}") {
        prop_assume!(value != "false");
        let result = parse_bool(&env_with("FLAG", &value), "FLAG", false);
        prop_assert!(matches!(result, Err(PlatformError::Config(_))));
    }
}

// Metrics: counters add up exactly and rendering covers every metric.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_counter_sums_increments(increments in prop::collection::vec(0u64..10_000, 0..50)) {
        let counter = Counter::new("requests_total", "Requests");
        for amount in &increments {
            counter.inc_by(*amount);
        }
        counter.inc();
        prop_assert_eq!(counter.get(), increments.iter().sum::<u64>() + 1);
    }

    #[test]
    fn prop_gauge_keeps_last_value(values in prop::collection::vec(any::<u64>(), 1..20)) {
        let gauge = Gauge::new("live", "Live items");
        for value in &values {
            gauge.set(*value);
        }
        prop_assert_eq!(Some(gauge.get()), values.last().copied());
    }

    #[test]
    fn prop_render_includes_every_metric(
        counter_value in 0u64..1_000_000,
        gauge_value in 0u64..1_000_000,
        prefix in "[a-z][a-z_]{0,10}",
    ) {
        let counter = Counter::new(format!("{prefix}_total"), "Counter");
        let gauge = Gauge::new(format!("{prefix}_current"), "Gauge");
        counter.inc_by(counter_value);
        gauge.set(gauge_value);

        let text = render(&[&counter, &gauge]);
        let counter_type = format!("# TYPE {} counter", counter.name());
        let gauge_type = format!("# TYPE {} gauge", gauge.name());
        let counter_sample = format!("{}_total {counter_value}\n", prefix);
        let gauge_sample = format!("{}_current {gauge_value}\n", prefix);
        prop_assert!(text.contains(&counter_type));
        prop_assert!(text.contains(&gauge_type));
        prop_assert!(text.contains(&counter_sample));
        prop_assert!(text.contains(&gauge_sample));
        prop_assert_eq!(text.lines().count(), 6);
    }
}
