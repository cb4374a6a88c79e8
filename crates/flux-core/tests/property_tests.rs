//! Property-based tests for flux-core.
//!
//! These tests verify invariants hold for arbitrary inputs using proptest.

use chrono::NaiveDate;
use flux_core::{Granularity, PeriodKey};
use proptest::prelude::*;

fn arb_period() -> impl Strategy<Value = PeriodKey> {
    (1900i32..2200i32, 1u32..13u32).prop_map(|(y, m)| PeriodKey::new(y, m))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2040i32, 1u32..13u32, 1u32..29u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_granularity() -> impl Strategy<Value = Granularity> {
    prop_oneof![
        Just(Granularity::Month),
        Just(Granularity::Quarter),
        Just(Granularity::Year),
    ]
}

proptest! {
    /// Structural ordering agrees with the canonical string ordering.
    #[test]
    fn prop_ordering_matches_canonical_string(a in arb_period(), b in arb_period()) {
        prop_assert_eq!(a.cmp(&b), a.to_string().cmp(&b.to_string()));
    }

    /// Ordering agrees with the arithmetic month index.
    #[test]
    fn prop_ordering_matches_month_index(a in arb_period(), b in arb_period()) {
        prop_assert_eq!(a.cmp(&b), a.month_index().cmp(&b.month_index()));
    }

    /// The canonical string parses back to the same key.
    #[test]
    fn prop_display_parses_back(p in arb_period()) {
        let parsed: PeriodKey = p.to_string().parse().unwrap();
        prop_assert_eq!(parsed, p);
    }

    /// Truncation is idempotent and never moves a period forward.
    #[test]
    fn prop_truncate_idempotent(g in arb_granularity(), d in arb_date()) {
        let period = g.period_of(d);
        prop_assert_eq!(g.truncate(period), period);
        prop_assert!(period <= PeriodKey::from_date(d));
    }

    /// Monthly span equals the month-index difference plus one.
    #[test]
    fn prop_month_span(a in arb_period(), b in arb_period()) {
        let (first, last) = if a <= b { (a, b) } else { (b, a) };
        let span = Granularity::Month.span(first, last);
        prop_assert_eq!(i64::from(span), last.month_index() - first.month_index() + 1);
    }
}
