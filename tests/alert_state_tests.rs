use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockwatch::services::alert_state::{AlertDecision, AlertStateTracker};

fn fire_indices(prices: &[Decimal], target: Decimal) -> Vec<usize> {
    let mut tracker = AlertStateTracker::new();
    prices
        .iter()
        .enumerate()
        .filter(|(_, p)| tracker.evaluate("TCS.NS", **p, target) == AlertDecision::Fire)
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn stays_quiet_while_price_sits_above_target() {
    let t = dec!(100);
    let fires = fire_indices(&[t - dec!(1), t + dec!(1), t + dec!(1), t + dec!(1)], t);
    assert_eq!(fires, vec![1]);
}

#[test]
fn rearms_after_dipping_below_target() {
    let t = dec!(100);
    let fires = fire_indices(&[t + dec!(1), t - dec!(1), t + dec!(1)], t);
    assert_eq!(fires.len(), 2);
}

#[test]
fn fires_once_per_run_above_target() {
    let fires = fire_indices(&[dec!(99), dec!(101), dec!(101), dec!(99), dec!(101)], dec!(100));
    assert_eq!(fires, vec![1, 4]);
}

#[test]
fn price_equal_to_target_counts_as_reached() {
    let mut tracker = AlertStateTracker::new();
    assert_eq!(tracker.evaluate("INFY.NS", dec!(1500), dec!(1500)), AlertDecision::Fire);
    assert!(tracker.is_fired("INFY.NS"));
}

#[test]
fn symbols_are_tracked_independently() {
    let mut tracker = AlertStateTracker::new();

    assert_eq!(tracker.evaluate("AAA", dec!(60), dec!(50)), AlertDecision::Fire);
    assert_eq!(tracker.evaluate("BBB", dec!(60), dec!(50)), AlertDecision::Fire);
    assert_eq!(tracker.evaluate("AAA", dec!(61), dec!(50)), AlertDecision::NoAction);
    assert_eq!(tracker.evaluate("BBB", dec!(40), dec!(50)), AlertDecision::NoAction);

    assert!(tracker.is_fired("AAA"));
    assert!(!tracker.is_fired("BBB"));
}

#[test]
fn changing_the_target_rearms_the_symbol() {
    let mut tracker = AlertStateTracker::new();

    assert_eq!(tracker.evaluate("TCS", dec!(3150), dec!(3100)), AlertDecision::Fire);
    assert_eq!(tracker.evaluate("TCS", dec!(3250), dec!(3100)), AlertDecision::NoAction);

    // raised target, already above it
    assert_eq!(tracker.evaluate("TCS", dec!(3250), dec!(3200)), AlertDecision::Fire);
}

#[test]
fn retain_drops_unwatched_symbols() {
    let mut tracker = AlertStateTracker::new();
    tracker.evaluate("AAA", dec!(60), dec!(50));
    tracker.evaluate("BBB", dec!(60), dec!(50));

    let keep = vec!["BBB".to_string()];
    tracker.retain_symbols(keep.iter());

    assert_eq!(tracker.len(), 1);
    assert!(!tracker.is_fired("AAA"));
    assert!(tracker.is_fired("BBB"));

    tracker.retain_symbols(std::iter::empty());
    assert!(tracker.is_empty());
}
