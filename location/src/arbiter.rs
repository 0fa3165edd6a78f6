//! The location-quality arbiter.
//!
//! Providers report at irregular intervals and out of order, so the most
//! recent reading is not automatically the most trustworthy one. The
//! arbiter compares a candidate reading against the currently held best
//! reading and decides which to keep, layering a time-significance gate,
//! an accuracy gate, and a same-provider tie-break.

use crate::sample::LocationSample;

/// Readings more than this much newer always win; readings more than this
/// much older always lose.
const SIGNIFICANT_TIME_DELTA_MS: i64 = 120_000;

/// Accuracy loss beyond this many meters disqualifies a newer reading
/// unless it is significantly newer.
const SIGNIFICANT_ACCURACY_LOSS_M: i64 = 200;

/// Decide whether `candidate` should replace `current_best`.
///
/// Pure and side-effect free: the decision depends only on the two inputs,
/// so concurrent calls need no coordination. The caller owns the single
/// "current best" slot and is responsible for serializing updates to it
/// (see [`PositionTracker`](crate::tracker::PositionTracker)).
///
/// Rules, first match wins:
/// 1. No current best: any reading beats none.
/// 2. More than two minutes newer: the user has likely moved, take it.
/// 3. More than two minutes older: stale, drop it.
/// 4. Strictly more accurate: take it.
/// 5. Newer and no less accurate: take it.
/// 6. Newer, same provider, and accuracy loss within 200 m: take it.
/// 7. Otherwise keep the current best.
///
/// Unknown accuracy is compared as zero meters, the value providers report
/// when they have no estimate. A sample of unknown accuracy therefore
/// compares as if it were perfectly accurate.
#[must_use]
pub fn is_better_location(
    candidate: &LocationSample,
    current_best: Option<&LocationSample>,
) -> bool {
    let Some(best) = current_best else {
        return true;
    };

    let time_delta = candidate.timestamp_millis - best.timestamp_millis;
    if time_delta > SIGNIFICANT_TIME_DELTA_MS {
        return true;
    }
    if time_delta < -SIGNIFICANT_TIME_DELTA_MS {
        return false;
    }

    let is_newer = time_delta > 0;

    // Whole meters, truncated toward zero; unknown accuracy enters as 0.
    #[allow(clippy::cast_possible_truncation)]
    let accuracy_delta =
        (candidate.accuracy.unwrap_or(0.0) - best.accuracy.unwrap_or(0.0)) as i64;
    let is_less_accurate = accuracy_delta > 0;
    let is_more_accurate = accuracy_delta < 0;
    let is_significantly_less_accurate = accuracy_delta > SIGNIFICANT_ACCURACY_LOSS_M;

    let is_from_same_provider = candidate.provider == best.provider;

    if is_more_accurate {
        return true;
    }
    if is_newer && !is_less_accurate {
        return true;
    }
    if is_newer && !is_significantly_less_accurate && is_from_same_provider {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::is_better_location;
    use crate::sample::LocationSample;

    fn sample(timestamp_millis: i64, accuracy: Option<f64>, provider: Option<&str>) -> LocationSample {
        LocationSample {
            timestamp_millis,
            latitude: 59.3293,
            longitude: 18.0686,
            accuracy,
            provider: provider.map(str::to_owned),
            ..LocationSample::default()
        }
    }

    #[test]
    fn anything_beats_nothing() {
        let candidate = sample(1_000, None, None);
        assert!(is_better_location(&candidate, None));
    }

    #[test]
    fn significantly_newer_wins_regardless_of_accuracy_and_provider() {
        let best = sample(1_000, Some(10.0), Some("gps"));
        let candidate = sample(1_000 + 121_000, Some(50.0), Some("network"));
        assert!(is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn significantly_older_loses_regardless_of_accuracy_and_provider() {
        let best = sample(500_000, Some(500.0), Some("network"));
        let candidate = sample(500_000 - 121_000, Some(1.0), Some("network"));
        assert!(!is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn exactly_two_minutes_newer_is_not_significant() {
        // At exactly the threshold the accuracy rules still apply: newer but
        // significantly less accurate from another provider is rejected.
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(10_000 + 120_000, Some(400.0), Some("network"));
        assert!(!is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn more_accurate_wins_even_when_older() {
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(9_000, Some(1.0), Some("gps"));
        assert!(is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn newer_and_equally_accurate_wins() {
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(10_500, Some(5.0), Some("gps"));
        assert!(is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn newer_with_small_accuracy_loss_wins_on_same_provider() {
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(10_500, Some(150.0), Some("gps"));
        assert!(is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn newer_with_small_accuracy_loss_loses_on_other_provider() {
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(10_500, Some(150.0), Some("network"));
        assert!(!is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn newer_but_significantly_less_accurate_loses_even_on_same_provider() {
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(10_500, Some(300.0), Some("gps"));
        assert!(!is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn accuracy_loss_of_exactly_200_is_not_significant() {
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(10_500, Some(205.0), Some("gps"));
        assert!(is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn newer_but_significantly_less_accurate_from_other_provider_loses() {
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(10_500, Some(300.0), Some("network"));
        assert!(!is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn same_age_and_accuracy_is_not_better() {
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(10_000, Some(5.0), Some("gps"));
        assert!(!is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn older_within_window_and_not_more_accurate_loses() {
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(9_000, Some(5.0), Some("gps"));
        assert!(!is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn absent_providers_count_as_the_same_provider() {
        let best = sample(10_000, Some(5.0), None);
        // Newer, accuracy loss under 200 m, same (absent) provider.
        let candidate = sample(10_500, Some(150.0), None);
        assert!(is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn absent_and_present_providers_never_match() {
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(10_500, Some(150.0), None);
        assert!(!is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn unknown_accuracy_compares_as_zero() {
        // The candidate's unknown accuracy subtracts as 0, so against a best
        // of 30 m the delta is negative and the candidate counts as more
        // accurate, even though it is older.
        let best = sample(10_000, Some(30.0), Some("gps"));
        let candidate = sample(9_500, None, Some("gps"));
        assert!(is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn known_accuracy_loses_to_unknown_best_within_window() {
        // The best's unknown accuracy subtracts as 0, so any candidate with
        // a real accuracy estimate reads as less accurate.
        let best = sample(10_000, None, Some("gps"));
        let candidate = sample(9_500, Some(10.0), Some("gps"));
        assert!(!is_better_location(&candidate, Some(&best)));
    }

    #[test]
    fn fractional_accuracy_delta_truncates_toward_zero() {
        // A loss of 0.9 m truncates to 0, which does not count as less
        // accurate, so the newer reading wins.
        let best = sample(10_000, Some(5.0), Some("gps"));
        let candidate = sample(10_500, Some(5.9), Some("network"));
        assert!(is_better_location(&candidate, Some(&best)));
    }
}
