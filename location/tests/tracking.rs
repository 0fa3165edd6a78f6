//! End-to-end tests of the best-position tracking surface: a session fed a
//! noisy multi-provider stream should retain the readings a consumer would
//! trust.

use geokit_location::{LocationSample, PositionTracker, is_better_location};

fn reading(timestamp_millis: i64, accuracy: f64, provider: &str) -> LocationSample {
    LocationSample {
        timestamp_millis,
        latitude: 40.7484,
        longitude: -73.9857,
        accuracy: Some(accuracy),
        provider: Some(provider.to_owned()),
        ..LocationSample::default()
    }
}

#[test]
fn gps_fix_survives_network_noise_within_the_window() {
    let mut tracker = PositionTracker::new();

    // First fix of the session: coarse network position.
    assert!(tracker.offer(reading(0, 800.0, "network")));
    // GPS comes up with a sharp fix.
    assert!(tracker.offer(reading(5_000, 8.0, "gps")));

    // Coarse network readings keep arriving; none should displace the fix.
    assert!(!tracker.offer(reading(10_000, 600.0, "network")));
    assert!(!tracker.offer(reading(20_000, 750.0, "network")));
    assert!(!tracker.offer(reading(30_000, 500.0, "network")));

    let best = tracker.best().expect("session holds a fix");
    assert_eq!(best.provider.as_deref(), Some("gps"));
    assert_eq!(best.timestamp_millis, 5_000);
}

#[test]
fn long_gps_outage_lets_the_network_take_over() {
    let mut tracker = PositionTracker::new();
    tracker.offer(reading(0, 8.0, "gps"));

    // After more than two minutes of GPS silence, even a coarse network
    // reading is more trustworthy than the stale fix.
    assert!(tracker.offer(reading(121_000, 800.0, "network")));
    assert_eq!(
        tracker.best().unwrap().provider.as_deref(),
        Some("network")
    );
}

#[test]
fn out_of_order_delivery_does_not_regress_the_fix() {
    let mut tracker = PositionTracker::new();
    tracker.offer(reading(60_000, 10.0, "gps"));

    // A delayed, equally accurate reading captured earlier arrives late.
    assert!(!tracker.offer(reading(55_000, 10.0, "gps")));
    // Unless it is sharper than what we hold.
    assert!(tracker.offer(reading(55_000, 3.0, "gps")));

    assert_eq!(tracker.best().unwrap().accuracy, Some(3.0));
}

#[test]
fn gps_drift_on_the_same_provider_is_tolerated_up_to_the_threshold() {
    let mut tracker = PositionTracker::new();
    tracker.offer(reading(0, 10.0, "gps"));

    // Same provider, newer, degraded but within 200 m: follow the provider.
    assert!(tracker.offer(reading(1_000, 180.0, "gps")));
    // Degradation beyond 200 m is rejected inside the window.
    assert!(!tracker.offer(reading(2_000, 450.0, "gps")));
}

#[test]
fn arbiter_and_tracker_agree() {
    let stream = [
        reading(0, 500.0, "network"),
        reading(1_000, 20.0, "gps"),
        reading(2_000, 700.0, "network"),
        reading(130_000, 900.0, "network"),
        reading(131_000, 15.0, "gps"),
    ];

    let mut tracker = PositionTracker::new();
    let mut shadow: Option<LocationSample> = None;

    for sample in stream {
        let expected = is_better_location(&sample, shadow.as_ref());
        assert_eq!(tracker.offer(sample.clone()), expected);
        if expected {
            shadow = Some(sample);
        }
    }

    assert_eq!(tracker.best(), shadow.as_ref());
}
