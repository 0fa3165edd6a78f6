//! Best-position tracking sessions.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::LocationError;
use crate::arbiter::is_better_location;
use crate::sample::LocationSample;

/// Observer notified by a tracking session.
pub trait PositionDelegate: Send + Sync {
    /// Called when the session adopts `sample` as its new best position.
    fn on_position(&self, sample: &LocationSample);

    /// Called when the platform source reports an error.
    fn on_error(&self, error: &LocationError) {
        let _ = error;
    }
}

/// Settings for platform location listening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Minimum time between platform reports, in milliseconds.
    pub min_time_ms: u64,
    /// Minimum distance between platform reports, in meters.
    pub min_distance_m: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_time_ms: 1_000,
            min_distance_m: 0.0,
        }
    }
}

/// A tracking session holding the currently trusted position.
///
/// The session owns the single "current best" slot and updates it only
/// through the arbiter's decision. It performs no locking of its own: one
/// session per consumer, and the consumer serializes access to it.
#[derive(Default)]
pub struct PositionTracker {
    best: Option<LocationSample>,
    delegate: Option<Arc<dyn PositionDelegate>>,
}

impl fmt::Debug for PositionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionTracker")
            .field("best", &self.best)
            .finish()
    }
}

impl PositionTracker {
    /// Create a session with no trusted position yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for adopted positions. Replaces any previous one.
    pub fn set_delegate(&mut self, delegate: Arc<dyn PositionDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Remove the registered observer.
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Offer a new reading to the session.
    ///
    /// Returns `true` and adopts the sample when the arbiter judges it
    /// better than the current best; otherwise discards it and returns
    /// `false`.
    pub fn offer(&mut self, sample: LocationSample) -> bool {
        if !is_better_location(&sample, self.best.as_ref()) {
            trace!(
                "discarding reading from {:?} at {}",
                sample.provider, sample.timestamp_millis
            );
            return false;
        }

        debug!(
            "adopting reading from {:?} at {}",
            sample.provider, sample.timestamp_millis
        );
        if let Some(delegate) = &self.delegate {
            delegate.on_position(&sample);
        }
        self.best = Some(sample);
        true
    }

    /// Forward a platform error to the registered observer.
    pub fn report_error(&self, error: &LocationError) {
        if let Some(delegate) = &self.delegate {
            delegate.on_error(error);
        }
    }

    /// The currently trusted position, if any.
    #[must_use]
    pub fn best(&self) -> Option<&LocationSample> {
        self.best.as_ref()
    }

    /// Take the currently trusted position out of the session.
    pub fn take_best(&mut self) -> Option<LocationSample> {
        self.best.take()
    }

    /// Forget the trusted position; the next reading is adopted untested.
    pub fn reset(&mut self) {
        self.best = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{PositionDelegate, PositionTracker, TrackingConfig};
    use crate::sample::LocationSample;

    fn sample(timestamp_millis: i64, accuracy: f64, provider: &str) -> LocationSample {
        LocationSample {
            timestamp_millis,
            latitude: 48.8584,
            longitude: 2.2945,
            accuracy: Some(accuracy),
            provider: Some(provider.to_owned()),
            ..LocationSample::default()
        }
    }

    #[derive(Default)]
    struct CountingDelegate {
        adopted: AtomicUsize,
    }

    impl PositionDelegate for CountingDelegate {
        fn on_position(&self, _sample: &LocationSample) {
            self.adopted.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn fresh_session_adopts_anything() {
        let mut tracker = PositionTracker::new();
        assert!(tracker.best().is_none());
        assert!(tracker.offer(sample(1_000, 500.0, "network")));
        assert_eq!(tracker.best().unwrap().timestamp_millis, 1_000);
    }

    #[test]
    fn worse_reading_leaves_best_untouched() {
        let mut tracker = PositionTracker::new();
        tracker.offer(sample(10_000, 5.0, "gps"));

        // Newer but significantly less accurate, other provider.
        assert!(!tracker.offer(sample(10_500, 300.0, "network")));
        assert_eq!(tracker.best().unwrap().accuracy, Some(5.0));
        assert_eq!(tracker.best().unwrap().provider.as_deref(), Some("gps"));
    }

    #[test]
    fn better_reading_replaces_best() {
        let mut tracker = PositionTracker::new();
        tracker.offer(sample(10_000, 50.0, "network"));

        assert!(tracker.offer(sample(10_500, 8.0, "gps")));
        assert_eq!(tracker.best().unwrap().provider.as_deref(), Some("gps"));
    }

    #[test]
    fn delegate_fires_only_on_adoption() {
        let delegate = Arc::new(CountingDelegate::default());
        let mut tracker = PositionTracker::new();
        tracker.set_delegate(delegate.clone());

        tracker.offer(sample(10_000, 5.0, "gps"));
        tracker.offer(sample(9_000, 500.0, "network"));
        tracker.offer(sample(10_500, 5.0, "gps"));

        assert_eq!(delegate.adopted.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_forgets_the_best() {
        let mut tracker = PositionTracker::new();
        tracker.offer(sample(1_000_000, 5.0, "gps"));
        tracker.reset();

        // A reading far older than the forgotten best is adopted untested.
        assert!(tracker.offer(sample(1_000, 500.0, "network")));
    }

    #[test]
    fn take_best_empties_the_slot() {
        let mut tracker = PositionTracker::new();
        tracker.offer(sample(1_000, 5.0, "gps"));

        let taken = tracker.take_best();
        assert_eq!(taken.unwrap().timestamp_millis, 1_000);
        assert!(tracker.best().is_none());
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let config = TrackingConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: TrackingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
