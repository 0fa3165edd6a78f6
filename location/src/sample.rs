//! The shared position model.

use serde::{Deserialize, Serialize};

/// One reported position with time, accuracy, and provider metadata.
///
/// Samples are immutable values: a platform source produces one, the
/// caller passes it through the quality arbiter once, and it is either
/// retained as the new best reading or discarded. No ordering exists
/// between samples beyond the arbiter's decision.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationSample {
    /// Capture time in milliseconds since the Unix epoch.
    ///
    /// Monotonic per provider, but not across providers.
    pub timestamp_millis: i64,
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
    /// Radial accuracy in meters. `None` means unknown, which is distinct
    /// from an accuracy of zero.
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Identifier of the originating source (e.g. `"gps"`, `"network"`).
    ///
    /// `None` is a valid, comparable value: two absent providers count as
    /// the same provider, while an absent and a present one never match.
    #[serde(default)]
    pub provider: Option<String>,
    /// Altitude in meters above sea level, if available.
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Direction of travel in degrees clockwise from north, if available.
    #[serde(default)]
    pub heading: Option<f64>,
    /// Ground speed in meters per second, if available.
    #[serde(default)]
    pub speed: Option<f64>,
}

impl LocationSample {
    /// Create a sample with the required fields; everything else is absent.
    #[must_use]
    pub fn new(timestamp_millis: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp_millis,
            latitude,
            longitude,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LocationSample;

    #[test]
    fn provider_equality_is_null_safe() {
        let unnamed = LocationSample::new(0, 0.0, 0.0);
        let gps = LocationSample {
            provider: Some("gps".into()),
            ..LocationSample::new(0, 0.0, 0.0)
        };

        assert_eq!(unnamed.provider, unnamed.clone().provider);
        assert_ne!(unnamed.provider, gps.provider);
        assert_eq!(gps.provider, Some("gps".to_string()));
    }

    #[test]
    fn bridge_payload_with_sparse_fields_deserializes() {
        let json = r#"{"timestamp_millis":1700000000000,"latitude":59.33,"longitude":18.06}"#;
        let sample: LocationSample = serde_json::from_str(json).expect("valid payload");

        assert_eq!(sample.timestamp_millis, 1_700_000_000_000);
        assert_eq!(sample.accuracy, None);
        assert_eq!(sample.provider, None);
        assert_eq!(sample.speed, None);
    }
}
