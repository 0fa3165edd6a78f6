//! Forward and reverse geocoding, delegated to the platform.
//!
//! Geocoding is a service of the host OS (Android `Geocoder`, Apple
//! `CLGeocoder`, Windows `MapLocationFinder`); this module only shapes the
//! requests and maps the results. Traditional Linux has no system geocoder
//! and reports [`GeocodeError::NotSupported`].

use serde::{Deserialize, Serialize};

use crate::sys;

/// Most candidates a single lookup asks the platform for.
pub const MAX_RESULTS: i32 = 10;

/// A civic address resolved from a coordinate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    /// Latitude of the resolved address.
    pub latitude: f64,
    /// Longitude of the resolved address.
    pub longitude: f64,
    /// Name of the nearest feature (building, landmark), if known.
    #[serde(default)]
    pub feature_name: Option<String>,
    /// Street name.
    #[serde(default)]
    pub thoroughfare: Option<String>,
    /// Street number or similar sub-street designator.
    #[serde(default)]
    pub sub_thoroughfare: Option<String>,
    /// City or town.
    #[serde(default)]
    pub locality: Option<String>,
    /// Neighborhood or district within the locality.
    #[serde(default)]
    pub sub_locality: Option<String>,
    /// State, province, or region.
    #[serde(default)]
    pub admin_area: Option<String>,
    /// County or similar subdivision of the admin area.
    #[serde(default)]
    pub sub_admin_area: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub postal_code: Option<String>,
    /// ISO country code.
    #[serde(default)]
    pub country_code: Option<String>,
    /// Country name.
    #[serde(default)]
    pub country_name: Option<String>,
}

/// A coordinate resolved from address text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Errors that can occur when geocoding.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeocodeError {
    /// No geocoding service exists on this platform.
    #[error("geocoding not supported on this platform")]
    NotSupported,
    /// The request was malformed and never reached the platform.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The platform geocoding service failed.
    #[error("geocoder failure: {message}")]
    Service {
        /// Platform-reported failure description.
        message: String,
    },
}

/// Resolve a coordinate to candidate civic addresses.
///
/// Returns at most [`MAX_RESULTS`] candidates; an empty list is a valid
/// outcome for a coordinate the service knows nothing about.
///
/// # Errors
/// Returns a [`GeocodeError`] when the platform service fails or does not
/// exist.
pub async fn addresses_for_position(
    latitude: f64,
    longitude: f64,
) -> Result<Vec<Address>, GeocodeError> {
    sys::addresses_for_position(latitude, longitude).await
}

/// Resolve free-form address text to candidate coordinates.
///
/// Returns at most [`MAX_RESULTS`] candidates; an empty list is a valid
/// outcome for text the service cannot place.
///
/// # Errors
/// Returns [`GeocodeError::InvalidInput`] for empty address text, or a
/// platform error from the geocoding service.
pub async fn positions_for_address(address: &str) -> Result<Vec<Coordinates>, GeocodeError> {
    if address.trim().is_empty() {
        return Err(GeocodeError::InvalidInput("address text is empty".into()));
    }

    sys::positions_for_address(address).await
}

#[cfg(test)]
mod tests {
    use super::positions_for_address;

    #[tokio::test]
    async fn empty_address_is_rejected_before_reaching_the_platform() {
        let result = positions_for_address("   ").await;
        assert!(matches!(
            result,
            Err(super::GeocodeError::InvalidInput(_))
        ));
    }
}
