//! Cross-platform positioning and geocoding.
//!
//! This crate provides a unified API for device location across iOS, macOS,
//! Android, Windows, and Linux platforms: a shared position model
//! ([`LocationSample`]), a pure location-quality arbiter
//! ([`is_better_location`]) for merging noisy multi-provider readings, a
//! best-position tracking session ([`PositionTracker`]), and forward/reverse
//! geocoding delegated to the platform ([`geocode`]).

#![warn(missing_docs)]

pub mod arbiter;
pub mod geocode;
pub mod sample;
/// Platform-specific implementations.
pub mod sys;
pub mod tracker;

pub use arbiter::is_better_location;
pub use geokit_permission::{Permission, PermissionStatus};
pub use sample::LocationSample;
pub use tracker::{PositionDelegate, PositionTracker, TrackingConfig};

use log::warn;

/// Errors that can occur when accessing location.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LocationError {
    /// Location permission was not granted.
    #[error("location permission denied")]
    PermissionDenied,
    /// Location services are disabled on the device.
    #[error("location services disabled")]
    ServiceDisabled,
    /// Location request timed out.
    #[error("location request timed out")]
    Timeout,
    /// Location is not available.
    #[error("location not available")]
    NotAvailable,
    /// An error reported by the underlying platform.
    #[error("platform error: {message}")]
    Platform {
        /// Platform-reported failure description.
        message: String,
    },
    /// A bridge payload could not be serialized or deserialized.
    #[error("serialization error: {message}")]
    Serialization {
        /// Underlying serde failure description.
        message: String,
    },
}

/// Convenience alias for location operations.
pub type LocationResult<T> = Result<T, LocationError>;

/// Manager for one-shot position retrieval.
#[derive(Debug)]
pub struct LocationManager;

impl LocationManager {
    /// Get the current device position.
    ///
    /// This will request location permission if not already granted.
    ///
    /// # Errors
    /// Returns [`LocationError::PermissionDenied`] when the user declines
    /// the permission, or a platform error from the location source.
    pub async fn current_position() -> LocationResult<LocationSample> {
        let status = geokit_permission::check(Permission::LocationWhenInUse).await;
        if status != PermissionStatus::Granted {
            let status = geokit_permission::request(Permission::LocationWhenInUse)
                .await
                .map_err(|e| LocationError::Platform {
                    message: e.to_string(),
                })?;

            if status != PermissionStatus::Granted {
                warn!("location permission denied, no position available");
                return Err(LocationError::PermissionDenied);
            }
        }

        sys::current_position().await
    }

    /// Get the current position without checking permissions.
    ///
    /// Use this if you've already verified permission status.
    ///
    /// # Errors
    /// Returns a platform error from the location source.
    pub async fn current_position_unchecked() -> LocationResult<LocationSample> {
        sys::current_position().await
    }
}
