//! Platform-specific location implementations.

#[cfg(any(target_os = "ios", target_os = "macos"))]
mod apple;

/// Android platform implementation.
#[cfg(target_os = "android")]
pub mod android;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
mod linux;

// Re-export platform implementations
#[cfg(any(target_os = "ios", target_os = "macos"))]
pub(crate) use apple::{addresses_for_position, current_position, positions_for_address};

#[cfg(target_os = "android")]
pub(crate) use android::{addresses_for_position, current_position, positions_for_address};

#[cfg(target_os = "windows")]
pub(crate) use windows::{addresses_for_position, current_position, positions_for_address};

#[cfg(target_os = "linux")]
pub(crate) use linux::{addresses_for_position, current_position, positions_for_address};

// Fallback for unsupported platforms
#[cfg(not(any(
    target_os = "ios",
    target_os = "macos",
    target_os = "android",
    target_os = "windows",
    target_os = "linux"
)))]
pub(crate) async fn current_position() -> crate::LocationResult<crate::LocationSample> {
    Err(crate::LocationError::NotAvailable)
}

#[cfg(not(any(
    target_os = "ios",
    target_os = "macos",
    target_os = "android",
    target_os = "windows",
    target_os = "linux"
)))]
pub(crate) async fn addresses_for_position(
    _latitude: f64,
    _longitude: f64,
) -> Result<Vec<crate::geocode::Address>, crate::geocode::GeocodeError> {
    Err(crate::geocode::GeocodeError::NotSupported)
}

#[cfg(not(any(
    target_os = "ios",
    target_os = "macos",
    target_os = "android",
    target_os = "windows",
    target_os = "linux"
)))]
pub(crate) async fn positions_for_address(
    _address: &str,
) -> Result<Vec<crate::geocode::Coordinates>, crate::geocode::GeocodeError> {
    Err(crate::geocode::GeocodeError::NotSupported)
}
