//! # GeoKit
//!
//! A cross-platform geolocation plugin for Rust applications.
//!
//! GeoKit provides a unified API for device positioning across Android, iOS,
//! macOS, Windows, and Linux: a shared position model, a location-quality
//! arbiter for merging noisy multi-provider readings, runtime permission
//! handling, and forward/reverse geocoding delegated to the platform.
//!
//! ## Features
//!
//! GeoKit is modular. Enable only the capabilities you need:
//!
//! - `location`: position retrieval, best-position tracking, and geocoding.
//! - `permission`: runtime location-permission checking and requesting.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! geokit = { version = "0.1", features = ["location"] }
//! ```
//!
//! ```rust,ignore
//! use geokit::location::LocationManager;
//!
//! async fn where_am_i() {
//!     if let Ok(position) = LocationManager::current_position().await {
//!         println!("Latitude: {}, Longitude: {}", position.latitude, position.longitude);
//!     }
//! }
//! ```

#[cfg(feature = "location")]
pub use geokit_location as location;

#[cfg(feature = "permission")]
pub use geokit_permission as permission;
