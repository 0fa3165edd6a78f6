//! Apple platform (iOS/macOS) location implementation using CoreLocation.
//!
//! Positioning reads the location manager's cached fix; geocoding goes
//! through `CLGeocoder`. Geocoder completion handlers are delivered on the
//! main queue, so the geocoding entry points must not be awaited from the
//! main run loop.

use std::sync::mpsc;
use std::time::Duration;

use block2::RcBlock;
use objc2::MainThreadMarker;
use objc2::rc::Retained;
use objc2_core_location::{CLGeocoder, CLLocation, CLLocationManager, CLPlacemark};
use objc2_foundation::{NSArray, NSError, NSString};

use crate::geocode::{Address, Coordinates, GeocodeError, MAX_RESULTS};
use crate::sample::LocationSample;
use crate::{LocationError, LocationResult};

/// How long to wait for a geocoder completion before giving up.
const GEOCODER_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) async fn current_position() -> LocationResult<LocationSample> {
    let Some(_mtm) = MainThreadMarker::new() else {
        return Err(LocationError::Platform {
            message: "CLLocationManager must be used from the main thread".into(),
        });
    };

    let manager = unsafe { CLLocationManager::new() };
    let location = unsafe { manager.location() }.ok_or(LocationError::NotAvailable)?;

    Ok(location_to_sample(&location))
}

fn location_to_sample(location: &CLLocation) -> LocationSample {
    let coordinate = unsafe { location.coordinate() };
    let timestamp = unsafe { location.timestamp() };
    #[allow(clippy::cast_possible_truncation)]
    let timestamp_millis = (unsafe { timestamp.timeIntervalSince1970() } * 1000.0) as i64;

    // CoreLocation reports negative values for estimates it does not have.
    let horizontal_accuracy = unsafe { location.horizontalAccuracy() };
    let vertical_accuracy = unsafe { location.verticalAccuracy() };
    let course = unsafe { location.course() };
    let speed = unsafe { location.speed() };

    LocationSample {
        timestamp_millis,
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
        accuracy: (horizontal_accuracy >= 0.0).then_some(horizontal_accuracy),
        // CoreLocation fuses its sources; it does not name one.
        provider: None,
        altitude: (vertical_accuracy >= 0.0).then(|| unsafe { location.altitude() }),
        heading: (course >= 0.0).then_some(course),
        speed: (speed >= 0.0).then_some(speed),
    }
}

pub(crate) async fn addresses_for_position(
    latitude: f64,
    longitude: f64,
) -> Result<Vec<Address>, GeocodeError> {
    let location = unsafe {
        CLLocation::initWithLatitude_longitude(CLLocation::alloc(), latitude, longitude)
    };
    let geocoder = unsafe { CLGeocoder::new() };

    let (sender, receiver) = mpsc::channel();
    let handler = RcBlock::new(
        move |placemarks: *mut NSArray<CLPlacemark>, error: *mut NSError| {
            let outcome = unsafe { placemarks.as_ref() }.map_or_else(
                || Err(completion_error(error)),
                |placemarks| {
                    Ok(placemarks
                        .iter()
                        .take(MAX_RESULTS as usize)
                        .map(|placemark| placemark_to_address(&placemark))
                        .collect::<Vec<_>>())
                },
            );
            let _ = sender.send(outcome);
        },
    );

    unsafe { geocoder.reverseGeocodeLocation_completionHandler(&location, &handler) };

    receiver
        .recv_timeout(GEOCODER_TIMEOUT)
        .map_err(|_| GeocodeError::Service {
            message: "geocoder completion timed out".into(),
        })?
}

pub(crate) async fn positions_for_address(
    address: &str,
) -> Result<Vec<Coordinates>, GeocodeError> {
    let geocoder = unsafe { CLGeocoder::new() };
    let text = NSString::from_str(address);

    let (sender, receiver) = mpsc::channel();
    let handler = RcBlock::new(
        move |placemarks: *mut NSArray<CLPlacemark>, error: *mut NSError| {
            let outcome = unsafe { placemarks.as_ref() }.map_or_else(
                || Err(completion_error(error)),
                |placemarks| {
                    Ok(placemarks
                        .iter()
                        .take(MAX_RESULTS as usize)
                        .filter_map(|placemark| {
                            let location = unsafe { placemark.location() }?;
                            let coordinate = unsafe { location.coordinate() };
                            Some(Coordinates {
                                latitude: coordinate.latitude,
                                longitude: coordinate.longitude,
                            })
                        })
                        .collect::<Vec<_>>())
                },
            );
            let _ = sender.send(outcome);
        },
    );

    unsafe { geocoder.geocodeAddressString_completionHandler(&text, &handler) };

    receiver
        .recv_timeout(GEOCODER_TIMEOUT)
        .map_err(|_| GeocodeError::Service {
            message: "geocoder completion timed out".into(),
        })?
}

fn placemark_to_address(placemark: &CLPlacemark) -> Address {
    let (latitude, longitude) = unsafe { placemark.location() }.map_or((0.0, 0.0), |location| {
        let coordinate = unsafe { location.coordinate() };
        (coordinate.latitude, coordinate.longitude)
    });

    Address {
        latitude,
        longitude,
        feature_name: string_value(unsafe { placemark.name() }),
        thoroughfare: string_value(unsafe { placemark.thoroughfare() }),
        sub_thoroughfare: string_value(unsafe { placemark.subThoroughfare() }),
        locality: string_value(unsafe { placemark.locality() }),
        sub_locality: string_value(unsafe { placemark.subLocality() }),
        admin_area: string_value(unsafe { placemark.administrativeArea() }),
        sub_admin_area: string_value(unsafe { placemark.subAdministrativeArea() }),
        postal_code: string_value(unsafe { placemark.postalCode() }),
        country_code: string_value(unsafe { placemark.ISOcountryCode() }),
        country_name: string_value(unsafe { placemark.country() }),
    }
}

fn string_value(value: Option<Retained<NSString>>) -> Option<String> {
    value.map(|s| s.to_string())
}

fn completion_error(error: *mut NSError) -> GeocodeError {
    let message = unsafe { error.as_ref() }.map_or_else(
        || "geocoder returned no placemarks".to_owned(),
        |error| error.localizedDescription().to_string(),
    );
    GeocodeError::Service { message }
}
