//! Windows location implementation using WinRT.
//!
//! Positioning goes through `Windows.Devices.Geolocation.Geolocator`;
//! geocoding through `Windows.Services.Maps.MapLocationFinder`.

use windows::Devices::Geolocation::{BasicGeoposition, Geolocator, Geopoint, PositionSource};
use windows::Services::Maps::{MapLocationFinder, MapLocationFinderStatus};
use windows::core::HSTRING;

use crate::geocode::{Address, Coordinates, GeocodeError, MAX_RESULTS};
use crate::sample::LocationSample;
use crate::{LocationError, LocationResult};

/// Offset between the Windows epoch (1601) and the Unix epoch (1970), in
/// milliseconds.
const WINDOWS_EPOCH_OFFSET_MS: i64 = 11_644_473_600_000;

/// `DateTime.UniversalTime` ticks are 100 ns.
const TICKS_PER_MS: i64 = 10_000;

pub(crate) async fn current_position() -> LocationResult<LocationSample> {
    let geolocator = Geolocator::new().map_err(map_platform_error)?;

    let position = geolocator
        .GetGeopositionAsync()
        .map_err(map_platform_error)?
        .get()
        .map_err(map_platform_error)?;

    let coord = position.Coordinate().map_err(map_platform_error)?;
    let point = coord.Point().map_err(map_platform_error)?;
    let pos = point.Position().map_err(map_platform_error)?;

    let timestamp_millis = coord
        .Timestamp()
        .map_err(map_platform_error)?
        .UniversalTime
        / TICKS_PER_MS
        - WINDOWS_EPOCH_OFFSET_MS;

    let accuracy = coord.Accuracy().ok();
    let heading = coord.Heading().ok().and_then(|h| h.Value().ok());
    let speed = coord.Speed().ok().and_then(|s| s.Value().ok());
    let provider = coord.PositionSource().ok().map(source_name);

    Ok(LocationSample {
        timestamp_millis,
        latitude: pos.Latitude,
        longitude: pos.Longitude,
        accuracy,
        provider: provider.map(str::to_owned),
        altitude: Some(pos.Altitude),
        heading,
        speed,
    })
}

fn source_name(source: PositionSource) -> &'static str {
    match source {
        PositionSource::Satellite => "satellite",
        PositionSource::Cellular => "cellular",
        PositionSource::WiFi => "wifi",
        PositionSource::IPAddress => "ipaddress",
        PositionSource::Obfuscated => "obfuscated",
        _ => "unknown",
    }
}

pub(crate) async fn addresses_for_position(
    latitude: f64,
    longitude: f64,
) -> Result<Vec<Address>, GeocodeError> {
    let position = BasicGeoposition {
        Latitude: latitude,
        Longitude: longitude,
        Altitude: 0.0,
    };
    let point = Geopoint::Create(position).map_err(map_geocode_error)?;

    let result = MapLocationFinder::FindLocationsAtAsync(&point)
        .map_err(map_geocode_error)?
        .get()
        .map_err(map_geocode_error)?;

    if result.Status().map_err(map_geocode_error)? != MapLocationFinderStatus::Success {
        return Err(GeocodeError::Service {
            message: format!("MapLocationFinder status {:?}", result.Status()),
        });
    }

    let locations = result.Locations().map_err(map_geocode_error)?;
    let mut addresses = Vec::new();
    for location in &locations {
        if addresses.len() >= MAX_RESULTS as usize {
            break;
        }

        let map_address = location.Address().map_err(map_geocode_error)?;
        let point = location
            .Point()
            .and_then(|p| p.Position())
            .map_err(map_geocode_error)?;

        addresses.push(Address {
            latitude: point.Latitude,
            longitude: point.Longitude,
            feature_name: string_value(map_address.BuildingName()),
            thoroughfare: string_value(map_address.Street()),
            sub_thoroughfare: string_value(map_address.StreetNumber()),
            locality: string_value(map_address.Town()),
            sub_locality: string_value(map_address.Neighborhood()),
            admin_area: string_value(map_address.Region()),
            sub_admin_area: string_value(map_address.District()),
            postal_code: string_value(map_address.PostCode()),
            country_code: string_value(map_address.CountryCode()),
            country_name: string_value(map_address.Country()),
        });
    }

    Ok(addresses)
}

pub(crate) async fn positions_for_address(
    address: &str,
) -> Result<Vec<Coordinates>, GeocodeError> {
    let result = MapLocationFinder::FindLocationsAsync(&HSTRING::from(address), None::<&Geopoint>)
        .map_err(map_geocode_error)?
        .get()
        .map_err(map_geocode_error)?;

    if result.Status().map_err(map_geocode_error)? != MapLocationFinderStatus::Success {
        return Err(GeocodeError::Service {
            message: format!("MapLocationFinder status {:?}", result.Status()),
        });
    }

    let locations = result.Locations().map_err(map_geocode_error)?;
    let mut positions = Vec::new();
    for location in &locations {
        if positions.len() >= MAX_RESULTS as usize {
            break;
        }

        let point = location
            .Point()
            .and_then(|p| p.Position())
            .map_err(map_geocode_error)?;
        positions.push(Coordinates {
            latitude: point.Latitude,
            longitude: point.Longitude,
        });
    }

    Ok(positions)
}

fn string_value(value: windows::core::Result<HSTRING>) -> Option<String> {
    value
        .ok()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}

fn map_platform_error(err: windows::core::Error) -> LocationError {
    LocationError::Platform {
        message: err.message().to_string(),
    }
}

fn map_geocode_error(err: windows::core::Error) -> GeocodeError {
    GeocodeError::Service {
        message: err.message().to_string(),
    }
}
