//! Linux location implementation using the GeoClue2 D-Bus service.

use crate::sample::LocationSample;
use crate::{LocationError, LocationResult};

const GEOCLUE_BUS: &str = "org.freedesktop.GeoClue2";
const MANAGER_PATH: &str = "/org/freedesktop/GeoClue2/Manager";
const MANAGER_IFACE: &str = "org.freedesktop.GeoClue2.Manager";
const CLIENT_IFACE: &str = "org.freedesktop.GeoClue2.Client";
const LOCATION_IFACE: &str = "org.freedesktop.GeoClue2.Location";
const PROPERTIES_IFACE: &str = "org.freedesktop.DBus.Properties";

/// Source id attached to readings obtained through GeoClue.
const PROVIDER: &str = "geoclue";

pub(crate) async fn current_position() -> LocationResult<LocationSample> {
    use zbus::Connection;

    let connection = Connection::system().await.map_err(|e| platform_error(format!("D-Bus connection failed: {e}")))?;

    // Ask the GeoClue2 manager for a dedicated client object
    let reply: (zbus::zvariant::OwnedObjectPath,) = connection
        .call_method(Some(GEOCLUE_BUS), MANAGER_PATH, Some(MANAGER_IFACE), "GetClient", &())
        .await
        .map_err(|e| platform_error(format!("GeoClue2 not available: {e}")))?
        .body()
        .deserialize()
        .map_err(|e| platform_error(format!("failed to parse GetClient response: {e}")))?;
    let client_path = reply.0;

    // The desktop ID is mandatory before Start is accepted
    connection
        .call_method(
            Some(GEOCLUE_BUS),
            client_path.as_str(),
            Some(PROPERTIES_IFACE),
            "Set",
            &(
                CLIENT_IFACE,
                "DesktopId",
                zbus::zvariant::Value::from("geokit"),
            ),
        )
        .await
        .map_err(|e| platform_error(format!("failed to set desktop ID: {e}")))?;

    connection
        .call_method(
            Some(GEOCLUE_BUS),
            client_path.as_str(),
            Some(CLIENT_IFACE),
            "Start",
            &(),
        )
        .await
        .map_err(|e| platform_error(format!("failed to start GeoClue client: {e}")))?;

    let location_reply: zbus::zvariant::OwnedValue = connection
        .call_method(
            Some(GEOCLUE_BUS),
            client_path.as_str(),
            Some(PROPERTIES_IFACE),
            "Get",
            &(CLIENT_IFACE, "Location"),
        )
        .await
        .map_err(|e| platform_error(format!("failed to get location: {e}")))?
        .body()
        .deserialize()
        .map_err(|e| platform_error(format!("failed to parse location path: {e}")))?;

    let location_path: zbus::zvariant::OwnedObjectPath = location_reply
        .downcast_ref::<zbus::zvariant::ObjectPath>()
        .map(|p| p.to_owned().into())
        .map_err(|_| LocationError::NotAvailable)?;

    let read_property = |prop: &'static str| {
        let connection = connection.clone();
        let location_path = location_path.clone();
        async move {
            let reply: zbus::zvariant::OwnedValue = connection
                .call_method(
                    Some(GEOCLUE_BUS),
                    location_path.as_str(),
                    Some(PROPERTIES_IFACE),
                    "Get",
                    &(LOCATION_IFACE, prop),
                )
                .await?
                .body()
                .deserialize()?;
            Ok::<f64, zbus::Error>(reply.downcast_ref::<f64>().unwrap_or(0.0))
        }
    };

    let latitude = read_property("Latitude")
        .await
        .map_err(|e| platform_error(format!("failed to get latitude: {e}")))?;
    let longitude = read_property("Longitude")
        .await
        .map_err(|e| platform_error(format!("failed to get longitude: {e}")))?;
    let accuracy = read_property("Accuracy").await.ok();
    let altitude = read_property("Altitude").await.ok();
    // GeoClue reports -1 for heading and speed it does not know
    let heading = read_property("Heading").await.ok().filter(|h| *h >= 0.0);
    let speed = read_property("Speed").await.ok().filter(|s| *s >= 0.0);

    // Release the client so GeoClue can power down the sources
    let _ = connection
        .call_method(
            Some(GEOCLUE_BUS),
            client_path.as_str(),
            Some(CLIENT_IFACE),
            "Stop",
            &(),
        )
        .await;

    // GeoClue's own Timestamp property lags the reading; the wall clock at
    // retrieval is close enough for a one-shot snapshot.
    let timestamp_millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    Ok(LocationSample {
        timestamp_millis,
        latitude,
        longitude,
        accuracy,
        provider: Some(PROVIDER.to_owned()),
        altitude,
        heading,
        speed,
    })
}

// GeoClue2 is positioning only; there is no system geocoding service on
// traditional Linux.
pub(crate) async fn addresses_for_position(
    _latitude: f64,
    _longitude: f64,
) -> Result<Vec<crate::geocode::Address>, crate::geocode::GeocodeError> {
    Err(crate::geocode::GeocodeError::NotSupported)
}

pub(crate) async fn positions_for_address(
    _address: &str,
) -> Result<Vec<crate::geocode::Coordinates>, crate::geocode::GeocodeError> {
    Err(crate::geocode::GeocodeError::NotSupported)
}

fn platform_error(message: String) -> LocationError {
    LocationError::Platform { message }
}
