//! Windows permission implementation using WinRT.
//!
//! Windows has a single location capability; both grant kinds map onto it.

use crate::{Permission, PermissionError, PermissionStatus};

pub(crate) async fn check(permission: Permission) -> PermissionStatus {
    let _ = permission;
    location_access_status()
}

pub(crate) async fn request(
    permission: Permission,
) -> Result<PermissionStatus, PermissionError> {
    let _ = permission;
    // On Windows, RequestAccessAsync both checks and requests if needed.
    Ok(location_access_status())
}

fn location_access_status() -> PermissionStatus {
    use windows::Devices::Geolocation::{GeolocationAccessStatus, Geolocator};

    match Geolocator::RequestAccessAsync() {
        Ok(op) => match op.get() {
            Ok(status) => match status {
                GeolocationAccessStatus::Allowed => PermissionStatus::Granted,
                GeolocationAccessStatus::Denied => PermissionStatus::Denied,
                GeolocationAccessStatus::Unspecified => PermissionStatus::NotDetermined,
                _ => PermissionStatus::NotDetermined,
            },
            Err(_) => PermissionStatus::NotDetermined,
        },
        Err(_) => PermissionStatus::NotDetermined,
    }
}
