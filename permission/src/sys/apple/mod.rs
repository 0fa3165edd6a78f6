//! Apple platform (iOS/macOS) permission implementation using CoreLocation.

use crate::{Permission, PermissionError, PermissionStatus};
use objc2::MainThreadMarker;
use objc2_core_location::{CLAuthorizationStatus, CLLocationManager};

fn map_status(status: CLAuthorizationStatus, permission: Permission) -> PermissionStatus {
    match status {
        CLAuthorizationStatus::NotDetermined => PermissionStatus::NotDetermined,
        CLAuthorizationStatus::Restricted => PermissionStatus::Restricted,
        CLAuthorizationStatus::Denied => PermissionStatus::Denied,
        CLAuthorizationStatus::AuthorizedAlways => PermissionStatus::Granted,
        CLAuthorizationStatus::AuthorizedWhenInUse => {
            // A when-in-use grant does not satisfy an always request.
            if permission == Permission::LocationAlways {
                PermissionStatus::Denied
            } else {
                PermissionStatus::Granted
            }
        }
        _ => PermissionStatus::NotDetermined,
    }
}

pub(crate) async fn check(permission: Permission) -> PermissionStatus {
    if MainThreadMarker::new().is_none() {
        return PermissionStatus::NotDetermined;
    }

    let manager = unsafe { CLLocationManager::new() };
    let status = unsafe { manager.authorizationStatus() };
    map_status(status, permission)
}

pub(crate) async fn request(permission: Permission) -> Result<PermissionStatus, PermissionError> {
    if MainThreadMarker::new().is_none() {
        return Err(PermissionError::Unknown(
            "CLLocationManager must be used from the main thread".into(),
        ));
    }

    let manager = unsafe { CLLocationManager::new() };
    let status = unsafe { manager.authorizationStatus() };

    if status == CLAuthorizationStatus::NotDetermined {
        // The prompt outcome arrives via the location manager delegate;
        // report the pre-prompt status and let callers re-check.
        match permission {
            Permission::LocationAlways => unsafe { manager.requestAlwaysAuthorization() },
            Permission::LocationWhenInUse => unsafe { manager.requestWhenInUseAuthorization() },
        }
    }

    Ok(map_status(unsafe { manager.authorizationStatus() }, permission))
}
