//! Linux permission implementation.
//!
//! There are no runtime location prompts on traditional Linux. Access is
//! mediated by the GeoClue D-Bus service itself (and by portals for
//! sandboxed Flatpak/Snap apps), so from the application's point of view
//! the permission is granted.

use crate::{Permission, PermissionError, PermissionStatus};

pub(crate) async fn check(_permission: Permission) -> PermissionStatus {
    PermissionStatus::Granted
}

pub(crate) async fn request(
    _permission: Permission,
) -> Result<PermissionStatus, PermissionError> {
    Ok(PermissionStatus::Granted)
}
