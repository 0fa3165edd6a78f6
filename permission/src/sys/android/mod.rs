//! Android permission implementation using JNI.

use crate::{Permission, PermissionError, PermissionStatus};
use jni::JNIEnv;
use jni::objects::{JObject, JValue};
use jni::sys::jint;
use log::warn;

/// `PackageManager.PERMISSION_GRANTED`.
const PERMISSION_GRANTED: jint = 0;

/// Request code passed to `Activity.requestPermissions`.
const LOCATION_REQUEST_CODE: jint = 25;

const fn manifest_permission(permission: Permission) -> &'static str {
    match permission {
        Permission::LocationWhenInUse => "android.permission.ACCESS_FINE_LOCATION",
        Permission::LocationAlways => "android.permission.ACCESS_BACKGROUND_LOCATION",
    }
}

/// Check a location permission using an Android `Context`.
///
/// # Errors
/// Returns a `PermissionError` if the JNI call into the context fails.
pub fn check_with_context(
    env: &mut JNIEnv<'_>,
    context: &JObject<'_>,
    permission: Permission,
) -> Result<PermissionStatus, PermissionError> {
    let name = env
        .new_string(manifest_permission(permission))
        .map_err(map_jni_error)?;
    let name_obj = JObject::from(name);

    let result = env
        .call_method(
            context,
            "checkSelfPermission",
            "(Ljava/lang/String;)I",
            &[JValue::Object(&name_obj)],
        )
        .map_err(map_jni_error)?
        .i()
        .map_err(map_jni_error)?;

    Ok(if result == PERMISSION_GRANTED {
        PermissionStatus::Granted
    } else {
        PermissionStatus::Denied
    })
}

/// Show the system permission prompt using an Android `Activity`.
///
/// Android delivers the outcome asynchronously to the activity's
/// `onRequestPermissionsResult`; the status returned here is the pre-prompt
/// one. Callers should re-check once the host activity observes the callback.
///
/// # Errors
/// Returns a `PermissionError` if a JNI call into the activity fails.
pub fn request_with_activity(
    env: &mut JNIEnv<'_>,
    activity: &JObject<'_>,
    permission: Permission,
) -> Result<PermissionStatus, PermissionError> {
    let status = check_with_context(env, activity, permission)?;
    if status == PermissionStatus::Granted {
        return Ok(status);
    }

    warn!("location permission not granted, prompting the user");

    let name = env
        .new_string(manifest_permission(permission))
        .map_err(map_jni_error)?;
    let names = env
        .new_object_array(1, "java/lang/String", &JObject::from(name))
        .map_err(map_jni_error)?;

    env.call_method(
        activity,
        "requestPermissions",
        "([Ljava/lang/String;I)V",
        &[JValue::Object(&names), JValue::Int(LOCATION_REQUEST_CODE)],
    )
    .map_err(map_jni_error)?;

    Ok(status)
}

// Async wrappers for the public API (require runtime context)
pub(crate) async fn check(permission: Permission) -> PermissionStatus {
    // Without a JNI context there is nothing to ask.
    // The application must call check_with_context with its Context.
    let _ = permission;
    PermissionStatus::NotDetermined
}

pub(crate) async fn request(permission: Permission) -> Result<PermissionStatus, PermissionError> {
    let _ = permission;
    Err(PermissionError::Unknown(
        "Android: use request_with_activity() with an Activity".into(),
    ))
}

#[allow(clippy::needless_pass_by_value)]
fn map_jni_error(err: jni::errors::Error) -> PermissionError {
    PermissionError::Unknown(err.to_string())
}
