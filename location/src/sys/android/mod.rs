//! Android location implementation using JNI.
//!
//! Listening sessions ride on a host-app-supplied Java bridge object
//! (`dev.geokit.location.LocationBridge`). The Java side pushes each
//! platform location callback over the native boundary as a JSON payload,
//! which is deserialized into a [`LocationSample`] and offered to the
//! session's [`PositionTracker`]. One-shot lookups and geocoding take an
//! explicit `Context` instead.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::jlong;
use jni::{JNIEnv, JavaVM};
use log::error;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::arbiter::is_better_location;
use crate::geocode::{Address, Coordinates, GeocodeError, MAX_RESULTS};
use crate::sample::LocationSample;
use crate::tracker::{PositionDelegate, PositionTracker, TrackingConfig};
use crate::{LocationError, LocationResult};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);
static SESSIONS: OnceLock<Mutex<HashMap<u64, Arc<Mutex<PositionTracker>>>>> = OnceLock::new();

fn sessions() -> &'static Mutex<HashMap<u64, Arc<Mutex<PositionTracker>>>> {
    SESSIONS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// A listening session backed by an Android Java bridge via JNI.
pub struct AndroidLocationBridge {
    vm: JavaVM,
    bridge: GlobalRef,
    handle: u64,
    tracker: Arc<Mutex<PositionTracker>>,
    config: Mutex<TrackingConfig>,
}

impl fmt::Debug for AndroidLocationBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndroidLocationBridge")
            .field("handle", &self.handle)
            .finish()
    }
}

impl AndroidLocationBridge {
    /// Create a session from a `LocationBridge` object supplied by the host
    /// app.
    ///
    /// # Errors
    /// Returns a platform error if the JNI handshake with the bridge fails.
    pub fn new(env: &JNIEnv<'_>, bridge: JObject<'_>) -> LocationResult<Self> {
        let vm = env.get_java_vm().map_err(map_jni_error)?;
        let global = env.new_global_ref(bridge).map_err(map_jni_error)?;
        let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);

        let tracker = Arc::new(Mutex::new(PositionTracker::new()));
        {
            let mut map = sessions().lock().expect("session map mutex poisoned");
            map.insert(handle, tracker.clone());
        }

        let session = Self {
            vm,
            bridge: global,
            handle,
            tracker,
            config: Mutex::new(TrackingConfig::default()),
        };
        session.register_handle()?;
        Ok(session)
    }

    /// Native handle associated with this session for callbacks from Java.
    #[must_use]
    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// Register an observer for adopted positions and platform errors.
    pub fn set_delegate(&self, delegate: Arc<dyn PositionDelegate>) {
        self.tracker
            .lock()
            .expect("tracker mutex poisoned")
            .set_delegate(delegate);
    }

    /// Remove the registered observer.
    pub fn clear_delegate(&self) {
        self.tracker
            .lock()
            .expect("tracker mutex poisoned")
            .clear_delegate();
    }

    /// Start platform location updates with the given listening settings.
    ///
    /// # Errors
    /// Returns a platform error if the bridge call fails.
    pub fn start_updates(&self, config: &TrackingConfig) -> LocationResult<()> {
        {
            let mut guard = self.config.lock().expect("config mutex poisoned");
            guard.clone_from(config);
        }

        let json = to_json(config)?;
        self.with_attached_env(|env, bridge| {
            let j_string = env.new_string(json.as_str())?;
            let j_object = JObject::from(j_string);
            let args = [JValue::Object(&j_object)];
            env.call_method(bridge, "startUpdates", "(Ljava/lang/String;)V", &args)?;
            Ok(())
        })
    }

    /// Stop platform location updates.
    pub fn stop_updates(&self) {
        if let Err(err) = self.with_attached_env(|env, bridge| {
            env.call_method(bridge, "stopUpdates", "()V", &[])?;
            Ok(())
        }) {
            error!("failed to stop Android location updates: {err}");
        }
    }

    /// The session's currently trusted position, if any.
    #[must_use]
    pub fn best_position(&self) -> Option<LocationSample> {
        self.tracker
            .lock()
            .expect("tracker mutex poisoned")
            .best()
            .cloned()
    }

    /// Forget the trusted position; the next reading is adopted untested.
    pub fn reset(&self) {
        self.tracker
            .lock()
            .expect("tracker mutex poisoned")
            .reset();
    }

    fn register_handle(&self) -> LocationResult<()> {
        self.with_attached_env(|env, bridge| {
            let args = [JValue::Long(self.handle as jlong)];
            env.call_method(bridge, "registerNativeHandle", "(J)V", &args)?;
            Ok(())
        })
    }

    fn with_attached_env<F>(&self, action: F) -> LocationResult<()>
    where
        F: FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> jni::errors::Result<()>,
    {
        let mut env = self.vm.attach_current_thread().map_err(map_jni_error)?;
        let bridge = self.bridge.as_obj();
        action(&mut env, &bridge).map_err(map_jni_error)
    }
}

impl Drop for AndroidLocationBridge {
    fn drop(&mut self) {
        if let Some(map) = SESSIONS.get() {
            let mut guard = map.lock().expect("session map mutex poisoned");
            guard.remove(&self.handle);
        }
    }
}

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_geokit_location_LocationBridge_nativeOnLocation(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
    json_sample: JString<'_>,
) {
    #[allow(clippy::cast_sign_loss)]
    let handle = handle as u64;
    let json = match env.get_string(&json_sample) {
        Ok(value) => value.to_string_lossy().into_owned(),
        Err(err) => {
            error!("failed to read Android location payload: {err}");
            return;
        }
    };

    dispatch_sample(handle, &json);
}

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_geokit_location_LocationBridge_nativeOnError(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
    message: JString<'_>,
) {
    #[allow(clippy::cast_sign_loss)]
    let handle = handle as u64;
    let message = match env.get_string(&message) {
        Ok(value) => value.to_string_lossy().into_owned(),
        Err(err) => {
            error!("failed to read Android error payload: {err}");
            return;
        }
    };

    report_error(handle, &LocationError::Platform { message });
}

fn dispatch_sample(handle: u64, json: &str) {
    let Some(tracker) = session_tracker(handle) else {
        error!("received Android location for unknown handle {handle}");
        return;
    };

    match from_json::<LocationSample>(json) {
        Ok(sample) => {
            tracker
                .lock()
                .expect("tracker mutex poisoned")
                .offer(sample);
        }
        Err(err) => {
            tracker
                .lock()
                .expect("tracker mutex poisoned")
                .report_error(&err);
        }
    }
}

fn report_error(handle: u64, error: &LocationError) {
    let Some(tracker) = session_tracker(handle) else {
        error!("received Android location error for unknown handle {handle}: {error}");
        return;
    };

    tracker
        .lock()
        .expect("tracker mutex poisoned")
        .report_error(error);
}

fn session_tracker(handle: u64) -> Option<Arc<Mutex<PositionTracker>>> {
    let map = sessions().lock().expect("session map mutex poisoned");
    map.get(&handle).cloned()
}

/// Snapshot the last known location using an Android `Context`.
///
/// Every enabled provider's cached reading is offered through the quality
/// arbiter in turn, so a fresher-but-noisier reading does not shadow a
/// better one.
///
/// # Errors
/// Returns [`LocationError::ServiceDisabled`] when the location service is
/// missing, [`LocationError::NotAvailable`] when no provider has a cached
/// reading, or a platform error if a JNI call fails.
pub fn last_known_position(
    env: &mut JNIEnv<'_>,
    context: &JObject<'_>,
) -> LocationResult<LocationSample> {
    let service_name = env.new_string("location").map_err(map_jni_error)?;
    let manager = env
        .call_method(
            context,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&JObject::from(service_name))],
        )
        .map_err(map_jni_error)?
        .l()
        .map_err(map_jni_error)?;
    if manager.is_null() {
        return Err(LocationError::ServiceDisabled);
    }

    let providers = env
        .call_method(&manager, "getProviders", "(Z)Ljava/util/List;", &[
            JValue::Bool(1),
        ])
        .map_err(map_jni_error)?
        .l()
        .map_err(map_jni_error)?;
    let count = env
        .call_method(&providers, "size", "()I", &[])
        .map_err(map_jni_error)?
        .i()
        .map_err(map_jni_error)?;

    let mut best: Option<LocationSample> = None;
    for index in 0..count {
        let provider = env
            .call_method(&providers, "get", "(I)Ljava/lang/Object;", &[
                JValue::Int(index),
            ])
            .map_err(map_jni_error)?
            .l()
            .map_err(map_jni_error)?;
        if provider.is_null() {
            continue;
        }

        let location = env
            .call_method(
                &manager,
                "getLastKnownLocation",
                "(Ljava/lang/String;)Landroid/location/Location;",
                &[JValue::Object(&provider)],
            )
            .map_err(map_jni_error)?
            .l()
            .map_err(map_jni_error)?;
        if location.is_null() {
            continue;
        }

        let sample = location_to_sample(env, &location)?;
        if is_better_location(&sample, best.as_ref()) {
            best = Some(sample);
        }
    }

    best.ok_or(LocationError::NotAvailable)
}

/// Convert an `android.location.Location` into the shared position model.
///
/// # Errors
/// Returns a platform error if a JNI call into the location object fails.
pub fn location_to_sample(
    env: &mut JNIEnv<'_>,
    location: &JObject<'_>,
) -> LocationResult<LocationSample> {
    let timestamp_millis = env
        .call_method(location, "getTime", "()J", &[])
        .map_err(map_jni_error)?
        .j()
        .map_err(map_jni_error)?;
    let latitude = env
        .call_method(location, "getLatitude", "()D", &[])
        .map_err(map_jni_error)?
        .d()
        .map_err(map_jni_error)?;
    let longitude = env
        .call_method(location, "getLongitude", "()D", &[])
        .map_err(map_jni_error)?
        .d()
        .map_err(map_jni_error)?;

    let accuracy = if bool_method(env, location, "hasAccuracy")? {
        Some(f64::from(float_method(env, location, "getAccuracy")?))
    } else {
        None
    };
    let altitude = if bool_method(env, location, "hasAltitude")? {
        Some(
            env.call_method(location, "getAltitude", "()D", &[])
                .map_err(map_jni_error)?
                .d()
                .map_err(map_jni_error)?,
        )
    } else {
        None
    };
    let heading = if bool_method(env, location, "hasBearing")? {
        Some(f64::from(float_method(env, location, "getBearing")?))
    } else {
        None
    };
    let speed = if bool_method(env, location, "hasSpeed")? {
        Some(f64::from(float_method(env, location, "getSpeed")?))
    } else {
        None
    };

    let provider = env
        .call_method(location, "getProvider", "()Ljava/lang/String;", &[])
        .map_err(map_jni_error)?
        .l()
        .map_err(map_jni_error)?;
    let provider = optional_string(env, provider).map_err(map_jni_error)?;

    Ok(LocationSample {
        timestamp_millis,
        latitude,
        longitude,
        accuracy,
        provider,
        altitude,
        heading,
        speed,
    })
}

/// Reverse geocode a coordinate using `android.location.Geocoder`.
///
/// # Errors
/// Returns a [`GeocodeError`] if a JNI call or the platform geocoder fails.
pub fn addresses_for_position_with_context(
    env: &mut JNIEnv<'_>,
    context: &JObject<'_>,
    latitude: f64,
    longitude: f64,
) -> Result<Vec<Address>, GeocodeError> {
    let geocoder = new_geocoder(env, context)?;
    let list = env
        .call_method(&geocoder, "getFromLocation", "(DDI)Ljava/util/List;", &[
            JValue::Double(latitude),
            JValue::Double(longitude),
            JValue::Int(MAX_RESULTS),
        ])
        .map_err(map_geocode_error)?
        .l()
        .map_err(map_geocode_error)?;
    if list.is_null() {
        return Ok(Vec::new());
    }

    let count = list_size(env, &list)?;
    let mut addresses = Vec::with_capacity(count as usize);
    for index in 0..count {
        let item = list_get(env, &list, index)?;
        addresses.push(platform_address(env, &item)?);
    }
    Ok(addresses)
}

/// Forward geocode address text using `android.location.Geocoder`.
///
/// # Errors
/// Returns a [`GeocodeError`] if a JNI call or the platform geocoder fails.
pub fn positions_for_address_with_context(
    env: &mut JNIEnv<'_>,
    context: &JObject<'_>,
    address: &str,
) -> Result<Vec<Coordinates>, GeocodeError> {
    let geocoder = new_geocoder(env, context)?;
    let name = env.new_string(address).map_err(map_geocode_error)?;
    let name_obj = JObject::from(name);
    let list = env
        .call_method(
            &geocoder,
            "getFromLocationName",
            "(Ljava/lang/String;I)Ljava/util/List;",
            &[JValue::Object(&name_obj), JValue::Int(MAX_RESULTS)],
        )
        .map_err(map_geocode_error)?
        .l()
        .map_err(map_geocode_error)?;
    if list.is_null() {
        return Ok(Vec::new());
    }

    let count = list_size(env, &list)?;
    let mut positions = Vec::with_capacity(count as usize);
    for index in 0..count {
        let item = list_get(env, &list, index)?;
        let latitude = env
            .call_method(&item, "getLatitude", "()D", &[])
            .map_err(map_geocode_error)?
            .d()
            .map_err(map_geocode_error)?;
        let longitude = env
            .call_method(&item, "getLongitude", "()D", &[])
            .map_err(map_geocode_error)?
            .d()
            .map_err(map_geocode_error)?;
        positions.push(Coordinates {
            latitude,
            longitude,
        });
    }
    Ok(positions)
}

fn new_geocoder<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
) -> Result<JObject<'local>, GeocodeError> {
    env.new_object(
        "android/location/Geocoder",
        "(Landroid/content/Context;)V",
        &[JValue::Object(context)],
    )
    .map_err(map_geocode_error)
}

fn platform_address(
    env: &mut JNIEnv<'_>,
    address: &JObject<'_>,
) -> Result<Address, GeocodeError> {
    let latitude = env
        .call_method(address, "getLatitude", "()D", &[])
        .map_err(map_geocode_error)?
        .d()
        .map_err(map_geocode_error)?;
    let longitude = env
        .call_method(address, "getLongitude", "()D", &[])
        .map_err(map_geocode_error)?
        .d()
        .map_err(map_geocode_error)?;

    Ok(Address {
        latitude,
        longitude,
        feature_name: string_field(env, address, "getFeatureName")?,
        thoroughfare: string_field(env, address, "getThoroughfare")?,
        sub_thoroughfare: string_field(env, address, "getSubThoroughfare")?,
        locality: string_field(env, address, "getLocality")?,
        sub_locality: string_field(env, address, "getSubLocality")?,
        admin_area: string_field(env, address, "getAdminArea")?,
        sub_admin_area: string_field(env, address, "getSubAdminArea")?,
        postal_code: string_field(env, address, "getPostalCode")?,
        country_code: string_field(env, address, "getCountryCode")?,
        country_name: string_field(env, address, "getCountryName")?,
    })
}

fn list_size(env: &mut JNIEnv<'_>, list: &JObject<'_>) -> Result<i32, GeocodeError> {
    env.call_method(list, "size", "()I", &[])
        .map_err(map_geocode_error)?
        .i()
        .map_err(map_geocode_error)
}

fn list_get<'local>(
    env: &mut JNIEnv<'local>,
    list: &JObject<'_>,
    index: i32,
) -> Result<JObject<'local>, GeocodeError> {
    env.call_method(list, "get", "(I)Ljava/lang/Object;", &[JValue::Int(index)])
        .map_err(map_geocode_error)?
        .l()
        .map_err(map_geocode_error)
}

fn string_field(
    env: &mut JNIEnv<'_>,
    object: &JObject<'_>,
    getter: &str,
) -> Result<Option<String>, GeocodeError> {
    let value = env
        .call_method(object, getter, "()Ljava/lang/String;", &[])
        .map_err(map_geocode_error)?
        .l()
        .map_err(map_geocode_error)?;
    optional_string(env, value).map_err(map_geocode_error)
}

fn bool_method(
    env: &mut JNIEnv<'_>,
    object: &JObject<'_>,
    name: &str,
) -> LocationResult<bool> {
    env.call_method(object, name, "()Z", &[])
        .map_err(map_jni_error)?
        .z()
        .map_err(map_jni_error)
}

fn float_method(
    env: &mut JNIEnv<'_>,
    object: &JObject<'_>,
    name: &str,
) -> LocationResult<f32> {
    env.call_method(object, name, "()F", &[])
        .map_err(map_jni_error)?
        .f()
        .map_err(map_jni_error)
}

fn optional_string(
    env: &mut JNIEnv<'_>,
    value: JObject<'_>,
) -> jni::errors::Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let value = JString::from(value);
    let value = env.get_string(&value)?;
    Ok(Some(value.to_string_lossy().into_owned()))
}

// Async wrappers for the public API (require runtime context)
pub(crate) async fn current_position() -> LocationResult<LocationSample> {
    Err(LocationError::Platform {
        message: "Android: use last_known_position() with a Context".into(),
    })
}

pub(crate) async fn addresses_for_position(
    _latitude: f64,
    _longitude: f64,
) -> Result<Vec<Address>, GeocodeError> {
    Err(GeocodeError::Service {
        message: "Android: use addresses_for_position_with_context() with a Context".into(),
    })
}

pub(crate) async fn positions_for_address(
    _address: &str,
) -> Result<Vec<Coordinates>, GeocodeError> {
    Err(GeocodeError::Service {
        message: "Android: use positions_for_address_with_context() with a Context".into(),
    })
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> LocationResult<String> {
    serde_json::to_string(value).map_err(|err| LocationError::Serialization {
        message: err.to_string(),
    })
}

fn from_json<T: DeserializeOwned>(value: &str) -> LocationResult<T> {
    serde_json::from_str(value).map_err(|err| LocationError::Serialization {
        message: err.to_string(),
    })
}

#[allow(clippy::needless_pass_by_value)]
fn map_jni_error(err: jni::errors::Error) -> LocationError {
    LocationError::Platform {
        message: err.to_string(),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn map_geocode_error(err: jni::errors::Error) -> GeocodeError {
    GeocodeError::Service {
        message: err.to_string(),
    }
}
