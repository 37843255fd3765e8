use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::PathBuf;

use hydropredict::{InferenceService, LeakageClass, Settings};

use super::{status_code, HYDRO_INDEX_OUT_OF_RANGE, HYDRO_NULL_POINTER, HYDRO_OK};

/// Opaque handle owning a started inference service.
pub struct HydroService {
    inner: InferenceService,
}

fn into_c_string(text: String) -> *mut c_char {
    // Interior NULs cannot cross the boundary; drop them.
    let text = text.replace('\0', "");
    CString::new(text).map_or(std::ptr::null_mut(), CString::into_raw)
}

/// Start a service on `models_dir`, or on the configured directory when
/// `models_dir` is null. Never returns null: a failed load yields a service
/// with predictions disabled.
///
/// # Safety
/// `models_dir` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn hydro_service_new(models_dir: *const c_char) -> *mut HydroService {
    let mut settings = Settings::from_env();
    if !models_dir.is_null() {
        let c_str = unsafe { CStr::from_ptr(models_dir) };
        settings = settings.with_models_dir(PathBuf::from(c_str.to_string_lossy().into_owned()));
    }
    log::debug!("starting service on {}", settings.models_dir.display());
    let inner = InferenceService::from_settings(&settings);
    Box::into_raw(Box::new(HydroService { inner }))
}

/// # Safety
/// `service` must be null or a pointer returned by [`hydro_service_new`]
/// that has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn hydro_service_free(service: *mut HydroService) {
    if !service.is_null() {
        unsafe { drop(Box::from_raw(service)) };
    }
}

/// 1 when predictions are enabled, 0 when disabled.
///
/// # Safety
/// `service` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn hydro_service_ready(service: *const HydroService) -> c_int {
    match unsafe { service.as_ref() } {
        Some(s) => c_int::from(s.inner.is_ready()),
        None => HYDRO_NULL_POINTER,
    }
}

/// Load failure message, or null when the service is ready. Free with
/// [`hydro_string_free`].
///
/// # Safety
/// `service` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn hydro_unavailable_reason(service: *const HydroService) -> *mut c_char {
    unsafe { service.as_ref() }
        .and_then(|s| s.inner.unavailable_reason())
        .map_or(std::ptr::null_mut(), |e| into_c_string(e.to_string()))
}

/// Number of input features; 0 when disabled.
///
/// # Safety
/// `service` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn hydro_feature_count(service: *const HydroService) -> usize {
    unsafe { service.as_ref() }
        .and_then(|s| s.inner.schema())
        .map_or(0, |schema| schema.len())
}

/// Name of feature `index`. Free with [`hydro_string_free`].
///
/// # Safety
/// `service` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn hydro_feature_name(service: *const HydroService, index: usize) -> *mut c_char {
    unsafe { service.as_ref() }
        .and_then(|s| s.inner.schema())
        .and_then(|schema| schema.names().get(index).cloned())
        .map_or(std::ptr::null_mut(), into_c_string)
}

/// Default value of feature `index`, written to `out`.
///
/// # Safety
/// `service` must be null or a live handle; `out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn hydro_feature_default(
    service: *const HydroService,
    index: usize,
    out: *mut f64,
) -> c_int {
    let Some(service) = (unsafe { service.as_ref() }) else {
        return HYDRO_NULL_POINTER;
    };
    if out.is_null() {
        return HYDRO_NULL_POINTER;
    }
    match service.inner.form_fields().get(index) {
        Some(field) => {
            unsafe { *out = field.default };
            HYDRO_OK
        }
        None => HYDRO_INDEX_OUT_OF_RANGE,
    }
}

/// Predict from `len` values in feature order. On success the class index
/// is written to `out_class`.
///
/// # Safety
/// `service` must be null or a live handle; `values` must be null or point
/// to `len` readable doubles; `out_class` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn hydro_predict(
    service: *const HydroService,
    values: *const f64,
    len: usize,
    out_class: *mut i64,
) -> c_int {
    let Some(service) = (unsafe { service.as_ref() }) else {
        return HYDRO_NULL_POINTER;
    };
    if out_class.is_null() || (values.is_null() && len > 0) {
        return HYDRO_NULL_POINTER;
    }
    let input: &[f64] = if len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(values, len) }
    };
    match service.inner.predict(input) {
        Ok(prediction) => {
            unsafe { *out_class = prediction.class_index };
            HYDRO_OK
        }
        Err(e) => {
            log::debug!("prediction rejected: {e}");
            status_code(&e)
        }
    }
}

/// Predict from the default vector with `len` named values replaced. On
/// success the class index is written to `out_class`. A name outside the
/// schema yields `HYDRO_UNKNOWN_FEATURE`.
///
/// # Safety
/// `service` must be null or a live handle; `names` and `values` must be
/// null or point to `len` entries, each name a NUL-terminated string;
/// `out_class` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn hydro_predict_with_overrides(
    service: *const HydroService,
    names: *const *const c_char,
    values: *const f64,
    len: usize,
    out_class: *mut i64,
) -> c_int {
    let Some(service) = (unsafe { service.as_ref() }) else {
        return HYDRO_NULL_POINTER;
    };
    if out_class.is_null() || (len > 0 && (names.is_null() || values.is_null())) {
        return HYDRO_NULL_POINTER;
    }
    let mut overrides = Vec::with_capacity(len);
    for i in 0..len {
        let name = unsafe { *names.add(i) };
        if name.is_null() {
            return HYDRO_NULL_POINTER;
        }
        let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
        overrides.push((name, unsafe { *values.add(i) }));
    }
    let result = service
        .inner
        .inputs_with_overrides(&overrides)
        .and_then(|input| service.inner.predict(&input));
    match result {
        Ok(prediction) => {
            unsafe { *out_class = prediction.class_index };
            HYDRO_OK
        }
        Err(e) => {
            log::debug!("prediction with overrides rejected: {e}");
            status_code(&e)
        }
    }
}

/// Static label text for a class index. Never null; do not free.
#[no_mangle]
pub extern "C" fn hydro_label(class_index: i64) -> *const c_char {
    let text: &'static [u8] = match LeakageClass::from_index(class_index) {
        LeakageClass::None => b"No Leakage\0",
        LeakageClass::Weak => b"Weak Leakage\0",
        LeakageClass::Severe => b"Severe Leakage\0",
    };
    text.as_ptr().cast()
}

/// # Safety
/// `ptr` must be null or a string returned by this library.
#[no_mangle]
pub unsafe extern "C" fn hydro_string_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe { drop(CString::from_raw(ptr)) };
    }
}
