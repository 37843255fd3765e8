use std::ffi::{CStr, CString};
use std::ptr;

use hydropredict::demo::write_demo_artifacts;
use hydropredict_ffi::*;

fn take_string(ptr: *mut std::os::raw::c_char) -> String {
    assert!(!ptr.is_null());
    let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
    unsafe { hydro_string_free(ptr) };
    text
}

#[test]
fn ffi_form_and_prediction() {
    let dir = tempfile::tempdir().unwrap();
    write_demo_artifacts(dir.path()).unwrap();
    let path = CString::new(dir.path().to_str().unwrap()).unwrap();

    unsafe {
        let service = hydro_service_new(path.as_ptr());
        assert!(!service.is_null());
        assert_eq!(hydro_service_ready(service), 1);
        assert!(hydro_unavailable_reason(service).is_null());

        assert_eq!(hydro_feature_count(service), 2);
        assert_eq!(take_string(hydro_feature_name(service, 0)), "ps1_mean");
        assert_eq!(take_string(hydro_feature_name(service, 1)), "vs2_mean");
        assert!(hydro_feature_name(service, 2).is_null());

        let mut defaults = [0.0_f64; 2];
        for (i, slot) in defaults.iter_mut().enumerate() {
            assert_eq!(hydro_feature_default(service, i, slot), HYDRO_OK);
        }
        assert_eq!(defaults, [120.5, 0.8]);
        let mut unused = 0.0;
        assert_eq!(
            hydro_feature_default(service, 9, &mut unused),
            HYDRO_INDEX_OUT_OF_RANGE
        );

        let mut class = -1_i64;
        assert_eq!(hydro_predict(service, defaults.as_ptr(), 2, &mut class), HYDRO_OK);
        assert_eq!(class, 2);
        let label = CStr::from_ptr(hydro_label(class)).to_str().unwrap();
        assert_eq!(label, "Severe Leakage");

        assert_eq!(
            hydro_predict(service, defaults.as_ptr(), 1, &mut class),
            HYDRO_SCHEMA_MISMATCH
        );
        let bad = [f64::NAN, 0.8];
        assert_eq!(
            hydro_predict(service, bad.as_ptr(), 2, &mut class),
            HYDRO_INVALID_INPUT
        );
        assert_eq!(hydro_predict(service, ptr::null(), 0, &mut class), HYDRO_SCHEMA_MISMATCH);
        assert_eq!(class, 2);

        hydro_service_free(service);
    }
}

#[test]
fn ffi_overrides_start_from_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_demo_artifacts(dir.path()).unwrap();
    let path = CString::new(dir.path().to_str().unwrap()).unwrap();
    let ps1 = CString::new("ps1_mean").unwrap();
    let vs2 = CString::new("vs2_mean").unwrap();
    let unknown = CString::new("ps9_mean").unwrap();

    unsafe {
        let service = hydro_service_new(path.as_ptr());
        let mut class = -1_i64;

        // No overrides: the defaults alone are severe leakage.
        assert_eq!(
            hydro_predict_with_overrides(service, ptr::null(), ptr::null(), 0, &mut class),
            HYDRO_OK
        );
        assert_eq!(class, 2);

        // Nominal operation.
        let names = [ps1.as_ptr(), vs2.as_ptr()];
        let values = [160.0, 0.6];
        assert_eq!(
            hydro_predict_with_overrides(service, names.as_ptr(), values.as_ptr(), 2, &mut class),
            HYDRO_OK
        );
        assert_eq!(class, 0);

        let names = [unknown.as_ptr()];
        assert_eq!(
            hydro_predict_with_overrides(service, names.as_ptr(), values.as_ptr(), 1, &mut class),
            HYDRO_UNKNOWN_FEATURE
        );
        let names = [ptr::null()];
        assert_eq!(
            hydro_predict_with_overrides(service, names.as_ptr(), values.as_ptr(), 1, &mut class),
            HYDRO_NULL_POINTER
        );
        let names = [vs2.as_ptr()];
        let huge = [1.0e308];
        assert_eq!(
            hydro_predict_with_overrides(service, names.as_ptr(), huge.as_ptr(), 1, &mut class),
            HYDRO_TRANSFORM_FAILURE
        );
        assert_eq!(class, 0);

        hydro_service_free(service);
    }
}

#[test]
fn ffi_degraded_service() {
    let dir = tempfile::tempdir().unwrap();
    let path = CString::new(dir.path().join("nothing-here").to_str().unwrap()).unwrap();

    unsafe {
        let service = hydro_service_new(path.as_ptr());
        assert!(!service.is_null());
        assert_eq!(hydro_service_ready(service), 0);
        assert_eq!(hydro_feature_count(service), 0);

        let reason = take_string(hydro_unavailable_reason(service));
        assert!(reason.contains("xgb_means_model.json"));

        let values = [120.5, 0.8];
        let mut class = 0_i64;
        assert_eq!(
            hydro_predict(service, values.as_ptr(), 2, &mut class),
            HYDRO_UNAVAILABLE
        );
        assert_eq!(
            hydro_predict_with_overrides(service, ptr::null(), ptr::null(), 0, &mut class),
            HYDRO_UNAVAILABLE
        );
        hydro_service_free(service);
    }
}

#[test]
fn ffi_null_pointers_are_rejected() {
    let mut class = 0_i64;
    let values = [1.0, 2.0];
    unsafe {
        assert_eq!(hydro_service_ready(ptr::null()), HYDRO_NULL_POINTER);
        assert_eq!(
            hydro_predict(ptr::null(), values.as_ptr(), 2, &mut class),
            HYDRO_NULL_POINTER
        );
        assert!(hydro_feature_name(ptr::null(), 0).is_null());
        hydro_service_free(ptr::null_mut());
        hydro_string_free(ptr::null_mut());
    }
}

#[test]
fn labels_for_unexpected_indices() {
    let cases = [
        (0, "No Leakage"),
        (1, "Weak Leakage"),
        (2, "Severe Leakage"),
        (7, "Severe Leakage"),
        (-3, "Severe Leakage"),
    ];
    for (index, expected) in cases {
        let label = unsafe { CStr::from_ptr(hydro_label(index)) };
        assert_eq!(label.to_str().unwrap(), expected);
    }
}
