//! C ABI over the HydroPredict inference service.
//!
//! Lets a presentation host written in another language build the service
//! once, render one input per feature, and submit vectors for prediction.
//! Every call returns a status code instead of unwinding across the boundary.

use std::os::raw::c_int;

use hydropredict::{PredictionError, ServiceError};

pub mod ffi;
pub use ffi::*;

pub const HYDRO_OK: c_int = 0;
pub const HYDRO_NULL_POINTER: c_int = -1;
pub const HYDRO_UNAVAILABLE: c_int = 1;
pub const HYDRO_SCHEMA_MISMATCH: c_int = 2;
pub const HYDRO_INVALID_INPUT: c_int = 3;
pub const HYDRO_TRANSFORM_FAILURE: c_int = 4;
pub const HYDRO_UNKNOWN_FEATURE: c_int = 5;
pub const HYDRO_INDEX_OUT_OF_RANGE: c_int = 6;

/// Status code reported for a service error.
pub fn status_code(err: &ServiceError) -> c_int {
    match err {
        ServiceError::Unavailable { .. } => HYDRO_UNAVAILABLE,
        ServiceError::UnknownFeature { .. } => HYDRO_UNKNOWN_FEATURE,
        ServiceError::Prediction(PredictionError::SchemaMismatch { .. }) => HYDRO_SCHEMA_MISMATCH,
        ServiceError::Prediction(PredictionError::InvalidInput { .. }) => HYDRO_INVALID_INPUT,
        ServiceError::Prediction(PredictionError::TransformFailure(_)) => HYDRO_TRANSFORM_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydropredict::ModelError;

    #[test]
    fn every_error_kind_has_a_distinct_code() {
        let errors = [
            ServiceError::Unavailable { reason: "x".into() },
            ServiceError::UnknownFeature { name: "x".into() },
            PredictionError::SchemaMismatch { expected: 2, actual: 1 }.into(),
            PredictionError::InvalidInput { index: 0 }.into(),
            PredictionError::TransformFailure(ModelError::EmptyBatch).into(),
        ];
        let mut codes: Vec<c_int> = errors.iter().map(status_code).collect();
        assert!(!codes.contains(&HYDRO_OK));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
