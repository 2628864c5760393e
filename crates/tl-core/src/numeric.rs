use crate::TlError;

/// Relative error of `value` against `reference`.
///
/// Falls back to the absolute error when the reference is zero.
pub fn relative_error(value: f64, reference: f64) -> f64 {
    let diff = (value - reference).abs();
    if reference == 0.0 {
        diff
    } else {
        diff / reference.abs()
    }
}

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, TlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TlError::NonFinite { what, value: v })
    }
}
