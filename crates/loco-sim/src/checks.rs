//! Input screening for ticks and runs.

use crate::error::{SimError, SimResult};

/// Clamp a control position to [0, 1]. NaN is rejected earlier.
pub(crate) fn clamp_position(pos: f64) -> f64 {
    pos.clamp(0.0, 1.0)
}

/// Reject NaN and infinities in a tick input.
pub(crate) fn finite_input(val: f64, name: &'static str) -> SimResult<f64> {
    if !val.is_finite() {
        return Err(SimError::InvalidArg { what: name });
    }
    Ok(val)
}

/// Finite and not negative.
pub(crate) fn validate_non_negative(val: f64, name: &'static str) -> SimResult<f64> {
    if !val.is_finite() || val < 0.0 {
        return Err(SimError::NonPhysical { what: name });
    }
    Ok(val)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_position_range() {
        assert_eq!(clamp_position(-0.5), 0.0);
        assert_eq!(clamp_position(0.5), 0.5);
        assert_eq!(clamp_position(1.5), 1.0);
    }

    #[test]
    fn finite_input_rejects_nan() {
        assert!(finite_input(-3.0, "test").is_ok());
        assert!(matches!(
            finite_input(f64::NAN, "test"),
            Err(SimError::InvalidArg { what: "test" })
        ));
        assert!(finite_input(f64::NEG_INFINITY, "test").is_err());
    }

    #[test]
    fn validate_non_negative_ok() {
        assert!(validate_non_negative(1.0, "test").is_ok());
        assert!(validate_non_negative(0.0, "test").is_ok()); // zero is allowed
    }

    #[test]
    fn validate_non_negative_fails_on_negative() {
        assert!(validate_non_negative(-0.1, "test").is_err());
        assert!(validate_non_negative(f64::NAN, "test").is_err());
    }
}
