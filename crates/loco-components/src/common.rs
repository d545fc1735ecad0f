//! Parameter checks shared by component constructors.

use crate::error::{ComponentError, ComponentResult};
use loco_core::numeric::ensure_finite;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Ensure a value is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<()> {
    check_finite(value, what)?;
    if value <= 0.0 {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(())
}

/// Ensure a value is finite and not negative.
pub fn check_non_negative(value: f64, what: &'static str) -> ComponentResult<()> {
    check_finite(value, what)?;
    if value < 0.0 {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(())
}

/// Ensure a value lies in (0, 1].
pub fn check_fraction(value: f64, what: &'static str) -> ComponentResult<()> {
    check_positive(value, what)?;
    if value > 1.0 {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_check_positive() {
        assert!(check_positive(0.5, "test").is_ok());
        assert!(check_positive(0.0, "test").is_err());
        assert!(check_positive(-2.0, "test").is_err());
    }

    #[test]
    fn test_check_non_negative() {
        assert!(check_non_negative(0.0, "test").is_ok());
        assert!(check_non_negative(-1e-9, "test").is_err());
    }

    #[test]
    fn test_check_fraction() {
        assert!(check_fraction(1.0, "test").is_ok());
        assert!(check_fraction(0.25, "test").is_ok());
        assert!(check_fraction(1.01, "test").is_err());
        assert!(check_fraction(0.0, "test").is_err());
    }
}
