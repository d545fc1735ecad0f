//! Error types for component construction.

use loco_core::error::CoreError;
use thiserror::Error;

/// Errors raised when a component is built with out-of-range parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<CoreError> for ComponentError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, .. } => ComponentError::NonPhysical { what },
            CoreError::InvalidArg { what } => ComponentError::InvalidArg { what },
            CoreError::Invariant { what } => ComponentError::NonPhysical { what },
        }
    }
}

impl From<ComponentError> for CoreError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what } => CoreError::InvalidArg { what },
            ComponentError::InvalidArg { what } => CoreError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::NonPhysical {
            what: "firebox capacity",
        };
        assert!(err.to_string().contains("firebox capacity"));
    }

    #[test]
    fn error_conversion() {
        let comp_err = ComponentError::InvalidArg { what: "test" };
        let core_err: CoreError = comp_err.into();
        assert!(matches!(core_err, CoreError::InvalidArg { .. }));

        let back: ComponentError = CoreError::NonFinite {
            what: "x",
            value: f64::NAN,
        }
        .into();
        assert!(matches!(back, ComponentError::NonPhysical { what: "x" }));
    }
}
