//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while building or stepping a locomotive.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<loco_components::ComponentError> for SimError {
    fn from(e: loco_components::ComponentError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<loco_core::CoreError> for SimError {
    fn from(e: loco_core::CoreError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
