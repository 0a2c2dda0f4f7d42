use thiserror::Error;

use crate::solver::PassKind;

pub type SimResult<T> = Result<T, SimError>;

/// Failures surfaced by the simulation core.
///
/// Expected control flow (an unknown pointer id, a missing display target)
/// is never reported through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid {which} resolution {value}: base resolution must be positive")]
    InvalidResolution { which: &'static str, value: usize },

    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("{pass:?} pass bound to mismatched grids: expected {expected:?}, found {found:?}")]
    SizeMismatch {
        pass: PassKind,
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error("simulation has been disposed")]
    Disposed,
}

impl SimError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidConfig { field, reason: reason.into() }
    }
}
