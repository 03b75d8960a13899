//! Error types for arbor.

use arbor_math::InertiaError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArborError {
    #[error("dimension mismatch for {name}: expected {expected}, got {got}")]
    DimensionMismatch {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid joint index {index} (model has {njoints} joints)")]
    InvalidJointIndex { index: usize, njoints: usize },

    #[error("invalid frame index {index} (model has {nframes} frames)")]
    InvalidFrameIndex { index: usize, nframes: usize },

    #[error("unsupported joint type: {0}")]
    UnsupportedJointType(String),

    #[error("invalid joint axis {axis:?}: must be a finite non-zero direction")]
    InvalidAxis { axis: [f64; 3] },

    #[error("duplicate joint name: {0}")]
    DuplicateJointName(String),

    #[error("singular joint-space inertia at joint {joint} ({name})")]
    SingularJointInertia { joint: usize, name: String },

    #[error("non-finite value in {name} at index {index}")]
    NonFiniteInput { name: &'static str, index: usize },

    #[error("inertia error: {0}")]
    Inertia(#[from] InertiaError),
}

pub type Result<T> = std::result::Result<T, ArborError>;
