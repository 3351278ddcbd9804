use std::fmt;

use thiserror::Error;

/// Which iterative loop a convergence criterion guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionRole {
    /// The inner loop refining a predicted estimate back onto the curve.
    Corrector,
    /// The outer loop stepping along the curve towards the target parameter.
    Tracer,
}

impl fmt::Display for CriterionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriterionRole::Corrector => f.write_str("corrector"),
            CriterionRole::Tracer => f.write_str("tracer"),
        }
    }
}

/// Errors that can occur while tracing a homotopy.
#[derive(Debug, Error)]
pub enum ContinuationError {
    #[error("{operation} is not implemented for this track")]
    NotImplemented { operation: &'static str },

    #[error("{role} failed to converge after {iterations} iterations")]
    FailedToConverge {
        role: CriterionRole,
        iterations: usize,
    },

    #[error("{what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    #[error("gradient kernel is degenerate: {reason}")]
    DegenerateKernel { reason: &'static str },

    #[error("pseudo-inverse failed: {reason}")]
    PseudoInverse { reason: &'static str },

    #[error("invalid settings: {reason}")]
    InvalidSettings { reason: &'static str },

    #[error("track evaluation failed")]
    Track(#[from] anyhow::Error),
}

impl ContinuationError {
    pub(crate) fn dimension_mismatch(
        what: &'static str,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self::DimensionMismatch {
            what,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Returns the loop that gave up, if this is a convergence failure.
    pub fn failed_role(&self) -> Option<CriterionRole> {
        match self {
            Self::FailedToConverge { role, .. } => Some(*role),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContinuationError>;
