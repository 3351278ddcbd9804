//! The `homotopy_core` crate traces solution curves of H(x, λ) = 0 by
//! predictor-corrector continuation.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction), `HomotopyFunction` (maps generic over the scalar).
//! - **Continuation**: `Track`, `StepAdjuster`, `ConvergenceCriterion` and the `PredictorCorrector`
//!   orchestrator with its Euler-Newton implementation.
//! - **Autodiff**: Dual number implementation and extended-Jacobian assembly for `AutoHomotopyTrack`.
//! - **Error**: `ContinuationError`, including role-tagged convergence failures.
pub mod autodiff;
pub mod continuation;
pub mod error;
pub mod traits;

pub use continuation::{EulerNewton, PredictorCorrector, Track};
pub use error::{ContinuationError, CriterionRole, Result};
