use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars in homotopy maps.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A parametrized family of maps H(x, λ) from R^n x R to R^n.
///
/// Implement this generically over `T: Scalar` so the same map can be
/// evaluated on `f64` and on `Dual` numbers for forward-mode derivatives.
pub trait HomotopyFunction<T: Scalar> {
    /// Returns the number of state variables (excluding λ).
    fn dimension(&self) -> usize;

    /// Evaluates the map.
    /// x: state variables
    /// lambda: continuation parameter
    /// out: buffer to write H(x, λ)
    fn apply(&self, x: &[T], lambda: T, out: &mut [T]);
}
