use nalgebra::{DMatrix, DVector};

use super::types::Point;
use super::util::kernel_unit_vector;
use crate::error::Result;

/// A homotopy map together with the interval on which to continue it.
///
/// The continuation parameter is not passed separately: the last component
/// of every `point` is λ, and the last column of `gradient` holds ∂H/∂λ.
pub trait Track {
    /// Returns the starting point on the curve.
    fn initial_point(&self) -> Result<Point>;

    /// Returns the unit tangent of the curve at `point`.
    ///
    /// The tangent lies in the kernel of `gradient(point)` and is oriented
    /// consistently with the previous call; implementations keep whatever
    /// state they need for that between calls.
    fn tangent(&mut self, point: &Point) -> Result<DVector<f64>>;

    /// Evaluates H at `point` (length `n`).
    fn homotopy(&self, point: &Point) -> Result<DVector<f64>>;

    /// Evaluates the `n x (n+1)` Jacobian of H at `point`.
    fn gradient(&self, point: &Point) -> Result<DMatrix<f64>>;

    /// The interval `(λ_start, λ_end)` of continuation. May be decreasing.
    fn param_range(&self) -> (f64, f64);
}

/// Remembers the last tangent returned along a trace and keeps new tangents
/// pointing the same way.
#[derive(Debug, Clone)]
pub struct TangentOrientation {
    previous: DVector<f64>,
}

impl TangentOrientation {
    /// Seeds the orientation with an explicit reference direction.
    pub fn new(reference: DVector<f64>) -> Self {
        Self {
            previous: reference,
        }
    }

    /// Seeds the orientation with `sign(λ_end - λ_start)` in the λ slot, so the
    /// first tangent heads towards the end of `param_range`.
    pub fn towards_range_end(state_dim: usize, param_range: (f64, f64)) -> Self {
        let mut reference = DVector::zeros(state_dim + 1);
        let (start, end) = param_range;
        reference[state_dim] = if end >= start { 1.0 } else { -1.0 };
        Self::new(reference)
    }

    pub fn previous(&self) -> &DVector<f64> {
        &self.previous
    }

    /// Flips `tangent` if it points against the previous one, then records it.
    pub fn orient(&mut self, mut tangent: DVector<f64>) -> DVector<f64> {
        if tangent.len() == self.previous.len() && tangent.dot(&self.previous) < 0.0 {
            tangent.neg_mut();
        }
        self.previous = tangent.clone();
        tangent
    }

    /// Computes the unit kernel vector of `gradient` and orients it.
    pub fn oriented_kernel(&mut self, gradient: &DMatrix<f64>) -> Result<DVector<f64>> {
        let tangent = kernel_unit_vector(gradient)?;
        Ok(self.orient(tangent))
    }
}
