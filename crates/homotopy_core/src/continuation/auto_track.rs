//! A track whose gradient comes from forward-mode automatic differentiation.

use nalgebra::{DMatrix, DVector};

use super::track::{TangentOrientation, Track};
use super::types::Point;
use crate::autodiff::{homotopy_jacobian, Dual};
use crate::error::{ContinuationError, Result};
use crate::traits::HomotopyFunction;

/// Wraps a `HomotopyFunction` so it can be traced without hand-written
/// derivatives.
///
/// The map must be implemented for both `f64` and `Dual`; the gradient is
/// assembled from one dual sweep per column.
#[derive(Debug, Clone)]
pub struct AutoHomotopyTrack<H> {
    map: H,
    init_root: Option<Vec<f64>>,
    param_range: (f64, f64),
    orientation: TangentOrientation,
}

impl<H> AutoHomotopyTrack<H>
where
    H: HomotopyFunction<f64> + HomotopyFunction<Dual>,
{
    /// Creates a track over `(0, 1)` with no initial root configured.
    pub fn new(map: H) -> Self {
        let n = <H as HomotopyFunction<f64>>::dimension(&map);
        let param_range = (0.0, 1.0);
        Self {
            map,
            init_root: None,
            param_range,
            orientation: TangentOrientation::towards_range_end(n, param_range),
        }
    }

    pub fn with_param_range(mut self, start: f64, end: f64) -> Self {
        self.param_range = (start, end);
        self.reset_orientation();
        self
    }

    /// Sets the root of H(·, λ_start) the trace starts from.
    pub fn with_initial_root(mut self, root: Vec<f64>) -> Result<Self> {
        let n = self.state_dim();
        if root.len() != n {
            return Err(ContinuationError::dimension_mismatch(
                "initial root length",
                n,
                root.len(),
            ));
        }
        self.init_root = Some(root);
        Ok(self)
    }

    pub fn map(&self) -> &H {
        &self.map
    }

    /// Re-seeds the tangent orientation so the next tangent heads towards the
    /// end of the parameter range. Call between independent traces.
    pub fn reset_orientation(&mut self) {
        self.orientation =
            TangentOrientation::towards_range_end(self.state_dim(), self.param_range);
    }

    fn state_dim(&self) -> usize {
        <H as HomotopyFunction<f64>>::dimension(&self.map)
    }

    fn split<'a>(&self, point: &'a Point) -> Result<(&'a [f64], f64)> {
        let n = self.state_dim();
        if point.len() != n + 1 {
            return Err(ContinuationError::dimension_mismatch(
                "point length",
                n + 1,
                point.len(),
            ));
        }
        let values = point.as_slice();
        Ok((&values[..n], values[n]))
    }
}

impl<H> Track for AutoHomotopyTrack<H>
where
    H: HomotopyFunction<f64> + HomotopyFunction<Dual>,
{
    fn initial_point(&self) -> Result<Point> {
        let root = self
            .init_root
            .as_ref()
            .ok_or(ContinuationError::NotImplemented {
                operation: "initial_point",
            })?;
        let mut point = DVector::zeros(root.len() + 1);
        point.rows_mut(0, root.len()).copy_from_slice(root);
        point[root.len()] = self.param_range.0;
        Ok(point)
    }

    fn tangent(&mut self, point: &Point) -> Result<DVector<f64>> {
        let gradient = self.gradient(point)?;
        self.orientation.oriented_kernel(&gradient)
    }

    fn homotopy(&self, point: &Point) -> Result<DVector<f64>> {
        let (x, lambda) = self.split(point)?;
        let mut out = DVector::zeros(x.len());
        <H as HomotopyFunction<f64>>::apply(&self.map, x, lambda, out.as_mut_slice());
        Ok(out)
    }

    fn gradient(&self, point: &Point) -> Result<DMatrix<f64>> {
        let (x, lambda) = self.split(point)?;
        Ok(homotopy_jacobian(&self.map, x, lambda))
    }

    fn param_range(&self) -> (f64, f64) {
        self.param_range
    }
}
