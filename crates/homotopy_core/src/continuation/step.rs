use serde::{Deserialize, Serialize};

use super::track::Track;
use super::types::Point;
use crate::error::Result;

/// Step-size controller for the predictor.
pub trait StepAdjuster {
    /// Updates the step size after `point` has been accepted on `track`.
    fn adjust<T: Track + ?Sized>(&mut self, track: &T, point: &Point) -> Result<()>;

    /// The step size for the next predictor call.
    fn current_step_size(&self) -> f64;
}

/// A step-size controller that never changes the step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantStep {
    h: f64,
}

impl ConstantStep {
    pub fn new(h: f64) -> Self {
        Self { h }
    }
}

impl Default for ConstantStep {
    fn default() -> Self {
        Self::new(1e-2)
    }
}

impl StepAdjuster for ConstantStep {
    fn adjust<T: Track + ?Sized>(&mut self, _track: &T, _point: &Point) -> Result<()> {
        Ok(())
    }

    fn current_step_size(&self) -> f64 {
        self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuation::tests_support::LineTrack;
    use nalgebra::DVector;

    #[test]
    fn constant_step_ignores_adjust() {
        let mut step = ConstantStep::new(0.25);
        let track = LineTrack::new(0.0, 1.0);
        for lambda in [0.0, 0.5, 2.0] {
            step.adjust(&track, &DVector::from_vec(vec![lambda, lambda]))
                .unwrap();
            assert_eq!(step.current_step_size(), 0.25);
        }
    }

    #[test]
    fn default_step_is_one_hundredth() {
        assert_eq!(ConstantStep::default().current_step_size(), 1e-2);
    }
}
