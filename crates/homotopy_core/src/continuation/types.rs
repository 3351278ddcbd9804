//! Core types for homotopy continuation.
//!
//! Settings structs are plain serde types so drivers can load them from
//! whatever configuration format they use.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{ContinuationError, Result};

/// A point on the homotopy curve: `n` state components followed by λ.
pub type Point = DVector<f64>;

/// Bounds for one convergence criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl CriterionSettings {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Checks that the tolerance is finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ContinuationError::InvalidSettings {
                reason: "tolerance must be finite and positive",
            });
        }
        Ok(())
    }
}

/// Settings for a constant-step Euler-Newton trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSettings {
    pub step_size: f64,
    pub corrector: CriterionSettings,
    pub tracer: CriterionSettings,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            step_size: 1e-2,
            corrector: CriterionSettings::new(1e-6, 1000),
            tracer: CriterionSettings::new(1e-6, 10000),
        }
    }
}

impl TraceSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(ContinuationError::InvalidSettings {
                reason: "step_size must be finite and positive",
            });
        }
        self.corrector.validate()?;
        self.tracer.validate()
    }
}

/// A single accepted point of a solution arc, split into state and parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcPoint {
    pub state: Vec<f64>,
    pub param_value: f64,
}

impl ArcPoint {
    /// Splits a point into its state components and its trailing parameter.
    pub fn from_point(point: &Point) -> Self {
        let n = point.len().saturating_sub(1);
        Self {
            state: point.rows(0, n).iter().cloned().collect(),
            param_value: point.get(n).copied().unwrap_or(f64::NAN),
        }
    }

    pub fn to_point(&self) -> Point {
        let mut aug = DVector::zeros(self.state.len() + 1);
        for (i, &val) in self.state.iter().enumerate() {
            aug[i] = val;
        }
        aug[self.state.len()] = self.param_value;
        aug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_point_places_param_last() {
        let point = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let arc = ArcPoint::from_point(&point);
        assert_eq!(arc.state, vec![1.0, 2.0]);
        assert_eq!(arc.param_value, 3.0);
        assert_eq!(arc.to_point(), point);
    }

    #[test]
    fn default_settings_match_reference_driver() {
        let settings = TraceSettings::default();
        assert_eq!(settings.step_size, 1e-2);
        assert_eq!(settings.corrector, CriterionSettings::new(1e-6, 1000));
        assert_eq!(settings.tracer, CriterionSettings::new(1e-6, 10000));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut settings = TraceSettings::default();
        settings.step_size = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = TraceSettings::default();
        settings.corrector.tolerance = f64::NAN;
        let err = settings.validate().expect_err("expected invalid tolerance");
        assert!(format!("{err}").contains("tolerance"));
    }
}
