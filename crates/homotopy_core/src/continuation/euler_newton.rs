use nalgebra::DVector;

use super::convergence::{ConvergenceCriterion, CorrectorCriterion, TracerCriterion};
use super::step::{ConstantStep, StepAdjuster};
use super::track::Track;
use super::types::{Point, TraceSettings};
use super::util::{pseudo_inverse, DEFAULT_RCOND};
use super::PredictorCorrector;
use crate::error::{ContinuationError, Result};

/// Euler predictor with a pseudo-inverse Newton corrector.
///
/// The predictor takes one explicit Euler step of the current step size along
/// the track tangent. Each correction is a single Newton-like step
/// `x - J⁺ H(x)`, where `J⁺` is the Moore-Penrose inverse of the rectangular
/// `n x (n+1)` gradient.
#[derive(Debug, Clone)]
pub struct EulerNewton<S = ConstantStep, TC = TracerCriterion, CC = CorrectorCriterion> {
    step_adjuster: S,
    tracer_criterion: TC,
    corrector_criterion: CC,
    rcond: f64,
}

impl<S, TC, CC> EulerNewton<S, TC, CC>
where
    S: StepAdjuster,
    TC: ConvergenceCriterion,
    CC: ConvergenceCriterion,
{
    pub fn new(step_adjuster: S, tracer_criterion: TC, corrector_criterion: CC) -> Self {
        Self {
            step_adjuster,
            tracer_criterion,
            corrector_criterion,
            rcond: DEFAULT_RCOND,
        }
    }

    /// Overrides the relative cutoff below which singular values of the
    /// gradient are treated as zero.
    pub fn with_singular_value_cutoff(mut self, rcond: f64) -> Self {
        self.rcond = rcond;
        self
    }

    pub fn tracer_criterion(&self) -> &TC {
        &self.tracer_criterion
    }

    pub fn corrector_criterion(&self) -> &CC {
        &self.corrector_criterion
    }
}

impl EulerNewton {
    /// Builds the constant-step tracer described by `settings`.
    pub fn from_settings(settings: TraceSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::new(
            ConstantStep::new(settings.step_size),
            TracerCriterion::from_settings(settings.tracer),
            CorrectorCriterion::from_settings(settings.corrector),
        ))
    }
}

impl<S, TC, CC> PredictorCorrector for EulerNewton<S, TC, CC>
where
    S: StepAdjuster,
    TC: ConvergenceCriterion,
    CC: ConvergenceCriterion,
{
    type Step = S;
    type Tracer = TC;
    type Corrector = CC;

    fn step_adjuster(&self) -> &S {
        &self.step_adjuster
    }

    fn step_adjuster_mut(&mut self) -> &mut S {
        &mut self.step_adjuster
    }

    fn tracer_criterion_mut(&mut self) -> &mut TC {
        &mut self.tracer_criterion
    }

    fn corrector_criterion_mut(&mut self) -> &mut CC {
        &mut self.corrector_criterion
    }

    fn predict<T: Track + ?Sized>(&self, track: &mut T, point: &Point) -> Result<Point> {
        let tangent = track.tangent(point)?;
        if tangent.len() != point.len() {
            return Err(ContinuationError::dimension_mismatch(
                "tangent length",
                point.len(),
                tangent.len(),
            ));
        }
        Ok(point + tangent * self.step_adjuster.current_step_size())
    }

    fn correct<T: Track + ?Sized>(&self, estimate: &Point, track: &T) -> Result<Point> {
        let jacobian = track.gradient(estimate)?;
        let residual = track.homotopy(estimate)?;
        if jacobian.ncols() != estimate.len() || jacobian.nrows() != residual.len() {
            return Err(ContinuationError::dimension_mismatch(
                "gradient shape",
                format!("{}x{}", residual.len(), estimate.len()),
                format!("{}x{}", jacobian.nrows(), jacobian.ncols()),
            ));
        }
        let pinv = pseudo_inverse(&jacobian, self.rcond)?;
        let delta: DVector<f64> = pinv * residual;
        Ok(estimate - delta)
    }
}
