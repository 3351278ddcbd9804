pub mod auto_track;
pub mod convergence;
pub mod euler_newton;
pub mod step;
pub mod track;
pub mod types;
pub mod util;

pub use auto_track::AutoHomotopyTrack;
pub use convergence::{
    ConvergenceCriterion, CorrectorCriterion, IterationCounter, TracerCriterion,
};
pub use euler_newton::EulerNewton;
pub use step::{ConstantStep, StepAdjuster};
pub use track::{TangentOrientation, Track};
pub use types::{ArcPoint, CriterionSettings, Point, TraceSettings};
pub use util::{kernel_unit_vector, pseudo_inverse, DEFAULT_RCOND};

use tracing::{debug, trace};

use crate::error::Result;

/// A predictor-corrector curve tracer.
///
/// Implementors supply one `predict` and one `correct` step plus access to
/// their step adjuster and convergence criteria; `trace` composes them. The
/// components are owned by the method and reused across traces.
pub trait PredictorCorrector {
    type Step: StepAdjuster;
    type Tracer: ConvergenceCriterion;
    type Corrector: ConvergenceCriterion;

    fn step_adjuster(&self) -> &Self::Step;
    fn step_adjuster_mut(&mut self) -> &mut Self::Step;
    fn tracer_criterion_mut(&mut self) -> &mut Self::Tracer;
    fn corrector_criterion_mut(&mut self) -> &mut Self::Corrector;

    /// Predicts the next point on the track from `point`.
    fn predict<T: Track + ?Sized>(&self, track: &mut T, point: &Point) -> Result<Point>;

    /// Applies a single correction step to `estimate`.
    ///
    /// Looping until the corrector criterion is satisfied is done by `trace`.
    fn correct<T: Track + ?Sized>(&self, estimate: &Point, track: &T) -> Result<Point>;

    /// Traces `track` from its initial point and returns the final point.
    ///
    /// The tracer criterion is checked before each prediction, so the result
    /// is the first accepted point whose parameter has passed the end of the
    /// range; it is not interpolated back onto the boundary. Convergence
    /// failures of either loop abort the trace.
    fn trace<T: Track + ?Sized>(&mut self, track: &mut T) -> Result<Point> {
        let mut point = track.initial_point()?;
        debug!(
            start = ?point.as_slice(),
            param_range = ?track.param_range(),
            "trace started"
        );

        self.tracer_criterion_mut().reset();
        let mut steps = 0usize;
        while !self.tracer_criterion_mut().converged(&point, &*track)? {
            let mut estimate = self.predict(track, &point)?;

            self.corrector_criterion_mut().reset();
            while !self.corrector_criterion_mut().converged(&estimate, &*track)? {
                estimate = self.correct(&estimate, &*track)?;
            }

            point = estimate;
            self.step_adjuster_mut().adjust(&*track, &point)?;
            steps += 1;
            trace!(
                step = steps,
                point = ?point.as_slice(),
                step_size = self.step_adjuster().current_step_size(),
                "accepted point"
            );
        }

        debug!(steps, end = ?point.as_slice(), "trace finished");
        Ok(point)
    }
}


#[cfg(test)]
mod tests {
    use super::tests_support::{LineTrack, SchmittTrigger, SchmittTriggerTrack};
    use super::*;
    use crate::error::ContinuationError;
    use nalgebra::{DMatrix, DVector};

    fn reference_tracer() -> EulerNewton {
        EulerNewton::new(
            ConstantStep::new(1e-2),
            TracerCriterion::new(1e-6, 10000),
            CorrectorCriterion::new(1e-6, 1000),
        )
    }

    fn assert_jumped_to_lower_branch(end: &Point) {
        assert!(end[1] > 0.8, "λ should pass the target, got {}", end[1]);
        assert!(end[1] <= 0.8 + 1e-2 + 1e-6, "λ overshot by more than a step: {}", end[1]);
        assert!((end[0] + 1.0).abs() < 1e-3, "expected v_o ≈ -1, got {}", end[0]);
    }

    #[test]
    fn schmitt_trigger_with_analytic_gradient() {
        let mut track = SchmittTriggerTrack::new();
        let mut method = reference_tracer();

        let end = method.trace(&mut track).expect("trace should converge");
        assert_jumped_to_lower_branch(&end);

        let arc = method.tracer_criterion().solution_arc();
        assert_eq!(arc[0].as_slice(), &[1.0, -0.8]);
        assert_eq!(arc.last(), Some(&end));
        // The curve folds back, so λ is not monotone along the arc.
        assert!(arc.windows(2).any(|w| w[1][1] < w[0][1]));
    }

    #[test]
    fn schmitt_trigger_with_auto_gradient() {
        let mut track = AutoHomotopyTrack::new(SchmittTrigger::default())
            .with_param_range(-0.8, 0.8)
            .with_initial_root(vec![1.0])
            .unwrap();
        let mut method = EulerNewton::from_settings(TraceSettings::default()).unwrap();

        let end = method.trace(&mut track).expect("trace should converge");
        assert_jumped_to_lower_branch(&end);
    }

    #[test]
    fn schmitt_trigger_tangents_stay_consistent() {
        let mut track = SchmittTriggerTrack::new();
        let mut method = reference_tracer();
        method.trace(&mut track).unwrap();

        let arc = method.tracer_criterion().solution_arc().to_vec();
        let mut replay = AutoHomotopyTrack::new(SchmittTrigger::default())
            .with_param_range(-0.8, 0.8);
        let mut previous: Option<nalgebra::DVector<f64>> = None;
        for point in &arc {
            let tangent = replay.tangent(point).unwrap();
            if let Some(prev) = previous {
                assert!(prev.dot(&tangent) >= 0.0);
            }
            previous = Some(tangent);
        }
    }

    /// Line track whose residual evaluation refuses points with λ above a
    /// cutoff, reporting through `anyhow`.
    struct CutoffTrack {
        line: LineTrack,
        cutoff: f64,
    }

    fn checked_lambda(point: &Point, cutoff: f64) -> anyhow::Result<f64> {
        let lambda = point[1];
        if lambda > cutoff {
            anyhow::bail!("λ = {lambda} is beyond the model's validity cutoff {cutoff}");
        }
        Ok(lambda)
    }

    impl Track for CutoffTrack {
        fn initial_point(&self) -> Result<Point> {
            self.line.initial_point()
        }

        fn tangent(&mut self, point: &Point) -> Result<DVector<f64>> {
            self.line.tangent(point)
        }

        fn homotopy(&self, point: &Point) -> Result<DVector<f64>> {
            let lambda = checked_lambda(point, self.cutoff)?;
            Ok(DVector::from_element(1, point[0] - lambda))
        }

        fn gradient(&self, point: &Point) -> Result<DMatrix<f64>> {
            self.line.gradient(point)
        }

        fn param_range(&self) -> (f64, f64) {
            self.line.param_range()
        }
    }

    #[test]
    fn track_errors_abort_trace_without_role() {
        let mut track = CutoffTrack {
            line: LineTrack::new(0.0, 1.0),
            cutoff: 0.3,
        };
        let mut method = EulerNewton::new(
            ConstantStep::new(0.1),
            TracerCriterion::new(1e-6, 100),
            CorrectorCriterion::new(1e-6, 10),
        );

        let err = method.trace(&mut track).expect_err("cutoff should abort");
        assert!(matches!(err, ContinuationError::Track(_)));
        assert_eq!(err.failed_role(), None);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert!(source.is_some_and(|s| s.contains("validity cutoff")));

        // Points recorded before the failure are still below the cutoff.
        let arc = method.tracer_criterion().solution_arc();
        assert!(!arc.is_empty());
        assert!(arc.iter().all(|p| p[1] <= 0.3));
    }

    #[test]
    fn missing_initial_root_aborts_trace() {
        let mut track = AutoHomotopyTrack::new(SchmittTrigger::default());
        let mut method = reference_tracer();
        let err = method.trace(&mut track).expect_err("no initial root");
        assert!(format!("{err}").contains("initial_point is not implemented"));
    }
}
