//! Convergence criteria for the corrector and tracer loops.
//!
//! Each criterion owns an iteration counter that bounds its loop. Counters
//! persist across `converged` calls and are zeroed by `reset`, which the
//! orchestrator calls before every independent loop.

use tracing::{debug, trace};

use super::track::Track;
use super::types::{ArcPoint, CriterionSettings, Point};
use crate::error::{ContinuationError, CriterionRole, Result};

/// Decides when an iterative process has converged or must give up.
pub trait ConvergenceCriterion {
    /// Clears all iteration and accumulation state.
    fn reset(&mut self);

    /// Counts one iteration and reports whether `point` satisfies the criterion.
    ///
    /// Fails with `FailedToConverge` once more than `max_iterations` calls have
    /// been made since the last reset.
    fn converged<T: Track + ?Sized>(&mut self, point: &Point, track: &T) -> Result<bool>;
}

/// Bounded iteration count for one loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationCounter {
    count: usize,
}

impl IterationCounter {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Records one iteration, failing if that exceeds `max_iterations`.
    pub fn tick(&mut self, role: CriterionRole, max_iterations: usize) -> Result<()> {
        self.count += 1;
        if self.count > max_iterations {
            debug!(%role, max_iterations, "iteration budget exhausted");
            return Err(ContinuationError::FailedToConverge {
                role,
                iterations: max_iterations,
            });
        }
        Ok(())
    }
}

/// Accepts a corrected estimate once `‖H(point)‖ < tolerance`.
#[derive(Debug, Clone)]
pub struct CorrectorCriterion {
    settings: CriterionSettings,
    counter: IterationCounter,
}

impl CorrectorCriterion {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self::from_settings(CriterionSettings::new(tolerance, max_iterations))
    }

    pub fn from_settings(settings: CriterionSettings) -> Self {
        Self {
            settings,
            counter: IterationCounter::default(),
        }
    }

    pub fn settings(&self) -> CriterionSettings {
        self.settings
    }

    pub fn iterations(&self) -> usize {
        self.counter.count()
    }
}

impl ConvergenceCriterion for CorrectorCriterion {
    fn reset(&mut self) {
        self.counter.reset();
    }

    fn converged<T: Track + ?Sized>(&mut self, point: &Point, track: &T) -> Result<bool> {
        self.counter
            .tick(CriterionRole::Corrector, self.settings.max_iterations)?;
        let residual = track.homotopy(point)?.norm();
        trace!(iteration = self.counter.count(), residual, "corrector check");
        Ok(residual < self.settings.tolerance)
    }
}

/// Stops the trace once λ has passed the end of the track's parameter range,
/// recording every checked point along the way.
#[derive(Debug, Clone)]
pub struct TracerCriterion {
    settings: CriterionSettings,
    counter: IterationCounter,
    solution_arc: Vec<Point>,
}

impl TracerCriterion {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self::from_settings(CriterionSettings::new(tolerance, max_iterations))
    }

    pub fn from_settings(settings: CriterionSettings) -> Self {
        Self {
            settings,
            counter: IterationCounter::default(),
            solution_arc: Vec::new(),
        }
    }

    pub fn settings(&self) -> CriterionSettings {
        self.settings
    }

    pub fn iterations(&self) -> usize {
        self.counter.count()
    }

    /// Points checked since the last reset, in order.
    pub fn solution_arc(&self) -> &[Point] {
        &self.solution_arc
    }

    /// The solution arc split into state and parameter, e.g. for serialization.
    pub fn arc_points(&self) -> Vec<ArcPoint> {
        self.solution_arc.iter().map(ArcPoint::from_point).collect()
    }
}

impl ConvergenceCriterion for TracerCriterion {
    fn reset(&mut self) {
        self.counter.reset();
        self.solution_arc.clear();
    }

    fn converged<T: Track + ?Sized>(&mut self, point: &Point, track: &T) -> Result<bool> {
        self.counter
            .tick(CriterionRole::Tracer, self.settings.max_iterations)?;
        let lambda = point.as_slice().last().copied().ok_or_else(|| {
            ContinuationError::dimension_mismatch("point length", "at least 1", 0)
        })?;
        self.solution_arc.push(point.clone());

        let (start, end) = track.param_range();
        Ok(if end >= start {
            lambda > end
        } else {
            lambda < end
        })
    }
}
