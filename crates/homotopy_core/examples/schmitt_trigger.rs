//! Traces the Schmitt trigger transfer curve tanh(k (v_o / 2 - v_i)) = v_o
//! from v_i = -0.8 to v_i = 0.8 and prints the hysteresis jump.
//!
//! Debug-level trace events go to stdout through the fmt subscriber:
//! `cargo run --example schmitt_trigger`

use homotopy_core::continuation::{AutoHomotopyTrack, TraceSettings};
use homotopy_core::traits::{HomotopyFunction, Scalar};
use homotopy_core::{EulerNewton, PredictorCorrector};
use tracing_subscriber::fmt::SubscriberBuilder;

struct SchmittTrigger {
    k: f64,
}

impl<T: Scalar> HomotopyFunction<T> for SchmittTrigger {
    fn dimension(&self) -> usize {
        1
    }

    fn apply(&self, x: &[T], lambda: T, out: &mut [T]) {
        let k = T::from_f64(self.k).unwrap();
        let half = T::from_f64(0.5).unwrap();
        out[0] = (k * (x[0] * half - lambda)).tanh() - x[0];
    }
}

fn main() -> anyhow::Result<()> {
    SubscriberBuilder::default()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut track = AutoHomotopyTrack::new(SchmittTrigger { k: 10.0 })
        .with_param_range(-0.8, 0.8)
        .with_initial_root(vec![1.0])?;
    let mut tracer = EulerNewton::from_settings(TraceSettings::default())?;

    let end = tracer.trace(&mut track)?;
    println!("final point: v_o = {:.6}, v_i = {:.6}", end[0], end[1]);

    let arc = tracer.tracer_criterion().arc_points();
    let jump = arc
        .windows(2)
        .find(|w| w[1].param_value < w[0].param_value)
        .map(|w| w[0].param_value);
    println!("accepted points: {}", arc.len());
    if let Some(fold) = jump {
        println!("upper branch folds at v_i ≈ {fold:.4}");
    }
    Ok(())
}
