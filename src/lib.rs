#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod experiment;
pub mod image;
pub mod metrics;
pub mod stats;

// Lower-level building blocks – public for tools and experiments.
pub mod angle;
pub mod edges;
pub mod masks;
pub mod response;

// --- High-level re-exports -------------------------------------------------

// Main entry points: orchestrator + configuration + results.
pub use crate::experiment::{
    EdgeExperiment, EdgeMapMeta, EdgeMapSink, ExperimentParams, ExperimentReport, SummaryRow,
};
pub use crate::stats::{StatKind, StatSet};

/// Small prelude for quick experiments.
///
/// ```no_run
/// use stat_edge_detector::prelude::*;
///
/// # fn main() -> Result<(), String> {
/// let (w, h) = (64usize, 48usize);
/// let gray = vec![0u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let mut experiment = EdgeExperiment::new(ExperimentParams {
///     mask_sizes: vec![5],
///     monte_carlo_iters: 1,
///     ..Default::default()
/// })?;
///
/// let report = experiment.run(img);
/// println!("{}", report.pivot_table());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{GrayImageU8, ImageU8};
    pub use crate::{EdgeExperiment, ExperimentParams, ExperimentReport, StatKind};
}
