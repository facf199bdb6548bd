//! Experiment orchestration: Monte Carlo × mask size × threshold sweep.
//!
//! One run walks three nested sweeps. Per Monte Carlo iteration the base
//! image is perturbed with Gaussian noise (skipped when a single iteration
//! is requested); per mask size the orientation search runs once and its
//! angle map is shared by all seven per-statistic suppression passes; per
//! high threshold the suppressed map is binarized, thinned and scored
//! against the synthetic mid-row ground truth. The best score over the
//! threshold sweep fills one write-once slot, and the slots reduce to
//! mean ± std per (statistic, mask size).
//!
//! Runs can be cancelled cooperatively between (MC iteration, mask size)
//! units; completed slots survive, the in-flight unit is discarded.

pub mod params;
pub mod report;

pub use params::{default_high_sweep, ExperimentParams};
pub use report::{ExperimentReport, StageTiming, SummaryRow, TimingBreakdown};

use crate::edges::{hysteresis_binarize, suppress_non_maxima, thin};
use crate::image::{GrayImageU8, ImageU8};
use crate::metrics::percentage_correct_match;
use crate::response::{build_response_field, normalize_response};
use crate::stats::StatKind;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use report::ScoreGrid;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Standard deviation of the Monte Carlo intensity noise.
pub const NOISE_SIGMA: f64 = 0.5;

/// Identifies an emitted edge map.
#[derive(Clone, Debug)]
pub struct EdgeMapMeta {
    pub statistic: StatKind,
    pub mask_size: usize,
    /// 1-based Monte Carlo iteration.
    pub mc_iteration: usize,
    /// High threshold that produced the best score.
    pub high_threshold: f32,
    /// Score of the emitted map.
    pub pcm: f64,
}

/// Receives the best thinned edge map per (statistic, mask size, MC
/// iteration). Failures are logged by the orchestrator and never abort a
/// run.
pub trait EdgeMapSink {
    fn emit(&mut self, meta: &EdgeMapMeta, map: &GrayImageU8) -> Result<(), String>;
}

/// Orchestrates the full measurement over one grayscale image.
pub struct EdgeExperiment {
    params: ExperimentParams,
    sink: Option<Box<dyn EdgeMapSink>>,
    cancel: Arc<AtomicBool>,
}

impl EdgeExperiment {
    /// Create an orchestrator; rejects malformed parameters up front.
    pub fn new(params: ExperimentParams) -> Result<Self, String> {
        params.validate()?;
        Ok(Self {
            params,
            sink: None,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Attach a sink receiving the best edge map per result slot.
    pub fn with_sink(mut self, sink: Box<dyn EdgeMapSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn params(&self) -> &ExperimentParams {
        &self.params
    }

    /// Flag observed between sweep units; set it to stop a running sweep.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the full sweep and reduce the per-slot best scores.
    pub fn run(&mut self, image: ImageU8<'_>) -> ExperimentReport {
        let total_start = Instant::now();
        let truth = ground_truth(image.w, image.h);
        let n_mc = self.params.monte_carlo_iters;
        let mut grid = ScoreGrid::new(&self.params.mask_sizes, n_mc);
        let mut timing = TimingBreakdown::default();
        let mut rng = match self.params.noise_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        'sweep: for mc in 0..n_mc {
            let frame = if n_mc > 1 {
                perturb(&image, &mut rng)
            } else {
                owned_copy(&image)
            };

            for size_idx in 0..self.params.mask_sizes.len() {
                if self.cancel.load(Ordering::Relaxed) {
                    debug!(
                        "EdgeExperiment::run cancelled before mc {}/{} mask {}",
                        mc + 1,
                        n_mc,
                        self.params.mask_sizes[size_idx]
                    );
                    break 'sweep;
                }
                let mask_size = self.params.mask_sizes[size_idx];
                let unit_start = Instant::now();
                self.process_unit(&frame, &truth, mask_size, size_idx, mc, &mut grid);
                let elapsed_ms = unit_start.elapsed().as_secs_f64() * 1000.0;
                timing.push(format!("mc{}/mask{}", mc + 1, mask_size), elapsed_ms);
                debug!(
                    "EdgeExperiment::run mc {}/{} mask {} done in {:.1} ms",
                    mc + 1,
                    n_mc,
                    mask_size,
                    elapsed_ms
                );
            }
        }

        timing.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        ExperimentReport {
            rows: grid.summarize(),
            timing,
        }
    }

    /// One (MC iteration, mask size) unit: orientation search, then the
    /// per-statistic suppression and threshold sweep.
    fn process_unit(
        &mut self,
        frame: &GrayImageU8,
        truth: &GrayImageU8,
        mask_size: usize,
        size_idx: usize,
        mc: usize,
        grid: &mut ScoreGrid,
    ) {
        let field = build_response_field(frame.as_view(), mask_size, self.params.chi_bins);

        for kind in StatKind::ALL {
            let norm = normalize_response(field.map(kind));
            let suppressed = suppress_non_maxima(&norm, &field.angles);

            let mut best: Option<(f64, f32, GrayImageU8)> = None;
            for &high in &self.params.high_thresholds {
                let low = self.params.low_ratio * high;
                let binary = hysteresis_binarize(&suppressed, high, low);
                let skeleton = thin(&binary);
                let score =
                    percentage_correct_match(&skeleton, truth, self.params.match_tolerance);
                // strict > keeps the earliest threshold on ties
                if best.as_ref().map_or(true, |(s, _, _)| score > *s) {
                    best = Some((score, high, skeleton));
                }
            }

            let (score, high, skeleton) =
                best.expect("threshold sweep is validated to be non-empty");
            grid.set(kind, size_idx, mc, score);

            if let Some(sink) = self.sink.as_mut() {
                let meta = EdgeMapMeta {
                    statistic: kind,
                    mask_size,
                    mc_iteration: mc + 1,
                    high_threshold: high,
                    pcm: score,
                };
                if let Err(err) = sink.emit(&meta, &skeleton) {
                    warn!(
                        "edge map sink failed for {} mask {} mc {}: {err}",
                        kind,
                        mask_size,
                        mc + 1
                    );
                }
            }
        }
    }
}

/// Synthetic reference: a single-pixel horizontal line at the middle row.
fn ground_truth(w: usize, h: usize) -> GrayImageU8 {
    let mut truth = GrayImageU8::zeros(w, h);
    if h > 0 {
        let mid = h / 2;
        for x in 0..w {
            truth.set(x, mid, 1);
        }
    }
    truth
}

fn owned_copy(image: &ImageU8<'_>) -> GrayImageU8 {
    let mut data = Vec::with_capacity(image.w * image.h);
    for y in 0..image.h {
        data.extend_from_slice(image.row(y));
    }
    GrayImageU8::new(image.w, image.h, data)
}

/// Add zero-mean Gaussian noise, clip to [0, 255] and round to 8 bits.
fn perturb(image: &ImageU8<'_>, rng: &mut StdRng) -> GrayImageU8 {
    let normal = Normal::new(0.0, NOISE_SIGMA).expect("noise sigma is positive");
    let mut data = Vec::with_capacity(image.w * image.h);
    for y in 0..image.h {
        for &px in image.row(y) {
            let noisy = px as f64 + normal.sample(rng);
            data.push(noisy.clamp(0.0, 255.0).round() as u8);
        }
    }
    GrayImageU8::new(image.w, image.h, data)
}
