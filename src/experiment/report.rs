//! Result accumulation and reduction.
//!
//! Scores land in a write-once grid indexed by (statistic, mask size, MC
//! iteration); the final reduction collapses the Monte Carlo axis into
//! mean ± sample standard deviation per (statistic, mask size). Unwritten
//! slots (an aborted run) are skipped by the reduction.

use crate::stats::StatKind;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Timing entry for one pipeline stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

/// Aggregated timing trace for an experiment run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming {
            label: label.into(),
            elapsed_ms,
        });
    }
}

/// One reduced result: PCM mean ± std for a (statistic, mask size) pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub statistic: StatKind,
    pub mask_size: usize,
    pub pcm_mean: f64,
    pub pcm_std: f64,
}

/// Full output of one experiment run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentReport {
    pub rows: Vec<SummaryRow>,
    pub timing: TimingBreakdown,
}

impl ExperimentReport {
    /// Plain-text pivot: one row per statistic, one column per mask size.
    pub fn pivot_table(&self) -> String {
        let mut sizes: Vec<usize> = Vec::new();
        for row in &self.rows {
            if !sizes.contains(&row.mask_size) {
                sizes.push(row.mask_size);
            }
        }

        let mut out = String::new();
        let _ = write!(out, "{:>5}", "test");
        for size in &sizes {
            let _ = write!(out, "  {:>16}", format!("mask {size}"));
        }
        out.push('\n');
        for kind in StatKind::ALL {
            let _ = write!(out, "{:>5}", kind.label());
            for &size in &sizes {
                let cell = self
                    .rows
                    .iter()
                    .find(|r| r.statistic == kind && r.mask_size == size)
                    .map(|r| format!("{:.3} ± {:.3}", r.pcm_mean, r.pcm_std))
                    .unwrap_or_else(|| "-".to_string());
                let _ = write!(out, "  {cell:>16}");
            }
            out.push('\n');
        }
        out
    }
}

/// Write-once score slots for (statistic, mask size, MC iteration).
pub(crate) struct ScoreGrid {
    mask_sizes: Vec<usize>,
    n_mc: usize,
    scores: Vec<f64>, // NaN = unwritten
}

impl ScoreGrid {
    pub(crate) fn new(mask_sizes: &[usize], n_mc: usize) -> Self {
        Self {
            mask_sizes: mask_sizes.to_vec(),
            n_mc,
            scores: vec![f64::NAN; StatKind::ALL.len() * mask_sizes.len() * n_mc],
        }
    }

    #[inline]
    fn idx(&self, kind: StatKind, size_idx: usize, mc: usize) -> usize {
        (kind.index() * self.mask_sizes.len() + size_idx) * self.n_mc + mc
    }

    pub(crate) fn set(&mut self, kind: StatKind, size_idx: usize, mc: usize, score: f64) {
        let idx = self.idx(kind, size_idx, mc);
        debug_assert!(
            self.scores[idx].is_nan(),
            "score slot ({kind:?}, size index {size_idx}, mc {mc}) written twice"
        );
        self.scores[idx] = score;
    }

    /// Collapse the Monte Carlo axis; unwritten slots are skipped.
    pub(crate) fn summarize(&self) -> Vec<SummaryRow> {
        let mut rows = Vec::with_capacity(StatKind::ALL.len() * self.mask_sizes.len());
        for kind in StatKind::ALL {
            for (size_idx, &mask_size) in self.mask_sizes.iter().enumerate() {
                let collected: Vec<f64> = (0..self.n_mc)
                    .map(|mc| self.scores[self.idx(kind, size_idx, mc)])
                    .filter(|v| !v.is_nan())
                    .collect();
                rows.push(SummaryRow {
                    statistic: kind,
                    mask_size,
                    pcm_mean: mean(&collected),
                    pcm_std: sample_std(&collected),
                });
            }
        }
        rows
    }
}

/// Arithmetic mean; NaN for an empty slice.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with the (n−1) denominator; 0.0 for n <= 1.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let m = mean(values);
    let ss = values.iter().map(|&v| (v - m) * (v - m)).sum::<f64>();
    (ss / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_sample_has_zero_std() {
        assert_eq!(sample_std(&[42.0]), 0.0);
        assert_eq!(sample_std(&[]), 0.0);
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        // var of {2, 4} with ddof=1 is 2
        assert!(approx_eq(sample_std(&[2.0, 4.0]), 2.0f64.sqrt()));
        assert!(approx_eq(mean(&[2.0, 4.0]), 3.0));
    }

    #[test]
    fn empty_mean_is_nan() {
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn grid_reduces_per_statistic_and_size() {
        let mut grid = ScoreGrid::new(&[5, 11], 2);
        grid.set(StatKind::DoB, 0, 0, 80.0);
        grid.set(StatKind::DoB, 0, 1, 90.0);
        grid.set(StatKind::DoB, 1, 0, 70.0);
        grid.set(StatKind::DoB, 1, 1, 70.0);
        let rows = grid.summarize();
        assert_eq!(rows.len(), 7 * 2);
        let first = rows
            .iter()
            .find(|r| r.statistic == StatKind::DoB && r.mask_size == 5)
            .unwrap();
        assert!(approx_eq(first.pcm_mean, 85.0));
        assert!(first.pcm_std > 0.0);
        let second = rows
            .iter()
            .find(|r| r.statistic == StatKind::DoB && r.mask_size == 11)
            .unwrap();
        assert!(approx_eq(second.pcm_std, 0.0));
    }

    #[test]
    fn unwritten_slots_are_ignored_by_the_reduction() {
        let mut grid = ScoreGrid::new(&[5], 3);
        grid.set(StatKind::Ks, 0, 0, 60.0);
        // mc 1 and 2 never ran
        let rows = grid.summarize();
        let ks = rows.iter().find(|r| r.statistic == StatKind::Ks).unwrap();
        assert!(approx_eq(ks.pcm_mean, 60.0));
        assert_eq!(ks.pcm_std, 0.0);
        let dob = rows.iter().find(|r| r.statistic == StatKind::DoB).unwrap();
        assert!(dob.pcm_mean.is_nan());
    }
}
