//! Experiment configuration.
//!
//! All sweep knobs travel in one immutable value handed to the orchestrator,
//! so runs are reentrant and independently testable. Defaults carry the
//! reference protocol: mask sizes {5, 11, 15, 19}, five Monte Carlo
//! iterations, twelve high thresholds from 240 down to 20, low threshold at
//! 0.4 × high, 16 chi-square bins and a one-pixel match tolerance.

use serde::{Deserialize, Serialize};

/// Parameters of one experiment run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperimentParams {
    /// Neighborhood side lengths to sweep; each must be odd and >= 3.
    pub mask_sizes: Vec<usize>,
    /// Monte Carlo repetitions; noise is only injected when > 1.
    pub monte_carlo_iters: usize,
    /// High-threshold sweep for hysteresis, values in [0, 255].
    pub high_thresholds: Vec<f32>,
    /// Low threshold as a fraction of the high threshold, in (0, 1].
    pub low_ratio: f32,
    /// Histogram bin count for the chi-square divergence.
    pub chi_bins: usize,
    /// Localization tolerance radius in pixels.
    pub match_tolerance: u32,
    /// Optional RNG seed for reproducible Monte Carlo noise.
    pub noise_seed: Option<u64>,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        Self {
            mask_sizes: vec![5, 11, 15, 19],
            monte_carlo_iters: 5,
            high_thresholds: default_high_sweep(),
            low_ratio: 0.4,
            chi_bins: 16,
            match_tolerance: 1,
            noise_seed: None,
        }
    }
}

/// Twelve thresholds linearly spaced from 240 down to 20.
pub fn default_high_sweep() -> Vec<f32> {
    let (start, end, count) = (240.0f32, 20.0f32, 12usize);
    let step = (end - start) / (count - 1) as f32;
    (0..count).map(|i| start + i as f32 * step).collect()
}

impl ExperimentParams {
    /// Reject malformed configuration with a diagnostic naming the defect.
    pub fn validate(&self) -> Result<(), String> {
        if self.mask_sizes.is_empty() {
            return Err("mask size list must not be empty".into());
        }
        for &size in &self.mask_sizes {
            if size < 3 || size % 2 == 0 {
                return Err(format!("mask size must be odd and at least 3, got {size}"));
            }
        }
        if self.monte_carlo_iters == 0 {
            return Err("Monte Carlo iteration count must be at least 1".into());
        }
        if self.high_thresholds.is_empty() {
            return Err("high threshold sweep must not be empty".into());
        }
        if !(self.low_ratio > 0.0 && self.low_ratio <= 1.0) {
            return Err(format!(
                "low/high threshold ratio must lie in (0, 1], got {}",
                self.low_ratio
            ));
        }
        if self.chi_bins == 0 {
            return Err("chi-square histogram bin count must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(ExperimentParams::default().validate().is_ok());
    }

    #[test]
    fn default_sweep_spans_240_down_to_20() {
        let sweep = default_high_sweep();
        assert_eq!(sweep.len(), 12);
        assert_eq!(sweep[0], 240.0);
        assert_eq!(sweep[11], 20.0);
        assert_eq!(sweep[1], 220.0);
    }

    #[test]
    fn even_mask_size_is_rejected() {
        let params = ExperimentParams {
            mask_sizes: vec![5, 8],
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.contains("odd"), "unexpected message: {err}");
    }

    #[test]
    fn empty_sweeps_are_rejected() {
        let no_masks = ExperimentParams {
            mask_sizes: vec![],
            ..Default::default()
        };
        assert!(no_masks.validate().is_err());

        let no_thresholds = ExperimentParams {
            high_thresholds: vec![],
            ..Default::default()
        };
        assert!(no_thresholds.validate().is_err());
    }

    #[test]
    fn zero_ratio_and_bins_are_rejected() {
        let bad_ratio = ExperimentParams {
            low_ratio: 0.0,
            ..Default::default()
        };
        assert!(bad_ratio.validate().is_err());

        let bad_bins = ExperimentParams {
            chi_bins: 0,
            ..Default::default()
        };
        assert!(bad_bins.validate().is_err());
    }
}
