//! The seven divergence statistics computed between two half-neighborhood
//! samples.
//!
//! Every measure is a pure scalar function of the two 1-D samples. Numeric
//! singularities are resolved locally: zero-variance denominators are
//! epsilon-guarded, a non-finite variance ratio falls back to a bounded
//! stand-in, and the rank tests substitute 0.0 when they cannot produce a
//! value. An empty sample short-circuits to a fixed degenerate record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Small guard added to denominators that may be zero.
const EPS: f64 = 1e-12;

/// Number of divergence statistics.
pub const STAT_COUNT: usize = 7;

/// Closed enumeration of the divergence measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Absolute difference of sample means.
    DoB,
    /// Welch's t-statistic magnitude.
    T,
    /// Variance ratio, larger-over-smaller.
    F,
    /// Likelihood-style score of the variance ratio.
    L,
    /// Mann–Whitney U statistic.
    U,
    /// Two-sample Kolmogorov–Smirnov D statistic.
    #[serde(rename = "KS")]
    Ks,
    /// Chi-square histogram divergence.
    #[serde(rename = "v2")]
    V2,
}

impl StatKind {
    pub const ALL: [StatKind; STAT_COUNT] = [
        StatKind::DoB,
        StatKind::T,
        StatKind::F,
        StatKind::L,
        StatKind::U,
        StatKind::Ks,
        StatKind::V2,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            StatKind::DoB => 0,
            StatKind::T => 1,
            StatKind::F => 2,
            StatKind::L => 3,
            StatKind::U => 4,
            StatKind::Ks => 5,
            StatKind::V2 => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatKind::DoB => "DoB",
            StatKind::T => "T",
            StatKind::F => "F",
            StatKind::L => "L",
            StatKind::U => "U",
            StatKind::Ks => "KS",
            StatKind::V2 => "v2",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed record carrying one value per statistic.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatSet {
    values: [f64; STAT_COUNT],
}

impl StatSet {
    #[inline]
    pub fn get(&self, kind: StatKind) -> f64 {
        self.values[kind.index()]
    }

    #[inline]
    pub fn set(&mut self, kind: StatKind, value: f64) {
        self.values[kind.index()] = value;
    }

    /// Arithmetic mean of the seven values.
    #[inline]
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / STAT_COUNT as f64
    }

    /// Record returned for a degenerate (empty) sample.
    pub fn degenerate() -> Self {
        let mut set = Self::default();
        set.set(StatKind::F, 1.0);
        set
    }
}

/// Compute all seven divergence measures between samples `a` and `b`.
///
/// Sample values are expected in [0, 255]; the `v2` histograms cover that
/// range with `chi_bins` equal-width bins. An empty sample yields the fixed
/// degenerate record rather than an error.
pub fn divergence_stats(a: &[f64], b: &[f64], chi_bins: usize) -> StatSet {
    assert!(chi_bins > 0, "chi-square histogram requires at least one bin");
    if a.is_empty() || b.is_empty() {
        return StatSet::degenerate();
    }

    let (mean_a, var_a) = mean_and_variance(a);
    let (mean_b, var_b) = mean_and_variance(b);
    let na = a.len() as f64;
    let nb = b.len() as f64;

    let mut set = StatSet::default();
    set.set(StatKind::DoB, (mean_a - mean_b).abs());

    let t_denom = (var_a / na + var_b / nb).sqrt();
    set.set(StatKind::T, (mean_a - mean_b).abs() / (t_denom + EPS));

    let f_stat = if var_a <= 0.0 && var_b <= 0.0 {
        1.0
    } else if var_b == 0.0 {
        f64::INFINITY
    } else {
        (var_a / (var_b + EPS)).max(var_b / (var_a + EPS))
    };
    let f_stat = if f_stat.is_finite() {
        f_stat
    } else {
        // bounded stand-in for an unbounded variance ratio
        var_a.max(var_b) * 1e3
    };
    set.set(StatKind::F, f_stat);

    let var_ratio = (var_a + EPS) / (var_b + EPS);
    set.set(StatKind::L, -(na + nb) * (4.0 * var_ratio + EPS).ln());

    set.set(StatKind::U, mann_whitney_u(a, b).unwrap_or(0.0));
    set.set(StatKind::Ks, kolmogorov_smirnov_d(a, b).unwrap_or(0.0));
    set.set(StatKind::V2, chi_square_histogram(a, b, chi_bins));

    set
}

/// Sample mean and (n−1)-denominator variance; variance is 0 for n <= 1.
fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() <= 1 {
        return (mean, 0.0);
    }
    let ss = values.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>();
    (mean, ss / (n - 1.0))
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Mann–Whitney U statistic of the first sample, with midranks over ties.
fn mann_whitney_u(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let na = a.len();
    let mut combined: Vec<(f64, bool)> = Vec::with_capacity(na + b.len());
    combined.extend(a.iter().map(|&v| (v, true)));
    combined.extend(b.iter().map(|&v| (v, false)));
    combined.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal));

    // Sum of 1-based midranks over the first sample.
    let mut rank_sum_a = 0.0f64;
    let mut lo = 0usize;
    while lo < combined.len() {
        let mut hi = lo + 1;
        while hi < combined.len() && combined[hi].0 == combined[lo].0 {
            hi += 1;
        }
        let midrank = (lo + 1 + hi) as f64 * 0.5;
        for entry in &combined[lo..hi] {
            if entry.1 {
                rank_sum_a += midrank;
            }
        }
        lo = hi;
    }

    let na = na as f64;
    Some(rank_sum_a - na * (na + 1.0) * 0.5)
}

/// Two-sample Kolmogorov–Smirnov D: largest gap between the two ECDFs.
fn kolmogorov_smirnov_d(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let sa = sorted(a);
    let sb = sorted(b);
    let na = sa.len() as f64;
    let nb = sb.len() as f64;

    let mut i = 0usize;
    let mut j = 0usize;
    let mut d = 0.0f64;
    while i < sa.len() || j < sb.len() {
        let v = match (sa.get(i), sb.get(j)) {
            (Some(&x), Some(&y)) => x.min(y),
            (Some(&x), None) => x,
            (None, Some(&y)) => y,
            (None, None) => break,
        };
        while i < sa.len() && sa[i] == v {
            i += 1;
        }
        while j < sb.len() && sb[j] == v {
            j += 1;
        }
        let gap = (i as f64 / na - j as f64 / nb).abs();
        if gap > d {
            d = gap;
        }
    }
    Some(d)
}

/// Chi-square-style divergence between equal-width histograms over [0, 255].
fn chi_square_histogram(a: &[f64], b: &[f64], bins: usize) -> f64 {
    let hist_a = histogram_255(a, bins);
    let hist_b = histogram_255(b, bins);
    let mut v2 = 0.0f64;
    for (&r, &s) in hist_a.iter().zip(&hist_b) {
        let denom = (r + s) as f64;
        if denom > 0.0 {
            let diff = r as f64 - s as f64;
            v2 += diff * diff / denom;
        }
    }
    v2
}

fn histogram_255(values: &[f64], bins: usize) -> Vec<u32> {
    let mut hist = vec![0u32; bins];
    for &v in values {
        if !(0.0..=255.0).contains(&v) {
            continue;
        }
        let mut idx = (v / 255.0 * bins as f64) as usize;
        if idx >= bins {
            idx = bins - 1; // v == 255 lands in the last (inclusive) bin
        }
        hist[idx] += 1;
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn constant_samples_have_exact_mean_gap() {
        let a = [10.0; 4];
        let b = [20.0; 4];
        let set = divergence_stats(&a, &b, 16);
        assert!(approx_eq(set.get(StatKind::DoB), 10.0));
        assert!(set.get(StatKind::Ks) >= 0.0);
        assert!(set.get(StatKind::U) >= 0.0);
        // both variances are zero
        assert!(approx_eq(set.get(StatKind::F), 1.0));
    }

    #[test]
    fn empty_sample_yields_degenerate_record() {
        let set = divergence_stats(&[], &[1.0, 2.0], 16);
        assert_eq!(set, StatSet::degenerate());
        assert!(approx_eq(set.get(StatKind::DoB), 0.0));
        assert!(approx_eq(set.get(StatKind::F), 1.0));
        assert!(approx_eq(set.get(StatKind::V2), 0.0));
    }

    #[test]
    fn u_statistic_matches_rank_arithmetic() {
        // a entirely below b: U of a is 0; reversed it is na*nb.
        assert!(approx_eq(
            mann_whitney_u(&[1.0, 2.0], &[3.0, 4.0]).unwrap(),
            0.0
        ));
        assert!(approx_eq(
            mann_whitney_u(&[3.0, 4.0], &[1.0, 2.0]).unwrap(),
            4.0
        ));
        // full tie: midranks make U = na*nb/2
        assert!(approx_eq(
            mann_whitney_u(&[5.0, 5.0], &[5.0, 5.0]).unwrap(),
            2.0
        ));
    }

    #[test]
    fn ks_distance_spans_zero_to_one() {
        let d = kolmogorov_smirnov_d(&[0.0, 1.0, 2.0], &[10.0, 11.0]).unwrap();
        assert!(approx_eq(d, 1.0));
        let same = kolmogorov_smirnov_d(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(approx_eq(same, 0.0));
        let partial = kolmogorov_smirnov_d(&[1.0, 2.0], &[2.0, 3.0]).unwrap();
        assert!(approx_eq(partial, 0.5));
    }

    #[test]
    fn chi_square_counts_disjoint_bins() {
        // all of a in the first bin, all of b in the last
        let a = [0.0, 1.0, 2.0];
        let b = [254.0, 255.0, 253.0];
        let set = divergence_stats(&a, &b, 16);
        // each occupied bin contributes (3-0)^2/3 = 3
        assert!(approx_eq(set.get(StatKind::V2), 6.0));
    }

    #[test]
    fn welch_t_is_symmetric_in_magnitude() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [10.0, 12.0, 14.0, 16.0];
        let ab = divergence_stats(&a, &b, 16);
        let ba = divergence_stats(&b, &a, 16);
        assert!(approx_eq(ab.get(StatKind::T), ba.get(StatKind::T)));
        assert!(ab.get(StatKind::T) > 0.0);
    }

    #[test]
    fn zero_variance_against_spread_uses_bounded_fallback() {
        // var(a) > 0, var(b) == 0 → ratio is unbounded, fallback applies
        let a = [0.0, 200.0, 10.0, 250.0];
        let b = [128.0, 128.0, 128.0, 128.0];
        let set = divergence_stats(&a, &b, 16);
        assert!(set.get(StatKind::F).is_finite());
        assert!(set.get(StatKind::F) > 1.0);
    }

    #[test]
    fn stat_mean_averages_all_seven() {
        let mut set = StatSet::default();
        for kind in StatKind::ALL {
            set.set(kind, 7.0);
        }
        assert!(approx_eq(set.mean(), 7.0));
    }
}
