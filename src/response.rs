//! Per-pixel orientation search producing the seven response maps.
//!
//! For every interior pixel the builder sweeps the candidate split angles,
//! extracts the two half-neighborhood samples through a precomputed mask
//! bank, and folds the divergence statistics into a per-statistic running
//! maximum. The angle that maximizes the *mean* of the seven statistics is
//! recorded separately; that single orientation is shared by every
//! per-statistic suppression pass downstream.
//!
//! Rows are evaluated in parallel; each row owns its output slice, so map
//! writes never alias.

use crate::angle::angle_sweep;
use crate::image::{GrayImageU8, ImageF32, ImageU8};
use crate::masks::MaskBank;
use crate::stats::{divergence_stats, StatKind, STAT_COUNT};
use rayon::prelude::*;

/// Response maps for one (image, neighborhood size) pair.
///
/// The seven statistic maps and the shared orientation map have the same
/// shape as the source image. Pixels whose full neighborhood does not fit
/// keep a zero response and an undefined (NaN) orientation.
pub struct ResponseField {
    pub mask_size: usize,
    maps: Vec<ImageF32>,
    /// Orientation (degrees) of the best mean response, NaN where undefined.
    pub angles: ImageF32,
}

impl ResponseField {
    /// Response map for one statistic.
    pub fn map(&self, kind: StatKind) -> &ImageF32 {
        &self.maps[kind.index()]
    }
}

/// Member offsets of one region relative to the window center.
type RegionOffsets = Vec<(isize, isize)>;

struct RowOutput {
    y: usize,
    best: Vec<[f64; STAT_COUNT]>,
    angles: Vec<f32>,
}

/// Evaluate the orientation sweep over every interior pixel of `image`.
pub fn build_response_field(image: ImageU8<'_>, mask_size: usize, chi_bins: usize) -> ResponseField {
    let angles_deg = angle_sweep(mask_size);
    let bank = MaskBank::new(mask_size, &angles_deg);
    let half = (mask_size - 1) / 2;
    let (w, h) = (image.w, image.h);

    let mut maps: Vec<ImageF32> = (0..STAT_COUNT).map(|_| ImageF32::new(w, h)).collect();
    let mut angles = ImageF32::filled(w, h, f32::NAN);
    if w < mask_size || h < mask_size {
        return ResponseField {
            mask_size,
            maps,
            angles,
        };
    }

    // Window-linear mask offsets converted once to center-relative steps.
    let regions: Vec<(RegionOffsets, RegionOffsets)> = (0..bank.len())
        .map(|i| {
            let mask = bank.get(i);
            (
                center_relative(mask.region_a(), mask_size),
                center_relative(mask.region_b(), mask_size),
            )
        })
        .collect();

    let rows: Vec<RowOutput> = (half..h - half)
        .into_par_iter()
        .map(|y| scan_row(&image, y, half, &angles_deg, &regions, chi_bins))
        .collect();

    for row in rows {
        for (i, (best, angle)) in row.best.iter().zip(&row.angles).enumerate() {
            let x = half + i;
            for kind in StatKind::ALL {
                maps[kind.index()].set(x, row.y, best[kind.index()] as f32);
            }
            angles.set(x, row.y, *angle);
        }
    }

    ResponseField {
        mask_size,
        maps,
        angles,
    }
}

fn center_relative(offsets: &[usize], size: usize) -> RegionOffsets {
    let half = (size - 1) as isize / 2;
    offsets
        .iter()
        .map(|&off| {
            let wx = (off % size) as isize - half;
            let wy = (off / size) as isize - half;
            (wx, wy)
        })
        .collect()
}

fn scan_row(
    image: &ImageU8<'_>,
    y: usize,
    half: usize,
    angles_deg: &[f32],
    regions: &[(RegionOffsets, RegionOffsets)],
    chi_bins: usize,
) -> RowOutput {
    let w = image.w;
    let interior = w - 2 * half;
    let mut best = vec![[f64::NEG_INFINITY; STAT_COUNT]; interior];
    let mut angles = vec![f32::NAN; interior];

    let mut sample_a: Vec<f64> = Vec::with_capacity(regions[0].0.len());
    let mut sample_b: Vec<f64> = Vec::with_capacity(regions[0].1.len());

    for (i, x) in (half..w - half).enumerate() {
        let mut best_mean = f64::NEG_INFINITY;
        for (angle_idx, (region_a, region_b)) in regions.iter().enumerate() {
            sample_a.clear();
            sample_b.clear();
            for &(dx, dy) in region_a {
                let px = (x as isize + dx) as usize;
                let py = (y as isize + dy) as usize;
                sample_a.push(image.get(px, py) as f64);
            }
            for &(dx, dy) in region_b {
                let px = (x as isize + dx) as usize;
                let py = (y as isize + dy) as usize;
                sample_b.push(image.get(px, py) as f64);
            }

            let stats = divergence_stats(&sample_a, &sample_b, chi_bins);
            for kind in StatKind::ALL {
                let v = stats.get(kind);
                if v > best[i][kind.index()] {
                    best[i][kind.index()] = v;
                }
            }
            let mean = stats.mean();
            if mean > best_mean {
                best_mean = mean;
                angles[i] = angles_deg[angle_idx];
            }
        }
    }

    RowOutput { y, best, angles }
}

/// Min–max normalize a response map to the 8-bit range.
///
/// A map whose span is below 1e-9 (constant, or without finite values)
/// normalizes to all zeros. Quantization truncates toward zero.
pub fn normalize_response(map: &ImageF32) -> GrayImageU8 {
    let (w, h) = (map.w, map.h);
    let mut out = GrayImageU8::zeros(w, h);
    let Some((mn, mx)) = map.finite_min_max() else {
        return out;
    };
    let span = (mx - mn) as f64;
    if span < 1e-9 {
        return out;
    }
    for y in 0..h {
        let row = map.row(y);
        for (x, &v) in row.iter().enumerate() {
            let scaled = (v as f64 - mn as f64) / span * 255.0;
            out.set(x, y, scaled as u8);
        }
    }
    out
}
