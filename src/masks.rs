//! Dual half-neighborhood region masks.
//!
//! A square S×S neighborhood is split into two disjoint pixel sets by a line
//! through the window center at a given angle. Membership is decided by the
//! sign of the dot product between the pixel offset and the line's unit
//! normal; the center pixel belongs to neither set. Masks depend only on
//! `(size, angle)` and are precomputed once per sweep by [`MaskBank`].

/// Boolean membership grids for the two half-neighborhood regions.
#[derive(Clone, Debug)]
pub struct DualRegionMask {
    size: usize,
    /// Linear offsets (row-major, within the S×S window) of region A members.
    region_a: Vec<usize>,
    /// Linear offsets of region B members.
    region_b: Vec<usize>,
}

impl DualRegionMask {
    /// Build the masks for a window of odd `size >= 3` split at `angle_deg`.
    pub fn new(size: usize, angle_deg: f32) -> Self {
        assert!(
            size >= 3 && size % 2 == 1,
            "mask size must be odd and at least 3, got {size}"
        );

        let center = (size as f64 - 1.0) / 2.0;
        let theta = (angle_deg as f64).to_radians();
        let (nx, ny) = (theta.cos(), theta.sin());

        let mut region_a = Vec::new();
        let mut region_b = Vec::new();
        for y in 0..size {
            for x in 0..size {
                let xr = x as f64 - center;
                let yr = y as f64 - center;
                if xr.abs() < 0.5 && yr.abs() < 0.5 {
                    continue; // center pixel stays unassigned
                }
                let dot = xr * nx + yr * ny;
                if dot > 0.0 {
                    region_a.push(y * size + x);
                } else if dot < 0.0 {
                    region_b.push(y * size + x);
                }
            }
        }

        Self {
            size,
            region_a,
            region_b,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major window offsets of the pixels in region A.
    #[inline]
    pub fn region_a(&self) -> &[usize] {
        &self.region_a
    }

    /// Row-major window offsets of the pixels in region B.
    #[inline]
    pub fn region_b(&self) -> &[usize] {
        &self.region_b
    }
}

/// Precomputed masks for one neighborhood size across a full angle sweep.
///
/// The masks are pure functions of `(size, angle)`, so one bank is shared by
/// every pixel of an image.
pub struct MaskBank {
    masks: Vec<DualRegionMask>,
}

impl MaskBank {
    pub fn new(size: usize, angles_deg: &[f32]) -> Self {
        assert!(!angles_deg.is_empty(), "angle sweep must not be empty");
        let masks = angles_deg
            .iter()
            .map(|&a| DualRegionMask::new(size, a))
            .collect();
        Self { masks }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    #[inline]
    pub fn get(&self, angle_idx: usize) -> &DualRegionMask {
        &self.masks[angle_idx]
    }
}
