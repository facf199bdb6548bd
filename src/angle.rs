//! Angle utilities shared by the orientation sweep and suppression stages.

/// Candidate split angles in degrees, evenly spaced over [0, 180).
///
/// The splitting line is π-periodic (a line and its 180°-rotated counterpart
/// are identical), so the sweep stops short of 180°. The 5×5 neighborhood
/// offers too few distinct splits to justify a dense sweep; larger
/// neighborhoods use 20 angles.
pub fn angle_sweep(mask_size: usize) -> Vec<f32> {
    let count = if mask_size == 5 { 12 } else { 20 };
    let step = 180.0 / count as f32;
    (0..count).map(|i| i as f32 * step).collect()
}

/// Pixel step along an orientation, rounded to the nearest integer offset.
///
/// Returns `(dx, dy)` with `dx = round(cos θ)` and `dy = round(sin θ)`.
/// The trigonometry runs in f64 so near-half components (cos 60°, sin 30°)
/// quantize consistently.
#[inline]
pub fn unit_step(angle_deg: f32) -> (i64, i64) {
    let theta = (angle_deg as f64).to_radians();
    (theta.cos().round() as i64, theta.sin().round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn sweep_counts_by_mask_size() {
        assert_eq!(angle_sweep(5).len(), 12);
        assert_eq!(angle_sweep(11).len(), 20);
        assert_eq!(angle_sweep(19).len(), 20);
    }

    #[test]
    fn sweep_excludes_endpoint() {
        for size in [5usize, 11] {
            let angles = angle_sweep(size);
            assert!(approx_eq(angles[0], 0.0));
            assert!(angles.iter().all(|&a| a < 180.0));
        }
        assert!(approx_eq(angle_sweep(5)[1], 15.0));
        assert!(approx_eq(angle_sweep(11)[1], 9.0));
    }

    #[test]
    fn unit_step_quantizes_to_neighbors() {
        assert_eq!(unit_step(0.0), (1, 0));
        assert_eq!(unit_step(90.0), (0, 1));
        assert_eq!(unit_step(45.0), (1, 1));
        assert_eq!(unit_step(135.0), (-1, 1));
    }
}
