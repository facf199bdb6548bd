//! Non-maximum suppression along the per-pixel response orientation.

use crate::angle::unit_step;
use crate::image::{GrayImageU8, ImageF32};

/// Suppress pixels that are not local maxima along their own orientation.
///
/// For each pixel with a defined angle, the two neighbors at ±1 step along
/// the rounded direction vector are inspected; the pixel keeps its value
/// when it is ≥ both. Out-of-bounds neighbors never dominate, so border
/// pixels with a defined angle survive. Pixels with an undefined (NaN)
/// angle come out as 0.
pub fn suppress_non_maxima(response: &GrayImageU8, angles: &ImageF32) -> GrayImageU8 {
    let (w, h) = (response.width(), response.height());
    assert_eq!(
        (angles.w, angles.h),
        (w, h),
        "response and angle maps must share a shape"
    );

    let mut out = GrayImageU8::zeros(w, h);
    for y in 0..h {
        for x in 0..w {
            let angle = angles.get(x, y);
            if !angle.is_finite() {
                continue;
            }
            let (dx, dy) = unit_step(angle);
            let val = response.get(x, y);
            let forward = neighbor_value(response, x as i64 + dx, y as i64 + dy);
            let backward = neighbor_value(response, x as i64 - dx, y as i64 - dy);
            if forward.map_or(true, |v| val >= v) && backward.map_or(true, |v| val >= v) {
                out.set(x, y, val);
            }
        }
    }
    out
}

#[inline]
fn neighbor_value(map: &GrayImageU8, x: i64, y: i64) -> Option<u8> {
    if x < 0 || y < 0 || x >= map.width() as i64 || y >= map.height() as i64 {
        return None;
    }
    Some(map.get(x as usize, y as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_angles(w: usize, h: usize, angle: f32) -> ImageF32 {
        ImageF32::filled(w, h, angle)
    }

    #[test]
    fn isolated_maximum_survives_and_dominated_neighbors_vanish() {
        let mut resp = GrayImageU8::zeros(5, 5);
        resp.set(1, 2, 80);
        resp.set(2, 2, 200);
        resp.set(3, 2, 90);
        // angle 0 → horizontal comparison
        let out = suppress_non_maxima(&resp, &uniform_angles(5, 5, 0.0));
        assert_eq!(out.get(2, 2), 200);
        assert_eq!(out.get(1, 2), 0);
        assert_eq!(out.get(3, 2), 0);
    }

    #[test]
    fn comparison_follows_the_orientation() {
        let mut resp = GrayImageU8::zeros(5, 5);
        resp.set(2, 1, 150);
        resp.set(2, 2, 100);
        resp.set(2, 3, 150);
        // horizontal comparison ignores the stronger vertical neighbors
        let horizontal = suppress_non_maxima(&resp, &uniform_angles(5, 5, 0.0));
        assert_eq!(horizontal.get(2, 2), 100);
        // vertical comparison suppresses the middle pixel
        let vertical = suppress_non_maxima(&resp, &uniform_angles(5, 5, 90.0));
        assert_eq!(vertical.get(2, 2), 0);
    }

    #[test]
    fn undefined_angle_produces_zero() {
        let mut resp = GrayImageU8::zeros(3, 3);
        resp.set(1, 1, 255);
        let out = suppress_non_maxima(&resp, &ImageF32::filled(3, 3, f32::NAN));
        assert!(out.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn suppression_is_idempotent() {
        let mut resp = GrayImageU8::zeros(7, 7);
        for (x, v) in [(1usize, 40u8), (2, 90), (3, 90), (4, 20), (5, 60)] {
            resp.set(x, 3, v);
        }
        let angles = uniform_angles(7, 7, 0.0);
        let once = suppress_non_maxima(&resp, &angles);
        let twice = suppress_non_maxima(&once, &angles);
        assert_eq!(once, twice);
    }
}
