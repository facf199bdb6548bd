//! Double-threshold hysteresis binarization and skeleton thinning.

use crate::image::GrayImageU8;

/// Binarize a suppressed response map with two-level hysteresis.
///
/// Thresholds are clamped to [0, 255] and `low` is additionally clamped to
/// `high`. Pixels ≥ `high` seed regions which grow through 4-connected
/// pixels ≥ `low`. The result holds strictly 0/1 values.
pub fn hysteresis_binarize(map: &GrayImageU8, high: f32, low: f32) -> GrayImageU8 {
    let (w, h) = (map.width(), map.height());
    let high = high.clamp(0.0, 255.0);
    let low = low.clamp(0.0, 255.0).min(high);

    let mut out = GrayImageU8::zeros(w, h);
    let mut queue: Vec<(usize, usize)> = Vec::new();
    for y in 0..h {
        let row = map.row(y);
        for (x, &v) in row.iter().enumerate() {
            if v as f32 >= high {
                out.set(x, y, 1);
                queue.push((x, y));
            }
        }
    }

    // Grow seeds through the weak mask.
    while let Some((x, y)) = queue.pop() {
        for (nx, ny) in neighbors4(x, y, w, h) {
            if out.get(nx, ny) != 0 {
                continue;
            }
            if map.get(nx, ny) as f32 >= low {
                out.set(nx, ny, 1);
                queue.push((nx, ny));
            }
        }
    }
    out
}

fn neighbors4(x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    const STEPS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    STEPS.iter().filter_map(move |&(dx, dy)| {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        (nx >= 0 && ny >= 0 && nx < w as i64 && ny < h as i64).then(|| (nx as usize, ny as usize))
    })
}

/// Thin a 0/1 map to a one-pixel-wide skeleton (Zhang–Suen).
///
/// Two sub-iterations alternate until a full pass removes nothing. Any
/// non-zero input value counts as set; the output is strictly 0/1.
pub fn thin(map: &GrayImageU8) -> GrayImageU8 {
    let (w, h) = (map.width(), map.height());
    let mut out = GrayImageU8::zeros(w, h);
    for y in 0..h {
        for x in 0..w {
            if map.get(x, y) != 0 {
                out.set(x, y, 1);
            }
        }
    }

    let mut deletions: Vec<(usize, usize)> = Vec::new();
    loop {
        let mut changed = false;
        for sub in 0..2 {
            deletions.clear();
            for y in 0..h {
                for x in 0..w {
                    if out.get(x, y) != 0 && removable(&out, x, y, sub) {
                        deletions.push((x, y));
                    }
                }
            }
            for &(x, y) in &deletions {
                out.set(x, y, 0);
            }
            changed |= !deletions.is_empty();
        }
        if !changed {
            break;
        }
    }
    out
}

/// Zhang–Suen removal test for one sub-iteration.
fn removable(map: &GrayImageU8, x: usize, y: usize, sub: usize) -> bool {
    // neighbors clockwise from north: p2..p9
    let p = ring_values(map, x, y);
    let set_count: u32 = p.iter().map(|&v| v as u32).sum();
    if !(2..=6).contains(&set_count) {
        return false;
    }
    let transitions = p
        .iter()
        .zip(p.iter().cycle().skip(1))
        .filter(|&(&a, &b)| a == 0 && b == 1)
        .count();
    if transitions != 1 {
        return false;
    }
    let (p2, p4, p6, p8) = (p[0], p[2], p[4], p[6]);
    if sub == 0 {
        p2 * p4 * p6 == 0 && p4 * p6 * p8 == 0
    } else {
        p2 * p4 * p8 == 0 && p2 * p6 * p8 == 0
    }
}

#[inline]
fn ring_values(map: &GrayImageU8, x: usize, y: usize) -> [u8; 8] {
    // N, NE, E, SE, S, SW, W, NW; out-of-bounds reads as 0
    const RING: [(i64, i64); 8] = [
        (0, -1),
        (1, -1),
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
    ];
    let (w, h) = (map.width() as i64, map.height() as i64);
    let mut out = [0u8; 8];
    for (slot, &(dx, dy)) in out.iter_mut().zip(RING.iter()) {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx >= 0 && ny >= 0 && nx < w && ny < h && map.get(nx as usize, ny as usize) != 0 {
            *slot = 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_from(rows: &[&[u8]]) -> GrayImageU8 {
        let h = rows.len();
        let w = rows[0].len();
        let mut data = Vec::with_capacity(w * h);
        for row in rows {
            data.extend_from_slice(row);
        }
        GrayImageU8::new(w, h, data)
    }

    #[test]
    fn weak_pixels_survive_only_when_connected_to_strong() {
        let map = map_from(&[
            &[0, 0, 0, 0, 0, 0],
            &[0, 200, 120, 120, 0, 0],
            &[0, 0, 0, 0, 0, 110],
            &[0, 0, 0, 0, 0, 0],
        ]);
        let out = hysteresis_binarize(&map, 180.0, 100.0);
        assert_eq!(out.get(1, 1), 1); // strong seed
        assert_eq!(out.get(2, 1), 1); // weak, connected
        assert_eq!(out.get(3, 1), 1); // weak, connected through weak
        assert_eq!(out.get(5, 2), 0); // weak island
    }

    #[test]
    fn diagonal_weak_pixels_are_not_connected() {
        let map = map_from(&[&[200, 0], &[0, 120]]);
        let out = hysteresis_binarize(&map, 180.0, 100.0);
        assert_eq!(out.get(0, 0), 1);
        assert_eq!(out.get(1, 1), 0);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let map = map_from(&[&[180, 100, 99]]);
        let out = hysteresis_binarize(&map, 180.0, 100.0);
        assert_eq!(out.data(), &[1, 1, 0]);
    }

    #[test]
    fn output_is_strictly_binary_with_input_shape() {
        let map = map_from(&[&[255, 200, 30], &[10, 160, 90]]);
        let out = hysteresis_binarize(&map, 150.0, 60.0);
        assert_eq!((out.width(), out.height()), (3, 2));
        assert!(out.data().iter().all(|&v| v <= 1));
        let skeleton = thin(&out);
        assert_eq!((skeleton.width(), skeleton.height()), (3, 2));
        assert!(skeleton.data().iter().all(|&v| v <= 1));
    }

    #[test]
    fn thinning_reduces_a_thick_bar_to_one_pixel_width() {
        let mut rows: Vec<Vec<u8>> = vec![vec![0; 9]; 7];
        for row in rows.iter_mut().take(5).skip(2) {
            for x in 1..8 {
                row[x] = 1;
            }
        }
        let refs: Vec<&[u8]> = rows.iter().map(|r| r.as_slice()).collect();
        let out = thin(&map_from(&refs));
        // every occupied column carries exactly one set pixel
        for x in 2..7 {
            let column: u32 = (0..7).map(|y| out.get(x, y) as u32).sum();
            assert_eq!(column, 1, "column {x} not thinned to a single pixel");
        }
    }

    #[test]
    fn thinning_keeps_a_single_pixel_line_intact() {
        let map = map_from(&[
            &[0, 0, 0, 0, 0],
            &[0, 1, 1, 1, 1],
            &[0, 0, 0, 0, 0],
        ]);
        let out = thin(&map);
        assert_eq!(out, map);
    }
}
