use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates a dark image with a single bright row at the vertical midpoint,
/// matching the synthetic ground truth used by the experiment.
pub fn mid_row_line_u8(width: usize, height: usize) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = vec![20u8; width * height];
    let mid = height / 2;
    for x in 0..width {
        img[mid * width + x] = 230;
    }
    img
}

/// Generates a seeded uniform-noise image with no structured edge.
pub fn uniform_noise_u8(width: usize, height: usize, seed: u64) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.gen_range(0..=255)).collect()
}
