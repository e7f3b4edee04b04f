use rand::prelude::*;

use crate::uniforms::SPARKLE_COUNT;

/// Scatters the sparkle field deterministically from a seed: position in
/// unit space, base radius, and an individual pulse phase per point.
pub(crate) fn generate(seed: u64) -> [[f32; 4]; SPARKLE_COUNT] {
    let mut rng = StdRng::seed_from_u64(seed);
    std::array::from_fn(|_| {
        [
            rng.gen::<f32>(),
            rng.gen::<f32>(),
            rng.gen_range(0.02..0.12),
            rng.gen_range(0.0..std::f32::consts::TAU),
        ]
    })
}
