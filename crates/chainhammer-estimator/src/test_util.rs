use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::Trajectory;

/// Builds a reproducible "sticky" random trajectory: each step stays put
/// with probability 1/2 and otherwise jumps to a uniformly chosen state.
pub(crate) fn random_trajectory(seed: u64, len: usize, num_states: usize, dt: f64) -> Trajectory {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut current = rng.random_range(0..num_states);
    let states = (0..len)
        .map(|_| {
            if rng.random_bool(0.5) {
                current = rng.random_range(0..num_states);
            }
            current
        })
        .collect();
    Trajectory::new(states, num_states, dt).unwrap()
}
