//! Seeded randomness.
//!
//! Every random choice in a run (shuffles, carve directions, obstacle
//! placement) draws from one PCG stream seeded with the run's seed, so a
//! given seed replays the same step sequence.

use rand::SeedableRng;
use rand_pcg::Pcg64;

/// The generator type shared by all steppers.
pub type RunRng = Pcg64;

/// Create the generator for a run.
pub fn seeded(seed: u64) -> RunRng {
    Pcg64::seed_from_u64(seed)
}
