//! Per-trial random sub-streams.
//!
//! Every trial owns a generator seeded from `(run seed, trial index)`, so a
//! trial's draws never depend on which worker ran it or in what order.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 finaliser.
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of the sub-stream for `trial` within a run seeded with `run_seed`.
pub fn trial_seed(run_seed: u64, trial: u64) -> u64 {
    mix64(mix64(run_seed).wrapping_add(trial.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA)))
}

/// Seeded generator for one Monte Carlo trial.
pub struct TrialRng {
    inner: StdRng,
}

impl TrialRng {
    pub fn new(run_seed: u64, trial: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(trial_seed(run_seed, trial)),
        }
    }

    #[inline]
    pub fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Two standard normals with correlation `rho`, built by Cholesky:
    /// `z_v = rho·z_s + sqrt(1 - rho²)·z_ind`. Returns `(z_s, z_v)`.
    ///
    /// `rho_complement` must be `sqrt(1 - rho²)`; callers hoist it out of
    /// the time loop.
    #[inline]
    pub fn correlated_pair(&mut self, rho: f64, rho_complement: f64) -> (f64, f64) {
        let z_s = self.standard_normal();
        let z_ind = self.standard_normal();
        (z_s, rho * z_s + rho_complement * z_ind)
    }
}
