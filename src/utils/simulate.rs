//! Seeded input generators for driving a network without recorded data.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Normal};

use crate::error::{HgfError, Result};

/// A Gaussian random walk of `n_trials` values starting at zero.
///
/// # Arguments
/// * `step_sd` - Standard deviation of each increment, finite and >= 0.
/// * `seed` - The same seed always gives the same walk.
pub fn gaussian_random_walk(n_trials: usize, step_sd: f64, seed: u64) -> Result<Vec<f64>> {
    if !(step_sd.is_finite() && step_sd >= 0.0) {
        return Err(HgfError::Configuration(format!(
            "random walk step must be finite and >= 0, got {}",
            step_sd
        )));
    }
    let normal = Normal::new(0.0, step_sd)
        .map_err(|err| HgfError::Configuration(format!("invalid random walk step {}: {}", step_sd, err)))?;
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut walk = Vec::with_capacity(n_trials);
    let mut value = 0.0;
    for _ in 0..n_trials {
        value += rng.sample(normal);
        walk.push(value);
    }
    Ok(walk)
}

/// One binary outcome (0.0 or 1.0) per probability.
pub fn bernoulli_sequence(probabilities: &[f64], seed: u64) -> Result<Vec<f64>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    probabilities
        .iter()
        .map(|&p| {
            let coin = Bernoulli::new(p)
                .map_err(|err| HgfError::Configuration(format!("invalid outcome probability {}: {}", p, err)))?;
            Ok(if rng.sample(coin) { 1.0 } else { 0.0 })
        })
        .collect()
}
