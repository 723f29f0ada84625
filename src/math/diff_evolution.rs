//! Differential evolution over a bound box.
//!
//! Global stochastic fallback for fits where the local solve diverges
//! (best/1/bin strategy with dithered mutation factor). Deterministic given
//! the seed: trial vectors are generated sequentially from a seeded RNG, and
//! only the (side-effect-free) objective evaluations run in parallel.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// Options mirroring the usual population heuristics: population size
/// `pop_factor × dim`, binomial crossover, convergence when the population
/// energies collapse.
#[derive(Debug, Clone)]
pub struct DeOptions {
    pub max_iters: usize,
    /// Convergence: `std(energies) <= tol · |mean(energies)|`.
    pub tol: f64,
    pub pop_factor: usize,
    /// Crossover probability.
    pub cr: f64,
    pub seed: u64,
}

impl Default for DeOptions {
    fn default() -> Self {
        Self {
            max_iters: 1000,
            tol: 1e-8,
            pop_factor: 15,
            cr: 0.9,
            seed: 42,
        }
    }
}

/// Minimize `objective` over `[lower, upper]`.
///
/// The objective must already absorb its own domain failures (return a large
/// finite penalty rather than NaN). Returns the best parameter vector found,
/// or `None` for an empty/invalid box.
pub fn differential_evolution(
    objective: &(dyn Fn(&[f64]) -> f64 + Sync),
    lower: &[f64],
    upper: &[f64],
    opts: &DeOptions,
) -> Option<Vec<f64>> {
    let dim = lower.len();
    if dim == 0 || upper.len() != dim {
        return None;
    }
    if lower
        .iter()
        .zip(upper.iter())
        .any(|(&lo, &hi)| !lo.is_finite() || !hi.is_finite() || hi < lo)
    {
        return None;
    }

    let np = (opts.pop_factor * dim).max(8);
    let mut rng = StdRng::seed_from_u64(opts.seed);

    // Uniform random initialization across the box.
    let mut population: Vec<Vec<f64>> = (0..np)
        .map(|_| {
            (0..dim)
                .map(|j| {
                    if upper[j] > lower[j] {
                        rng.gen_range(lower[j]..=upper[j])
                    } else {
                        lower[j]
                    }
                })
                .collect()
        })
        .collect();

    let mut energies: Vec<f64> = population.par_iter().map(|p| objective(p)).collect();

    let mut best_idx = argmin(&energies);

    for _ in 0..opts.max_iters {
        // Dithered mutation factor, fixed per generation.
        let f = rng.gen_range(0.5..1.0);

        let trials: Vec<Vec<f64>> = (0..np)
            .map(|i| {
                let (a, b) = distinct_pair(&mut rng, np, i, best_idx);
                let j_rand = rng.gen_range(0..dim);
                (0..dim)
                    .map(|j| {
                        let v = if j == j_rand || rng.gen_bool(opts.cr) {
                            population[best_idx][j] + f * (population[a][j] - population[b][j])
                        } else {
                            population[i][j]
                        };
                        v.clamp(lower[j], upper[j])
                    })
                    .collect()
            })
            .collect();

        let trial_energies: Vec<f64> = trials.par_iter().map(|p| objective(p)).collect();

        for i in 0..np {
            if trial_energies[i] <= energies[i] {
                population[i] = trials[i].clone();
                energies[i] = trial_energies[i];
            }
        }
        best_idx = argmin(&energies);

        let mean = energies.iter().sum::<f64>() / np as f64;
        let var = energies.iter().map(|e| (e - mean) * (e - mean)).sum::<f64>() / np as f64;
        if var.sqrt() <= opts.tol * mean.abs() {
            break;
        }
    }

    Some(population[best_idx].clone())
}

fn argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v < values[best] {
            best = i;
        }
    }
    best
}

/// Two distinct population indices, both different from `i` and `best`.
fn distinct_pair(rng: &mut StdRng, np: usize, i: usize, best: usize) -> (usize, usize) {
    let mut pick = |exclude: &[usize]| loop {
        let idx = rng.gen_range(0..np);
        if !exclude.contains(&idx) {
            return idx;
        }
    };
    let a = pick(&[i, best]);
    let b = pick(&[i, best, a]);
    (a, b)
}
