//! Route improvement heuristics.
//!
//! This module implements two independent improvers:
//! - 2-opt segment reversal with first-improvement restarts
//! - Simulated annealing over random two-place swaps
//!
//! Both take a route by reference and hand back a new one; neither ever
//! returns a route longer than its input.

use crate::matrix::DistanceMatrix;
use crate::solution::{is_closed_route, Solution};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Trait for route improvement methods
pub trait LocalSearch {
    fn improve(&self, matrix: &DistanceMatrix, solution: &Solution) -> Solution;
    fn name(&self) -> &str;
}

/// 2-Opt Local Search
///
/// Reverses route segments while that shortens the route. The first and last
/// positions never move, so a designated start (and, for closed routes, the
/// return to it) stays in place. On every accepted move the scan restarts
/// from the beginning.
pub struct TwoOptSearch {
    /// Optional cap on the number of full passes; `None` runs to a local optimum
    pub max_passes: Option<usize>,
}

impl TwoOptSearch {
    pub fn new() -> Self {
        TwoOptSearch { max_passes: None }
    }

    pub fn with_max_passes(max_passes: usize) -> Self {
        TwoOptSearch {
            max_passes: Some(max_passes),
        }
    }

    /// Return a 2-opt local optimum of `route`.
    pub fn optimize(&self, matrix: &DistanceMatrix, route: &[usize]) -> Vec<usize> {
        self.search(matrix, route).0
    }

    fn search(&self, matrix: &DistanceMatrix, route: &[usize]) -> (Vec<usize>, usize) {
        let mut best = route.to_vec();
        let n = best.len();
        if n < 4 {
            return (best, 0);
        }

        let mut best_distance = matrix.route_length(&best);
        let mut passes = 0;

        'pass: loop {
            if self.max_passes.is_some_and(|max| passes >= max) {
                log::debug!("2-opt stopped after {} passes", passes);
                break;
            }
            passes += 1;

            for i in 1..n - 2 {
                for j in i + 1..n - 1 {
                    best[i..=j].reverse();
                    let distance = matrix.route_length(&best);

                    if distance < best_distance {
                        log::trace!("2-opt reversed {}..={}: {:.3} -> {:.3}", i, j, best_distance, distance);
                        best_distance = distance;
                        continue 'pass;
                    }

                    best[i..=j].reverse();
                }
            }

            break;
        }

        (best, passes)
    }
}

impl Default for TwoOptSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for TwoOptSearch {
    fn improve(&self, matrix: &DistanceMatrix, solution: &Solution) -> Solution {
        let start = std::time::Instant::now();

        let (route, passes) = self.search(matrix, &solution.route);

        let mut improved = Solution::from_route(matrix, route, self.name());
        improved.iterations = Some(passes);
        improved.computation_time = start.elapsed().as_secs_f64();
        log::debug!(
            "2-opt: {:.2} -> {:.2} km in {} passes",
            solution.distance,
            improved.distance,
            passes
        );
        improved
    }

    fn name(&self) -> &str {
        "2-Opt"
    }
}

/// Cooling schedule for simulated annealing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealingConfig {
    /// Initial temperature
    pub temp_start: f64,
    /// Temperature at or below which the search stops
    pub temp_end: f64,
    /// Multiplicative cooling factor, in (0, 1)
    pub cooling_rate: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        AnnealingConfig {
            temp_start: 1000.0,
            temp_end: 0.01,
            cooling_rate: 0.995,
        }
    }
}

/// Simulated Annealing
///
/// Proposes swaps of two random positions and accepts worse routes with
/// probability `exp(-delta / T)`. The endpoints of a closed route are fixed;
/// an open route has no fixed positions unless `keep_start` is set. The best
/// route seen is returned.
pub struct SimulatedAnnealing {
    pub config: AnnealingConfig,
    /// Seed for the random source; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Pin position 0 of open routes as well
    pub keep_start: bool,
}

impl SimulatedAnnealing {
    pub fn new() -> Self {
        SimulatedAnnealing {
            config: AnnealingConfig::default(),
            seed: None,
            keep_start: false,
        }
    }

    pub fn with_config(config: AnnealingConfig, seed: Option<u64>) -> Self {
        SimulatedAnnealing {
            config,
            seed,
            keep_start: false,
        }
    }

    /// Keep the first stop of open routes in place.
    pub fn keeping_start(mut self) -> Self {
        self.keep_start = true;
        self
    }

    /// Anneal `route` using the supplied random source.
    pub fn anneal<R: Rng + ?Sized>(&self, matrix: &DistanceMatrix, route: &[usize], rng: &mut R) -> Vec<usize> {
        self.run(matrix, route, rng).0
    }

    fn run<R: Rng + ?Sized>(&self, matrix: &DistanceMatrix, route: &[usize], rng: &mut R) -> (Vec<usize>, usize) {
        let AnnealingConfig {
            temp_start,
            temp_end,
            cooling_rate,
        } = self.config;

        let n = route.len();
        let movable: Vec<usize> = if is_closed_route(route) {
            (1..n - 1).collect()
        } else if self.keep_start {
            (1..n).collect()
        } else {
            (0..n).collect()
        };

        if movable.len() < 2 {
            return (route.to_vec(), 0);
        }
        if !(cooling_rate > 0.0 && cooling_rate < 1.0) {
            log::warn!("Cooling rate {} is outside (0, 1); skipping annealing", cooling_rate);
            return (route.to_vec(), 0);
        }
        if !(temp_start.is_finite() && temp_end > 0.0) {
            log::warn!(
                "Temperatures {} -> {} never finish cooling; skipping annealing",
                temp_start,
                temp_end
            );
            return (route.to_vec(), 0);
        }

        let mut current = route.to_vec();
        let mut current_distance = matrix.route_length(&current);
        let mut best = current.clone();
        let mut best_distance = current_distance;

        let mut temperature = temp_start;
        let mut iterations = 0;
        let mut accepted = 0;

        while temperature > temp_end {
            let a = rng.gen_range(0..movable.len());
            let mut b = rng.gen_range(0..movable.len() - 1);
            if b >= a {
                b += 1;
            }
            let (i, j) = (movable[a], movable[b]);

            current.swap(i, j);
            let candidate_distance = matrix.route_length(&current);
            let delta = candidate_distance - current_distance;

            let accept = delta < 0.0 || rng.gen::<f64>() < (-delta / temperature).exp();

            if accept {
                current_distance = candidate_distance;
                accepted += 1;

                if current_distance < best_distance {
                    best.copy_from_slice(&current);
                    best_distance = current_distance;
                }
            } else {
                current.swap(i, j);
            }

            temperature *= cooling_rate;
            iterations += 1;
        }

        log::debug!(
            "Annealing: {} iterations, {} accepted, best {:.2} km",
            iterations,
            accepted,
            best_distance
        );

        (best, iterations)
    }
}

impl Default for SimulatedAnnealing {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for SimulatedAnnealing {
    fn improve(&self, matrix: &DistanceMatrix, solution: &Solution) -> Solution {
        let start = std::time::Instant::now();
        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let (route, iterations) = self.run(matrix, &solution.route, &mut rng);

        let mut improved = Solution::from_route(matrix, route, self.name());
        improved.iterations = Some(iterations);
        improved.computation_time = start.elapsed().as_secs_f64();
        improved
    }

    fn name(&self) -> &str {
        "SimulatedAnnealing"
    }
}
