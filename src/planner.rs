//! End-to-end tour planning: construction, optional return leg, improvement.

use crate::error::Result;
use crate::heuristics::construction::{ConstructionHeuristic, NearestNeighbor};
use crate::heuristics::local_search::{AnnealingConfig, LocalSearch, SimulatedAnnealing, TwoOptSearch};
use crate::instance::TourInstance;
use crate::solution::{close_route, Solution};
use serde::{Deserialize, Serialize};

/// Improvement strategy applied after the greedy construction
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum Algorithm {
    /// Nearest neighbor followed by 2-opt
    #[default]
    Greedy,
    /// Nearest neighbor, simulated annealing, then a 2-opt polish
    SimulatedAnnealing,
}

/// Planner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub return_to_start: bool,
    pub algorithm: Algorithm,
    pub annealing: AnnealingConfig,
    /// Seed for annealing; `None` gives non-reproducible runs
    pub seed: Option<u64>,
    /// Optional cap on 2-opt passes
    pub max_two_opt_passes: Option<usize>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            return_to_start: false,
            algorithm: Algorithm::Greedy,
            annealing: AnnealingConfig::default(),
            seed: None,
            max_two_opt_passes: None,
        }
    }
}

/// The greedy starting route and the final improved route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourPlan {
    pub initial: Solution,
    pub improved: Solution,
}

impl TourPlan {
    /// Relative shortening achieved by the improvement stages, in percent.
    pub fn improvement_percent(&self) -> f64 {
        if self.initial.distance > 0.0 {
            (self.initial.distance - self.improved.distance) / self.initial.distance * 100.0
        } else {
            0.0
        }
    }
}

pub struct TourPlanner {
    pub config: PlannerConfig,
}

impl TourPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        TourPlanner { config }
    }

    /// Plan a tour over `instance` starting at place `start`.
    pub fn plan(&self, instance: &TourInstance, start: usize) -> Result<TourPlan> {
        let matrix = &instance.distance_matrix;
        let timer = std::time::Instant::now();

        let mut initial = NearestNeighbor::new(start).construct(matrix)?;
        if self.config.return_to_start {
            let algorithm = initial.algorithm.clone();
            let computation_time = initial.computation_time;
            initial = Solution::from_route(matrix, close_route(initial.route), &algorithm);
            initial.computation_time = computation_time;
        }
        log::info!("Greedy route: {:.2} km over {} stops", initial.distance, initial.len());

        let two_opt = TwoOptSearch {
            max_passes: self.config.max_two_opt_passes,
        };

        let mut improved = match self.config.algorithm {
            Algorithm::Greedy if initial.len() > 3 => {
                log::info!("Optimizing route using 2-opt algorithm...");
                let mut polished = two_opt.improve(matrix, &initial);
                polished.algorithm = format!("{}+{}", initial.algorithm, two_opt.name());
                polished
            }
            Algorithm::Greedy => initial.clone(),
            Algorithm::SimulatedAnnealing => {
                log::info!("Optimizing route using simulated annealing...");
                let sa = SimulatedAnnealing::with_config(self.config.annealing, self.config.seed).keeping_start();
                let annealed = sa.improve(matrix, &initial);
                log::info!(
                    "Annealing: {:.2} -> {:.2} km in {} iterations",
                    initial.distance,
                    annealed.distance,
                    annealed.iterations.unwrap_or(0)
                );
                let mut polished = two_opt.improve(matrix, &annealed);
                polished.iterations = annealed.iterations;
                polished.algorithm = format!("{}+{}+{}", initial.algorithm, sa.name(), two_opt.name());
                polished
            }
        };
        improved.computation_time = timer.elapsed().as_secs_f64();

        let plan = TourPlan { initial, improved };
        log::info!(
            "Final route: {:.2} km ({:.2}% shorter than greedy)",
            plan.improved.distance,
            plan.improvement_percent()
        );

        Ok(plan)
    }
}
