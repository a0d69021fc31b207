use std::{
    cmp::Ordering,
    iter,
    ops::{Add, AddAssign},
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    constraints::evaluator::{evaluate_route, simulate_route},
    problem::{routing_problem::RoutingProblem, vehicle::VehicleIdx},
    report::baseline_metrics,
};

use super::chromosome::Chromosome;

/// Fitness of one chromosome, lower is better. `hard` carries the summed
/// violation penalties, `soft` the goal-weighted raw objective; ordering is
/// lexicographic on (hard, soft), so an infeasible chromosome always ranks
/// below every feasible one while the hard component stays proportional to
/// how badly constraints are broken.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FitnessScore {
    pub hard: f64,
    pub soft: f64,
}

impl FitnessScore {
    pub const MAX: FitnessScore = FitnessScore {
        hard: f64::MAX,
        soft: f64::MAX,
    };

    pub const ZERO: FitnessScore = FitnessScore {
        hard: 0.0,
        soft: 0.0,
    };

    pub fn new(hard: f64, soft: f64) -> Self {
        FitnessScore { hard, soft }
    }

    pub fn is_feasible(&self) -> bool {
        self.hard == 0.0
    }

    /// Scalar projection for reporting and quick comparisons across runs.
    pub fn scalar(&self) -> f64 {
        self.hard * 1_000.0 + self.soft
    }
}

impl Eq for FitnessScore {}

impl Ord for FitnessScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hard
            .total_cmp(&other.hard)
            .then_with(|| self.soft.total_cmp(&other.soft))
    }
}

impl PartialOrd for FitnessScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add<FitnessScore> for FitnessScore {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        FitnessScore {
            hard: self.hard + other.hard,
            soft: self.soft + other.soft,
        }
    }
}

impl AddAssign<FitnessScore> for FitnessScore {
    fn add_assign(&mut self, other: FitnessScore) {
        self.hard += other.hard;
        self.soft += other.soft;
    }
}

impl iter::Sum for FitnessScore {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, score| acc + score)
    }
}

/// Baseline objective magnitudes used to bring distance, time and cost onto
/// one scale before goal weighting. Derived from the naive single-vehicle
/// traversal; floored at one so empty dimensions cannot divide by zero.
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveScale {
    pub distance_meters: f64,
    pub duration_secs: f64,
    pub cost: f64,
}

impl ObjectiveScale {
    pub fn for_problem(problem: &RoutingProblem) -> Self {
        let baseline = baseline_metrics(problem);

        ObjectiveScale {
            distance_meters: baseline.distance_meters.max(1.0),
            duration_secs: baseline.total_duration().as_secs_f64().max(1.0),
            cost: baseline.cost.max(1.0),
        }
    }
}

/// Full fitness of one chromosome: simulate each non-empty route, score its
/// violations, and weight the raw objective by the job's goal. Pure in
/// (problem, scale, chromosome), which is what makes the per-generation
/// evaluation safely parallel.
pub fn evaluate_chromosome(
    problem: &RoutingProblem,
    scale: &ObjectiveScale,
    chromosome: &Chromosome,
) -> FitnessScore {
    let mut penalty = 0.0;
    let mut distance_meters = 0.0;
    let mut duration_secs = 0.0;
    let mut cost = 0.0;

    for (vehicle, route) in chromosome.routes().iter().enumerate() {
        if route.is_empty() {
            continue;
        }

        let vehicle = VehicleIdx::new(vehicle);
        let metrics = simulate_route(problem, vehicle, route);
        let report = evaluate_route(problem, vehicle, route, &metrics);

        penalty += report.penalty();
        distance_meters += metrics.distance_meters;
        duration_secs += metrics.total_duration().as_secs_f64();
        cost += metrics.cost;
    }

    let (weight_distance, weight_time, weight_cost) = problem.goal().objective_weights();
    let objective = weight_distance * distance_meters / scale.distance_meters
        + weight_time * duration_secs / scale.duration_secs
        + weight_cost * cost / scale.cost;

    FitnessScore::new(penalty, objective)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_ordering_is_hard_first() {
        let feasible_bad = FitnessScore::new(0.0, 100.0);
        let infeasible_good = FitnessScore::new(0.1, 0.5);

        assert!(feasible_bad < infeasible_good);
    }

    #[test]
    fn test_score_ordering_within_level() {
        assert!(FitnessScore::new(0.0, 1.0) < FitnessScore::new(0.0, 2.0));
        assert!(FitnessScore::new(1.0, 9.0) < FitnessScore::new(2.0, 1.0));
        assert_eq!(FitnessScore::new(1.0, 2.0), FitnessScore::new(1.0, 2.0));
    }

    #[test]
    fn test_score_sum() {
        let scores = vec![
            FitnessScore::new(1.0, 0.5),
            FitnessScore::new(0.0, 0.25),
            FitnessScore::new(2.0, 0.0),
        ];

        let total: FitnessScore = scores.into_iter().sum();
        assert_eq!(total, FitnessScore::new(3.0, 0.75));
    }

    #[test]
    fn test_min_by_key_picks_feasible() {
        let scores = [
            FitnessScore::new(5.0, 0.1),
            FitnessScore::new(0.0, 3.0),
            FitnessScore::new(0.0, 2.0),
        ];

        let best = scores.iter().min().unwrap();
        assert_eq!(*best, FitnessScore::new(0.0, 2.0));
    }
}
