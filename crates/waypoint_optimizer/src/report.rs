use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    assembly::{AssembledPlan, PlannedRoute, UnassignedStop},
    constraints::evaluator::{RouteMetrics, simulate_route},
    problem::{routing_problem::RoutingProblem, stop::StopIdx, vehicle::VehicleIdx},
    solver::genetic::StopReason,
};

/// The naive plan used as the savings reference: the first candidate
/// vehicle visits every stop in input order, priced with the same matrices
/// as the optimized plan.
pub fn baseline_metrics(problem: &RoutingProblem) -> RouteMetrics {
    let stops: Vec<StopIdx> = (0..problem.num_stops()).map(StopIdx::new).collect();
    simulate_route(problem, VehicleIdx::new(0), &stops)
}

#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug)]
pub struct OptimizationSummary {
    pub total_distance_meters: f64,
    pub total_duration: SignedDuration,
    pub total_cost: f64,

    /// Baseline cost minus plan cost, floored at zero.
    pub estimated_savings: f64,

    /// Mean of the per-dimension improvements over the naive baseline,
    /// each clamped to [0, 1].
    pub optimization_score: f64,

    pub solver_time: SignedDuration,
    pub generations: usize,
    pub stop_reason: StopReason,

    /// Set when travel data came from the straight-line fallback rather
    /// than the live provider.
    pub degraded: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OptimizationResult {
    pub routes: Vec<PlannedRoute>,
    pub unassigned: Vec<UnassignedStop>,
    pub summary: OptimizationSummary,
}

fn improvement(baseline: f64, actual: f64) -> f64 {
    if baseline > 0.0 {
        ((baseline - actual) / baseline).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Aggregates per-route metrics into job-level totals and the normalized
/// optimization score.
pub fn summarize(
    problem: &RoutingProblem,
    plan: &AssembledPlan,
    solver_time: SignedDuration,
    generations: usize,
    stop_reason: StopReason,
) -> OptimizationSummary {
    let total_distance_meters: f64 = plan
        .routes
        .iter()
        .map(|route| route.total_distance_meters)
        .sum();
    let total_duration = plan
        .routes
        .iter()
        .fold(SignedDuration::ZERO, |acc, route| acc + route.total_duration);
    let total_cost: f64 = plan.routes.iter().map(|route| route.total_cost).sum();

    let baseline = baseline_metrics(problem);
    let baseline_duration = baseline.total_duration();

    let optimization_score = (improvement(baseline.distance_meters, total_distance_meters)
        + improvement(baseline_duration.as_secs_f64(), total_duration.as_secs_f64())
        + improvement(baseline.cost, total_cost))
        / 3.0;

    OptimizationSummary {
        total_distance_meters,
        total_duration,
        total_cost,
        estimated_savings: (baseline.cost - total_cost).max(0.0),
        optimization_score,
        solver_time,
        generations,
        stop_reason,
        degraded: problem.degraded(),
    }
}
