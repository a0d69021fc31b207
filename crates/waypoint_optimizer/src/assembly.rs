use geo::LineString;
use jiff::{SignedDuration, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    constraints::{
        evaluator::{evaluate_route, simulate_route},
        violation::Violation,
    },
    problem::{routing_problem::RoutingProblem, vehicle::VehicleIdx},
    solver::chromosome::Chromosome,
};

/// Downstream dispatch lifecycle of a produced route. The solver never
/// touches this after creation; only external update calls move it.
#[derive(Serialize, Deserialize, JsonSchema, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl RouteStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RouteStatus::Completed | RouteStatus::Cancelled)
    }

    /// Monotonic: planned -> active -> completed, cancel from any
    /// non-terminal state.
    pub fn can_transition_to(&self, next: RouteStatus) -> bool {
        match (self, next) {
            (RouteStatus::Planned, RouteStatus::Active) => true,
            (RouteStatus::Active, RouteStatus::Completed) => true,
            (status, RouteStatus::Cancelled) => !status.is_terminal(),
            _ => false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RouteStop {
    pub stop_id: String,
    pub sequence: u32,
    pub planned_arrival: Timestamp,
    pub planned_departure: Timestamp,
    pub wait: SignedDuration,

    pub completed: bool,
    pub actual_arrival: Option<Timestamp>,
    pub actual_departure: Option<Timestamp>,
    pub notes: Option<String>,
}

/// A concrete timed, costed route produced from the winning chromosome.
/// Immutable once produced except for the dispatch lifecycle fields.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlannedRoute {
    pub id: Uuid,
    pub route_number: u32,
    pub vehicle_id: String,
    pub driver_id: Option<String>,
    pub status: RouteStatus,
    pub actual_start_time: Option<Timestamp>,

    pub stops: Vec<RouteStop>,

    pub total_distance_meters: f64,
    pub driving_duration: SignedDuration,
    pub service_duration: SignedDuration,
    pub waiting_duration: SignedDuration,
    pub total_duration: SignedDuration,
    pub total_cost: f64,
    pub capacity_utilization: f64,

    pub geometry: LineString,
    pub violations: Vec<Violation>,
}

impl PlannedRoute {
    pub fn set_geometry(&mut self, geometry: LineString) {
        self.geometry = geometry;
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UnassignedStop {
    pub stop_id: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct AssembledPlan {
    pub routes: Vec<PlannedRoute>,
    pub unassigned: Vec<UnassignedStop>,
}

impl AssembledPlan {
    /// Feasible means every stop rides a route and no route carries a
    /// violation.
    pub fn is_feasible(&self) -> bool {
        self.unassigned.is_empty() && self.routes.iter().all(|route| route.violations.is_empty())
    }
}

/// Materializes the winning chromosome: per non-empty vehicle sub-sequence,
/// leg-by-leg timing and cost from the matrices, the violation report for
/// transparency, and a straight-segment polyline that callers may replace
/// with provider geometry. Stops forced out by `max_stops_per_route` are
/// reported as unassigned, never dropped.
pub fn assemble(problem: &RoutingProblem, chromosome: &Chromosome) -> AssembledPlan {
    let mut routes = Vec::new();
    let mut unassigned = Vec::new();
    let mut route_number = 0u32;

    for (vehicle_index, sequence) in chromosome.routes().iter().enumerate() {
        if sequence.is_empty() {
            continue;
        }

        let (kept, overflow) = match problem.options().max_stops_per_route {
            Some(limit) if sequence.len() > limit => sequence.split_at(limit),
            _ => (sequence.as_slice(), &[][..]),
        };

        for &index in overflow {
            unassigned.push(UnassignedStop {
                stop_id: problem.stop(index).id().to_owned(),
                reason: String::from("excluded by max_stops_per_route"),
            });
        }

        if kept.is_empty() {
            continue;
        }

        route_number += 1;
        let vehicle = VehicleIdx::new(vehicle_index);
        let profile = problem.vehicle(vehicle);
        let metrics = simulate_route(problem, vehicle, kept);
        let report = evaluate_route(problem, vehicle, kept, &metrics);

        let stops: Vec<RouteStop> = kept
            .iter()
            .zip(metrics.timings.iter())
            .enumerate()
            .map(|(position, (&index, &(arrival, departure)))| {
                let stop = problem.stop(index);
                RouteStop {
                    stop_id: stop.id().to_owned(),
                    sequence: position as u32 + 1,
                    planned_arrival: arrival,
                    planned_departure: departure,
                    wait: stop
                        .time_window()
                        .map(|window| window.wait_before(arrival))
                        .unwrap_or(SignedDuration::ZERO),
                    completed: false,
                    actual_arrival: None,
                    actual_departure: None,
                    notes: None,
                }
            })
            .collect();

        let capacity_utilization = if profile.max_weight() > 0.0 {
            metrics.load_weight / profile.max_weight()
        } else {
            0.0
        };

        let geometry: LineString = kept
            .iter()
            .map(|&index| {
                let point = problem.stop(index).location();
                geo::Coord {
                    x: point.x(),
                    y: point.y(),
                }
            })
            .collect();

        routes.push(PlannedRoute {
            id: Uuid::new_v4(),
            route_number,
            vehicle_id: profile.id().to_owned(),
            driver_id: problem.driver(vehicle).map(|driver| driver.id().to_owned()),
            status: RouteStatus::Planned,
            actual_start_time: None,
            stops,
            total_distance_meters: metrics.distance_meters,
            driving_duration: metrics.driving,
            service_duration: metrics.service,
            waiting_duration: metrics.waiting,
            total_duration: metrics.total_duration(),
            total_cost: metrics.cost,
            capacity_utilization,
            geometry,
            violations: report.into_vec(),
        });
    }

    AssembledPlan { routes, unassigned }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use crate::{
        problem::{options::OptimizeOptions, stop::StopIdx},
        solver::chromosome::Chromosome,
        test_utils::{ProblemFixture, minutes},
    };

    use super::*;

    #[test]
    fn test_total_duration_splits_into_parts() {
        let problem = ProblemFixture::line(3, minutes(20))
            .stop_service(1, minutes(5))
            .stop_service(2, minutes(5))
            .build();

        let chromosome = Chromosome::from_routes(vec![vec![
            StopIdx::new(0),
            StopIdx::new(1),
            StopIdx::new(2),
        ]]);
        let plan = assemble(&problem, &chromosome);

        assert_eq!(plan.routes.len(), 1);
        let route = &plan.routes[0];
        assert_eq!(route.driving_duration, minutes(40));
        assert_eq!(route.service_duration, minutes(10));
        assert_eq!(
            route.total_duration,
            route.driving_duration + route.service_duration + route.waiting_duration
        );
        assert_eq!(route.stops.len(), 3);
        assert_eq!(route.geometry.coords().count(), 3);
    }

    #[test]
    fn test_max_stops_overflow_is_reported_not_dropped() {
        let problem = ProblemFixture::line(5, minutes(10))
            .options(OptimizeOptions {
                max_stops_per_route: Some(3),
                ..OptimizeOptions::default()
            })
            .build();

        let chromosome = Chromosome::from_routes(vec![(0..5).map(StopIdx::new).collect()]);
        let plan = assemble(&problem, &chromosome);

        assert_eq!(plan.routes[0].stops.len(), 3);
        assert_eq!(plan.unassigned.len(), 2);
        assert!(!plan.is_feasible());

        let covered = plan.routes[0].stops.len() + plan.unassigned.len();
        assert_eq!(covered, 5);
    }

    #[test]
    fn test_capacity_utilization() {
        let problem = ProblemFixture::line(2, minutes(10))
            .stop_weight(0, 30.0)
            .stop_weight(1, 20.0)
            .vehicle_max_weight(100.0)
            .build();

        let chromosome =
            Chromosome::from_routes(vec![vec![StopIdx::new(0), StopIdx::new(1)]]);
        let plan = assemble(&problem, &chromosome);

        assert!((plan.routes[0].capacity_utilization - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_vehicles_produce_no_routes() {
        let problem = ProblemFixture::line(4, minutes(10)).vehicles(3).build();
        let mut rng = SmallRng::seed_from_u64(41);
        let chromosome = Chromosome::random(&problem, &mut rng);

        let plan = assemble(&problem, &chromosome);

        let assigned: usize = plan.routes.iter().map(|route| route.stops.len()).sum();
        assert_eq!(assigned, 4);
        for route in &plan.routes {
            assert!(!route.stops.is_empty());
        }
    }

    #[test]
    fn test_route_status_transitions() {
        assert!(RouteStatus::Planned.can_transition_to(RouteStatus::Active));
        assert!(RouteStatus::Active.can_transition_to(RouteStatus::Completed));
        assert!(RouteStatus::Planned.can_transition_to(RouteStatus::Cancelled));
        assert!(RouteStatus::Active.can_transition_to(RouteStatus::Cancelled));

        assert!(!RouteStatus::Planned.can_transition_to(RouteStatus::Completed));
        assert!(!RouteStatus::Completed.can_transition_to(RouteStatus::Active));
        assert!(!RouteStatus::Cancelled.can_transition_to(RouteStatus::Active));
        assert!(!RouteStatus::Completed.can_transition_to(RouteStatus::Cancelled));
    }
}
