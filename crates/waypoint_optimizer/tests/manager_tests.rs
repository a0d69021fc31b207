mod setup;

use std::collections::HashSet;

use jiff::Timestamp;
use waypoint_optimizer::{
    assembly::RouteStatus,
    constraints::violation::ViolationKind,
    error::OptimizeError,
    jobs::{job::JobStatus, manager::JobManagerConfig},
    problem::options::OptimizeOptions,
    solver::params::SolverParams,
};

use setup::{haversine_config, manager, profiles, request, spread_stops};

fn seeded(mut req: waypoint_optimizer::jobs::request::OptimizeRequest, seed: u64)
-> waypoint_optimizer::jobs::request::OptimizeRequest {
    req.options = OptimizeOptions {
        seed: Some(seed),
        ..req.options
    };
    req
}

/// Every input stop ends up in exactly one route or in the unassigned
/// list, never duplicated, never missing.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn coverage_invariant_holds_on_terminal_jobs() {
    let manager = manager(haversine_config(), profiles(3, 0.0));
    let job = manager
        .submit("acme", seeded(request(spread_stops(15), 3), 21))
        .await
        .unwrap();

    assert!(job.status.is_terminal());
    let result = job.result.unwrap();

    let mut seen = HashSet::new();
    for route in &result.routes {
        for stop in &route.stops {
            assert!(seen.insert(stop.stop_id.clone()), "duplicated {}", stop.stop_id);
        }
    }
    for unassigned in &result.unassigned {
        assert!(seen.insert(unassigned.stop_id.clone()));
    }

    assert_eq!(seen.len(), 15);
}

/// With capacity on, every route either fits the vehicle or carries an
/// explicit overweight violation.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn capacity_invariant_reported_not_silently_broken() {
    let manager = manager(haversine_config(), profiles(2, 100.0));

    let mut stops = spread_stops(6);
    for stop in &mut stops {
        stop.weight = 60.0; // 360 total against a fleet capacity of 200
    }

    let job = manager
        .submit("acme", seeded(request(stops, 2), 3))
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Infeasible);
    let result = job.result.unwrap();

    for route in &result.routes {
        let load: f64 = route.stops.len() as f64 * 60.0;
        let overweight = route
            .violations
            .iter()
            .any(|violation| violation.kind == ViolationKind::OverWeight);
        assert!(load <= 100.0 || overweight);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_vehicle_is_a_validation_error() {
    let manager = manager(haversine_config(), profiles(1, 0.0));
    let mut req = request(spread_stops(3), 1);
    req.vehicle_ids = vec![String::from("veh-missing")];

    let error = manager.submit("acme", req).await.unwrap_err();
    assert!(matches!(error, OptimizeError::Validation(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn jobs_are_tenant_scoped() {
    let manager = manager(haversine_config(), profiles(1, 0.0));
    let job = manager
        .submit("acme", seeded(request(spread_stops(3), 1), 1))
        .await
        .unwrap();

    assert!(manager.get("acme", job.id).is_ok());
    assert!(matches!(
        manager.get("globex", job.id),
        Err(OptimizeError::NotFound(_))
    ));
    assert!(matches!(
        manager.get("acme", uuid::Uuid::new_v4()),
        Err(OptimizeError::NotFound(_))
    ));
}

/// Cancelling a running job settles to `cancelled` with a best-so-far
/// result within a bounded wait, and cancelling again is a no-op.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancellation_settles_promptly_with_best_so_far() {
    let config = JobManagerConfig {
        inline_threshold: 1, // force the async path
        solver: SolverParams {
            population_size: 200,
            max_generations: 1_000_000,
            stall_generations: usize::MAX,
            max_duration: None,
            ..SolverParams::default()
        },
        ..haversine_config()
    };
    let manager = manager(config, profiles(3, 0.0));

    let job = manager
        .submit("acme", seeded(request(spread_stops(40), 3), 77))
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Running);

    manager.cancel("acme", job.id).unwrap();

    let mut terminal = None;
    for _ in 0..200 {
        let current = manager.get("acme", job.id).unwrap();
        if current.status.is_terminal() {
            terminal = Some(current);
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    let job = terminal.expect("job did not settle after cancellation");
    assert_eq!(job.status, JobStatus::Cancelled);

    // Best-so-far still comes back, with full coverage.
    let result = job.result.expect("cancelled job carries best-so-far");
    let assigned: usize = result.routes.iter().map(|route| route.stops.len()).sum();
    assert_eq!(assigned + result.unassigned.len(), 40);

    // Idempotent: cancelling a terminal job is a no-op.
    let again = manager.cancel("acme", job.id).unwrap();
    assert_eq!(again.status, JobStatus::Cancelled);
}

/// Provider down + strict mode off: the job completes on straight-line
/// estimates and the result says so.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn provider_failure_degrades_instead_of_failing() {
    // Default config keeps the HTTP provider, and the test manager has no
    // HTTP client behind it, so every lookup fails over.
    let config = JobManagerConfig {
        solver: setup::quick_solver_params(),
        ..JobManagerConfig::default()
    };
    let manager = manager(config, profiles(1, 0.0));

    let job = manager
        .submit("acme", seeded(request(spread_stops(4), 1), 9))
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.result.unwrap().summary.degraded);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn strict_mode_surfaces_provider_errors() {
    let config = JobManagerConfig {
        solver: setup::quick_solver_params(),
        ..JobManagerConfig::default()
    };
    let manager = manager(config, profiles(1, 0.0));

    let mut req = request(spread_stops(4), 1);
    req.options = OptimizeOptions {
        strict_matrix: true,
        ..OptimizeOptions::default()
    };

    let error = manager.submit("acme", req).await.unwrap_err();
    assert!(matches!(error, OptimizeError::Provider(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn route_lifecycle_transitions_are_monotonic() {
    let manager = manager(haversine_config(), profiles(1, 0.0));
    let job = manager
        .submit("acme", seeded(request(spread_stops(4), 1), 13))
        .await
        .unwrap();

    let route_id = job.result.as_ref().unwrap().routes[0].id;

    // Freshly planned routes are listed as active work.
    assert_eq!(manager.list_active_routes("acme").len(), 1);
    assert!(manager.list_active_routes("globex").is_empty());

    // planned -> completed skips a step and is rejected.
    let error = manager
        .update_route_status("acme", route_id, RouteStatus::Completed, None)
        .unwrap_err();
    assert!(matches!(error, OptimizeError::Validation(_)));

    let started: Timestamp = "2026-03-02T08:05:00Z".parse().unwrap();
    let route = manager
        .update_route_status("acme", route_id, RouteStatus::Active, Some(started))
        .unwrap();
    assert_eq!(route.status, RouteStatus::Active);
    assert_eq!(route.actual_start_time, Some(started));

    let route = manager
        .mark_stop_complete(
            "acme",
            route_id,
            "stop-0",
            Some("2026-03-02T08:20:00Z".parse().unwrap()),
            Some("2026-03-02T08:25:00Z".parse().unwrap()),
            Some(String::from("left at reception")),
        )
        .unwrap();
    let stop = route.stops.iter().find(|stop| stop.stop_id == "stop-0").unwrap();
    assert!(stop.completed);
    assert_eq!(stop.notes.as_deref(), Some("left at reception"));

    let route = manager
        .update_route_status("acme", route_id, RouteStatus::Completed, None)
        .unwrap();
    assert_eq!(route.status, RouteStatus::Completed);

    // Terminal routes drop out of the active listing and stay terminal.
    assert!(manager.list_active_routes("acme").is_empty());
    let error = manager
        .update_route_status("acme", route_id, RouteStatus::Cancelled, None)
        .unwrap_err();
    assert!(matches!(error, OptimizeError::Validation(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stats_aggregate_terminal_jobs() {
    let manager = manager(haversine_config(), profiles(2, 0.0));

    for seed in 0..3u64 {
        let job = manager
            .submit("acme", seeded(request(spread_stops(5), 2), seed))
            .await
            .unwrap();
        assert!(job.status.is_terminal());
    }
    manager
        .submit("globex", seeded(request(spread_stops(3), 2), 5))
        .await
        .unwrap();

    let stats = manager.stats("acme");
    assert_eq!(stats.total_jobs, 3);
    assert_eq!(stats.completed, 3);
    assert!(stats.total_routes >= 3);
    assert!(stats.total_distance_meters > 0.0);
    assert!(stats.average_optimization_score >= 0.0);

    let other = manager.stats("globex");
    assert_eq!(other.total_jobs, 1);
}
