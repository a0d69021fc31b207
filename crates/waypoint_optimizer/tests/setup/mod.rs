#![allow(dead_code)]

use std::sync::Arc;

use waypoint_matrix_providers::{
    client::TravelMatrixClient,
    provider::TravelMatrixProvider,
    travel_matrices::TravelMatrices,
};
use waypoint_optimizer::{
    jobs::{
        manager::{JobManager, JobManagerConfig},
        notifier::TracingNotifier,
        profiles::InMemoryProfileStore,
        request::{OptimizeRequest, StopInput},
        store::InMemoryJobStore,
    },
    problem::{
        goal::OptimizationGoal,
        options::OptimizeOptions,
        vehicle::{VehicleProfile, VehicleProfileBuilder},
    },
    solver::params::SolverParams,
};

pub fn quick_solver_params() -> SolverParams {
    SolverParams {
        population_size: 30,
        max_generations: 40,
        stall_generations: 40,
        max_duration: None,
        ..SolverParams::default()
    }
}

pub fn vehicle_profile(id: &str, max_weight: f64) -> VehicleProfile {
    let mut builder = VehicleProfileBuilder::default();
    builder.set_id(id.to_owned());
    builder.set_max_weight(max_weight);
    builder.set_avg_speed_kmh(50.0);
    builder.set_cost_per_km(1.0);
    builder.set_cost_per_hour(30.0);
    builder.build()
}

pub fn profiles(num_vehicles: usize, max_weight: f64) -> InMemoryProfileStore {
    let mut store = InMemoryProfileStore::default();
    for index in 0..num_vehicles {
        store.add_vehicle(vehicle_profile(&format!("veh-{index}"), max_weight));
    }
    store
}

pub fn manager(config: JobManagerConfig, profiles: InMemoryProfileStore) -> JobManager {
    JobManager::new(
        Arc::new(InMemoryJobStore::default()),
        Arc::new(profiles),
        Arc::new(TravelMatrixClient::new(None)),
        Arc::new(TracingNotifier),
        config,
    )
}

/// Offline config: haversine matrices, quick solver.
pub fn haversine_config() -> JobManagerConfig {
    JobManagerConfig {
        provider: TravelMatrixProvider::Haversine { speed_kmh: 50.0 },
        solver: quick_solver_params(),
        ..JobManagerConfig::default()
    }
}

/// Offline config backed by explicit matrices.
pub fn fixed_config(matrices: TravelMatrices) -> JobManagerConfig {
    JobManagerConfig {
        provider: TravelMatrixProvider::Fixed { matrices },
        solver: quick_solver_params(),
        ..JobManagerConfig::default()
    }
}

pub fn stop_input(id: &str, lon: f64, lat: f64) -> StopInput {
    StopInput {
        id: id.to_owned(),
        lat: Some(lat),
        lon: Some(lon),
        address: None,
        service_duration: None,
        weight: 0.0,
        volume: 0.0,
        packages: 0,
        priority: 0,
        earliest_arrival: None,
        latest_arrival: None,
    }
}

pub fn spread_stops(count: usize) -> Vec<StopInput> {
    (0..count)
        .map(|index| {
            stop_input(
                &format!("stop-{index}"),
                4.30 + (index % 7) as f64 * 0.02,
                50.80 + (index / 7) as f64 * 0.02,
            )
        })
        .collect()
}

pub fn request(stops: Vec<StopInput>, num_vehicles: usize) -> OptimizeRequest {
    OptimizeRequest {
        name: String::from("integration job"),
        stops,
        vehicle_ids: (0..num_vehicles).map(|index| format!("veh-{index}")).collect(),
        goal: OptimizationGoal::MinimizeDistance,
        options: OptimizeOptions::default(),
    }
}
