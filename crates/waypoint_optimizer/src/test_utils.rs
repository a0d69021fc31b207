use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use waypoint_matrix_providers::travel_matrices::TravelMatrices;

use crate::{
    jobs::request::{OptimizeRequest, StopInput},
    problem::{
        driver::DriverProfile,
        goal::OptimizationGoal,
        options::OptimizeOptions,
        routing_problem::{RoutingProblem, RoutingProblemBuilder},
        stop::{Stop, StopBuilder},
        time_window::TimeWindow,
        vehicle::{VehicleProfile, VehicleProfileBuilder},
    },
};

/// Assumed travel speed of the `line` fixture, km/h.
const LINE_SPEED_KMH: f64 = 100.0;

pub fn minutes(n: i64) -> SignedDuration {
    SignedDuration::from_mins(n)
}

pub fn default_departure() -> Timestamp {
    "2026-03-02T08:00:00Z".parse().unwrap()
}

/// Declarative problem fixture. `line` puts stops on a straight line with
/// one fixed-duration leg between neighbors; `with_matrices` takes explicit
/// flat matrices.
pub struct ProblemFixture {
    num_stops: usize,
    distances: Vec<f64>,
    durations: Vec<f64>,

    weights: Vec<f64>,
    service: Vec<SignedDuration>,
    windows: Vec<Option<TimeWindow>>,

    num_vehicles: usize,
    vehicle_max_weight: f64,
    electric_range_km: Option<f64>,
    drivers: Vec<Option<DriverProfile>>,

    goal: OptimizationGoal,
    options: OptimizeOptions,
    departure: Timestamp,
    degraded: bool,
}

impl ProblemFixture {
    pub fn line(num_stops: usize, leg: SignedDuration) -> Self {
        let leg_secs = leg.as_secs_f64();
        let leg_meters = leg_secs * LINE_SPEED_KMH / 3.6;

        let mut distances = vec![0.0; num_stops * num_stops];
        let mut durations = vec![0.0; num_stops * num_stops];
        for i in 0..num_stops {
            for j in 0..num_stops {
                let hops = i.abs_diff(j) as f64;
                distances[i * num_stops + j] = hops * leg_meters;
                durations[i * num_stops + j] = hops * leg_secs;
            }
        }

        Self::with_matrices(num_stops, distances, durations)
    }

    pub fn with_matrices(num_stops: usize, distances: Vec<f64>, durations: Vec<f64>) -> Self {
        ProblemFixture {
            num_stops,
            distances,
            durations,
            weights: vec![0.0; num_stops],
            service: vec![SignedDuration::ZERO; num_stops],
            windows: vec![None; num_stops],
            num_vehicles: 1,
            vehicle_max_weight: 0.0,
            electric_range_km: None,
            drivers: Vec::new(),
            goal: OptimizationGoal::MinimizeDistance,
            options: OptimizeOptions::default(),
            departure: default_departure(),
            degraded: false,
        }
    }

    pub fn vehicles(mut self, num_vehicles: usize) -> Self {
        self.num_vehicles = num_vehicles;
        self
    }

    pub fn vehicle_max_weight(mut self, max_weight: f64) -> Self {
        self.vehicle_max_weight = max_weight;
        self
    }

    pub fn electric_range_km(mut self, range_km: f64) -> Self {
        self.electric_range_km = Some(range_km);
        self
    }

    pub fn driver(mut self, vehicle_index: usize, driver: DriverProfile) -> Self {
        if self.drivers.len() <= vehicle_index {
            self.drivers.resize(vehicle_index + 1, None);
        }
        self.drivers[vehicle_index] = Some(driver);
        self
    }

    pub fn stop_weight(mut self, index: usize, weight: f64) -> Self {
        self.weights[index] = weight;
        self
    }

    pub fn stop_service(mut self, index: usize, duration: SignedDuration) -> Self {
        self.service[index] = duration;
        self
    }

    pub fn stop_window(mut self, index: usize, window: TimeWindow) -> Self {
        self.windows[index] = Some(window);
        self
    }

    pub fn goal(mut self, goal: OptimizationGoal) -> Self {
        self.goal = goal;
        self
    }

    pub fn options(mut self, options: OptimizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn departure(mut self, departure: Timestamp) -> Self {
        self.departure = departure;
        self
    }

    pub fn degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }

    pub fn build(mut self) -> RoutingProblem {
        let stops: Vec<Stop> = (0..self.num_stops)
            .map(|index| {
                let mut builder = StopBuilder::default();
                builder.set_id(format!("stop-{index}"));
                builder.set_location(4.0 + index as f64 * 0.01, 50.0);
                builder.set_service_duration(self.service[index]);
                builder.set_weight(self.weights[index]);
                if let Some(window) = self.windows[index].clone() {
                    builder.set_time_window(window);
                }
                builder.build()
            })
            .collect();

        let vehicles: Vec<VehicleProfile> = (0..self.num_vehicles)
            .map(|index| {
                let mut builder = VehicleProfileBuilder::default();
                builder.set_id(format!("veh-{index}"));
                builder.set_max_weight(self.vehicle_max_weight);
                builder.set_avg_speed_kmh(LINE_SPEED_KMH);
                builder.set_cost_per_km(1.0);
                builder.set_cost_per_hour(30.0);
                if let Some(range_km) = self.electric_range_km {
                    builder.set_electric_range(range_km);
                }
                builder.build()
            })
            .collect();

        self.drivers.resize(self.num_vehicles, None);

        let mut builder = RoutingProblemBuilder::default();
        builder.set_stops(stops);
        builder.set_vehicles(vehicles);
        builder.set_drivers(self.drivers);
        builder.set_matrices(TravelMatrices::new(
            self.num_stops,
            self.distances,
            self.durations,
        ));
        builder.set_degraded(self.degraded);
        builder.set_goal(self.goal);
        builder.set_options(self.options);
        builder.set_departure(self.departure);
        builder.build()
    }

    pub fn build_arc(self) -> Arc<RoutingProblem> {
        Arc::new(self.build())
    }
}

pub fn basic_request(num_stops: usize, num_vehicles: usize) -> OptimizeRequest {
    OptimizeRequest {
        name: String::from("test job"),
        stops: (0..num_stops)
            .map(|index| StopInput {
                id: format!("stop-{index}"),
                lat: Some(50.0),
                lon: Some(4.0 + index as f64 * 0.01),
                address: None,
                service_duration: None,
                weight: 0.0,
                volume: 0.0,
                packages: 0,
                priority: 0,
                earliest_arrival: None,
                latest_arrival: None,
            })
            .collect(),
        vehicle_ids: (0..num_vehicles).map(|index| format!("veh-{index}")).collect(),
        goal: OptimizationGoal::MinimizeDistance,
        options: OptimizeOptions::default(),
    }
}
