use jiff::{SignedDuration, Timestamp};
use waypoint_matrix_providers::travel_matrices::TravelMatrices;

use super::{
    driver::DriverProfile,
    goal::OptimizationGoal,
    options::OptimizeOptions,
    stop::{Stop, StopIdx},
    vehicle::{VehicleIdx, VehicleProfile},
};

/// The immutable view a single solve runs against: stops, candidate
/// vehicles with their drivers, the travel matrices, goal and options.
/// Built once at job start; the solver never mutates it.
pub struct RoutingProblem {
    stops: Vec<Stop>,
    vehicles: Vec<VehicleProfile>,
    drivers: Vec<Option<DriverProfile>>,
    matrices: TravelMatrices,
    degraded: bool,
    goal: OptimizationGoal,
    options: OptimizeOptions,
    departure: Timestamp,

    has_time_windows: bool,
    has_capacity_demand: bool,
}

impl RoutingProblem {
    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stop(&self, index: StopIdx) -> &Stop {
        &self.stops[index]
    }

    pub fn vehicles(&self) -> &[VehicleProfile] {
        &self.vehicles
    }

    pub fn vehicle(&self, index: VehicleIdx) -> &VehicleProfile {
        &self.vehicles[index]
    }

    pub fn driver(&self, index: VehicleIdx) -> Option<&DriverProfile> {
        self.drivers[index.get()].as_ref()
    }

    pub fn goal(&self) -> OptimizationGoal {
        self.goal
    }

    pub fn options(&self) -> &OptimizeOptions {
        &self.options
    }

    pub fn degraded(&self) -> bool {
        self.degraded
    }

    pub fn distance_meters(&self, from: StopIdx, to: StopIdx) -> f64 {
        self.matrices.distance_meters(from.get(), to.get())
    }

    pub fn travel_time(&self, from: StopIdx, to: StopIdx) -> SignedDuration {
        SignedDuration::from_secs_f64(self.matrices.duration_seconds(from.get(), to.get()))
    }

    /// When a route's vehicle leaves for its first stop: the driver's shift
    /// start, or the job-wide departure when the driver has no shift.
    pub fn route_departure(&self, vehicle: VehicleIdx) -> Timestamp {
        self.driver(vehicle)
            .and_then(|driver| driver.shift_start())
            .unwrap_or(self.departure)
    }

    pub fn has_time_windows(&self) -> bool {
        self.has_time_windows
    }

    pub fn has_capacity_demand(&self) -> bool {
        self.has_capacity_demand
    }

    pub fn total_demand_weight(&self) -> f64 {
        self.stops.iter().map(Stop::weight).sum()
    }
}

#[derive(Default)]
pub struct RoutingProblemBuilder {
    stops: Option<Vec<Stop>>,
    vehicles: Option<Vec<VehicleProfile>>,
    drivers: Option<Vec<Option<DriverProfile>>>,
    matrices: Option<TravelMatrices>,
    degraded: bool,
    goal: Option<OptimizationGoal>,
    options: Option<OptimizeOptions>,
    departure: Option<Timestamp>,
}

impl RoutingProblemBuilder {
    pub fn set_stops(&mut self, stops: Vec<Stop>) -> &mut RoutingProblemBuilder {
        self.stops = Some(stops);
        self
    }

    pub fn set_vehicles(&mut self, vehicles: Vec<VehicleProfile>) -> &mut RoutingProblemBuilder {
        self.vehicles = Some(vehicles);
        self
    }

    pub fn set_drivers(
        &mut self,
        drivers: Vec<Option<DriverProfile>>,
    ) -> &mut RoutingProblemBuilder {
        self.drivers = Some(drivers);
        self
    }

    pub fn set_matrices(&mut self, matrices: TravelMatrices) -> &mut RoutingProblemBuilder {
        self.matrices = Some(matrices);
        self
    }

    pub fn set_degraded(&mut self, degraded: bool) -> &mut RoutingProblemBuilder {
        self.degraded = degraded;
        self
    }

    pub fn set_goal(&mut self, goal: OptimizationGoal) -> &mut RoutingProblemBuilder {
        self.goal = Some(goal);
        self
    }

    pub fn set_options(&mut self, options: OptimizeOptions) -> &mut RoutingProblemBuilder {
        self.options = Some(options);
        self
    }

    pub fn set_departure(&mut self, departure: Timestamp) -> &mut RoutingProblemBuilder {
        self.departure = Some(departure);
        self
    }

    pub fn build(self) -> RoutingProblem {
        let stops = self.stops.expect("Expected list of stops");
        let vehicles = self.vehicles.expect("Expected list of vehicles");
        let matrices = self.matrices.expect("Expected travel matrices");

        if matrices.num_points() != stops.len() {
            panic!("Travel matrices must cover exactly the stop set");
        }

        let drivers = self
            .drivers
            .unwrap_or_else(|| vec![None; vehicles.len()]);
        if drivers.len() != vehicles.len() {
            panic!("Drivers must align with vehicles");
        }

        RoutingProblem {
            has_time_windows: stops.iter().any(|stop| {
                stop.time_window()
                    .is_some_and(|window| !window.is_empty())
            }),
            has_capacity_demand: stops
                .iter()
                .any(|stop| stop.weight() > 0.0 || stop.volume() > 0.0 || stop.packages() > 0),
            stops,
            vehicles,
            drivers,
            matrices,
            degraded: self.degraded,
            goal: self.goal.unwrap_or(OptimizationGoal::Balance),
            options: self.options.unwrap_or_default(),
            departure: self.departure.unwrap_or_else(Timestamp::now),
        }
    }
}
