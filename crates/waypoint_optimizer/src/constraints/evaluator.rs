use jiff::{SignedDuration, Timestamp};

use crate::problem::{
    routing_problem::RoutingProblem,
    stop::StopIdx,
    vehicle::VehicleIdx,
};

use super::violation::{Violation, ViolationKind, ViolationReport};

/// Raw metrics of one candidate route, produced by [`simulate_route`].
#[derive(Debug, Clone)]
pub struct RouteMetrics {
    pub distance_meters: f64,
    pub driving: SignedDuration,
    pub service: SignedDuration,
    pub waiting: SignedDuration,
    pub cost: f64,

    /// Planned (arrival, departure) per stop, in route order.
    pub timings: Vec<(Timestamp, Timestamp)>,

    pub load_weight: f64,
    pub load_volume: f64,
    pub load_packages: u32,

    pub departure: Timestamp,
    pub route_end: Timestamp,
}

impl RouteMetrics {
    pub fn total_duration(&self) -> SignedDuration {
        self.route_end.duration_since(self.departure)
    }
}

/// Walks a stop sequence leg by leg: travel from the matrices, wait at early
/// arrivals, service at each stop. Pure in (problem, vehicle, stops).
pub fn simulate_route(
    problem: &RoutingProblem,
    vehicle: VehicleIdx,
    stops: &[StopIdx],
) -> RouteMetrics {
    let profile = problem.vehicle(vehicle);
    let departure = problem.route_departure(vehicle);

    let mut clock = departure;
    let mut distance_meters = 0.0;
    let mut driving = SignedDuration::ZERO;
    let mut service = SignedDuration::ZERO;
    let mut waiting = SignedDuration::ZERO;
    let mut timings = Vec::with_capacity(stops.len());

    let mut load_weight = 0.0;
    let mut load_volume = 0.0;
    let mut load_packages = 0u32;

    let mut previous: Option<StopIdx> = None;

    for &index in stops {
        if let Some(from) = previous {
            let leg_distance = problem.distance_meters(from, index);
            let leg_time = problem.travel_time(from, index);
            distance_meters += leg_distance;
            driving += leg_time;
            clock = clock + leg_time;
        }

        let stop = problem.stop(index);
        let arrival = clock;

        let wait = stop
            .time_window()
            .map(|window| window.wait_before(arrival))
            .unwrap_or(SignedDuration::ZERO);
        waiting += wait;

        let stop_departure = arrival + wait + stop.service_duration();
        service += stop.service_duration();
        timings.push((arrival, stop_departure));

        load_weight += stop.weight();
        load_volume += stop.volume();
        load_packages += stop.packages();

        clock = stop_departure;
        previous = Some(index);
    }

    let cost = driving.as_secs_f64() / 3600.0 * profile.cost_per_hour()
        + distance_meters / 1000.0 * profile.cost_per_km();

    RouteMetrics {
        distance_meters,
        driving,
        service,
        waiting,
        cost,
        timings,
        load_weight,
        load_volume,
        load_packages,
        departure,
        route_end: clock,
    }
}

/// Scores one candidate route against every active constraint. Pure: takes
/// data, returns data, never raises.
pub fn evaluate_route(
    problem: &RoutingProblem,
    vehicle: VehicleIdx,
    stops: &[StopIdx],
    metrics: &RouteMetrics,
) -> ViolationReport {
    let mut report = ViolationReport::default();
    let profile = problem.vehicle(vehicle);
    let options = problem.options();

    if options.consider_capacity {
        if profile.max_weight() > 0.0 && metrics.load_weight > profile.max_weight() {
            report.push(Violation::route_level(
                ViolationKind::OverWeight,
                metrics.load_weight - profile.max_weight(),
            ));
        }
        if profile.max_volume() > 0.0 && metrics.load_volume > profile.max_volume() {
            report.push(Violation::route_level(
                ViolationKind::OverVolume,
                metrics.load_volume - profile.max_volume(),
            ));
        }
        if let Some(max_packages) = profile.max_packages()
            && metrics.load_packages > max_packages
        {
            report.push(Violation::route_level(
                ViolationKind::OverPackages,
                f64::from(metrics.load_packages - max_packages),
            ));
        }
    }

    if options.consider_time_windows {
        for (&index, &(arrival, _)) in stops.iter().zip(metrics.timings.iter()) {
            let stop = problem.stop(index);
            if let Some(window) = stop.time_window() {
                let lateness_secs = window.lateness_secs(arrival);
                if lateness_secs > 0 {
                    report.push(Violation::at_stop(
                        ViolationKind::LateArrival,
                        lateness_secs as f64 / 60.0,
                        stop.id().to_owned(),
                    ));
                }
            }
        }
    }

    if let Some(max_duration) = options.max_route_duration {
        let overrun = metrics.total_duration() - max_duration;
        if overrun > SignedDuration::ZERO {
            report.push(Violation::route_level(
                ViolationKind::MaxDurationExceeded,
                overrun.as_secs_f64() / 60.0,
            ));
        }
    }

    if let Some(driver) = problem.driver(vehicle) {
        if let Some(shift_end) = driver.shift_end() {
            let overrun = metrics.route_end.as_second() - shift_end.as_second();
            if overrun > 0 {
                report.push(Violation::route_level(
                    ViolationKind::ShiftExceeded,
                    overrun as f64 / 60.0,
                ));
            }
        }

        if let Some(max_working) = driver.max_working_duration() {
            let overrun = metrics.total_duration() - max_working;
            if overrun > SignedDuration::ZERO {
                report.push(Violation::route_level(
                    ViolationKind::WorkingHoursExceeded,
                    overrun.as_secs_f64() / 60.0,
                ));
            }
        }
    }

    // Charging-stop insertion is out of scope: range overage is reported,
    // never auto-resolved.
    if let Some(range_km) = profile.range_km() {
        let distance_km = metrics.distance_meters / 1000.0;
        if distance_km > range_km {
            report.push(Violation::route_level(
                ViolationKind::RangeExceeded,
                distance_km - range_km,
            ));
        }
    }

    if let Some(max_stops) = options.max_stops_per_route
        && stops.len() > max_stops
    {
        report.push(Violation::route_level(
            ViolationKind::TooManyStops,
            (stops.len() - max_stops) as f64,
        ));
    }

    report
}
