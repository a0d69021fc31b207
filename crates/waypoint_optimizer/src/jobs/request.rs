use jiff::{SignedDuration, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::OptimizeError,
    problem::{
        goal::OptimizationGoal,
        options::OptimizeOptions,
        stop::{Stop, StopBuilder},
        time_window::TimeWindow,
    },
};

pub const MAX_STOPS: usize = 500;
pub const MAX_VEHICLES: usize = 50;

/// One stop as submitted. Either coordinates or a geocodable address must
/// be present.
#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug)]
pub struct StopInput {
    pub id: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub address: Option<String>,

    #[serde(default)]
    pub service_duration: Option<SignedDuration>,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub packages: u32,
    #[serde(default)]
    pub priority: u8,

    pub earliest_arrival: Option<Timestamp>,
    pub latest_arrival: Option<Timestamp>,
}

impl StopInput {
    pub fn coordinates(&self) -> Option<geo::Point> {
        match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => Some(geo::Point::new(lon, lat)),
            _ => None,
        }
    }

    pub fn time_window(&self) -> Option<TimeWindow> {
        if self.earliest_arrival.is_none() && self.latest_arrival.is_none() {
            None
        } else {
            Some(TimeWindow::new(self.earliest_arrival, self.latest_arrival))
        }
    }

    /// Materializes the stop once its location is known (given or
    /// geocoded).
    pub fn to_stop(&self, location: geo::Point) -> Stop {
        let mut builder = StopBuilder::default();
        builder.set_id(self.id.clone());
        builder.set_point(location);
        if let Some(duration) = self.service_duration {
            builder.set_service_duration(duration);
        }
        builder.set_weight(self.weight);
        builder.set_volume(self.volume);
        builder.set_packages(self.packages);
        builder.set_priority(self.priority);
        if let Some(window) = self.time_window() {
            builder.set_time_window(window);
        }
        builder.build()
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug)]
pub struct OptimizeRequest {
    pub name: String,
    pub stops: Vec<StopInput>,
    pub vehicle_ids: Vec<String>,
    pub goal: OptimizationGoal,

    #[serde(default)]
    pub options: OptimizeOptions,
}

impl OptimizeRequest {
    /// Surfaced synchronously; a failing request never creates a job.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.stops.is_empty() {
            return Err(OptimizeError::Validation(String::from(
                "at least one stop is required",
            )));
        }
        if self.stops.len() > MAX_STOPS {
            return Err(OptimizeError::Validation(format!(
                "too many stops: {} exceeds the limit of {MAX_STOPS}",
                self.stops.len()
            )));
        }

        if self.vehicle_ids.is_empty() {
            return Err(OptimizeError::Validation(String::from(
                "at least one vehicle is required",
            )));
        }
        if self.vehicle_ids.len() > MAX_VEHICLES {
            return Err(OptimizeError::Validation(format!(
                "too many vehicles: {} exceeds the limit of {MAX_VEHICLES}",
                self.vehicle_ids.len()
            )));
        }

        let mut seen_ids = fxhash::FxHashSet::default();
        for stop in &self.stops {
            if stop.id.is_empty() {
                return Err(OptimizeError::Validation(String::from(
                    "stop ids must not be empty",
                )));
            }
            if !seen_ids.insert(stop.id.as_str()) {
                return Err(OptimizeError::Validation(format!(
                    "duplicate stop id '{}'",
                    stop.id
                )));
            }

            if stop.coordinates().is_none() && stop.address.is_none() {
                return Err(OptimizeError::Validation(format!(
                    "stop '{}' has neither coordinates nor an address",
                    stop.id
                )));
            }

            if stop.weight < 0.0 || stop.volume < 0.0 {
                return Err(OptimizeError::Validation(format!(
                    "stop '{}' has a negative demand",
                    stop.id
                )));
            }

            if let Some(duration) = stop.service_duration
                && duration < SignedDuration::ZERO
            {
                return Err(OptimizeError::Validation(format!(
                    "stop '{}' has a negative service duration",
                    stop.id
                )));
            }

            if let Some(window) = stop.time_window()
                && window.is_inverted()
            {
                return Err(OptimizeError::Validation(format!(
                    "stop '{}' has an inverted time window",
                    stop.id
                )));
            }
        }

        Ok(())
    }
}
