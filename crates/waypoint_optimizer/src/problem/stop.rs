use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::define_index_newtype;

use super::time_window::TimeWindow;

define_index_newtype!(StopIdx, Stop);

/// A delivery/service location. Immutable once a job starts.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Stop {
    id: String,
    location: geo::Point,
    service_duration: SignedDuration,
    weight: f64,
    volume: f64,
    packages: u32,
    priority: u8,
    time_window: Option<TimeWindow>,
}

impl Stop {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> geo::Point {
        self.location
    }

    pub fn service_duration(&self) -> SignedDuration {
        self.service_duration
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn packages(&self) -> u32 {
        self.packages
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }
}

#[derive(Default)]
pub struct StopBuilder {
    id: Option<String>,
    location: Option<geo::Point>,
    service_duration: Option<SignedDuration>,
    weight: Option<f64>,
    volume: Option<f64>,
    packages: Option<u32>,
    priority: Option<u8>,
    time_window: Option<TimeWindow>,
}

impl StopBuilder {
    pub fn set_id(&mut self, id: String) -> &mut StopBuilder {
        self.id = Some(id);
        self
    }

    pub fn set_location(&mut self, lon: f64, lat: f64) -> &mut StopBuilder {
        self.location = Some(geo::Point::new(lon, lat));
        self
    }

    pub fn set_point(&mut self, point: geo::Point) -> &mut StopBuilder {
        self.location = Some(point);
        self
    }

    pub fn set_service_duration(&mut self, duration: SignedDuration) -> &mut StopBuilder {
        self.service_duration = Some(duration);
        self
    }

    pub fn set_weight(&mut self, weight: f64) -> &mut StopBuilder {
        self.weight = Some(weight);
        self
    }

    pub fn set_volume(&mut self, volume: f64) -> &mut StopBuilder {
        self.volume = Some(volume);
        self
    }

    pub fn set_packages(&mut self, packages: u32) -> &mut StopBuilder {
        self.packages = Some(packages);
        self
    }

    pub fn set_priority(&mut self, priority: u8) -> &mut StopBuilder {
        self.priority = Some(priority);
        self
    }

    pub fn set_time_window(&mut self, time_window: TimeWindow) -> &mut StopBuilder {
        self.time_window = Some(time_window);
        self
    }

    pub fn build(self) -> Stop {
        Stop {
            id: self.id.expect("Stop ID is required"),
            location: self.location.expect("Stop location is required"),
            service_duration: self.service_duration.unwrap_or(SignedDuration::ZERO),
            weight: self.weight.unwrap_or(0.0),
            volume: self.volume.unwrap_or(0.0),
            packages: self.packages.unwrap_or(0),
            priority: self.priority.unwrap_or(0),
            time_window: self.time_window,
        }
    }
}
