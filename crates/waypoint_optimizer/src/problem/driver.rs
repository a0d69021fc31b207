use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// Read-only reference data describing a driver's working constraints.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DriverProfile {
    id: String,
    shift_start: Option<Timestamp>,
    shift_end: Option<Timestamp>,
    max_hours_per_day: Option<f64>,
}

impl DriverProfile {
    pub fn new(
        id: String,
        shift_start: Option<Timestamp>,
        shift_end: Option<Timestamp>,
        max_hours_per_day: Option<f64>,
    ) -> Self {
        DriverProfile {
            id,
            shift_start,
            shift_end,
            max_hours_per_day,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shift_start(&self) -> Option<Timestamp> {
        self.shift_start
    }

    pub fn shift_end(&self) -> Option<Timestamp> {
        self.shift_end
    }

    pub fn max_hours_per_day(&self) -> Option<f64> {
        self.max_hours_per_day
    }

    pub fn max_working_duration(&self) -> Option<SignedDuration> {
        self.max_hours_per_day
            .map(|hours| SignedDuration::from_secs_f64(hours * 3600.0))
    }
}
