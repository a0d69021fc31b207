use serde::{Deserialize, Serialize};

use crate::define_index_newtype;

define_index_newtype!(VehicleIdx, VehicleProfile);

/// Read-only reference data describing a vehicle. Loaded once at job start.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VehicleProfile {
    id: String,
    max_weight: f64,
    max_volume: f64,
    max_packages: Option<u32>,
    avg_speed_kmh: f64,
    cost_per_km: f64,
    cost_per_hour: f64,
    is_electric: bool,
    range_km: Option<f64>,
}

impl VehicleProfile {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    pub fn max_volume(&self) -> f64 {
        self.max_volume
    }

    pub fn max_packages(&self) -> Option<u32> {
        self.max_packages
    }

    pub fn avg_speed_kmh(&self) -> f64 {
        self.avg_speed_kmh
    }

    pub fn cost_per_km(&self) -> f64 {
        self.cost_per_km
    }

    pub fn cost_per_hour(&self) -> f64 {
        self.cost_per_hour
    }

    pub fn is_electric(&self) -> bool {
        self.is_electric
    }

    /// Meaningful only for electric vehicles.
    pub fn range_km(&self) -> Option<f64> {
        if self.is_electric { self.range_km } else { None }
    }
}

#[derive(Default)]
pub struct VehicleProfileBuilder {
    id: Option<String>,
    max_weight: Option<f64>,
    max_volume: Option<f64>,
    max_packages: Option<u32>,
    avg_speed_kmh: Option<f64>,
    cost_per_km: Option<f64>,
    cost_per_hour: Option<f64>,
    is_electric: Option<bool>,
    range_km: Option<f64>,
}

impl VehicleProfileBuilder {
    pub fn set_id(&mut self, id: String) -> &mut VehicleProfileBuilder {
        self.id = Some(id);
        self
    }

    pub fn set_max_weight(&mut self, max_weight: f64) -> &mut VehicleProfileBuilder {
        self.max_weight = Some(max_weight);
        self
    }

    pub fn set_max_volume(&mut self, max_volume: f64) -> &mut VehicleProfileBuilder {
        self.max_volume = Some(max_volume);
        self
    }

    pub fn set_max_packages(&mut self, max_packages: u32) -> &mut VehicleProfileBuilder {
        self.max_packages = Some(max_packages);
        self
    }

    pub fn set_avg_speed_kmh(&mut self, avg_speed_kmh: f64) -> &mut VehicleProfileBuilder {
        self.avg_speed_kmh = Some(avg_speed_kmh);
        self
    }

    pub fn set_cost_per_km(&mut self, cost_per_km: f64) -> &mut VehicleProfileBuilder {
        self.cost_per_km = Some(cost_per_km);
        self
    }

    pub fn set_cost_per_hour(&mut self, cost_per_hour: f64) -> &mut VehicleProfileBuilder {
        self.cost_per_hour = Some(cost_per_hour);
        self
    }

    pub fn set_electric_range(&mut self, range_km: f64) -> &mut VehicleProfileBuilder {
        self.is_electric = Some(true);
        self.range_km = Some(range_km);
        self
    }

    pub fn build(self) -> VehicleProfile {
        VehicleProfile {
            id: self.id.expect("Vehicle profile ID is required"),
            max_weight: self.max_weight.unwrap_or(0.0),
            max_volume: self.max_volume.unwrap_or(0.0),
            max_packages: self.max_packages,
            avg_speed_kmh: self.avg_speed_kmh.unwrap_or(45.0),
            cost_per_km: self.cost_per_km.unwrap_or(0.0),
            cost_per_hour: self.cost_per_hour.unwrap_or(0.0),
            is_electric: self.is_electric.unwrap_or(false),
            range_km: self.range_km,
        }
    }
}
