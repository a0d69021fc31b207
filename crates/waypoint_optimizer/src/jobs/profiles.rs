use fxhash::FxHashMap;

use crate::problem::{driver::DriverProfile, vehicle::VehicleProfile};

/// Read-only lookup of vehicle and driver reference data. Profile data is
/// loaded once at job start and never mutated by the solver.
pub trait ProfileStore: Send + Sync {
    fn vehicle(&self, id: &str) -> Option<VehicleProfile>;

    fn driver(&self, id: &str) -> Option<DriverProfile>;

    /// The driver assigned to a vehicle, when dispatch has paired them.
    fn driver_for_vehicle(&self, vehicle_id: &str) -> Option<DriverProfile>;
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    vehicles: FxHashMap<String, VehicleProfile>,
    drivers: FxHashMap<String, DriverProfile>,
    assignments: FxHashMap<String, String>,
}

impl InMemoryProfileStore {
    pub fn add_vehicle(&mut self, profile: VehicleProfile) {
        self.vehicles.insert(profile.id().to_owned(), profile);
    }

    pub fn add_driver(&mut self, profile: DriverProfile) {
        self.drivers.insert(profile.id().to_owned(), profile);
    }

    pub fn assign_driver(&mut self, vehicle_id: String, driver_id: String) {
        self.assignments.insert(vehicle_id, driver_id);
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn vehicle(&self, id: &str) -> Option<VehicleProfile> {
        self.vehicles.get(id).cloned()
    }

    fn driver(&self, id: &str) -> Option<DriverProfile> {
        self.drivers.get(id).cloned()
    }

    fn driver_for_vehicle(&self, vehicle_id: &str) -> Option<DriverProfile> {
        let driver_id = self.assignments.get(vehicle_id)?;
        self.drivers.get(driver_id).cloned()
    }
}
