use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-job option flags. Defaults match the common dispatch case: respect
/// windows and capacity, no live traffic, degrade instead of failing when
/// the matrix provider is down.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(default)]
pub struct OptimizeOptions {
    pub consider_traffic: bool,
    pub consider_time_windows: bool,
    pub consider_capacity: bool,

    /// Fail the job on provider errors instead of degrading to haversine.
    pub strict_matrix: bool,

    pub max_stops_per_route: Option<usize>,
    pub max_route_duration: Option<SignedDuration>,

    /// Seed for the solver's random source. Identical request and seed give
    /// bit-identical results.
    pub seed: Option<u64>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        OptimizeOptions {
            consider_traffic: false,
            consider_time_windows: true,
            consider_capacity: true,
            strict_matrix: false,
            max_stops_per_route: None,
            max_route_duration: None,
            seed: None,
        }
    }
}
