use std::fmt::Display;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::travel_matrices::TravelMatrices;

#[derive(Deserialize, Serialize, JsonSchema, Copy, Clone, Hash, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatrixProfile {
    Car,
    Van,
    Truck,
}

impl Display for MatrixProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MatrixProfile::Car => "car",
                MatrixProfile::Van => "van",
                MatrixProfile::Truck => "truck",
            }
        )
    }
}

/// One matrix-lookup capability with several backings. The solver's logic is
/// identical regardless of which variant serves it.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum TravelMatrixProvider {
    /// Remote matrix service, traffic-aware when `traffic` is set.
    Http {
        profile: MatrixProfile,
        traffic: bool,
    },
    /// Straight-line estimate at an assumed average speed.
    Haversine { speed_kmh: f64 },
    /// Precomputed matrices, used by tests and offline runs.
    Fixed { matrices: TravelMatrices },
}

impl std::hash::Hash for TravelMatrixProvider {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            TravelMatrixProvider::Http { profile, traffic } => {
                state.write_u8(0);
                profile.hash(state);
                traffic.hash(state);
            }
            TravelMatrixProvider::Haversine { speed_kmh } => {
                state.write_u8(1);
                state.write_u64(speed_kmh.to_bits());
            }
            TravelMatrixProvider::Fixed { matrices } => {
                state.write_u8(2);
                matrices.hash(state);
            }
        }
    }
}
