mod error;
mod route_optimization;
mod state;

use std::{collections::HashMap, sync::Arc};

use axum::{http::Method, serve};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info, warn};

use waypoint_matrix_providers::client::TravelMatrixClient;
use waypoint_optimizer::{
    jobs::{
        manager::{JobManager, JobManagerConfig},
        notifier::TracingNotifier,
        profiles::InMemoryProfileStore,
        store::InMemoryJobStore,
    },
    problem::{driver::DriverProfile, vehicle::VehicleProfile},
};

use crate::state::AppState;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const PROFILES_FILE_ENV_VAR: &str = "WAYPOINT_PROFILES_FILE";
const BIND_ADDR_ENV_VAR: &str = "WAYPOINT_BIND_ADDR";

#[derive(Deserialize, Default)]
struct ProfilesFile {
    #[serde(default)]
    vehicles: Vec<VehicleProfile>,
    #[serde(default)]
    drivers: Vec<DriverProfile>,
    /// vehicle id -> driver id
    #[serde(default)]
    assignments: HashMap<String, String>,
}

fn load_profiles() -> anyhow::Result<InMemoryProfileStore> {
    let mut store = InMemoryProfileStore::default();

    match std::env::var(PROFILES_FILE_ENV_VAR) {
        Ok(path) => {
            let file = std::fs::File::open(&path)?;
            let profiles: ProfilesFile = serde_json::from_reader(file)?;

            info!(
                path,
                vehicles = profiles.vehicles.len(),
                drivers = profiles.drivers.len(),
                "loaded profile data"
            );

            for vehicle in profiles.vehicles {
                store.add_vehicle(vehicle);
            }
            for driver in profiles.drivers {
                store.add_driver(driver);
            }
            for (vehicle_id, driver_id) in profiles.assignments {
                store.assign_driver(vehicle_id, driver_id);
            }
        }
        Err(_) => {
            warn!(
                "{} not set, starting with an empty profile store",
                PROFILES_FILE_ENV_VAR
            );
        }
    }

    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let manager = JobManager::new(
        Arc::new(InMemoryJobStore::default()),
        Arc::new(load_profiles()?),
        Arc::new(TravelMatrixClient::from_env()),
        Arc::new(TracingNotifier),
        JobManagerConfig::from_env(),
    );

    let state = Arc::new(AppState { manager });

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_origin(Any)
        .allow_headers(Any);

    let app = route_optimization::routes::router(state)
        .layer(ServiceBuilder::new().layer(cors_layer));

    let addr =
        std::env::var(BIND_ADDR_ENV_VAR).unwrap_or_else(|_| String::from("127.0.0.1:8080"));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "waypoint api listening");

    serve(listener, app).await?;

    Ok(())
}
