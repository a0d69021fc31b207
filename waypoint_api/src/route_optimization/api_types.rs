use geojson::Geometry;
use jiff::{SignedDuration, Timestamp};
use serde::Serialize;
use uuid::Uuid;

use waypoint_optimizer::{
    assembly::{PlannedRoute, RouteStatus, RouteStop, UnassignedStop},
    constraints::violation::Violation,
    jobs::job::{JobStatus, OptimizationJob},
    report::{OptimizationResult, OptimizationSummary},
};

/// Wire shape of a produced route: the engine record with its polyline
/// rendered as GeoJSON.
#[derive(Serialize)]
pub struct ApiRoute {
    pub id: Uuid,
    pub route_number: u32,
    pub vehicle_id: String,
    pub driver_id: Option<String>,
    pub status: RouteStatus,
    pub actual_start_time: Option<Timestamp>,
    pub stops: Vec<RouteStop>,
    pub total_distance_meters: f64,
    pub driving_duration: SignedDuration,
    pub service_duration: SignedDuration,
    pub waiting_duration: SignedDuration,
    pub total_duration: SignedDuration,
    pub total_cost: f64,
    pub capacity_utilization: f64,
    pub violations: Vec<Violation>,
    pub geometry: Geometry,
}

impl From<&PlannedRoute> for ApiRoute {
    fn from(route: &PlannedRoute) -> Self {
        ApiRoute {
            id: route.id,
            route_number: route.route_number,
            vehicle_id: route.vehicle_id.clone(),
            driver_id: route.driver_id.clone(),
            status: route.status,
            actual_start_time: route.actual_start_time,
            stops: route.stops.clone(),
            total_distance_meters: route.total_distance_meters,
            driving_duration: route.driving_duration,
            service_duration: route.service_duration,
            waiting_duration: route.waiting_duration,
            total_duration: route.total_duration,
            total_cost: route.total_cost,
            capacity_utilization: route.capacity_utilization,
            violations: route.violations.clone(),
            geometry: Geometry::from(&route.geometry),
        }
    }
}

#[derive(Serialize)]
pub struct ApiResult {
    pub routes: Vec<ApiRoute>,
    pub unassigned: Vec<UnassignedStop>,
    pub summary: OptimizationSummary,
}

impl From<&OptimizationResult> for ApiResult {
    fn from(result: &OptimizationResult) -> Self {
        ApiResult {
            routes: result.routes.iter().map(ApiRoute::from).collect(),
            unassigned: result.unassigned.clone(),
            summary: result.summary.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ApiJob {
    pub id: Uuid,
    pub name: String,
    pub status: JobStatus,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub result: Option<ApiResult>,
}

impl From<&OptimizationJob> for ApiJob {
    fn from(job: &OptimizationJob) -> Self {
        ApiJob {
            id: job.id,
            name: job.name.clone(),
            status: job.status,
            error: job.error.clone(),
            created_at: job.created_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
            result: job.result.as_ref().map(ApiResult::from),
        }
    }
}
