use std::{
    cmp,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use fxhash::FxHashMap;
use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

use waypoint_matrix_providers::{
    client::TravelMatrixClient,
    provider::{MatrixProfile, TravelMatrixProvider},
};

use crate::{
    assembly::{AssembledPlan, PlannedRoute, RouteStatus, assemble},
    error::OptimizeError,
    problem::{
        driver::DriverProfile,
        routing_problem::{RoutingProblem, RoutingProblemBuilder},
        stop::Stop,
        vehicle::VehicleProfile,
    },
    report::{OptimizationResult, summarize},
    solver::{
        genetic::{GeneticSolver, StopReason},
        params::SolverParams,
    },
};

use super::{
    job::{JobStatus, OptimizationJob},
    notifier::RouteNotifier,
    profiles::ProfileStore,
    request::OptimizeRequest,
    store::JobStore,
};

pub const MAX_CONCURRENT_JOBS_ENV_VAR: &str = "WAYPOINT_MAX_CONCURRENT_JOBS";

#[derive(Clone, Debug)]
pub struct JobManagerConfig {
    /// Worker pool size. Submissions beyond it queue, never drop.
    pub max_concurrent_jobs: usize,

    /// Jobs below this stop count solve synchronously in the submit call.
    pub inline_threshold: usize,

    /// Wall-clock bound for a synchronous solve.
    pub inline_timeout: SignedDuration,

    pub solver: SolverParams,

    /// Base matrix provider; the traffic flag per job comes from its
    /// options.
    pub provider: TravelMatrixProvider,

    /// Seed used when the request does not carry one.
    pub default_seed: u64,
}

impl Default for JobManagerConfig {
    fn default() -> Self {
        JobManagerConfig {
            max_concurrent_jobs: 4,
            inline_threshold: 25,
            inline_timeout: SignedDuration::from_secs(10),
            solver: SolverParams::default(),
            provider: TravelMatrixProvider::Http {
                profile: MatrixProfile::Car,
                traffic: false,
            },
            default_seed: 0,
        }
    }
}

impl JobManagerConfig {
    pub fn from_env() -> Self {
        let mut config = JobManagerConfig::default();

        if let Ok(value) = std::env::var(MAX_CONCURRENT_JOBS_ENV_VAR) {
            match value.parse() {
                Ok(parsed) if parsed > 0 => config.max_concurrent_jobs = parsed,
                _ => warn!(
                    value,
                    "ignoring invalid {}", MAX_CONCURRENT_JOBS_ENV_VAR
                ),
            }
        }

        config
    }
}

/// Aggregate historical optimization metrics for one tenant.
#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug, Default)]
pub struct TenantStats {
    pub total_jobs: usize,
    pub running: usize,
    pub completed: usize,
    pub infeasible: usize,
    pub failed: usize,
    pub cancelled: usize,

    pub total_routes: usize,
    pub total_distance_meters: f64,
    pub total_cost: f64,
    pub total_estimated_savings: f64,
    pub average_optimization_score: f64,
}

/// Owns every job's lifecycle: validation, profile/matrix resolution,
/// scheduling on the bounded worker pool, cancellation, and the dispatch
/// operations on produced routes. Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct JobManager {
    store: Arc<dyn JobStore>,
    profiles: Arc<dyn ProfileStore>,
    matrix_client: Arc<TravelMatrixClient>,
    notifier: Arc<dyn RouteNotifier>,
    config: Arc<JobManagerConfig>,
    semaphore: Arc<Semaphore>,
    cancel_flags: Arc<Mutex<FxHashMap<Uuid, Arc<AtomicBool>>>>,
}

impl JobManager {
    pub fn new(
        store: Arc<dyn JobStore>,
        profiles: Arc<dyn ProfileStore>,
        matrix_client: Arc<TravelMatrixClient>,
        notifier: Arc<dyn RouteNotifier>,
        config: JobManagerConfig,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1)));

        JobManager {
            store,
            profiles,
            matrix_client,
            notifier,
            config: Arc::new(config),
            semaphore,
            cancel_flags: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }

    /// Validates and creates a job. Small jobs solve synchronously and
    /// return terminal; larger jobs return `running` immediately and solve
    /// on the worker pool.
    pub async fn submit(
        &self,
        tenant: &str,
        request: OptimizeRequest,
    ) -> Result<OptimizationJob, OptimizeError> {
        request.validate()?;

        let (vehicles, drivers) = self.resolve_profiles(&request)?;
        let stops = self.resolve_stops(&request).await?;

        let points: Vec<geo::Point> = stops.iter().map(Stop::location).collect();
        let provider = self.job_provider(&request);
        let lookup = self
            .matrix_client
            .fetch_matrix(&points, &provider, request.options.strict_matrix)
            .await?;

        let mut builder = RoutingProblemBuilder::default();
        builder.set_stops(stops);
        builder.set_vehicles(vehicles);
        builder.set_drivers(drivers);
        builder.set_matrices(lookup.matrices);
        builder.set_degraded(lookup.degraded);
        builder.set_goal(request.goal);
        builder.set_options(request.options.clone());
        builder.set_departure(Timestamp::now());
        let problem = Arc::new(builder.build());

        let seed = request.options.seed.unwrap_or(self.config.default_seed);
        let inline = request.stops.len() < self.config.inline_threshold;

        let mut job = OptimizationJob::new(tenant.to_owned(), request);
        let job_id = job.id;
        self.store.insert(job.clone());

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel_flags.lock().insert(job_id, Arc::clone(&cancel));

        let mut params = self.config.solver.clone();
        job.transition_to(JobStatus::Running);
        self.store.put(job.clone());

        if inline {
            params.max_duration = Some(cmp::min(
                params.max_duration.unwrap_or(self.config.inline_timeout),
                self.config.inline_timeout,
            ));

            self.execute(job_id, problem, params, seed, cancel).await;
            self.cancel_flags.lock().remove(&job_id);

            return self.get(tenant, job_id);
        }

        let manager = self.clone();
        tokio::spawn(async move {
            let Ok(_permit) = manager.semaphore.clone().acquire_owned().await else {
                return;
            };

            manager.execute(job_id, problem, params, seed, cancel).await;
            manager.cancel_flags.lock().remove(&job_id);
        });

        Ok(job)
    }

    pub fn get(&self, tenant: &str, id: Uuid) -> Result<OptimizationJob, OptimizeError> {
        self.store
            .get(id)
            .filter(|job| job.tenant == tenant)
            .ok_or_else(|| OptimizeError::NotFound(format!("job {id}")))
    }

    /// Signals a running solve to stop. Idempotent: cancelling a terminal
    /// job is a no-op returning the job as-is.
    pub fn cancel(&self, tenant: &str, id: Uuid) -> Result<OptimizationJob, OptimizeError> {
        let job = self.get(tenant, id)?;
        if job.status.is_terminal() {
            return Ok(job);
        }

        if let Some(flag) = self.cancel_flags.lock().get(&id) {
            flag.store(true, Ordering::Relaxed);
        }
        info!(job_id = %id, "cancellation requested");

        self.get(tenant, id)
    }

    pub fn list_active_routes(&self, tenant: &str) -> Vec<PlannedRoute> {
        self.store.active_routes(tenant)
    }

    /// Applies a monotonic dispatch transition to a produced route.
    pub fn update_route_status(
        &self,
        tenant: &str,
        route_id: Uuid,
        status: RouteStatus,
        actual_start_time: Option<Timestamp>,
    ) -> Result<PlannedRoute, OptimizeError> {
        let (job_id, mut route) = self
            .store
            .find_route(tenant, route_id)
            .ok_or_else(|| OptimizeError::NotFound(format!("route {route_id}")))?;

        if !route.status.can_transition_to(status) {
            return Err(OptimizeError::Validation(format!(
                "route status cannot move from {:?} to {status:?}",
                route.status
            )));
        }

        route.status = status;
        if let Some(started) = actual_start_time {
            route.actual_start_time = Some(started);
        }

        self.store.put_route(job_id, route.clone());
        Ok(route)
    }

    /// Records a completed visit to one stop of a produced route.
    #[allow(clippy::too_many_arguments)]
    pub fn mark_stop_complete(
        &self,
        tenant: &str,
        route_id: Uuid,
        stop_id: &str,
        arrival: Option<Timestamp>,
        departure: Option<Timestamp>,
        notes: Option<String>,
    ) -> Result<PlannedRoute, OptimizeError> {
        let (job_id, mut route) = self
            .store
            .find_route(tenant, route_id)
            .ok_or_else(|| OptimizeError::NotFound(format!("route {route_id}")))?;

        let stop = route
            .stops
            .iter_mut()
            .find(|stop| stop.stop_id == stop_id)
            .ok_or_else(|| {
                OptimizeError::NotFound(format!("stop {stop_id} on route {route_id}"))
            })?;

        stop.completed = true;
        stop.actual_arrival = arrival;
        stop.actual_departure = departure;
        stop.notes = notes;

        self.store.put_route(job_id, route.clone());
        Ok(route)
    }

    pub fn stats(&self, tenant: &str) -> TenantStats {
        let jobs = self.store.for_tenant(tenant);
        let mut stats = TenantStats {
            total_jobs: jobs.len(),
            ..TenantStats::default()
        };

        let mut scored_jobs = 0usize;
        let mut score_sum = 0.0;

        for job in &jobs {
            match job.status {
                JobStatus::Running | JobStatus::Pending => stats.running += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Infeasible => stats.infeasible += 1,
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Cancelled => stats.cancelled += 1,
            }

            if let Some(result) = &job.result {
                stats.total_routes += result.routes.len();
                stats.total_distance_meters += result.summary.total_distance_meters;
                stats.total_cost += result.summary.total_cost;
                stats.total_estimated_savings += result.summary.estimated_savings;
                score_sum += result.summary.optimization_score;
                scored_jobs += 1;
            }
        }

        if scored_jobs > 0 {
            stats.average_optimization_score = score_sum / scored_jobs as f64;
        }

        stats
    }

    fn resolve_profiles(
        &self,
        request: &OptimizeRequest,
    ) -> Result<(Vec<VehicleProfile>, Vec<Option<DriverProfile>>), OptimizeError> {
        let mut vehicles = Vec::with_capacity(request.vehicle_ids.len());
        let mut drivers = Vec::with_capacity(request.vehicle_ids.len());

        for vehicle_id in &request.vehicle_ids {
            let profile = self.profiles.vehicle(vehicle_id).ok_or_else(|| {
                OptimizeError::Validation(format!("unknown vehicle profile '{vehicle_id}'"))
            })?;

            drivers.push(self.profiles.driver_for_vehicle(vehicle_id));
            vehicles.push(profile);
        }

        Ok((vehicles, drivers))
    }

    async fn resolve_stops(&self, request: &OptimizeRequest) -> Result<Vec<Stop>, OptimizeError> {
        let mut stops = Vec::with_capacity(request.stops.len());

        for input in &request.stops {
            let location = match input.coordinates() {
                Some(point) => point,
                None => {
                    // validate() guarantees an address is present here
                    let address = input.address.as_deref().unwrap_or_default();
                    self.matrix_client.geocode(address).await?
                }
            };

            stops.push(input.to_stop(location));
        }

        Ok(stops)
    }

    fn job_provider(&self, request: &OptimizeRequest) -> TravelMatrixProvider {
        match &self.config.provider {
            TravelMatrixProvider::Http { profile, .. } => TravelMatrixProvider::Http {
                profile: *profile,
                traffic: request.options.consider_traffic,
            },
            other => other.clone(),
        }
    }

    fn geometry_profile(&self) -> MatrixProfile {
        match &self.config.provider {
            TravelMatrixProvider::Http { profile, .. } => *profile,
            _ => MatrixProfile::Car,
        }
    }

    async fn execute(
        &self,
        job_id: Uuid,
        problem: Arc<RoutingProblem>,
        params: SolverParams,
        seed: u64,
        cancel: Arc<AtomicBool>,
    ) {
        let started = Timestamp::now();
        let solver = GeneticSolver::new(Arc::clone(&problem), params, seed, cancel);

        match tokio::task::spawn_blocking(move || solver.run()).await {
            Ok(outcome) => {
                let mut plan = assemble(&problem, &outcome.best);
                self.apply_route_geometry(&mut plan).await;

                let solver_time = Timestamp::now().duration_since(started);
                let summary = summarize(
                    &problem,
                    &plan,
                    solver_time,
                    outcome.generations,
                    outcome.stop_reason,
                );

                let status = if outcome.stop_reason == StopReason::Cancelled {
                    JobStatus::Cancelled
                } else if plan.is_feasible() {
                    JobStatus::Completed
                } else {
                    JobStatus::Infeasible
                };

                let Some(mut job) = self.store.get(job_id) else {
                    return;
                };

                let routes = plan.routes.clone();
                job.result = Some(OptimizationResult {
                    routes: plan.routes,
                    unassigned: plan.unassigned,
                    summary,
                });
                job.transition_to(status);
                let tenant = job.tenant.clone();
                self.store.put(job);

                if matches!(status, JobStatus::Completed | JobStatus::Infeasible) {
                    // Best effort: the notifier must never fail the job.
                    self.notifier.routes_finalized(&tenant, job_id, &routes);
                }

                info!(%job_id, ?status, "optimization job finished");
            }
            Err(join_error) => {
                error!(%job_id, error = %join_error, "solver execution failed");

                if let Some(mut job) = self.store.get(job_id) {
                    job.error = Some(String::from("internal error during optimization"));
                    job.transition_to(JobStatus::Failed);
                    self.store.put(job);
                }
            }
        }
    }

    /// Swaps each route's straight-segment polyline for provider geometry
    /// where available.
    async fn apply_route_geometry(&self, plan: &mut AssembledPlan) {
        let profile = self.geometry_profile();

        for route in &mut plan.routes {
            let points: Vec<geo::Point> = route.geometry.points().collect();
            if let Some(polyline) = self.matrix_client.route_geometry(&points, profile).await {
                route.set_geometry(
                    polyline
                        .into_iter()
                        .map(|[lon, lat]| geo::Coord { x: lon, y: lat })
                        .collect(),
                );
            }
        }
    }
}
