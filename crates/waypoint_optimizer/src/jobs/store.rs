use fxhash::FxHashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::assembly::{PlannedRoute, RouteStatus};

use super::job::OptimizationJob;

/// Persistence collaborator for job and route records. Tenant scope is
/// enforced by the queries that take a tenant.
pub trait JobStore: Send + Sync {
    fn insert(&self, job: OptimizationJob);

    fn get(&self, id: Uuid) -> Option<OptimizationJob>;

    /// Replaces the stored record wholesale.
    fn put(&self, job: OptimizationJob);

    fn for_tenant(&self, tenant: &str) -> Vec<OptimizationJob>;

    /// The route plus its owning job id, when it belongs to the tenant.
    fn find_route(&self, tenant: &str, route_id: Uuid) -> Option<(Uuid, PlannedRoute)>;

    /// Replaces a route inside its job's result. Returns false when no
    /// such route exists.
    fn put_route(&self, job_id: Uuid, route: PlannedRoute) -> bool;

    fn active_routes(&self, tenant: &str) -> Vec<PlannedRoute>;
}

#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<FxHashMap<Uuid, OptimizationJob>>,
}

impl JobStore for InMemoryJobStore {
    fn insert(&self, job: OptimizationJob) {
        self.jobs.write().insert(job.id, job);
    }

    fn get(&self, id: Uuid) -> Option<OptimizationJob> {
        self.jobs.read().get(&id).cloned()
    }

    fn put(&self, job: OptimizationJob) {
        self.jobs.write().insert(job.id, job);
    }

    fn for_tenant(&self, tenant: &str) -> Vec<OptimizationJob> {
        self.jobs
            .read()
            .values()
            .filter(|job| job.tenant == tenant)
            .cloned()
            .collect()
    }

    fn find_route(&self, tenant: &str, route_id: Uuid) -> Option<(Uuid, PlannedRoute)> {
        self.jobs
            .read()
            .values()
            .filter(|job| job.tenant == tenant)
            .find_map(|job| {
                let result = job.result.as_ref()?;
                result
                    .routes
                    .iter()
                    .find(|route| route.id == route_id)
                    .map(|route| (job.id, route.clone()))
            })
    }

    fn put_route(&self, job_id: Uuid, route: PlannedRoute) -> bool {
        let mut jobs = self.jobs.write();
        let Some(job) = jobs.get_mut(&job_id) else {
            return false;
        };
        let Some(result) = job.result.as_mut() else {
            return false;
        };

        match result.routes.iter_mut().find(|existing| existing.id == route.id) {
            Some(existing) => {
                *existing = route;
                true
            }
            None => false,
        }
    }

    fn active_routes(&self, tenant: &str) -> Vec<PlannedRoute> {
        self.jobs
            .read()
            .values()
            .filter(|job| job.tenant == tenant)
            .filter_map(|job| job.result.as_ref())
            .flat_map(|result| result.routes.iter())
            .filter(|route| {
                matches!(route.status, RouteStatus::Planned | RouteStatus::Active)
            })
            .cloned()
            .collect()
    }
}
