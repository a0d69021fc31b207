use tracing::info;
use uuid::Uuid;

use crate::assembly::PlannedRoute;

/// Outbound channel for finalized routes (e.g. dispatch). Fire and forget,
/// best effort: implementations must not fail the job.
pub trait RouteNotifier: Send + Sync {
    fn routes_finalized(&self, tenant: &str, job_id: Uuid, routes: &[PlannedRoute]);
}

/// Default sink: a structured log line per notification.
pub struct TracingNotifier;

impl RouteNotifier for TracingNotifier {
    fn routes_finalized(&self, tenant: &str, job_id: Uuid, routes: &[PlannedRoute]) {
        info!(tenant, %job_id, routes = routes.len(), "routes finalized");
    }
}
