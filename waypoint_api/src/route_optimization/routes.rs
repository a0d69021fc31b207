use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::{dispatch, jobs, optimize, stats};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/route-optimization/optimize",
            post(optimize::optimize_handler),
        )
        .route(
            "/route-optimization/jobs/{job_id}",
            get(jobs::get_job_handler),
        )
        .route(
            "/route-optimization/jobs/{job_id}/cancel",
            post(jobs::cancel_job_handler),
        )
        .route(
            "/route-optimization/routes/active",
            get(dispatch::active_routes_handler),
        )
        .route(
            "/route-optimization/routes/{route_id}/update",
            put(dispatch::update_route_handler),
        )
        .route(
            "/route-optimization/routes/{route_id}/stops/{stop_id}/complete",
            post(dispatch::complete_stop_handler),
        )
        .route("/route-optimization/stats", get(stats::stats_handler))
        .with_state(state)
}
