use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use waypoint_optimizer::jobs::manager::TenantStats;

use crate::{error::ApiError, state::AppState};

use super::tenant_from;

pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TenantStats>, ApiError> {
    let tenant = tenant_from(&headers);

    Ok(Json(state.manager.stats(&tenant)))
}
