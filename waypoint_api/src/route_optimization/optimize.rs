use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use waypoint_optimizer::jobs::request::OptimizeRequest;

use crate::{error::ApiError, state::AppState};

use super::{api_types::ApiJob, tenant_from};

/// Submits an optimization job. Small jobs come back terminal with their
/// full result; larger ones come back `running` with just the job id to
/// poll.
pub async fn optimize_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<ApiJob>, ApiError> {
    let tenant = tenant_from(&headers);
    let job = state.manager.submit(&tenant, request).await?;

    Ok(Json(ApiJob::from(&job)))
}
