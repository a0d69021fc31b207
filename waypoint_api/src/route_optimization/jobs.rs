use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

use super::{api_types::ApiJob, tenant_from};

pub async fn get_job_handler(
    Path(job_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiJob>, ApiError> {
    let tenant = tenant_from(&headers);
    let job = state.manager.get(&tenant, job_id)?;

    Ok(Json(ApiJob::from(&job)))
}

pub async fn cancel_job_handler(
    Path(job_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiJob>, ApiError> {
    let tenant = tenant_from(&headers);
    let job = state.manager.cancel(&tenant, job_id)?;

    Ok(Json(ApiJob::from(&job)))
}
