use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;

use waypoint_optimizer::assembly::RouteStatus;

use crate::{error::ApiError, state::AppState};

use super::{api_types::ApiRoute, tenant_from};

pub async fn active_routes_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ApiRoute>>, ApiError> {
    let tenant = tenant_from(&headers);
    let routes = state
        .manager
        .list_active_routes(&tenant)
        .iter()
        .map(ApiRoute::from)
        .collect();

    Ok(Json(routes))
}

#[derive(Deserialize, JsonSchema)]
pub struct UpdateRouteBody {
    pub status: RouteStatus,
    pub actual_start_time: Option<Timestamp>,
}

pub async fn update_route_handler(
    Path(route_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UpdateRouteBody>,
) -> Result<Json<ApiRoute>, ApiError> {
    let tenant = tenant_from(&headers);
    let route = state.manager.update_route_status(
        &tenant,
        route_id,
        body.status,
        body.actual_start_time,
    )?;

    Ok(Json(ApiRoute::from(&route)))
}

#[derive(Deserialize, JsonSchema)]
pub struct CompleteStopBody {
    pub arrival: Option<Timestamp>,
    pub departure: Option<Timestamp>,
    pub notes: Option<String>,
}

pub async fn complete_stop_handler(
    Path((route_id, stop_id)): Path<(Uuid, String)>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CompleteStopBody>,
) -> Result<Json<ApiRoute>, ApiError> {
    let tenant = tenant_from(&headers);
    let route = state.manager.mark_stop_complete(
        &tenant,
        route_id,
        &stop_id,
        body.arrival,
        body.departure,
        body.notes,
    )?;

    Ok(Json(ApiRoute::from(&route)))
}
