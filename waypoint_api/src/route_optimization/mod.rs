pub mod api_types;
pub mod dispatch;
pub mod jobs;
pub mod optimize;
pub mod routes;
pub mod stats;

use axum::http::HeaderMap;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Authentication runs upstream; by the time a request lands here the
/// tenant header is trusted.
pub fn tenant_from(headers: &HeaderMap) -> String {
    headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("default")
        .to_owned()
}
