use thiserror::Error;
use waypoint_matrix_providers::http_api::MatrixProviderError;

/// Errors surfaced by the engine. Cancellation and infeasibility are not
/// errors: both are normal terminal job statuses.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("matrix provider failed: {0}")]
    Provider(#[from] MatrixProviderError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}
