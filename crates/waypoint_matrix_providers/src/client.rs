use tracing::{debug, warn};

use crate::{
    cache::MatrixCache,
    haversine::haversine_matrices,
    http_api::{HttpMatrixClient, HttpMatrixClientParams, MatrixProviderError},
    provider::{MatrixProfile, TravelMatrixProvider},
    travel_matrices::TravelMatrices,
};

pub const MATRIX_URL_ENV_VAR: &str = "WAYPOINT_MATRIX_URL";
pub const MATRIX_API_KEY_ENV_VAR: &str = "WAYPOINT_MATRIX_API_KEY";

const DEFAULT_FALLBACK_SPEED_KMH: f64 = 45.0;

/// A matrix lookup result, flagged when it was served by the straight-line
/// fallback instead of the requested provider.
#[derive(Debug, Clone)]
pub struct MatrixLookup {
    pub matrices: TravelMatrices,
    pub degraded: bool,
}

/// Front door for all pairwise travel lookups. Dispatches to the configured
/// provider, shares results through the in-memory cache, and degrades to
/// haversine estimates when the provider fails and strict mode is off.
pub struct TravelMatrixClient {
    http: Option<HttpMatrixClient>,
    cache: MatrixCache,
    fallback_speed_kmh: f64,
}

impl TravelMatrixClient {
    pub fn new(http: Option<HttpMatrixClient>) -> Self {
        Self {
            http,
            cache: MatrixCache::new(),
            fallback_speed_kmh: DEFAULT_FALLBACK_SPEED_KMH,
        }
    }

    /// Configured from `WAYPOINT_MATRIX_URL` / `WAYPOINT_MATRIX_API_KEY`.
    /// Without them every HTTP-backed lookup degrades to haversine.
    pub fn from_env() -> Self {
        let http = match std::env::var(MATRIX_URL_ENV_VAR) {
            Ok(base_url) => Some(HttpMatrixClient::new(HttpMatrixClientParams {
                base_url,
                api_key: std::env::var(MATRIX_API_KEY_ENV_VAR).unwrap_or_default(),
                ..HttpMatrixClientParams::default()
            })),
            Err(_) => {
                warn!(
                    "{} not set, matrix lookups will use straight-line estimates",
                    MATRIX_URL_ENV_VAR
                );
                None
            }
        };

        Self::new(http)
    }

    pub fn with_fallback_speed(mut self, speed_kmh: f64) -> Self {
        self.fallback_speed_kmh = speed_kmh;
        self
    }

    pub async fn fetch_matrix(
        &self,
        points: &[geo_types::Point],
        provider: &TravelMatrixProvider,
        strict: bool,
    ) -> Result<MatrixLookup, MatrixProviderError> {
        match provider {
            TravelMatrixProvider::Fixed { matrices } => Ok(MatrixLookup {
                matrices: matrices.clone(),
                degraded: false,
            }),
            TravelMatrixProvider::Haversine { speed_kmh } => Ok(MatrixLookup {
                // Requested estimate, not a fallback
                matrices: haversine_matrices(points, *speed_kmh),
                degraded: false,
            }),
            TravelMatrixProvider::Http { profile, traffic } => {
                let result = match &self.http {
                    Some(http) => {
                        self.cache
                            .get_or_fetch(points, provider, || {
                                http.fetch_matrix(points, *profile, *traffic)
                            })
                            .await
                    }
                    None => Err(MatrixProviderError::NotConfigured),
                };

                match result {
                    Ok(matrices) => Ok(MatrixLookup {
                        matrices,
                        degraded: false,
                    }),
                    Err(error) if !strict => {
                        warn!(%error, "matrix provider unavailable, falling back to haversine");
                        Ok(MatrixLookup {
                            matrices: haversine_matrices(points, self.fallback_speed_kmh),
                            degraded: true,
                        })
                    }
                    Err(error) => Err(error),
                }
            }
        }
    }

    pub async fn geocode(&self, address: &str) -> Result<geo_types::Point, MatrixProviderError> {
        match &self.http {
            Some(http) => http.geocode(address).await,
            None => Err(MatrixProviderError::Geocode(format!(
                "no provider configured to geocode '{address}'"
            ))),
        }
    }

    /// Road polyline for an ordered point sequence, as [lon, lat] pairs.
    /// Returns `None` when no provider is configured or the call fails;
    /// callers draw straight segments instead.
    pub async fn route_geometry(
        &self,
        points: &[geo_types::Point],
        profile: MatrixProfile,
    ) -> Option<Vec<[f64; 2]>> {
        let http = self.http.as_ref()?;

        match http.route_geometry(points, profile).await {
            Ok(polyline) => Some(polyline),
            Err(error) => {
                debug!(%error, "route geometry lookup failed");
                None
            }
        }
    }

    pub fn cache(&self) -> &MatrixCache {
        &self.cache
    }
}
