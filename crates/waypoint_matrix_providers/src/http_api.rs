use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{provider::MatrixProfile, travel_matrices::TravelMatrices};

pub type ApiPoint = [f64; 2];

#[derive(Debug, Error)]
pub enum MatrixProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Provider gave up after {0} attempts")]
    RetriesExhausted(u32),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Geocoding failed: {0}")]
    Geocode(String),

    #[error("No matrix provider configured")]
    NotConfigured,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatrixRequestBody {
    /// Points as [lon, lat] pairs for an all-to-all matrix
    pub points: Vec<ApiPoint>,

    /// Routing profile (e.g. "car", "truck")
    pub profile: String,

    /// Request a traffic-aware matrix
    pub traffic: bool,
}

#[derive(Deserialize)]
struct MatrixResponseBody {
    /// Distances in meters
    distances: Vec<Vec<f64>>,

    /// Travel times in seconds
    durations: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct GeocodeResponseBody {
    lon: f64,
    lat: f64,
}

#[derive(Serialize)]
struct GeometryRequestBody {
    points: Vec<ApiPoint>,
    profile: String,
}

#[derive(Deserialize)]
struct GeometryResponseBody {
    polyline: Vec<ApiPoint>,
}

pub struct HttpMatrixClientParams {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for HttpMatrixClientParams {
    fn default() -> Self {
        HttpMatrixClientParams {
            base_url: String::from("https://matrix.waypoint.example/api/1"),
            api_key: String::new(),
            request_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

pub struct HttpMatrixClient {
    params: HttpMatrixClientParams,
    client: reqwest::Client,
}

impl HttpMatrixClient {
    pub fn new(params: HttpMatrixClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    pub async fn fetch_matrix(
        &self,
        points: &[geo_types::Point],
        profile: MatrixProfile,
        traffic: bool,
    ) -> Result<TravelMatrices, MatrixProviderError> {
        let body = MatrixRequestBody {
            points: points.iter().map(|p| [p.x(), p.y()]).collect(),
            profile: profile.to_string(),
            traffic,
        };

        let response: MatrixResponseBody = self
            .request_with_retries("matrix", || {
                self.client
                    .post(format!("{}/matrix", self.params.base_url))
                    .query(&[("key", &self.params.api_key)])
                    .json(&body)
                    .timeout(self.params.request_timeout)
            })
            .await?;

        let num_points = points.len();
        let distances: Vec<f64> = response.distances.into_iter().flatten().collect();
        let durations: Vec<f64> = response.durations.into_iter().flatten().collect();

        if distances.len() != num_points * num_points || durations.len() != num_points * num_points
        {
            return Err(MatrixProviderError::Api {
                status: 200,
                message: String::from("matrix dimensions do not match request"),
            });
        }

        Ok(TravelMatrices::new(num_points, distances, durations))
    }

    pub async fn geocode(&self, address: &str) -> Result<geo_types::Point, MatrixProviderError> {
        let response: GeocodeResponseBody = self
            .request_with_retries("geocode", || {
                self.client
                    .get(format!("{}/geocode", self.params.base_url))
                    .query(&[("key", &self.params.api_key), ("q", &address.to_owned())])
                    .timeout(self.params.request_timeout)
            })
            .await?;

        Ok(geo_types::Point::new(response.lon, response.lat))
    }

    /// Road polyline through an ordered point sequence.
    pub async fn route_geometry(
        &self,
        points: &[geo_types::Point],
        profile: MatrixProfile,
    ) -> Result<Vec<ApiPoint>, MatrixProviderError> {
        let body = GeometryRequestBody {
            points: points.iter().map(|p| [p.x(), p.y()]).collect(),
            profile: profile.to_string(),
        };

        let response: GeometryResponseBody = self
            .request_with_retries("geometry", || {
                self.client
                    .post(format!("{}/route/geometry", self.params.base_url))
                    .query(&[("key", &self.params.api_key)])
                    .json(&body)
                    .timeout(self.params.request_timeout)
            })
            .await?;

        Ok(response.polyline)
    }

    async fn request_with_retries<T, F>(
        &self,
        operation: &str,
        make_request: F,
    ) -> Result<T, MatrixProviderError>
    where
        T: serde::de::DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut backoff = self.params.retry_backoff;

        for attempt in 1..=self.params.max_retries {
            match self.send(make_request()).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.params.max_retries => {
                    warn!(
                        operation,
                        attempt,
                        max = self.params.max_retries,
                        %error,
                        "matrix provider request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(error) => {
                    debug!(operation, %error, "matrix provider request failed, giving up");
                    return Err(error);
                }
            }
        }

        Err(MatrixProviderError::RetriesExhausted(
            self.params.max_retries,
        ))
    }

    async fn send<T>(&self, request: reqwest::RequestBuilder) -> Result<T, MatrixProviderError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = request.send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(MatrixProviderError::Api { status, message })
        }
    }
}
