pub mod cache;
pub mod client;
pub mod haversine;
pub mod http_api;
pub mod provider;
pub mod travel_matrices;
