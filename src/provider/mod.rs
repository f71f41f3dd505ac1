// src/provider/mod.rs
//! Geocoding provider interaction: resolving one address at a time.
//!
//! The pipeline depends on the `GeocodingProvider` trait, never on HTTP
//! details. `GoogleGeocodingClient` is the production implementation.

pub mod client;
pub mod parser;
mod responses;

use crate::error::LookupError;
use crate::types::{Address, ApiKey, Coordinate};

/// The ability to resolve an address to a coordinate.
///
/// One call is one attempt; retries and pacing belong to the caller.
#[async_trait::async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn lookup(&self, address: &Address, key: &ApiKey) -> Result<Coordinate, LookupError>;
}

#[async_trait::async_trait]
impl<P: GeocodingProvider + ?Sized> GeocodingProvider for std::sync::Arc<P> {
    async fn lookup(&self, address: &Address, key: &ApiKey) -> Result<Coordinate, LookupError> {
        (**self).lookup(address, key).await
    }
}

pub use client::GoogleGeocodingClient;
pub use parser::interpret_response;
