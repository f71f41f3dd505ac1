// src/provider/responses.rs
//! Wire types for the geocoding JSON response.
//!
//! Only the fields the pipeline reads are modelled; everything else in
//! the payload is ignored. Every level is optional so a response with a
//! missing field still parses and is reported as malformed by the parser.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeCandidate>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeCandidate {
    pub geometry: Option<Geometry>,
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatLng {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}
