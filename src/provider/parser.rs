// src/provider/parser.rs
//! Classifies raw provider responses into coordinates or lookup errors.
//!
//! Pure functions over the response text, so every branch is testable
//! without a network.

use super::client::ApiResponse;
use super::responses::GeocodeResponse;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{LookupError, ProviderStatus};
use crate::types::Coordinate;

/// Interprets one provider response.
pub fn interpret_response(response: &ApiResponse<String>) -> Result<Coordinate, LookupError> {
    if !response.status.is_success() {
        log::debug!(
            "HTTP {} from {}: {}",
            response.status,
            response.url,
            preview(&response.data)
        );
        return Err(LookupError::HttpStatus(response.status.as_u16()));
    }

    interpret_body(&response.data)
}

/// Interprets a successful response body.
pub fn interpret_body(body: &str) -> Result<Coordinate, LookupError> {
    let parsed: GeocodeResponse = serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse provider response: {} ({})", e, preview(body));
        LookupError::Malformed(format!("invalid JSON: {}", e))
    })?;

    let status = parsed
        .status
        .as_deref()
        .map(ProviderStatus::from_api_response)
        .ok_or_else(|| LookupError::Malformed("missing 'status' field".to_string()))?;

    match status {
        ProviderStatus::Ok => first_location(&parsed),
        ProviderStatus::ZeroResults => Err(LookupError::NoMatch),
        ProviderStatus::OverQueryLimit => Err(LookupError::OverQueryLimit),
        other => {
            if let Some(message) = &parsed.error_message {
                log::warn!("Provider returned {}: {}", other, message);
            }
            Err(LookupError::Rejected(other))
        }
    }
}

/// Reads `results[0].geometry.location.{lat,lng}`.
fn first_location(parsed: &GeocodeResponse) -> Result<Coordinate, LookupError> {
    let candidate = parsed
        .results
        .first()
        .ok_or_else(|| LookupError::Malformed("status OK but 'results' is empty".to_string()))?;

    let location = candidate
        .geometry
        .as_ref()
        .and_then(|g| g.location.as_ref())
        .ok_or_else(|| {
            LookupError::Malformed("missing 'results[0].geometry.location'".to_string())
        })?;

    match (location.lat, location.lng) {
        (Some(lat), Some(lng)) => {
            let coordinate = Coordinate::new(lat, lng);
            if !coordinate.is_plausible() {
                return Err(LookupError::Malformed(format!(
                    "location out of range: {}",
                    coordinate
                )));
            }
            if let Some(formatted) = &candidate.formatted_address {
                log::debug!("Matched '{}' at {}", formatted, coordinate);
            }
            Ok(coordinate)
        }
        _ => Err(LookupError::Malformed(
            "missing 'lat' or 'lng' in location".to_string(),
        )),
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let head: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}
