// src/provider/client.rs
//! Thin HTTP client for the geocoding endpoint.
//!
//! Wraps reqwest: builds the `address` + `key` query, sends one GET, and
//! hands the raw response to the parser. No retries, no pacing.

use super::parser::interpret_response;
use super::GeocodingProvider;
use crate::error::{AppError, LookupError};
use crate::types::{Address, ApiKey, Coordinate, ValidatedUrl};
use reqwest::{Client, Response};
use std::time::Duration;

/// HTTP client for a Google-compatible geocoding endpoint.
#[derive(Clone)]
pub struct GoogleGeocodingClient {
    client: Client,
    endpoint: ValidatedUrl,
}

impl GoogleGeocodingClient {
    /// Creates a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: ValidatedUrl, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Sends the lookup request for one address.
    ///
    /// The key goes into the query string; the logged URL leaves it out.
    pub async fn get(&self, address: &Address, key: &ApiKey) -> Result<Response, reqwest::Error> {
        log::debug!("GET {}?address={}", self.endpoint, address);

        let response = self
            .client
            .get(self.endpoint.as_url().clone())
            .query(&[("address", address.as_str()), ("key", key.as_str())])
            .send()
            .await?;

        log::debug!("Response for '{}': {}", address, response.status());
        Ok(response)
    }
}

#[async_trait::async_trait]
impl GeocodingProvider for GoogleGeocodingClient {
    async fn lookup(&self, address: &Address, key: &ApiKey) -> Result<Coordinate, LookupError> {
        let response = self
            .get(address, key)
            .await
            .map_err(|e| LookupError::Transport(describe_transport_error(e)))?;
        let result = extract_response_text(response, &self.endpoint)
            .await
            .map_err(|e| LookupError::Transport(describe_transport_error(e)))?;
        interpret_response(&result)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    /// Endpoint the response came from, without the query string.
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(
    response: Response,
    endpoint: &ValidatedUrl,
) -> Result<ApiResponse<String>, reqwest::Error> {
    let status = response.status();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url: endpoint.to_string(),
    })
}

/// Describes a reqwest error without echoing the request URL, which
/// carries the API key.
fn describe_transport_error(error: reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_body() || error.is_decode() {
        "failed to read response body"
    } else if error.is_request() {
        "request failed"
    } else {
        "transport failure"
    };

    let detail = error.without_url().to_string();
    format!("{}: {}", kind, detail)
}
