// src/error.rs
//! Application error types with structured error handling.
//!
//! Failures come in three layers. `AppError` stops a run. `GeocodeFailure`
//! is recorded on a single address's result while the batch carries on.
//! `LookupError` is what one provider attempt reports, before the retry
//! loop has decided whether to try again.

use crate::types::Address;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Provider status codes as a typed vocabulary.
///
/// The geocoding API reports its outcome in a `status` string next to the
/// HTTP status. Unknown codes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderStatus {
    /// At least one result was returned
    Ok,
    /// The address was valid but matched nothing
    ZeroResults,
    /// Request rate exceeded; back off and retry
    OverQueryLimit,
    /// Daily quota or billing limit reached
    OverDailyLimit,
    /// The key is invalid or not allowed to use the API
    RequestDenied,
    /// The query was missing or malformed
    InvalidRequest,
    /// Provider-side failure
    UnknownError,
    /// A status this client doesn't recognize yet
    Other(String),
}

impl ProviderStatus {
    /// Parse a provider status string into the typed vocabulary.
    pub fn from_api_response(status: &str) -> Self {
        match status {
            "OK" => Self::Ok,
            "ZERO_RESULTS" => Self::ZeroResults,
            "OVER_QUERY_LIMIT" => Self::OverQueryLimit,
            "OVER_DAILY_LIMIT" => Self::OverDailyLimit,
            "REQUEST_DENIED" => Self::RequestDenied,
            "INVALID_REQUEST" => Self::InvalidRequest,
            "UNKNOWN_ERROR" => Self::UnknownError,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether the same request should be sent again after a backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OverQueryLimit)
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::ZeroResults => write!(f, "ZERO_RESULTS"),
            Self::OverQueryLimit => write!(f, "OVER_QUERY_LIMIT"),
            Self::OverDailyLimit => write!(f, "OVER_DAILY_LIMIT"),
            Self::RequestDenied => write!(f, "REQUEST_DENIED"),
            Self::InvalidRequest => write!(f, "INVALID_REQUEST"),
            Self::UnknownError => write!(f, "UNKNOWN_ERROR"),
            Self::Other(status) => write!(f, "{}", status),
        }
    }
}

/// Main application error type. Any of these ends the run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read addresses from {}: {reason}", artifact.display())]
    SourceRead { artifact: PathBuf, reason: String },

    #[error("Column '{column}' not found (available: {})", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not deliver output to {destination}: {reason}")]
    DeliveryFailed { destination: String, reason: String },

    #[error(transparent)]
    Validation(#[from] crate::types::ValidationError),
}

impl From<std::string::FromUtf8Error> for AppError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }
}

/// Why a single address ended up without coordinates.
///
/// Recorded on the address's result; sibling addresses are unaffected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeFailure {
    #[error("transport error for '{address}': {message}")]
    Transport { address: Address, message: String },

    #[error("HTTP status {code} for '{address}'")]
    HttpStatus { address: Address, code: u16 },

    #[error("no match for '{address}'")]
    NoMatch { address: Address },

    #[error("rate limit still exceeded for '{address}' after {attempts} attempts")]
    RateLimitExhausted { address: Address, attempts: u32 },

    #[error("provider error for '{address}': {reason}")]
    Provider { address: Address, reason: String },
}

impl GeocodeFailure {
    pub fn address(&self) -> &Address {
        match self {
            Self::Transport { address, .. }
            | Self::HttpStatus { address, .. }
            | Self::NoMatch { address }
            | Self::RateLimitExhausted { address, .. }
            | Self::Provider { address, .. } => address,
        }
    }

    /// Short machine-friendly name of the failure class.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } => FailureKind::Transport,
            Self::HttpStatus { .. } => FailureKind::HttpStatus,
            Self::NoMatch { .. } => FailureKind::NoMatch,
            Self::RateLimitExhausted { .. } => FailureKind::RateLimitExhausted,
            Self::Provider { .. } => FailureKind::Provider,
        }
    }
}

/// Failure classes, used for grouping in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    Transport,
    HttpStatus,
    NoMatch,
    RateLimitExhausted,
    Provider,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport error",
            Self::HttpStatus => "HTTP status error",
            Self::NoMatch => "no match",
            Self::RateLimitExhausted => "rate limit exhausted",
            Self::Provider => "provider error",
        };
        f.write_str(name)
    }
}

/// Outcome of one provider attempt that did not yield a coordinate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("no match")]
    NoMatch,

    #[error("over query limit")]
    OverQueryLimit,

    #[error("provider rejected request ({0})")]
    Rejected(ProviderStatus),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl LookupError {
    /// Whether the retry loop should back off and send the request again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OverQueryLimit)
    }

    /// The provider status this error was derived from, when one was read.
    pub fn provider_status(&self) -> Option<ProviderStatus> {
        match self {
            Self::NoMatch => Some(ProviderStatus::ZeroResults),
            Self::OverQueryLimit => Some(ProviderStatus::OverQueryLimit),
            Self::Rejected(status) => Some(status.clone()),
            Self::Transport(_) | Self::HttpStatus(_) | Self::Malformed(_) => None,
        }
    }

    /// Attaches the address and turns the final attempt's error into the
    /// failure recorded on the result.
    pub fn into_failure(self, address: &Address, attempts: u32) -> GeocodeFailure {
        let address = address.clone();
        match self {
            Self::Transport(message) => GeocodeFailure::Transport { address, message },
            Self::HttpStatus(code) => GeocodeFailure::HttpStatus { address, code },
            Self::NoMatch => GeocodeFailure::NoMatch { address },
            Self::OverQueryLimit => GeocodeFailure::RateLimitExhausted { address, attempts },
            Self::Rejected(status) => GeocodeFailure::Provider {
                address,
                reason: status.to_string(),
            },
            Self::Malformed(reason) => GeocodeFailure::Provider { address, reason },
        }
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
