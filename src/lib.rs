// src/lib.rs
//! geobatch batch-geocodes address lists into coordinate tables.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `GeocodeFailure`, `LookupError`, `ProviderStatus`
//! - **Configuration**: `PipelineConfig`, `CommandLineInput`, `GeocoderSettings`
//! - **Domain types**: `Address`, `Coordinate`, `ApiKey`, `ValidatedUrl`
//! - **Address sources**: `load_addresses`, `read_address_lines`, `parse_address_table`
//! - **Geocoding**: `GeocodingPipeline`, `Batch`, `GeocodeResult`, `CancelToken`
//! - **Provider**: `GeocodingProvider`, `GoogleGeocodingClient`
//! - **Output**: `render_batch`, `render_table`, `deliver`

mod analytics;
mod config;
mod constants;
mod error;
mod error_recovery;
mod geocoding;
mod output;
mod pipeline;
mod provider;
mod source;
mod types;

// --- Error Handling ---
pub use crate::error::{AppError, FailureKind, GeocodeFailure, LookupError, ProviderStatus};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, FormatArg, PipelineConfig};
pub use crate::constants::{
    API_KEY_ENV_VAR, DEFAULT_GEOCODING_ENDPOINT, LOG_FILE_NAME, PREVIEW_ADDRESS_COUNT,
};
pub use crate::geocoding::GeocoderSettings;

// --- Domain Types ---
pub use crate::types::{Address, ApiKey, Coordinate, ValidatedUrl};

// --- Address Sources ---
pub use crate::source::{
    load_addresses, parse_address_table, read_address_lines, AddressSource, AddressTable,
    ColumnSelector, InputFormat,
};

// --- Geocoding ---
pub use crate::error_recovery::{retry_with_backoff, BackoffPolicy, RetryOutcome};
pub use crate::geocoding::{
    Batch, BatchRun, CancelToken, Cancelled, GeocodeResult, GeocodingPipeline, NoProgress,
    Progress, ProgressReporter, RateLimiter, RunCompletion,
};

// --- Provider ---
pub use crate::provider::{
    client::{extract_response_text, ApiResponse},
    interpret_response, GeocodingProvider, GoogleGeocodingClient,
};

// --- Output ---
pub use crate::output::{
    default_output_path, deliver, render_batch, render_for_source, render_table, DeliveryReport,
    DeliveryTarget, Destination,
};

// --- Analytics ---
pub use crate::analytics::{summarize_batch, summarize_run, BatchSummary};

// --- Pipeline Traits ---
pub use crate::pipeline::{AddressIntake, BatchGeocoder, ResultSink};
