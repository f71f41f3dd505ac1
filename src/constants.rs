// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains. Reading
//! them tells you how the tool talks to the provider: how fast, how
//! patiently, and where the results go.

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// The Google Maps Geocoding JSON endpoint.
pub const DEFAULT_GEOCODING_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV_VAR: &str = "GOOGLE_MAPS_API_KEY";

/// How long a single request may take before it counts as a transport error.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

/// Sustained request rate. Ten per second reproduces a 100 ms gap between
/// requests and stays well under the provider's 50 QPS ceiling.
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 10.0;

/// Requests allowed back-to-back before pacing kicks in.
pub const DEFAULT_BURST: u32 = 1;

/// Lower bound accepted for the configured request rate (one request
/// every 1000 seconds).
pub const MIN_REQUESTS_PER_SECOND: f64 = 0.001;

/// Upper bound accepted for the configured request rate.
pub const MAX_REQUESTS_PER_SECOND: u64 = 1_000;

// ---------------------------------------------------------------------------
// Rate-limit retries
// ---------------------------------------------------------------------------

/// Total attempts per address (first try included) while throttled.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Maximum accepted attempt count.
pub const MAX_ATTEMPTS_LIMIT: u32 = 20;

/// First backoff after an `OVER_QUERY_LIMIT` reply.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 2_000;

/// Backoff never grows past this.
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 32_000;

/// Random extra delay added to each backoff, up to this many milliseconds.
pub const DEFAULT_JITTER_MS: u64 = 250;

// ---------------------------------------------------------------------------
// Input and output
// ---------------------------------------------------------------------------

/// Suffix appended to the input file stem to name the output file.
pub const OUTPUT_FILE_SUFFIX: &str = "_with_coords";

/// Output file name used when no input stem is available.
pub const FALLBACK_OUTPUT_FILE: &str = "addresses_with_coords.csv";

/// Header of the address column in text-mode output.
pub const ADDRESS_HEADER: &str = "Address";

/// Header of the appended latitude column.
pub const LATITUDE_HEADER: &str = "Latitude";

/// Header of the appended longitude column.
pub const LONGITUDE_HEADER: &str = "Longitude";

/// Number of addresses shown by `--preview`.
pub const PREVIEW_ADDRESS_COUNT: usize = 5;

/// Name of the log file written to the system temp directory.
pub const LOG_FILE_NAME: &str = "geobatch.log";

/// Maximum characters shown when previewing unparseable response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
