// src/config.rs
use crate::constants::*;
use crate::error::AppError;
use crate::error_recovery::BackoffPolicy;
use crate::geocoding::GeocoderSettings;
use crate::source::{ColumnSelector, InputFormat};
use crate::types::{ApiKey, ValidatedUrl, ValidationError};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Input layout requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Decide from the file extension (.csv/.tsv are tables)
    Auto,
    /// One address per line
    Text,
    /// Delimited table with a header row
    Table,
}

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Input file: a text file with one address per line, or a CSV/TSV table
    pub input: PathBuf,

    /// Output CSV file (defaults to <input stem>_with_coords.csv beside the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pipe mode - print the CSV to stdout instead of writing a file
    #[arg(short = 'p', long, default_value_t = false)]
    pub pipe: bool,

    /// Input layout
    #[arg(short, long, value_enum, default_value_t = FormatArg::Auto)]
    pub format: FormatArg,

    /// Header of the column holding addresses (tables only; defaults to the first column)
    #[arg(short, long, conflicts_with = "column_index")]
    pub column: Option<String>,

    /// Zero-based position of the column holding addresses (tables only)
    #[arg(long)]
    pub column_index: Option<usize>,

    /// Field delimiter for tables (defaults to ',' or tab for .tsv)
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Geocoding endpoint URL
    #[arg(long, default_value = DEFAULT_GEOCODING_ENDPOINT)]
    pub endpoint: String,

    /// Attempts per address while the provider reports OVER_QUERY_LIMIT
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// First backoff delay in milliseconds; doubles on each retry
    #[arg(long, default_value_t = DEFAULT_INITIAL_BACKOFF_MS)]
    pub backoff_ms: u64,

    /// Largest backoff delay in milliseconds
    #[arg(long, default_value_t = DEFAULT_MAX_BACKOFF_MS)]
    pub max_backoff_ms: u64,

    /// Maximum random delay added to each backoff, in milliseconds
    #[arg(long, default_value_t = DEFAULT_JITTER_MS)]
    pub jitter_ms: u64,

    /// Sustained request rate allowed by the provider quota
    #[arg(long, default_value_t = DEFAULT_REQUESTS_PER_SECOND)]
    pub requests_per_second: f64,

    /// Requests allowed back-to-back before pacing applies
    #[arg(long, default_value_t = DEFAULT_BURST)]
    pub burst: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Show how many addresses were found and the first few, then exit
    #[arg(long, default_value_t = false)]
    pub preview: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Resolved pipeline configuration, validated before any stage runs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub format: InputFormat,
    pub column: ColumnSelector,
    /// `None` in pipe mode.
    pub output: Option<PathBuf>,
    pub pipe: bool,
    pub endpoint: ValidatedUrl,
    pub request_timeout: Duration,
    pub geocoder: GeocoderSettings,
    pub preview: bool,
    pub verbose: bool,
}

impl PipelineConfig {
    /// Resolves a complete pipeline configuration from CLI input and environment.
    ///
    /// A missing API key is not an error here; the pipeline refuses to
    /// start without one, so `--preview` works without credentials.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let api_key = match std::env::var(API_KEY_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => Some(ApiKey::new(value)?),
            _ => None,
        };
        Self::from_parts(cli, api_key)
    }

    /// Builds the configuration from parsed arguments and an explicit key.
    pub fn from_parts(cli: CommandLineInput, api_key: Option<ApiKey>) -> Result<Self, AppError> {
        let format = resolve_format(&cli)?;
        let backoff = resolve_backoff(&cli)?;
        let column = match (cli.column, cli.column_index) {
            (Some(name), _) => ColumnSelector::Named(name),
            (None, Some(index)) => ColumnSelector::Position(index),
            (None, None) => ColumnSelector::First,
        };

        let endpoint = ValidatedUrl::parse(&cli.endpoint)?;
        let geocoder = GeocoderSettings {
            api_key,
            backoff,
            requests_per_second: validate_rate(cli.requests_per_second)?,
            burst: check_bounds("burst", u64::from(cli.burst), 1, 1_000)? as u32,
        };
        let timeout_secs = check_bounds("timeout-secs", cli.timeout_secs, 1, 600)?;

        let output = if cli.pipe {
            None
        } else {
            Some(
                cli.output
                    .unwrap_or_else(|| crate::output::default_output_path(&cli.input)),
            )
        };

        if output
            .as_deref()
            .is_some_and(|path| same_file(path, &cli.input))
        {
            return Err(AppError::InvalidConfiguration(format!(
                "output path {} would overwrite the input",
                cli.input.display()
            )));
        }

        Ok(PipelineConfig {
            input: cli.input,
            format,
            column,
            output,
            pipe: cli.pipe,
            endpoint,
            request_timeout: Duration::from_secs(timeout_secs),
            geocoder,
            preview: cli.preview,
            verbose: cli.verbose,
        })
    }
}

fn resolve_format(cli: &CommandLineInput) -> Result<InputFormat, AppError> {
    let detected = InputFormat::detect(&cli.input);
    let format = match cli.format {
        FormatArg::Auto => detected,
        FormatArg::Text => InputFormat::Text,
        FormatArg::Table => match detected {
            InputFormat::Table { .. } => detected,
            InputFormat::Text => InputFormat::Table { delimiter: b',' },
        },
    };

    match (format, cli.delimiter) {
        (InputFormat::Table { .. }, Some(delimiter)) => {
            if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' {
                return Err(ValidationError::InvalidValue {
                    field: "delimiter",
                    value: delimiter.escape_default().to_string(),
                    reason: "must be a single ASCII character other than quote or newline"
                        .to_string(),
                }
                .into());
            }
            Ok(InputFormat::Table {
                delimiter: delimiter as u8,
            })
        }
        (InputFormat::Text, Some(_)) => Err(AppError::InvalidConfiguration(
            "--delimiter only applies to table input".to_string(),
        )),
        (format, None) => Ok(format),
    }
}

fn resolve_backoff(cli: &CommandLineInput) -> Result<BackoffPolicy, AppError> {
    let max_attempts =
        check_bounds("max-attempts", u64::from(cli.max_attempts), 1, u64::from(MAX_ATTEMPTS_LIMIT))?
            as u32;
    if cli.max_backoff_ms < cli.backoff_ms {
        return Err(AppError::InvalidConfiguration(format!(
            "--max-backoff-ms ({}) is smaller than --backoff-ms ({})",
            cli.max_backoff_ms, cli.backoff_ms
        )));
    }

    Ok(BackoffPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(cli.backoff_ms),
        max_delay: Duration::from_millis(cli.max_backoff_ms),
        jitter: Duration::from_millis(cli.jitter_ms),
    })
}

/// Whether `output` names the same file as `input`, comparing resolved
/// paths when the files (or the output's directory) exist.
fn same_file(output: &Path, input: &Path) -> bool {
    if output == input {
        return true;
    }
    match (std::fs::canonicalize(input), resolve_target(output)) {
        (Ok(input), Some(output)) => input == output,
        _ => false,
    }
}

/// Canonical form of a path that may not exist yet.
fn resolve_target(path: &Path) -> Option<PathBuf> {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return Some(resolved);
    }
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path.file_name()?;
    std::fs::canonicalize(parent).ok().map(|dir| dir.join(name))
}

fn validate_rate(rate: f64) -> Result<f64, ValidationError> {
    let accepted = MIN_REQUESTS_PER_SECOND..=MAX_REQUESTS_PER_SECOND as f64;
    if rate.is_finite() && accepted.contains(&rate) {
        Ok(rate)
    } else {
        Err(ValidationError::InvalidValue {
            field: "requests-per-second",
            value: rate.to_string(),
            reason: format!(
                "must be between {} and {}",
                MIN_REQUESTS_PER_SECOND, MAX_REQUESTS_PER_SECOND
            ),
        })
    }
}

fn check_bounds(field: &'static str, value: u64, min: u64, max: u64) -> Result<u64, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfBounds {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CommandLineInput {
        CommandLineInput::try_parse_from(std::iter::once("geobatch").chain(args.iter().copied()))
            .unwrap()
    }

    fn key() -> Option<ApiKey> {
        Some(ApiKey::new("AIzaTestKey").unwrap())
    }

    #[test]
    fn defaults_follow_the_input_file() {
        let config = PipelineConfig::from_parts(parse(&["data/addresses.txt"]), key()).unwrap();
        assert_eq!(config.format, InputFormat::Text);
        assert_eq!(config.column, ColumnSelector::First);
        assert_eq!(
            config.output,
            Some(PathBuf::from("data/addresses_with_coords.csv"))
        );
        assert_eq!(config.geocoder.backoff, BackoffPolicy::default());
        assert_eq!(config.geocoder.requests_per_second, DEFAULT_REQUESTS_PER_SECOND);
        assert_eq!(config.endpoint.as_str(), DEFAULT_GEOCODING_ENDPOINT);
    }

    #[test]
    fn csv_input_selects_named_column() {
        let config = PipelineConfig::from_parts(
            parse(&["shops.csv", "--column", "street", "-o", "out.csv"]),
            key(),
        )
        .unwrap();
        assert_eq!(config.format, InputFormat::Table { delimiter: b',' });
        assert_eq!(config.column, ColumnSelector::Named("street".into()));
        assert_eq!(config.output, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn forced_table_format_with_custom_delimiter() {
        let config = PipelineConfig::from_parts(
            parse(&["list.txt", "--format", "table", "--delimiter", ";", "--column-index", "2"]),
            key(),
        )
        .unwrap();
        assert_eq!(config.format, InputFormat::Table { delimiter: b';' });
        assert_eq!(config.column, ColumnSelector::Position(2));
    }

    #[test]
    fn column_and_column_index_conflict() {
        let result = CommandLineInput::try_parse_from([
            "geobatch",
            "in.csv",
            "--column",
            "a",
            "--column-index",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn pipe_mode_has_no_output_file() {
        let config = PipelineConfig::from_parts(parse(&["in.txt", "--pipe"]), key()).unwrap();
        assert!(config.pipe);
        assert_eq!(config.output, None);
    }

    #[test]
    fn missing_key_is_left_for_the_pipeline() {
        let config = PipelineConfig::from_parts(parse(&["in.txt"]), None).unwrap();
        assert!(config.geocoder.api_key.is_none());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(PipelineConfig::from_parts(parse(&["in.txt", "--max-attempts", "0"]), key()).is_err());
        assert!(
            PipelineConfig::from_parts(parse(&["in.txt", "--requests-per-second", "0"]), key())
                .is_err()
        );
        assert!(PipelineConfig::from_parts(
            parse(&["in.txt", "--backoff-ms", "5000", "--max-backoff-ms", "10"]),
            key()
        )
        .is_err());
        assert!(PipelineConfig::from_parts(parse(&["in.txt", "--endpoint", "ftp://x"]), key()).is_err());
        assert!(PipelineConfig::from_parts(parse(&["in.txt", "--delimiter", ";"]), key()).is_err());
        assert!(PipelineConfig::from_parts(parse(&["in.csv", "-o", "in.csv"]), key()).is_err());
    }

    #[test]
    fn vanishing_request_rate_is_rejected() {
        let err = PipelineConfig::from_parts(
            parse(&["in.txt", "--requests-per-second", "1e-30"]),
            key(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidValue {
                field: "requests-per-second",
                ..
            })
        ));

        let slowest = PipelineConfig::from_parts(
            parse(&["in.txt", "--requests-per-second", "0.001"]),
            key(),
        )
        .unwrap();
        assert_eq!(slowest.geocoder.requests_per_second, MIN_REQUESTS_PER_SECOND);
    }

    #[test]
    fn output_spelled_differently_still_cannot_overwrite_the_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "A\n").unwrap();
        let dotted = dir.path().join(".").join("in.txt");
        let roundabout = dir.path().join("sub").join("..").join("in.txt");
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        for output in [&dotted, &roundabout] {
            let cli = parse(&[
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
            ]);
            assert!(
                matches!(
                    PipelineConfig::from_parts(cli, key()),
                    Err(AppError::InvalidConfiguration(_))
                ),
                "{} was accepted",
                output.display()
            );
        }

        let elsewhere = dir.path().join("out.csv");
        let cli = parse(&[input.to_str().unwrap(), "-o", elsewhere.to_str().unwrap()]);
        assert!(PipelineConfig::from_parts(cli, key()).is_ok());
    }
}
