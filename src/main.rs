// src/main.rs

use clap::Parser;
use geobatch::{
    deliver, load_addresses, render_for_source, summarize_run, AddressIntake, AddressSource,
    AppError, BatchGeocoder, BatchRun, CancelToken, CommandLineInput, DeliveryTarget,
    DeliveryReport, Destination, GeocodingPipeline, GoogleGeocodingClient, PipelineConfig, Progress,
    ProgressReporter, ResultSink, LOG_FILE_NAME, PREVIEW_ADDRESS_COUNT,
};
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;
use std::io::Write;

/// Sets up logging configuration.
///
/// Console output goes to stderr so `--pipe` keeps stdout clean for CSV.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join(LOG_FILE_NAME);
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(console_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Executes the three-stage pipeline: load → geocode → deliver.
async fn execute_pipeline(config: &PipelineConfig) -> Result<(), AppError> {
    let pipeline = AddressesToCoordinates::new(config);

    let source = pipeline.load()?;
    if config.preview {
        pipeline.show_preview(&source);
        return Ok(());
    }

    let cancel = CancelToken::new();
    spawn_interrupt_handler(cancel.clone());

    let progress = ConsoleProgress { quiet: config.pipe };
    let run = pipeline.geocode(&source, &progress, &cancel).await?;
    progress.finish();

    let report = pipeline.deliver(&source, &run)?;
    pipeline.report_completion(&run, &report);

    Ok(())
}

/// Cancels the run on Ctrl-C; the partial batch is still written.
fn spawn_interrupt_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, finishing the current address and saving partial results...");
            cancel.cancel();
        }
    });
}

/// Renders `Processing i of n: <address>` on stderr.
struct ConsoleProgress {
    quiet: bool,
}

impl ConsoleProgress {
    fn finish(&self) {
        if !self.quiet {
            eprintln!();
        }
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, progress: &Progress<'_>) {
        if self.quiet {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(
            stderr,
            "\r\x1b[2KProcessing {} of {} ({:.0}%): {}",
            progress.processed,
            progress.total,
            progress.fraction() * 100.0,
            progress.current
        );
        let _ = stderr.flush();
    }
}

/// Orchestrates the loading, geocoding, and delivery of an address batch.
struct AddressesToCoordinates<'a> {
    config: &'a PipelineConfig,
}

impl<'a> AddressesToCoordinates<'a> {
    fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Prints the address count and the first few addresses.
    fn show_preview(&self, source: &AddressSource) {
        println!(
            "Loaded {} addresses from {}.",
            source.len(),
            source.artifact.display()
        );
        for address in source.addresses.iter().take(PREVIEW_ADDRESS_COUNT) {
            println!("  {}", address);
        }
        if source.len() > PREVIEW_ADDRESS_COUNT {
            println!("  ... and {} more", source.len() - PREVIEW_ADDRESS_COUNT);
        }
    }

    /// Reports completion to the user with stats and delivery confirmations.
    fn report_completion(&self, run: &BatchRun, report: &DeliveryReport) {
        for failure in run.batch.iter().filter_map(|r| r.failure()) {
            log::warn!("{}", failure);
        }

        if self.config.pipe {
            return;
        }

        let summary = summarize_run(run);
        if run.is_complete() {
            eprintln!("Geocoding complete: {}.", summary.describe());
        } else {
            eprintln!(
                "Geocoding cancelled after {} of {} addresses: {}.",
                summary.processed,
                summary.requested,
                summary.describe()
            );
        }

        if let Destination::File(path) = &report.destination {
            eprintln!(
                "Results saved to {} ({} bytes)",
                path.display(),
                report.bytes_written
            );
        }
    }
}

impl AddressIntake for AddressesToCoordinates<'_> {
    fn load(&self) -> Result<AddressSource, AppError> {
        load_addresses(&self.config.input, self.config.format, &self.config.column)
    }
}

#[async_trait::async_trait]
impl BatchGeocoder for AddressesToCoordinates<'_> {
    async fn geocode(
        &self,
        source: &AddressSource,
        progress: &dyn ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<BatchRun, AppError> {
        let client =
            GoogleGeocodingClient::new(self.config.endpoint.clone(), self.config.request_timeout)?;
        let pipeline = GeocodingPipeline::new(client, self.config.geocoder.clone());
        pipeline.run(&source.addresses, progress, cancel).await
    }
}

impl ResultSink for AddressesToCoordinates<'_> {
    fn deliver(&self, source: &AddressSource, run: &BatchRun) -> Result<DeliveryReport, AppError> {
        let content = render_for_source(source, &run.batch)?;
        deliver(DeliveryTarget::for_output(
            self.config.output.as_deref(),
            content,
        ))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    match dotenvy::dotenv() {
        Ok(path) => log::info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No .env file found"),
        Err(e) => log::warn!("Could not read .env file: {}", e),
    }

    let config = PipelineConfig::resolve(cli)?;

    execute_pipeline(&config).await?;

    Ok(())
}
