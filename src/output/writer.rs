// src/output/writer.rs
//! Writes rendered output to its destination.
//!
//! This module is the only place where output files are written.

use super::types::{DeliveryReport, DeliveryTarget};
use crate::error::AppError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Delivers rendered CSV to its target.
///
/// Any I/O failure becomes `DeliveryFailed` naming the destination.
pub fn deliver(target: DeliveryTarget) -> Result<DeliveryReport, AppError> {
    let destination = target.destination();
    let content = target.content();

    let written = match &target {
        DeliveryTarget::WriteFile { path, .. } => write_file(path, content),
        DeliveryTarget::PrintToStdout { .. } => print_to_stdout(content),
    };

    match written {
        Ok(()) => {
            log::info!("Delivered {} bytes to {}", content.len(), destination);
            Ok(DeliveryReport {
                destination,
                bytes_written: content.len(),
            })
        }
        Err(e) => {
            log::error!("Delivery to {} failed: {}", destination, e);
            Err(AppError::DeliveryFailed {
                destination: destination.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

/// Writes content to a file, creating parent directories as needed.
fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    log::debug!("Writing {} bytes to {}", content.len(), path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content)
}

fn print_to_stdout(content: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()
}
