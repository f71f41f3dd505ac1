// src/source/mod.rs
//! Address ingestion from text files and delimited tables.
//!
//! Reading is the only side effect here. Parsing functions take readers so
//! they can be exercised on in-memory input.

mod table;
mod text;

pub use table::{parse_address_table, AddressTable, ColumnSelector};
pub use text::read_address_lines;

use crate::error::AppError;
use crate::types::Address;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Layout of an input artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One address per line.
    Text,
    /// Delimited table with a header row.
    Table { delimiter: u8 },
}

impl InputFormat {
    /// Picks a format from the file extension: `.csv` and `.tsv` are
    /// tables, anything else is text.
    pub fn detect(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Self::Table { delimiter: b',' },
            Some("tsv") => Self::Table { delimiter: b'\t' },
            _ => Self::Text,
        }
    }
}

/// Addresses read from one input artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressSource {
    pub artifact: PathBuf,
    pub addresses: Vec<Address>,
    /// The full table, kept for tabular input so output can preserve it.
    pub table: Option<AddressTable>,
}

impl AddressSource {
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Reads the addresses from `path` in the given format.
pub fn load_addresses(
    path: &Path,
    format: InputFormat,
    column: &ColumnSelector,
) -> Result<AddressSource, AppError> {
    log::info!("Reading addresses from {}", path.display());

    let file = File::open(path).map_err(|e| AppError::SourceRead {
        artifact: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let reader = BufReader::new(file);

    let source = match format {
        InputFormat::Text => AddressSource {
            artifact: path.to_path_buf(),
            addresses: read_address_lines(reader, path)?,
            table: None,
        },
        InputFormat::Table { delimiter } => {
            let (table, addresses) = parse_address_table(reader, path, delimiter, column)?;
            log::info!(
                "Using column '{}' ({} of {} rows hold an address)",
                table.address_header(),
                addresses.len(),
                table.rows.len()
            );
            AddressSource {
                artifact: path.to_path_buf(),
                addresses,
                table: Some(table),
            }
        }
    };

    log::info!("Loaded {} addresses", source.len());
    Ok(source)
}
