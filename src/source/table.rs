// src/source/table.rs
//! Delimited tables with a header row and one address column.

use crate::error::AppError;
use crate::types::Address;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Which column of a table holds the addresses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSelector {
    #[default]
    First,
    /// Header name. Exact match wins; otherwise a trimmed,
    /// case-insensitive match is accepted.
    Named(String),
    /// Zero-based column position.
    Position(usize),
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "#0"),
            Self::Named(name) => write!(f, "{}", name),
            Self::Position(index) => write!(f, "#{}", index),
        }
    }
}

impl ColumnSelector {
    fn resolve(&self, headers: &[String]) -> Result<usize, AppError> {
        let found = match self {
            Self::First => (!headers.is_empty()).then_some(0),
            Self::Position(index) => (*index < headers.len()).then_some(*index),
            Self::Named(name) => headers.iter().position(|h| h == name).or_else(|| {
                let wanted = name.trim().to_lowercase();
                headers
                    .iter()
                    .position(|h| h.trim().to_lowercase() == wanted)
            }),
        };

        found.ok_or_else(|| AppError::ColumnNotFound {
            column: self.to_string(),
            available: headers.to_vec(),
        })
    }
}

/// A parsed table, kept whole so output can reproduce every row.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub address_column: usize,
    /// Row index of each extracted address, in address order.
    pub address_rows: Vec<usize>,
}

impl AddressTable {
    pub fn address_header(&self) -> &str {
        &self.headers[self.address_column]
    }
}

/// Parses a table and extracts the non-empty cells of the selected column.
///
/// Ragged rows or invalid UTF-8 fail with `SourceRead`; an unknown column
/// fails with `ColumnNotFound`.
pub fn parse_address_table<R: Read>(
    reader: R,
    artifact: &Path,
    delimiter: u8,
    column: &ColumnSelector,
) -> Result<(AddressTable, Vec<Address>), AppError> {
    let source_error = |e: csv::Error| AppError::SourceRead {
        artifact: artifact.to_path_buf(),
        reason: e.to_string(),
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(source_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let address_column = column.resolve(&headers)?;

    let mut rows = Vec::new();
    let mut addresses = Vec::new();
    let mut address_rows = Vec::new();

    for record in csv_reader.records() {
        let record = record.map_err(source_error)?;
        let row: Vec<String> = record.iter().map(str::to_string).collect();

        if let Some(address) = row.get(address_column).and_then(|c| Address::from_cell(c)) {
            address_rows.push(rows.len());
            addresses.push(address);
        } else {
            log::debug!("Skipping row {} with empty address cell", rows.len() + 1);
        }
        rows.push(row);
    }

    Ok((
        AddressTable {
            headers,
            rows,
            address_column,
            address_rows,
        },
        addresses,
    ))
}
