// src/output/render.rs
//! Renders a batch to CSV text.
//!
//! Absent coordinates become empty fields, never `0,0`. Both layouts print
//! degrees the same way: plain decimal, no exponent.

use crate::constants::{ADDRESS_HEADER, LATITUDE_HEADER, LONGITUDE_HEADER};
use crate::error::AppError;
use crate::geocoding::Batch;
use crate::source::AddressTable;
use crate::types::Coordinate;
use serde::Serialize;

/// One row of text-mode output.
#[derive(Debug, Serialize)]
struct GeocodedRow<'a> {
    #[serde(rename = "Address")]
    address: &'a str,
    #[serde(rename = "Latitude")]
    latitude: String,
    #[serde(rename = "Longitude")]
    longitude: String,
}

/// Renders `Address,Latitude,Longitude` rows, one per result.
pub fn render_batch(batch: &Batch) -> Result<String, AppError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    if batch.is_empty() {
        wtr.write_record([ADDRESS_HEADER, LATITUDE_HEADER, LONGITUDE_HEADER])?;
    }

    for result in batch {
        let (latitude, longitude) = coordinate_cells(result.coordinate());
        wtr.serialize(GeocodedRow {
            address: result.address.as_str(),
            latitude,
            longitude,
        })?;
    }

    finish(wtr)
}

/// Renders the original table with coordinate columns.
///
/// Every input row is kept. Coordinates land on the row each address came
/// from; rows without an address, or not reached, get empty cells. Existing
/// `Latitude`/`Longitude` columns are overwritten rather than duplicated.
pub fn render_table(table: &AddressTable, batch: &Batch) -> Result<String, AppError> {
    let mut headers = table.headers.clone();
    let latitude_column = column_index(&mut headers, LATITUDE_HEADER);
    let longitude_column = column_index(&mut headers, LONGITUDE_HEADER);

    let mut coordinates = vec![None; table.rows.len()];
    for result in batch {
        if let Some(&row) = table.address_rows.get(result.position) {
            coordinates[row] = result.coordinate();
        }
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&headers)?;

    for (row, coordinate) in table.rows.iter().zip(coordinates) {
        let mut record = row.clone();
        record.resize(headers.len(), String::new());
        let (latitude, longitude) = coordinate_cells(coordinate);
        record[latitude_column] = latitude;
        record[longitude_column] = longitude;
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

/// Latitude and longitude cells; both empty when there is no coordinate.
fn coordinate_cells(coordinate: Option<Coordinate>) -> (String, String) {
    match coordinate {
        Some(c) => (format_degrees(c.latitude), format_degrees(c.longitude)),
        None => (String::new(), String::new()),
    }
}

fn format_degrees(value: f64) -> String {
    value.to_string()
}

/// Index of `name` in `headers`, appending it when missing.
fn column_index(headers: &mut Vec<String>, name: &str) -> usize {
    match headers.iter().position(|h| h == name) {
        Some(index) => index,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    }
}

fn finish(mut wtr: csv::Writer<Vec<u8>>) -> Result<String, AppError> {
    wtr.flush()?;
    let bytes = wtr.into_inner().map_err(|e| AppError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
