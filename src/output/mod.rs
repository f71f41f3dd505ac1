// src/output/mod.rs
//! Output handling with clear separation of planning and execution.
//!
//! Rendering and path calculation are pure; `deliver` is where the bytes
//! are written.

mod paths;
mod render;
mod types;
mod writer;

pub use paths::default_output_path;
pub use render::{render_batch, render_table};
pub use types::{DeliveryReport, DeliveryTarget, Destination};
pub use writer::deliver;

use crate::error::AppError;
use crate::geocoding::Batch;
use crate::source::AddressSource;

/// Renders a batch in the layout matching its source: the original table
/// with coordinate columns, or `Address,Latitude,Longitude` rows.
pub fn render_for_source(source: &AddressSource, batch: &Batch) -> Result<String, AppError> {
    match &source.table {
        Some(table) => render_table(table, batch),
        None => render_batch(batch),
    }
}
