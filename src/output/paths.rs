// src/output/paths.rs
//! Pure functions for output path calculation.

use crate::constants::{FALLBACK_OUTPUT_FILE, OUTPUT_FILE_SUFFIX};
use std::path::{Path, PathBuf};

/// Output path beside the input: `<stem>_with_coords.csv`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let file_name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .map(sanitize_filename)
        .filter(|s| !s.is_empty())
        .map(|stem| format!("{}{}.csv", stem, OUTPUT_FILE_SUFFIX))
        .unwrap_or_else(|| FALLBACK_OUTPUT_FILE.to_string());

    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Sanitizes a string to be safe for use as a filename.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .trim_matches('.')
        .to_string()
}
