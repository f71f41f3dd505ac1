// src/source/text.rs
//! Newline-delimited address lists.

use crate::error::AppError;
use crate::types::Address;
use std::io::BufRead;
use std::path::Path;

/// Reads one address per non-blank line, trimmed, in file order.
///
/// `artifact` names the input in errors.
pub fn read_address_lines<R: BufRead>(reader: R, artifact: &Path) -> Result<Vec<Address>, AppError> {
    let mut addresses = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| AppError::SourceRead {
            artifact: artifact.to_path_buf(),
            reason: format!("line {}: {}", index + 1, e),
        })?;

        match Address::from_cell(&line) {
            Some(address) => addresses.push(address),
            None => log::debug!("Skipping blank line {}", index + 1),
        }
    }

    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read(input: &[u8]) -> Result<Vec<String>, AppError> {
        read_address_lines(input, Path::new("addresses.txt"))
            .map(|list| list.iter().map(|a| a.as_str().to_string()).collect())
    }

    #[test]
    fn blank_lines_are_not_counted() {
        assert_eq!(read(b"A\n\nB\n").unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn lines_are_trimmed() {
        assert_eq!(
            read(b"  1600 Amphitheatre Pkwy  \r\n\t\n 10 Downing St\n").unwrap(),
            vec!["1600 Amphitheatre Pkwy", "10 Downing St"]
        );
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(read(b"").unwrap().is_empty());
        assert!(read(b"\n \n").unwrap().is_empty());
    }

    #[test]
    fn invalid_utf8_names_the_artifact() {
        let err = read(b"ok\n\xff\xfe\n").unwrap_err();
        assert!(err.to_string().contains("addresses.txt"));
        assert!(err.to_string().contains("line 2"));
    }
}
