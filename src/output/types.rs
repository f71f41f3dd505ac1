// src/output/types.rs
//! Where rendered CSV goes, and what was written.
//!
//! Choosing a target is pure; `deliver` performs the I/O.

use std::fmt;
use std::path::{Path, PathBuf};

/// A rendered CSV document and its destination.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryTarget {
    /// Write content to a file
    WriteFile { path: PathBuf, content: String },
    /// Print to stdout
    PrintToStdout { content: String },
}

impl DeliveryTarget {
    /// Targets `output` when given, stdout otherwise.
    pub fn for_output(output: Option<&Path>, content: String) -> Self {
        match output {
            Some(path) => Self::WriteFile {
                path: path.to_path_buf(),
                content,
            },
            None => Self::PrintToStdout { content },
        }
    }

    pub fn destination(&self) -> Destination {
        match self {
            Self::WriteFile { path, .. } => Destination::File(path.clone()),
            Self::PrintToStdout { .. } => Destination::Stdout,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::WriteFile { content, .. } | Self::PrintToStdout { content } => content,
        }
    }
}

/// Where a delivery ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdout => f.write_str("stdout"),
        }
    }
}

/// Result of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub destination: Destination,
    pub bytes_written: usize,
}
