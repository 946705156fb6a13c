//! SMET Reconciler Library
//!
//! A Rust library for reconciling station metadata across heterogeneous
//! batches of SMET weather station files.
//!
//! This library provides tools for:
//! - Parsing SMET files with proper `[HEADER]`/`[DATA]` section handling
//!   and byte-exact preservation of the data payload
//! - Loading and indexing authoritative station metadata for O(1) lookups
//!   by station name or station id
//! - Merging header fields from an authoritative source with all-or-nothing
//!   semantics and stable field ordering
//! - Reprojecting station coordinates between reference systems
//! - Safe, idempotent file mutation: atomic writes, `.bak` backups, and
//!   collision-checked canonical renames
//! - Batch processing with per-file outcome reporting

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod header_merge;
        pub mod reconciler;
        pub mod reproject;
        pub mod smet_codec;
        pub mod station_registry;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{BatchSummary, ReconcileOutcome, StationRecord};
pub use app::services::smet_codec::{HeaderMap, SmetFile};
pub use config::Config;

/// Result type alias for the SMET reconciler
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for SMET reconciliation operations
///
/// Per-file conditions that are expected during a batch run (no authoritative
/// match, declined renames) are not errors; they are reported through
/// [`app::models::ReconcileOutcome`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// SMET header could not be parsed
    #[error("malformed SMET header in '{file}': {reason}")]
    MalformedHeader { file: String, reason: String },

    /// A required header or authority field is absent
    #[error("missing required field(s) for '{file}': {fields}")]
    MissingField { file: String, fields: String },

    /// Reference metadata table could not be loaded or is inconsistent
    #[error("station registry error: {message}")]
    Registry { message: String },

    /// CSV table parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// JSON table parsing error
    #[error("JSON parsing error in file '{file}': {message}")]
    JsonParsing {
        file: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Coordinate reprojection failed
    #[error("projection error: {message}")]
    Projection { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a malformed header error
    pub fn malformed_header(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing field error from a list of field names
    pub fn missing_field(file: impl Into<String>, fields: &[impl AsRef<str>]) -> Self {
        Self::MissingField {
            file: file.into(),
            fields: fields
                .iter()
                .map(|f| f.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Create a station registry error
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a JSON parsing error with context
    pub fn json_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<serde_json::Error>,
    ) -> Self {
        Self::JsonParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a projection error
    pub fn projection(message: impl Into<String>) -> Self {
        Self::Projection {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonParsing {
            file: "unknown".to_string(),
            message: "JSON parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}
