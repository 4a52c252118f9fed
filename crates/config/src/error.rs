//! Configuration Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration file was requested explicitly but does not exist.
    #[display("configuration file not found: {}", _0.display())]
    FileNotFound(#[error(not(source))] PathBuf),
    /// One of the configuration layers could not be extracted (wrong type, bad syntax).
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] String),
    /// The requested color scheme is not one of the known palettes.
    #[display("unknown color scheme: {_0}")]
    UnknownScheme(#[error(not(source))] String),
    /// A value for an enumerated option was not recognised.
    #[display("unrecognised value for {option}: {value}")]
    UnknownValue { option: &'static str, value: String },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
