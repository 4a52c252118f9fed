//! Server Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A server error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Missing files are not errors: they are answered with a 404.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The directory to serve does not exist or is not a directory.
    #[display("cannot serve {}: not a directory", _0.display())]
    InvalidRoot(#[error(not(source))] PathBuf),
    /// Binding the listening socket failed for a reason other than the port being taken.
    #[display("failed to bind port {_0}")]
    Bind(#[error(not(source))] u16),
    /// Every port in the probing range was already in use.
    #[display("no free port in {_0}..={_1}")]
    PortsExhausted(#[error(not(source))] u16, #[error(not(source))] u16),
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PortsExhausted(..) | Self::Io)
    }
}
