//! Render Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! The browser automation library reports failures as opaque messages, so the
//! browser-facing variants carry that message rather than a source error.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("chrome/chromium not detected on your system")]
    ChromeNotFound,
    /// The browser process or a new tab could not be started.
    #[display("failed to launch browser: {_0}")]
    Launch(#[error(not(source))] String),
    /// Navigation failed, or the page never went quiet within the navigation timeout.
    #[display("navigation failed: {_0}")]
    Navigation(#[error(not(source))] String),
    /// Evaluating a script inside the page failed.
    #[display("page script failed: {_0}")]
    Script(#[error(not(source))] String),
    /// The browser could not produce the PDF.
    #[display("PDF export failed: {_0}")]
    Export(#[error(not(source))] String),
    /// Asset was not loadable (either file or builtin).
    #[display("asset not found: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    /// Writing the output file failed.
    #[display("failed to write {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Navigation(_) | Self::Io)
    }
}
