//! Poster Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Errors from the member crates are
//! kept as children of the kind that names the stage they broke.

use derive_more::{Display, Error};
use poster_config::Scheme;

/// A poster run error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for poster run operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration could not be resolved.
    #[display("invalid configuration")]
    Config,
    /// The local static server could not be started.
    #[display("failed to serve page files")]
    Serve,
    /// The browser could not be launched, or the page style sheet could not be built.
    #[display("failed to start rendering")]
    Render,
    /// One poster could not be produced.
    #[display("failed to render the {_0} poster")]
    Job(#[error(not(source))] Scheme),
    /// The page never reported completion and timeouts are configured to fail.
    #[display("the {_0} poster did not finish rendering in time")]
    TimedOut(#[error(not(source))] Scheme),
    /// Some posters of the run failed.
    #[display("{failed} of {total} posters failed")]
    Incomplete { failed: usize, total: usize },
    /// The rendering thread panicked or was cancelled.
    #[display("rendering thread did not complete")]
    Join,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Serve | Self::TimedOut(_))
    }
}
