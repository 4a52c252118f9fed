//! Render a data-visualization web page into print-ready A3 PDF posters.
//!
//! A run serves the page's files locally, drives a headless Chrome to the
//! configured state and prints one poster per color scheme. See [`run`].

mod cli;
pub mod error;
pub mod logging;
mod run;

pub use crate::cli::{Cli, RenderArgs};
pub use crate::run::{JobFailure, Report, run, run_job, run_jobs, run_with};
