//! Waiting for the page to report that rendering finished.
//!
//! The page signals completion by setting its status line to text starting
//! with `Done.`. There is no event for it, so the status is polled.

use crate::error::Result;
use crate::page::PosterPage;
use crate::wait::poll_until;
use poster_config::TimeoutPolicy;
use regex::Regex;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

static DONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^done\.").expect("valid completion pattern"));

/// Whether a status line says rendering is complete.
pub fn is_done(status: &str) -> bool {
    DONE.is_match(status.trim_start())
}

/// How waiting for completion ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    Done { elapsed: Duration },
    /// The budget ran out; carries the last status the page showed.
    TimedOut { elapsed: Duration, last_status: Option<String> },
}

/// Poll the page's status until it reads `Done.` or `policy` runs out.
///
/// Page errors (a closed tab, a crashed renderer) are returned as errors; a
/// timeout is not an error but a [`Completion::TimedOut`] for the caller to judge.
pub fn wait_for_done<P: PosterPage>(page: &P, policy: TimeoutPolicy, interval: Duration) -> Result<Completion> {
    let started = Instant::now();
    let mut last_status = None;
    let done = poll_until(policy, interval, || {
        let status = page.status_text()?;
        let done = status.as_deref().is_some_and(is_done);
        if status != last_status {
            tracing::trace!(status = ?status, "Page status changed");
            last_status = status;
        }
        Ok(done.then_some(()))
    })?;
    let elapsed = started.elapsed();
    Ok(match done {
        Some(()) => Completion::Done { elapsed },
        None => Completion::TimedOut { elapsed, last_status },
    })
}
