//! Condition polling with a timeout policy.

use crate::error::Result;
use poster_config::TimeoutPolicy;
use std::thread;
use std::time::{Duration, Instant};

/// Interval between probes when polling the page.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Call `probe` until it yields a value or `policy` runs out.
///
/// Returns `Ok(None)` on timeout. A probe error stops polling immediately. The probe always runs at
/// least once, even with a zero budget.
pub(crate) fn poll_until<T>(
    policy: TimeoutPolicy,
    interval: Duration,
    mut probe: impl FnMut() -> Result<Option<T>>,
) -> Result<Option<T>> {
    let started = Instant::now();
    loop {
        let attempted = started.elapsed();
        if let Some(value) = probe()? {
            return Ok(Some(value));
        }
        if policy.is_expired(attempted) {
            return Ok(None);
        }
        thread::sleep(interval);
    }
}

/// Tracks page load snapshots until the page has been quiet for a settling window.
///
/// The page counts as quiet once its document has finished loading and the
/// number of fetched resources stopped changing for `window`.
pub(crate) struct Quiescence {
    window: Duration,
    last: Option<(LoadSnapshot, Instant)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LoadSnapshot {
    pub complete: bool,
    pub resources: usize,
}
impl LoadSnapshot {
    /// Parse the `"<readyState>:<count>"` string produced by the page.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let (state, count) = raw.rsplit_once(':')?;
        Some(Self { complete: state == "complete", resources: count.trim().parse().ok()? })
    }
}

impl Quiescence {
    pub(crate) fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Record a snapshot taken at `now`; returns `true` once the page is quiet.
    pub(crate) fn observe(&mut self, snapshot: LoadSnapshot, now: Instant) -> bool {
        match self.last {
            Some((previous, since)) if previous == snapshot => {
                snapshot.complete && now.duration_since(since) >= self.window
            },
            _ => {
                self.last = Some((snapshot, now));
                false
            },
        }
    }
}
