//! Behavioural switches: title visibility, timeouts and failure handling.

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Whether the decorative title stays visible on the poster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleVisibility {
    #[default]
    On,
    Off,
}
impl TitleVisibility {
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::On)
    }
}
impl FromStr for TitleVisibility {
    type Err = ErrorKind;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on" | "show" | "true" | "1" => Ok(Self::On),
            "off" | "hide" | "false" | "0" => Ok(Self::Off),
            _ => Err(ErrorKind::UnknownValue { option: "title", value: s.to_string() }),
        }
    }
}

/// How long to wait for something before giving up.
///
/// Serialized as whole seconds; `0` means wait forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum TimeoutPolicy {
    Bounded(Duration),
    Unbounded,
}
impl TimeoutPolicy {
    pub fn from_secs(secs: u64) -> Self {
        match secs {
            0 => Self::Unbounded,
            secs => Self::Bounded(Duration::from_secs(secs)),
        }
    }

    /// The time limit, if there is one.
    pub fn limit(&self) -> Option<Duration> {
        match self {
            Self::Bounded(limit) => Some(*limit),
            Self::Unbounded => None,
        }
    }

    /// Whether `elapsed` has used up the budget.
    pub fn is_expired(&self, elapsed: Duration) -> bool {
        self.limit().is_some_and(|limit| elapsed >= limit)
    }
}
impl From<u64> for TimeoutPolicy {
    fn from(secs: u64) -> Self {
        Self::from_secs(secs)
    }
}
impl From<TimeoutPolicy> for u64 {
    fn from(policy: TimeoutPolicy) -> Self {
        match policy {
            // Sub-second limits only come from code, never from a config layer.
            TimeoutPolicy::Bounded(limit) => limit.as_secs().max(1),
            TimeoutPolicy::Unbounded => 0,
        }
    }
}

/// What to do when the page never reports that rendering finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutAction {
    /// Log a warning and export whatever the page shows.
    #[default]
    Warn,
    /// Treat the timeout as a job failure.
    Fail,
}
impl FromStr for TimeoutAction {
    type Err = ErrorKind;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "fail" => Ok(Self::Fail),
            _ => Err(ErrorKind::UnknownValue { option: "on-timeout", value: s.to_string() }),
        }
    }
}

/// What to do with the remaining jobs of a batch once one has failed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchPolicy {
    #[default]
    Continue,
    Abort,
}
impl FromStr for BatchPolicy {
    type Err = ErrorKind;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort" => Ok(Self::Abort),
            _ => Err(ErrorKind::UnknownValue { option: "on-failure", value: s.to_string() }),
        }
    }
}
