//! Color schemes understood by the visualization page.

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// A palette the target page can render in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scheme {
    Ocean,
    Sunset,
    Forest,
    Mono,
}
impl Scheme {
    /// Every palette, in the order a batch run renders them.
    pub const ALL: [Scheme; 4] = [Scheme::Ocean, Scheme::Sunset, Scheme::Forest, Scheme::Mono];

    /// The identifier used in query strings and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ocean => "ocean",
            Self::Sunset => "sunset",
            Self::Forest => "forest",
            Self::Mono => "mono",
        }
    }
}
impl Display for Scheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
impl FromStr for Scheme {
    type Err = ErrorKind;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ErrorKind::UnknownScheme(s.to_string()))
    }
}
impl TryFrom<String> for Scheme {
    type Error = ErrorKind;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl From<Scheme> for String {
    fn from(value: Scheme) -> Self {
        value.as_str().to_string()
    }
}

/// Either one palette, or every palette in [`Scheme::ALL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SchemeSelection {
    One(Scheme),
    All,
}
impl Default for SchemeSelection {
    fn default() -> Self {
        Self::One(Scheme::Ocean)
    }
}
impl Display for SchemeSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::One(scheme) => Display::fmt(scheme, f),
            Self::All => f.write_str("all"),
        }
    }
}
impl FromStr for SchemeSelection {
    type Err = ErrorKind;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            all if all.eq_ignore_ascii_case("all") => Ok(Self::All),
            other => Ok(Self::One(other.parse()?)),
        }
    }
}
impl TryFrom<String> for SchemeSelection {
    type Error = ErrorKind;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl From<SchemeSelection> for String {
    fn from(value: SchemeSelection) -> Self {
        value.to_string()
    }
}
