//! Listening socket acquisition with port probing.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::ErrorKind as IoErrorKind;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use tokio::net::TcpListener;

/// First port tried when no port was requested.
pub const BASE_PORT: u16 = 8000;
/// How many consecutive ports are tried before giving up.
pub const MAX_ATTEMPTS: u16 = 100;

/// Which port the server should listen on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PortRequest {
    /// Probe upwards from [`BASE_PORT`].
    #[default]
    Auto,
    /// Try this port first, then probe upwards from it if it is taken.
    /// Port `0` lets the operating system choose.
    Explicit(u16),
}
impl From<Option<u16>> for PortRequest {
    fn from(value: Option<u16>) -> Self {
        value.map_or(Self::Auto, Self::Explicit)
    }
}
impl PortRequest {
    fn start(&self) -> u16 {
        match self {
            Self::Auto => BASE_PORT,
            Self::Explicit(port) => *port,
        }
    }
}

/// Ports tried for a request starting at `start`, stopping at the top of the port range.
fn candidates(start: u16) -> RangeInclusive<u16> {
    start..=start.saturating_add(MAX_ATTEMPTS - 1)
}

/// Bind a loopback listener, moving to the next port only while ports are in use.
pub(crate) async fn bind(request: PortRequest) -> Result<TcpListener> {
    let start = request.start();
    let ports = candidates(start);
    let last = *ports.end();
    for port in ports {
        match TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await {
            Ok(listener) => {
                if port != start {
                    tracing::info!(requested = start, port, "Requested port in use; bound the next free port");
                }
                return Ok(listener);
            },
            Err(e) if e.kind() == IoErrorKind::AddrInUse => {
                tracing::trace!(port, "Port in use");
                continue;
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::Bind(port)),
        }
    }
    exn::bail!(ErrorKind::PortsExhausted(start, last))
}
