//! Minimal static file server for visualization pages.
//!
//! Serves the files under one root directory over HTTP on the loopback
//! interface so a headless browser can load the page (and the data it
//! fetches) without `file://` restrictions.
//!
//! - `GET /<path>` answers with the file's bytes and a content type picked
//!   from its extension (see [`content_type`]).
//! - Directory paths, including `/`, serve their `index.html`.
//! - Missing files, non-files and paths escaping the root answer `404` with a
//!   plain-text body. They are never server errors.

pub mod error;
mod mime;
mod path;
mod port;

pub use crate::mime::{FALLBACK as FALLBACK_CONTENT_TYPE, content_type};
pub use crate::port::{BASE_PORT, MAX_ATTEMPTS, PortRequest};
use crate::error::{ErrorKind, Result};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use exn::ResultExt;
use std::borrow::Cow;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// How long a graceful shutdown may wait for open connections before the task is aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A running static file server.
///
/// Call [`shutdown`](Self::shutdown) to stop it and release the port. Dropping
/// the handle without shutting down aborts the serving task instead.
pub struct StaticServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl StaticServer {
    /// Start serving `root` in a background task on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a directory, or if no port could be bound.
    pub async fn start(root: impl AsRef<Path>, port: impl Into<PortRequest>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            exn::bail!(ErrorKind::InvalidRoot(root.to_path_buf()));
        }
        let root = root.canonicalize().or_raise(|| ErrorKind::Io)?;
        let listener = port::bind(port.into()).await?;
        let addr = listener.local_addr().or_raise(|| ErrorKind::Io)?;

        let (tx, rx) = oneshot::channel::<()>();
        let app = router(root.clone());
        let handle = tokio::spawn(async move {
            let signal = async {
                // A dropped sender also means "stop".
                let _ = rx.await;
            };
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(signal).await {
                tracing::error!("Static server error: {e}");
            }
        });
        tracing::info!(root = %root.display(), "Serving on http://{addr}/");
        Ok(Self { addr, shutdown: Some(tx), handle })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL of the served root, always ending in `/`.
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Stop accepting connections, wait for the serving task and release the port.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.handle).await.is_err() {
            tracing::warn!("Static server did not stop in time; aborting");
            self.handle.abort();
        }
        tracing::debug!(port = self.port(), "Static server stopped");
    }
}

impl Drop for StaticServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(root: PathBuf) -> Router {
    Router::new().route("/", get(serve_file)).route("/{*path}", get(serve_file)).with_state(Arc::new(root))
}

async fn serve_file(State(root): State<Arc<PathBuf>>, uri: Uri) -> Response {
    let Some(request) = percent_decode(uri.path()) else {
        return not_found();
    };
    let Some(file) = path::locate(&root, &request).await else {
        tracing::debug!(path = %uri.path(), "Not found");
        return not_found();
    };
    match tokio::fs::read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        // Raced with a deletion between locate() and read().
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => not_found(),
        Err(e) => {
            tracing::error!(path = %file.display(), "Failed to read file: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "Not found").into_response()
}

/// Decode `%XX` escapes in a URL path. `None` when the decoded bytes are not
/// UTF-8. A `%` without two hex digits after it is kept as-is.
fn percent_decode(path: &str) -> Option<String> {
    urlencoding::decode(path).ok().map(Cow::into_owned)
}
