//! Content types for served files, chosen by extension.

use std::path::Path;

/// Content type for anything not in the table.
pub const FALLBACK: &str = "application/octet-stream";

/// Map a file path to the `Content-Type` it is served with.
///
/// Matching is on the last extension only and ignores case, so `app.min.JS`
/// is JavaScript and `data.json.gz` is opaque bytes.
#[must_use]
pub fn content_type(path: impl AsRef<Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| match ext.to_lowercase().as_str() {
            "html" | "htm" => "text/html; charset=utf-8",
            "js" | "mjs" => "text/javascript; charset=utf-8",
            "css" => "text/css; charset=utf-8",
            "json" => "application/json",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "ico" => "image/x-icon",
            "csv" => "text/csv; charset=utf-8",
            "txt" => "text/plain; charset=utf-8",
            "wasm" => "application/wasm",
            "woff2" => "font/woff2",
            _ => FALLBACK,
        })
        .unwrap_or(FALLBACK)
}
