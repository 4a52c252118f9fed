//! End-to-end runs against a real Chrome/Chromium. Run with `--ignored` on a
//! machine that has one installed.

use poster_config::{RenderConfig, SchemeSelection, TimeoutAction, TimeoutPolicy};
use regex::bytes::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn fixture_config(out: &Path) -> RenderConfig {
    RenderConfig {
        root: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/site"),
        dataset: "museums".into(),
        metric: "l2".into(),
        res: 2,
        out: out.join("poster_a3_museums.pdf"),
        out_dir: out.to_path_buf(),
        timeout: TimeoutPolicy::Bounded(Duration::from_secs(30)),
        on_timeout: TimeoutAction::Fail,
        ..RenderConfig::default()
    }
}

fn assert_a3(path: &Path) {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    // Chrome rounds the paper size to whole or fractional points.
    let media_box = Regex::new(r"/MediaBox\s*\[\s*0\s+0\s+84[12](\.\d+)?\s+119[01](\.\d+)?\s*\]").unwrap();
    assert!(media_box.is_match(&bytes), "{} is not A3 portrait", path.display());
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires Chrome/Chromium"]
async fn renders_fixture_page() {
    let dir = TempDir::new().unwrap();
    let report = poster::run(fixture_config(dir.path())).await.unwrap();
    assert!(report.is_success());
    assert_a3(&dir.path().join("poster_a3_museums.pdf"));
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires Chrome/Chromium"]
async fn renders_every_scheme() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig { scheme: SchemeSelection::All, ..fixture_config(dir.path()) };
    let report = poster::run(config).await.unwrap();
    assert_eq!(report.written.len(), 4);
    report.written.iter().for_each(|path| assert_a3(path));
}
