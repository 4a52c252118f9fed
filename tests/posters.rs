use poster::error::ErrorKind;
use poster::{Report, run_jobs, run_with};
use poster_config::{BatchPolicy, RenderConfig, Scheme, SchemeSelection, TimeoutAction, TimeoutPolicy, TitleVisibility};
use poster_render::StyleConfig;
use poster_render::mock::MockBrowser;
use regex::Regex;
use rstest::rstest;
use std::collections::HashSet;
use std::net::{Ipv4Addr, TcpListener};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

const PAGE: &str = "http://127.0.0.1:8000/index.html";

fn config_in(dir: &Path) -> RenderConfig {
    RenderConfig {
        out: dir.join("poster_a3.pdf"),
        out_dir: dir.to_path_buf(),
        timeout: TimeoutPolicy::Bounded(Duration::from_millis(250)),
        ..RenderConfig::default()
    }
}

fn render(browser: &MockBrowser, config: &RenderConfig) -> Report {
    let css = StyleConfig::for_poster(config).unwrap().to_css().unwrap();
    run_jobs(browser, &Url::parse(PAGE).unwrap(), config, &css)
}

fn assert_a3_pdf(path: &Path) {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"), "{} is not a PDF", path.display());
    let media_box = Regex::new(r"/MediaBox \[0 0 841\.89 1190\.55\]").unwrap();
    assert!(media_box.is_match(&String::from_utf8_lossy(&bytes)));
}

#[test]
fn single_scheme_writes_one_poster() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig {
        dataset: "museums".into(),
        metric: "l2".into(),
        res: 2,
        scheme: SchemeSelection::One(Scheme::Ocean),
        out: dir.path().join("poster_a3_museums.pdf"),
        ..config_in(dir.path())
    };
    let browser = MockBrowser::new();
    let report = render(&browser, &config);

    assert!(report.is_success());
    assert_eq!(report.written, vec![dir.path().join("poster_a3_museums.pdf")]);
    assert_a3_pdf(&report.written[0]);

    let pages = browser.pages();
    assert_eq!(pages.len(), 1);
    let page = &pages[0];
    assert_eq!(page.url.query(), Some("poster&scheme=ocean&res=2&angle=29"));
    assert_eq!(
        page.controls,
        [("dataset", "museums"), ("metric", "l2"), ("angle", "29"), ("res", "2")]
            .map(|(id, value)| (id.to_string(), value.to_string()))
            .to_vec()
    );
    assert_eq!(page.clicks, vec!["redraw".to_string()]);
    assert_eq!(page.resizes, 1);
    assert!(page.styles[0].contains("canvas"));
    assert!(page.closed);
}

#[test]
fn all_schemes_write_four_distinct_posters() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig { scheme: SchemeSelection::All, ..config_in(dir.path()) };
    let browser = MockBrowser::new();
    let report = render(&browser, &config);

    assert!(report.is_success());
    assert_eq!(report.written.len(), 4);
    let unique: HashSet<&PathBuf> = report.written.iter().collect();
    assert_eq!(unique.len(), 4);
    for (path, scheme) in report.written.iter().zip(Scheme::ALL) {
        assert_eq!(path, &dir.path().join(format!("poster_a3_{scheme}.pdf")));
        assert_a3_pdf(path);
    }
    let schemes: Vec<_> = browser.pages().iter().map(|page| page.query("scheme").unwrap()).collect();
    assert_eq!(schemes, ["ocean", "sunset", "forest", "mono"]);
    assert!(browser.pages().iter().all(|page| page.closed));
}

#[test]
fn hidden_title_reaches_page_and_style() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig { title: TitleVisibility::Off, ..config_in(dir.path()) };
    let browser = MockBrowser::new();
    assert!(render(&browser, &config).is_success());
    let page = &browser.pages()[0];
    assert_eq!(page.query("title").as_deref(), Some("off"));
    assert!(page.styles[0].contains("#title"));
}

#[test]
fn missing_controls_are_skipped() {
    let dir = TempDir::new().unwrap();
    let browser = MockBrowser::new().without_element("metric").without_element("redraw");
    let report = render(&browser, &config_in(dir.path()));
    assert!(report.is_success());
    let page = &browser.pages()[0];
    assert!(page.controls.iter().all(|(id, _)| id != "metric"));
    assert!(page.clicks.is_empty());
}

#[test]
fn soft_timeout_still_exports() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let browser = MockBrowser::new().never_done();
    let report = render(&browser, &config);
    assert!(report.is_success());
    assert_a3_pdf(&config.out);
}

#[test]
fn failing_timeout_policy_fails_the_job() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig { on_timeout: TimeoutAction::Fail, ..config_in(dir.path()) };
    let browser = MockBrowser::new().never_done();
    let report = render(&browser, &config);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(*report.failed[0].error, ErrorKind::TimedOut(Scheme::Ocean));
    assert!(!config.out.exists());
    assert!(browser.pages()[0].closed);
}

#[rstest]
#[case(BatchPolicy::Continue, 3, 0)]
#[case(BatchPolicy::Abort, 0, 3)]
fn batch_policy_after_first_failure(#[case] policy: BatchPolicy, #[case] written: usize, #[case] skipped: usize) {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig { scheme: SchemeSelection::All, on_failure: policy, ..config_in(dir.path()) };
    let browser = MockBrowser::new().fail_open_when("scheme=ocean");
    let report = render(&browser, &config);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].job.scheme, Scheme::Ocean);
    assert_eq!(*report.failed[0].error, ErrorKind::Job(Scheme::Ocean));
    assert_eq!(report.written.len(), written);
    assert_eq!(report.skipped.len(), skipped);
    assert!(report.check().is_err());
}

#[test]
fn export_failure_closes_the_page() {
    let dir = TempDir::new().unwrap();
    let browser = MockBrowser::new().fail_export();
    let report = render(&browser, &config_in(dir.path()));
    assert_eq!(report.failed.len(), 1);
    assert!(browser.pages()[0].closed);
}

#[tokio::test]
async fn serves_root_and_releases_port() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig {
        root: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/site"),
        ..config_in(dir.path())
    };
    let browser = MockBrowser::new();
    let launched = browser.clone();
    let report = run_with(config, move |_| Ok(launched)).await.unwrap();
    assert!(report.is_success());

    let url = browser.pages()[0].url.clone();
    assert_eq!(url.host_str(), Some("127.0.0.1"));
    assert_eq!(url.path(), "/index.html");
    let port = url.port().unwrap();
    assert!(TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok(), "port {port} still held");
}

#[tokio::test]
async fn external_url_skips_the_server() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig {
        url: Some("https://viz.example.org/app/".into()),
        page: "ignored.html".into(),
        root: PathBuf::from("/definitely/not/a/directory"),
        ..config_in(dir.path())
    };
    let browser = MockBrowser::new();
    let launched = browser.clone();
    run_with(config, move |_| Ok(launched)).await.unwrap();
    assert_eq!(browser.pages()[0].url.as_str(), "https://viz.example.org/app/?poster&scheme=ocean&res=1&angle=29");
}

#[tokio::test]
async fn invalid_root_fails_before_launch() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig { root: dir.path().join("missing"), ..config_in(dir.path()) };
    let result = run_with(config, |_| -> poster_render::error::Result<MockBrowser> {
        panic!("browser must not launch without a server")
    })
    .await;
    assert_eq!(*result.unwrap_err(), ErrorKind::Serve);
}

#[tokio::test]
async fn launch_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig { url: Some("http://127.0.0.1:9/".into()), ..config_in(dir.path()) };
    let result = run_with(config, |_| -> poster_render::error::Result<MockBrowser> {
        exn::bail!(poster_render::error::ErrorKind::ChromeNotFound)
    })
    .await;
    assert_eq!(*result.unwrap_err(), ErrorKind::Render);
}
