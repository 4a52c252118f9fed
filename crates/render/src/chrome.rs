//! The real browser: a Chrome/Chromium process driven over the DevTools protocol.

use crate::error::{ErrorKind, Result};
use crate::export::PageLayout;
use crate::page::{PageSource, PosterPage, STATUS_ELEMENT, script};
use crate::wait::{DEFAULT_POLL_INTERVAL, LoadSnapshot, Quiescence};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::util::Wait;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use poster_config::{RenderConfig, TimeoutPolicy, Viewport};
use serde_json::Value;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;
use url::Url;

/// Executable names searched for on `PATH`, most specific first.
const EXECUTABLES: [&str; 5] = ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser", "chrome"];
/// How long the network must stay idle before a page counts as loaded.
const QUIET_WINDOW: Duration = Duration::from_millis(500);
/// Stand-in for "forever" where the protocol client wants a finite duration.
const EFFECTIVELY_UNBOUNDED: Duration = Duration::from_secs(24 * 60 * 60);

/// Locate a Chrome/Chromium executable.
///
/// An explicit path wins when it exists. Flatpak installs are not considered:
/// the DevTools connection needs a binary it can spawn directly.
pub(crate) fn discover(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(path = %path.display(), "Configured browser executable not found; searching PATH");
    }
    for exe in EXECUTABLES {
        if let Ok(path) = which::which(exe) {
            tracing::debug!(path = %path.display(), "Discovered browser executable");
            return Ok(path);
        }
    }
    tracing::info!("Chrome executable not found in PATH");
    exn::bail!(ErrorKind::ChromeNotFound);
}

/// How to launch the browser and how long navigation may take.
#[derive(Clone, Debug, PartialEq)]
pub struct ChromeOptions {
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub viewport: Viewport,
    pub navigation: TimeoutPolicy,
    /// Upper bound on the time a single page may spend rendering.
    pub render: TimeoutPolicy,
}
impl From<&RenderConfig> for ChromeOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            executable: config.chrome.clone(),
            headless: config.headless,
            viewport: config.viewport,
            navigation: config.navigation_timeout,
            render: config.timeout,
        }
    }
}

fn finite(policy: TimeoutPolicy) -> Duration {
    policy.limit().unwrap_or(EFFECTIVELY_UNBOUNDED)
}

/// A running browser. The process is terminated when this is dropped.
pub struct Chrome {
    browser: Browser,
    navigation: TimeoutPolicy,
}

impl Chrome {
    #[instrument(skip_all, fields(headless = options.headless))]
    pub fn launch(options: &ChromeOptions) -> Result<Self> {
        let executable = discover(options.executable.as_deref())?;
        let Viewport { width, height, scale_factor } = options.viewport;
        let scale = format!("--force-device-scale-factor={scale_factor}");
        // The DevTools connection is dropped when the browser sends nothing for
        // this long, which can happen while a heavy page renders.
        let idle = finite(options.navigation) + finite(options.render) + Duration::from_secs(30);
        let launch = LaunchOptionsBuilder::default()
            .path(Some(executable.clone()))
            .headless(options.headless)
            .window_size(Some((width, height)))
            .idle_browser_timeout(idle)
            .args(vec![
                OsStr::new(&scale),
                OsStr::new("--hide-scrollbars"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--disable-background-networking"),
                OsStr::new("--disable-sync"),
            ])
            .build()
            .map_err(|e| ErrorKind::Launch(e.to_string()))?;
        let browser = Browser::new(launch).map_err(|e| ErrorKind::Launch(e.to_string()))?;
        tracing::info!(executable = %executable.display(), width, height, scale_factor, "Browser launched");
        Ok(Self { browser, navigation: options.navigation })
    }
}

impl PageSource for Chrome {
    type Page = ChromeTab;

    /// Navigate a fresh tab to `url` and wait until the document has loaded
    /// and no new resources were requested for a short settling window.
    #[instrument(skip_all, fields(url = %url))]
    fn open(&self, url: &Url) -> Result<ChromeTab> {
        let tab = self.browser.new_tab().map_err(|e| ErrorKind::Launch(e.to_string()))?;
        tab.set_default_timeout(finite(self.navigation));
        let page = ChromeTab { tab };
        if let Err(err) = page.navigate(url, self.navigation) {
            if let Err(close) = page.close() {
                tracing::debug!(error = %close, "Failed to close tab after navigation error");
            }
            return Err(err);
        }
        Ok(page)
    }
}

/// One browser tab showing the visualization page.
pub struct ChromeTab {
    tab: Arc<Tab>,
}

impl ChromeTab {
    fn navigate(&self, url: &Url, policy: TimeoutPolicy) -> Result<()> {
        self.tab
            .navigate_to(url.as_str())
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| ErrorKind::Navigation(e.to_string()))?;
        let mut quiescence = Quiescence::new(QUIET_WINDOW);
        let script = script::load_snapshot();
        // A script error ends the wait early and is returned as the outcome.
        let settled = Wait::new(finite(policy), DEFAULT_POLL_INTERVAL).until(|| match self.evaluate(&script) {
            Ok(value) => {
                let snapshot = value.as_ref().and_then(Value::as_str).and_then(LoadSnapshot::parse);
                snapshot.is_some_and(|snapshot| quiescence.observe(snapshot, Instant::now())).then_some(Ok(()))
            },
            Err(err) => Some(Err(err)),
        });
        match settled {
            Ok(outcome) => outcome?,
            Err(_) => exn::bail!(ErrorKind::Navigation(format!("{url} did not finish loading in time"))),
        }
        tracing::debug!("Page loaded and network idle");
        Ok(())
    }

    fn evaluate(&self, expression: &str) -> Result<Option<Value>> {
        let object = self.tab.evaluate(expression, false).map_err(|e| ErrorKind::Script(e.to_string()))?;
        Ok(object.value)
    }

    fn evaluate_flag(&self, expression: &str) -> Result<bool> {
        Ok(self.evaluate(expression)?.as_ref().and_then(Value::as_bool).unwrap_or(false))
    }
}

impl PosterPage for ChromeTab {
    fn inject_style(&self, css: &str) -> Result<()> {
        self.evaluate(&script::inject_style(css)).map(drop)
    }

    fn set_control(&self, id: &str, value: &str) -> Result<bool> {
        self.evaluate_flag(&script::set_control(id, value))
    }

    fn click(&self, id: &str) -> Result<bool> {
        self.evaluate_flag(&script::click(id))
    }

    fn notify_resize(&self) -> Result<()> {
        self.evaluate(&script::notify_resize()).map(drop)
    }

    fn status_text(&self) -> Result<Option<String>> {
        let value = self.evaluate(&script::status_text(STATUS_ELEMENT))?;
        Ok(value.as_ref().and_then(Value::as_str).map(str::to_string))
    }

    fn print_pdf(&self, layout: &PageLayout) -> Result<Vec<u8>> {
        let margin = layout.margin_in();
        let options = PrintToPdfOptions {
            print_background: Some(layout.print_background),
            paper_width: Some(layout.width_in()),
            paper_height: Some(layout.height_in()),
            margin_top: Some(margin),
            margin_bottom: Some(margin),
            margin_left: Some(margin),
            margin_right: Some(margin),
            landscape: Some(false),
            display_header_footer: Some(false),
            prefer_css_page_size: Some(false),
            ..Default::default()
        };
        self.tab.print_to_pdf(Some(options)).map_err(|e| exn::Exn::from(ErrorKind::Export(e.to_string())))
    }

    fn close(self) -> Result<()> {
        self.tab.close(false).map(drop).map_err(|e| exn::Exn::from(ErrorKind::Script(e.to_string())))
    }
}
