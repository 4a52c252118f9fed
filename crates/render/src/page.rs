//! The narrow contract between a poster run and the visualization page.
//!
//! The page has no formal API. It exposes a handful of DOM elements with
//! stable identifiers, and reacts to their `input`/`change` events. Instead of
//! scattering event simulation through the code, everything the run needs from
//! a page goes through [`PosterPage`]: set a control, click a trigger, read the
//! status line, print. A missing control is not an error; the page simply
//! doesn't offer that knob.

use crate::error::Result;
use crate::export::PageLayout;
use poster_config::RenderConfig;
use url::Url;

/// Element ids of the controls set from the configuration, in the order they are set.
pub const CONTROL_DATASET: &str = "dataset";
pub const CONTROL_METRIC: &str = "metric";
pub const CONTROL_ANGLE: &str = "angle";
pub const CONTROL_RESOLUTION: &str = "res";
/// Element id of the button that makes the page recompute and redraw.
pub const REDRAW_TRIGGER: &str = "redraw";
/// Element id whose text reports rendering progress (`"Done."` once finished).
pub const STATUS_ELEMENT: &str = "status";

/// One open page in the browser.
pub trait PosterPage {
    /// Append a `<style>` element with `css` to the document.
    fn inject_style(&self, css: &str) -> Result<()>;

    /// Set the value of the element with `id` and notify its listeners with
    /// `input` and `change` events. Returns `false` if there is no such element.
    fn set_control(&self, id: &str, value: &str) -> Result<bool>;

    /// Click the element with `id`. Returns `false` if there is no such element.
    fn click(&self, id: &str) -> Result<bool>;

    /// Fire a `resize` event on the window so layouts recompute.
    fn notify_resize(&self) -> Result<()>;

    /// Current text of the status element, `None` if the page has none.
    fn status_text(&self) -> Result<Option<String>>;

    /// Print the page to PDF bytes.
    fn print_pdf(&self, layout: &PageLayout) -> Result<Vec<u8>>;

    /// Close the page. Consumes it; the page is unusable afterwards.
    fn close(self) -> Result<()>;
}

/// Something that can open pages, normally a running browser.
pub trait PageSource {
    type Page: PosterPage;

    /// Open `url` in a new page and return once the page has settled.
    fn open(&self, url: &Url) -> Result<Self::Page>;
}

/// Style the page and drive its controls to the configured state.
///
/// Order: inject `css`, set dataset, metric, angle and resolution, click
/// redraw, fire resize. Absent elements are skipped.
#[tracing::instrument(skip_all)]
pub fn prepare<P: PosterPage>(page: &P, css: &str, config: &RenderConfig) -> Result<()> {
    page.inject_style(css)?;
    let controls = [
        (CONTROL_DATASET, config.dataset.clone()),
        (CONTROL_METRIC, config.metric.clone()),
        (CONTROL_ANGLE, config.angle.to_string()),
        (CONTROL_RESOLUTION, config.res.to_string()),
    ];
    for (id, value) in &controls {
        if page.set_control(id, value)? {
            tracing::debug!(control = id, value = %value, "Control set");
        } else {
            tracing::debug!(control = id, "Control not present on page; skipped");
        }
    }
    if !page.click(REDRAW_TRIGGER)? {
        tracing::debug!(trigger = REDRAW_TRIGGER, "Redraw trigger not present on page; skipped");
    }
    page.notify_resize()
}

/// Page-side scripts. Arguments are embedded as JSON literals so that any
/// string survives quoting.
pub(crate) mod script {
    use serde_json::Value;

    fn literal(value: &str) -> String {
        Value::from(value).to_string()
    }

    pub(crate) fn inject_style(css: &str) -> String {
        format!(
            "(() => {{ const s = document.createElement('style'); s.setAttribute('data-poster', ''); \
             s.textContent = {}; (document.head || document.documentElement).appendChild(s); return true; }})()",
            literal(css)
        )
    }

    pub(crate) fn set_control(id: &str, value: &str) -> String {
        format!(
            "(() => {{ const el = document.getElementById({}); if (!el) return false; el.value = {}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
            literal(id),
            literal(value)
        )
    }

    pub(crate) fn click(id: &str) -> String {
        format!(
            "(() => {{ const el = document.getElementById({}); if (!el) return false; el.click(); return true; }})()",
            literal(id)
        )
    }

    pub(crate) fn notify_resize() -> String {
        "(() => { window.dispatchEvent(new Event('resize')); return true; })()".to_string()
    }

    pub(crate) fn status_text(id: &str) -> String {
        format!("(() => {{ const el = document.getElementById({}); return el ? el.textContent : null; }})()", literal(id))
    }

    /// `"<readyState>:<resource count>"`, polled to detect network quiescence.
    pub(crate) fn load_snapshot() -> String {
        "document.readyState + ':' + performance.getEntriesByType('resource').length".to_string()
    }
}
