//! In-memory browser for testing.

use crate::error::{ErrorKind, Result};
use crate::export::PageLayout;
use crate::page::{PageSource, PosterPage, STATUS_ELEMENT};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// Status shown by a mock page while it is still "rendering".
pub const RENDERING_STATUS: &str = "Rendering…";

/// A scripted stand-in for a running browser.
///
/// Pages opened from the same `MockBrowser` (or its clones) share a log, so a
/// test can hand the browser to the code under test and inspect afterwards
/// what happened to every page, including closed ones. Each page reports
/// `Done.` on its `n`th status poll (first poll by default), and prints a
/// minimal document whose `/MediaBox` reflects the requested layout.
#[derive(Clone, Debug)]
pub struct MockBrowser {
    script: Script,
    log: Arc<Mutex<Vec<Arc<Mutex<PageRecord>>>>>,
}

#[derive(Clone, Debug)]
struct Script {
    done_after: Option<usize>,
    fail_status: bool,
    fail_export: bool,
    fail_open: Vec<String>,
    missing: HashSet<String>,
}
impl Default for Script {
    fn default() -> Self {
        Self { done_after: Some(1), fail_status: false, fail_export: false, fail_open: Vec::new(), missing: HashSet::new() }
    }
}

/// Everything that happened to one mock page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageRecord {
    pub url: Url,
    pub styles: Vec<String>,
    /// `(id, value)` pairs, in the order the controls were set.
    pub controls: Vec<(String, String)>,
    pub clicks: Vec<String>,
    pub resizes: usize,
    pub status_polls: usize,
    pub printed: Vec<PageLayout>,
    pub closed: bool,
}
impl PageRecord {
    fn new(url: Url) -> Self {
        Self {
            url,
            styles: Vec::new(),
            controls: Vec::new(),
            clicks: Vec::new(),
            resizes: 0,
            status_polls: 0,
            printed: Vec::new(),
            closed: false,
        }
    }

    /// Value a query parameter was given in the page URL.
    pub fn query(&self, key: &str) -> Option<String> {
        self.url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v.into_owned())
    }
}

impl Default for MockBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBrowser {
    pub fn new() -> Self {
        Self { script: Script::default(), log: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Report `Done.` on the `polls`th status poll of every page.
    pub fn done_after(mut self, polls: usize) -> Self {
        self.script.done_after = Some(polls.max(1));
        self
    }

    /// Never report completion.
    pub fn never_done(mut self) -> Self {
        self.script.done_after = None;
        self
    }

    /// Reading the status fails, as it would after a renderer crash.
    pub fn fail_status(mut self) -> Self {
        self.script.fail_status = true;
        self
    }

    /// Printing to PDF fails.
    pub fn fail_export(mut self) -> Self {
        self.script.fail_export = true;
        self
    }

    /// Opening any URL containing `fragment` fails with a navigation error.
    pub fn fail_open_when(mut self, fragment: impl Into<String>) -> Self {
        self.script.fail_open.push(fragment.into());
        self
    }

    /// Pages have no element with this id.
    pub fn without_element(mut self, id: impl Into<String>) -> Self {
        self.script.missing.insert(id.into());
        self
    }

    /// A page that skips navigation, for exercising page-level functions directly.
    pub fn page(&self) -> MockPage {
        self.create(Url::parse("about:blank").expect("static URL parses"))
    }

    /// Snapshot of every page opened so far, in opening order.
    pub fn pages(&self) -> Vec<PageRecord> {
        lock(&self.log).iter().map(|record| lock(record).clone()).collect()
    }

    fn create(&self, url: Url) -> MockPage {
        let record = Arc::new(Mutex::new(PageRecord::new(url)));
        lock(&self.log).push(Arc::clone(&record));
        MockPage { script: self.script.clone(), record }
    }
}

impl PageSource for MockBrowser {
    type Page = MockPage;

    fn open(&self, url: &Url) -> Result<MockPage> {
        if self.script.fail_open.iter().any(|fragment| url.as_str().contains(fragment.as_str())) {
            exn::bail!(ErrorKind::Navigation(format!("mock refused to open {url}")));
        }
        Ok(self.create(url.clone()))
    }
}

/// A page opened by a [`MockBrowser`].
#[derive(Debug)]
pub struct MockPage {
    script: Script,
    record: Arc<Mutex<PageRecord>>,
}

impl MockPage {
    pub fn status_polls(&self) -> usize {
        lock(&self.record).status_polls
    }

    pub fn printed_layouts(&self) -> Vec<PageLayout> {
        lock(&self.record).printed.clone()
    }

    pub fn record(&self) -> PageRecord {
        lock(&self.record).clone()
    }

    fn present(&self, id: &str) -> bool {
        !self.script.missing.contains(id)
    }
}

impl PosterPage for MockPage {
    fn inject_style(&self, css: &str) -> Result<()> {
        lock(&self.record).styles.push(css.to_string());
        Ok(())
    }

    fn set_control(&self, id: &str, value: &str) -> Result<bool> {
        if !self.present(id) {
            return Ok(false);
        }
        lock(&self.record).controls.push((id.to_string(), value.to_string()));
        Ok(true)
    }

    fn click(&self, id: &str) -> Result<bool> {
        if !self.present(id) {
            return Ok(false);
        }
        lock(&self.record).clicks.push(id.to_string());
        Ok(true)
    }

    fn notify_resize(&self) -> Result<()> {
        lock(&self.record).resizes += 1;
        Ok(())
    }

    fn status_text(&self) -> Result<Option<String>> {
        if self.script.fail_status {
            exn::bail!(ErrorKind::Script("mock page crashed".to_string()));
        }
        if !self.present(STATUS_ELEMENT) {
            return Ok(None);
        }
        let mut record = lock(&self.record);
        record.status_polls += 1;
        let done = self.script.done_after.is_some_and(|polls| record.status_polls >= polls);
        Ok(Some(if done { "Done." } else { RENDERING_STATUS }.to_string()))
    }

    fn print_pdf(&self, layout: &PageLayout) -> Result<Vec<u8>> {
        if self.script.fail_export {
            exn::bail!(ErrorKind::Export("mock printing failed".to_string()));
        }
        lock(&self.record).printed.push(*layout);
        let (width, height) = layout.size_pt();
        Ok(format!(
            "%PDF-1.7\n1 0 obj\n<< /Type /Page /MediaBox [0 0 {width:.2} {height:.2}] >>\nendobj\n%%EOF\n"
        )
        .into_bytes())
    }

    fn close(self) -> Result<()> {
        lock(&self.record).closed = true;
        Ok(())
    }
}

// A panicking test poisons the lock; the data is still what the test wants to see.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
