//! Running a batch of poster jobs.
//!
//! Resources are acquired in a fixed order and released in reverse: the static
//! server (when the page is served locally), then the browser. Jobs run one
//! after another, each on a tab of its own that is closed whether the job
//! succeeded or not. The browser is gone before the server shuts down.

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use poster_config::{BatchPolicy, PosterJob, RenderConfig, TimeoutAction};
use poster_render::{
    Chrome, ChromeOptions, Completion, DEFAULT_POLL_INTERVAL, PageSource, PosterPage, StyleConfig, export_pdf,
    page_url, poster_url, prepare, wait_for_done,
};
use poster_serve::StaticServer;
use std::path::PathBuf;
use tracing::instrument;
use url::Url;

/// A job that did not produce its poster.
#[derive(Debug)]
pub struct JobFailure {
    pub job: PosterJob,
    pub error: Error,
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct Report {
    /// Files written, in job order.
    pub written: Vec<PathBuf>,
    pub failed: Vec<JobFailure>,
    /// Jobs never attempted because an earlier one failed under [`BatchPolicy::Abort`].
    pub skipped: Vec<PosterJob>,
}
impl Report {
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len() + self.skipped.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// An error summarizing the batch unless every job produced its file.
    pub fn check(&self) -> Result<()> {
        if !self.is_success() {
            exn::bail!(ErrorKind::Incomplete { failed: self.failed.len() + self.skipped.len(), total: self.total() });
        }
        Ok(())
    }
}

/// Serve (if needed), launch Chrome and render every job of `config`.
pub async fn run(config: RenderConfig) -> Result<Report> {
    run_with(config, |config| Chrome::launch(&ChromeOptions::from(config))).await
}

/// Like [`run`], with the browser supplied by `launch`.
///
/// `launch` runs on a blocking thread together with the jobs; whatever it
/// returns is dropped there once the jobs are done.
pub async fn run_with<S, F>(config: RenderConfig, launch: F) -> Result<Report>
where
    S: PageSource + 'static,
    F: FnOnce(&RenderConfig) -> poster_render::error::Result<S> + Send + 'static,
{
    let css = StyleConfig::for_poster(&config).and_then(|styles| styles.to_css()).or_raise(|| ErrorKind::Render)?;
    let server = match config.serves_locally() {
        true => Some(StaticServer::start(&config.root, config.port).await.or_raise(|| ErrorKind::Serve)?),
        false => None,
    };
    let base = server.as_ref().map(StaticServer::base_url);
    let outcome = render_all(config, base, css, launch).await;
    if let Some(server) = server {
        server.shutdown().await;
    }
    outcome
}

async fn render_all<S, F>(config: RenderConfig, base: Option<String>, css: String, launch: F) -> Result<Report>
where
    S: PageSource + 'static,
    F: FnOnce(&RenderConfig) -> poster_render::error::Result<S> + Send + 'static,
{
    let page = page_url(&config, base.as_deref()).or_raise(|| ErrorKind::Config)?;
    tokio::task::spawn_blocking(move || -> Result<Report> {
        let source = launch(&config).or_raise(|| ErrorKind::Render)?;
        let report = run_jobs(&source, &page, &config, &css);
        drop(source);
        tracing::debug!("Browser closed");
        Ok(report)
    })
    .await
    .or_raise(|| ErrorKind::Join)?
}

/// Run every job of `config` against pages opened from `source`.
///
/// Failures are collected, not returned; [`BatchPolicy`] decides whether the
/// remaining jobs still run.
pub fn run_jobs<S: PageSource>(source: &S, page: &Url, config: &RenderConfig, css: &str) -> Report {
    let mut report = Report::default();
    let mut jobs = config.jobs().into_iter();
    while let Some(job) = jobs.next() {
        match run_job(source, page, config, css, &job) {
            Ok(path) => report.written.push(path),
            Err(error) => {
                tracing::error!(scheme = %job.scheme, "{error:?}");
                report.failed.push(JobFailure { job, error });
                if config.on_failure == BatchPolicy::Abort {
                    report.skipped.extend(jobs.by_ref());
                    if !report.skipped.is_empty() {
                        tracing::warn!(skipped = report.skipped.len(), "Aborting remaining posters");
                    }
                }
            },
        }
    }
    report
}

/// Render one poster: open, style and drive the page, wait, print, close.
#[instrument(skip_all, fields(scheme = %job.scheme, output = %job.output.display()))]
pub fn run_job<S: PageSource>(
    source: &S,
    page: &Url,
    config: &RenderConfig,
    css: &str,
    job: &PosterJob,
) -> Result<PathBuf> {
    let url = poster_url(page, config, job.scheme);
    tracing::info!(%url, "Rendering poster");
    let tab = source.open(&url).or_raise(|| ErrorKind::Job(job.scheme))?;
    let outcome = render_on(&tab, config, css, job);
    if let Err(e) = tab.close() {
        tracing::debug!("Failed to close tab: {e}");
    }
    outcome
}

fn render_on<P: PosterPage>(tab: &P, config: &RenderConfig, css: &str, job: &PosterJob) -> Result<PathBuf> {
    prepare(tab, css, config).or_raise(|| ErrorKind::Job(job.scheme))?;
    match wait_for_done(tab, config.timeout, DEFAULT_POLL_INTERVAL).or_raise(|| ErrorKind::Job(job.scheme))? {
        Completion::Done { elapsed } => tracing::debug!(?elapsed, "Page reported done"),
        Completion::TimedOut { elapsed, last_status } => match config.on_timeout {
            TimeoutAction::Warn => tracing::warn!(
                ?elapsed,
                status = last_status.as_deref().unwrap_or("<none>"),
                "Page did not report done in time; exporting anyway"
            ),
            TimeoutAction::Fail => exn::bail!(ErrorKind::TimedOut(job.scheme)),
        },
    }
    let written = export_pdf(tab, &job.output).or_raise(|| ErrorKind::Job(job.scheme))?;
    tracing::info!("Poster finished");
    Ok(written)
}
