//! Command-line interface.
//!
//! Flags only carry what the user typed. Everything left out is filled in by
//! the configuration layers (defaults, file, `POSTER_*` environment), so the
//! flag structs serialize only the fields that were given.

use clap::{ArgAction, Args, Parser};
use figment::Figment;
use figment::providers::Serialized;
use poster_config::{BatchPolicy, RenderConfig, SchemeSelection, TimeoutAction, TitleVisibility};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "poster", version, about = "Render a data-visualization page into print-ready A3 PDF posters")]
pub struct Cli {
    #[command(flatten)]
    pub render: RenderArgs,

    /// TOML configuration file (defaults to poster.toml in the user config directory)
    #[arg(long, env = "POSTER_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headful: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Rendering options given on the command line.
#[derive(Debug, Default, Args, Serialize)]
pub struct RenderArgs {
    /// Dataset selected in the page
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Distance metric selected in the page
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,

    /// Projection angle in degrees
    #[arg(long, allow_negative_numbers = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<i32>,

    /// Rendering resolution level
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub res: Option<u8>,

    /// Show or hide the poster title
    #[arg(long, value_name = "on|off")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleVisibility>,

    /// Color scheme, or `all` to render one poster per scheme
    #[arg(long, value_name = "ocean|sunset|forest|mono|all")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<SchemeSelection>,

    /// Output file for a single scheme
    #[arg(long, value_name = "FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,

    /// Output directory for `--scheme all`
    #[arg(long, value_name = "DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    /// Port for the local server (probes upwards from 8000 when absent)
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Render an already-served page instead of serving --root
    #[arg(long, conflicts_with = "root")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Directory to serve
    #[arg(long, value_name = "DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Page under the served root
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    /// Title alignment passed to the page
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_align: Option<String>,

    /// Title scale passed to the page
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_scale: Option<f64>,

    /// Extra stylesheet injected after the poster style (repeatable)
    #[arg(long = "style", value_name = "FILE")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<PathBuf>,

    /// Seconds to wait for the page to report `Done.` (0 waits forever)
    #[arg(long, value_name = "SECS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Seconds to wait for the page to load (0 waits forever)
    #[arg(long = "nav-timeout", value_name = "SECS")]
    #[serde(rename = "navigation_timeout", skip_serializing_if = "Option::is_none")]
    pub navigation_timeout: Option<u64>,

    /// What a render timeout does to the job
    #[arg(long, value_name = "warn|fail")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_timeout: Option<TimeoutAction>,

    /// Whether a failed job stops the remaining ones
    #[arg(long, value_name = "continue|abort")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<BatchPolicy>,

    /// Chrome/Chromium executable
    #[arg(long, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome: Option<PathBuf>,
}

impl Cli {
    /// The flags as a configuration layer, to be merged over every other layer.
    pub fn overrides(&self) -> Figment {
        let figment = Figment::from(Serialized::defaults(&self.render));
        match self.headful {
            true => figment.merge(Serialized::default("headless", false)),
            false => figment,
        }
    }

    pub fn resolve(&self) -> poster_config::error::Result<RenderConfig> {
        RenderConfig::resolve(self.config.as_deref(), self.overrides())
    }
}
