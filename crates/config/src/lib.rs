//! Configuration for a poster rendering run.
//!
//! A [`RenderConfig`] is assembled once per invocation from several layers,
//! later layers overriding earlier ones:
//!
//! 1. built-in defaults ([`RenderConfig::default`]),
//! 2. a TOML file (explicit path, or `poster.toml` in the user config directory),
//! 3. environment variables prefixed with `POSTER_` (nested keys split on `__`;
//!    flags named differently from their field, such as `POSTER_NAV_TIMEOUT`,
//!    `POSTER_STYLE` and `POSTER_HEADFUL`, are accepted under the flag name),
//! 4. whatever the caller merges last, normally the command-line flags.
//!
//! Values are not validated beyond their types: an angle of 720 or a
//! resolution of 9 is handed to the page as-is.

pub mod error;
mod lenient;
mod policy;
mod scheme;

pub use crate::policy::{BatchPolicy, TimeoutAction, TimeoutPolicy, TitleVisibility};
pub use crate::scheme::{Scheme, SchemeSelection};
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::Provider;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::{Uncased, UncasedStr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix for environment variable overrides (`POSTER_DATASET=museums`).
pub const ENV_PREFIX: &str = "POSTER_";
/// File name looked up in the user configuration directory.
pub const CONFIG_FILE_NAME: &str = "poster.toml";

/// Browser viewport the page is laid out in before printing.
///
/// The default is A3 at 300 DPI, which keeps canvas output sharp at print size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}
impl Default for Viewport {
    fn default() -> Self {
        Self { width: 3508, height: 4961, scale_factor: 1.0 }
    }
}

/// Everything one invocation needs to know. Immutable once resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    #[serde(deserialize_with = "lenient::string")]
    pub dataset: String,
    #[serde(deserialize_with = "lenient::string")]
    pub metric: String,
    pub angle: i32,
    pub res: u8,
    pub title: TitleVisibility,
    #[serde(deserialize_with = "lenient::optional_string")]
    pub title_align: Option<String>,
    pub title_scale: Option<f64>,
    pub scheme: SchemeSelection,
    /// Output file for a single-scheme run.
    #[serde(deserialize_with = "lenient::path")]
    pub out: PathBuf,
    /// Directory receiving `poster_a3_<scheme>.pdf` files when every scheme is rendered.
    #[serde(deserialize_with = "lenient::path")]
    pub out_dir: PathBuf,
    /// Port for the local server; probed upwards from a fixed base when absent.
    pub port: Option<u16>,
    /// Render a page that is already being served elsewhere instead of serving `root`.
    #[serde(deserialize_with = "lenient::optional_string")]
    pub url: Option<String>,
    /// Directory served by the local static server.
    #[serde(deserialize_with = "lenient::path")]
    pub root: PathBuf,
    /// Document under `root` that hosts the visualization.
    #[serde(deserialize_with = "lenient::string")]
    pub page: String,
    /// Extra stylesheets injected after the builtin poster style.
    #[serde(deserialize_with = "lenient::paths")]
    pub styles: Vec<PathBuf>,
    pub viewport: Viewport,
    /// How long to wait for the page to report that rendering is done.
    pub timeout: TimeoutPolicy,
    /// How long navigation may take to reach network quiescence.
    pub navigation_timeout: TimeoutPolicy,
    pub on_timeout: TimeoutAction,
    pub on_failure: BatchPolicy,
    /// Explicit Chrome/Chromium executable; discovered on `PATH` otherwise.
    #[serde(deserialize_with = "lenient::optional_path")]
    pub chrome: Option<PathBuf>,
    pub headless: bool,
}
impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dataset: "stations".to_string(),
            metric: "l1".to_string(),
            angle: 29,
            res: 1,
            title: TitleVisibility::On,
            title_align: None,
            title_scale: None,
            scheme: SchemeSelection::default(),
            out: PathBuf::from("poster_a3.pdf"),
            out_dir: PathBuf::from("."),
            port: None,
            url: None,
            root: PathBuf::from("."),
            page: "index.html".to_string(),
            styles: Vec::new(),
            viewport: Viewport::default(),
            timeout: TimeoutPolicy::Bounded(Duration::from_secs(120)),
            navigation_timeout: TimeoutPolicy::Bounded(Duration::from_secs(60)),
            on_timeout: TimeoutAction::default(),
            on_failure: BatchPolicy::default(),
            chrome: None,
            headless: true,
        }
    }
}

/// One unit of work: render one scheme into one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PosterJob {
    pub scheme: Scheme,
    pub output: PathBuf,
}

impl RenderConfig {
    /// Resolve the configuration from every layer, with `overrides` applied last.
    ///
    /// An explicit `file` must exist; without one, the user configuration
    /// directory is searched and silently skipped when nothing is there.
    pub fn resolve(file: Option<&Path>, overrides: impl Provider) -> Result<Self> {
        if let Some(path) = file
            && !path.is_file()
        {
            exn::bail!(ErrorKind::FileNotFound(path.to_path_buf()));
        }
        let file = file.map(Path::to_path_buf).or_else(default_config_file);
        Self::from_figment(Self::layered(file).merge(overrides))
    }

    /// Defaults, optional file and environment, without any caller overrides.
    pub fn layered(file: Option<PathBuf>) -> Figment {
        let figment = Figment::from(Serialized::defaults(RenderConfig::default()));
        let figment = match file {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading configuration file");
                figment.merge(Toml::file(path))
            },
            None => figment,
        };
        figment.merge(Env::prefixed(ENV_PREFIX).map(flag_key).split("__")).merge(headful_env())
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract().map_err(|e| ErrorKind::Invalid(e.to_string()))?)
    }

    /// Expand the scheme selection into jobs.
    ///
    /// A single scheme writes to [`out`](Self::out); every scheme writes
    /// `poster_a3_<scheme>.pdf` into [`out_dir`](Self::out_dir), so no two jobs
    /// of one run share an output path.
    pub fn jobs(&self) -> Vec<PosterJob> {
        match self.scheme {
            SchemeSelection::One(scheme) => vec![PosterJob { scheme, output: self.out.clone() }],
            SchemeSelection::All => Scheme::ALL
                .into_iter()
                .map(|scheme| PosterJob { scheme, output: self.out_dir.join(format!("poster_a3_{scheme}.pdf")) })
                .collect(),
        }
    }

    /// Whether a local static server is needed for this run.
    pub fn serves_locally(&self) -> bool {
        self.url.is_none()
    }
}

/// Environment keys named after their command-line flag rather than the field.
fn flag_key(key: &UncasedStr) -> Uncased<'_> {
    match key.as_str() {
        "nav_timeout" => "navigation_timeout".into(),
        "style" => "styles".into(),
        _ => key.into(),
    }
}

/// `POSTER_HEADFUL` as the inverse of `headless`. Unreadable values are passed
/// on under `headless` so extraction reports them.
fn headful_env() -> Figment {
    let env = Figment::from(Env::prefixed(ENV_PREFIX).only(&["headful"]));
    match env.find_value("headful") {
        Ok(value) => match value.to_bool_lossy() {
            Some(headful) => Figment::from(Serialized::default("headless", !headful)),
            None => Figment::from(Serialized::default("headless", value)),
        },
        Err(_) => Figment::new(),
    }
}

fn default_config_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "poster")?;
    let path = dirs.config_dir().join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use std::collections::HashSet;

    fn resolve_in(jail: &Jail, file: Option<&str>) -> RenderConfig {
        let file = file.map(|name| jail.directory().join(name));
        RenderConfig::from_figment(RenderConfig::layered(file)).unwrap()
    }

    #[test]
    fn defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.dataset, "stations");
        assert_eq!(config.metric, "l1");
        assert_eq!(config.angle, 29);
        assert_eq!(config.res, 1);
        assert_eq!(config.title, TitleVisibility::On);
        assert_eq!(config.scheme, SchemeSelection::One(Scheme::Ocean));
        assert_eq!(config.out, PathBuf::from("poster_a3.pdf"));
        assert_eq!(config.port, None);
        assert!(config.serves_locally());
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("POSTER_DATASET", "museums");
            jail.set_env("POSTER_METRIC", "l2");
            jail.set_env("POSTER_RES", "2");
            jail.set_env("POSTER_SCHEME", "all");
            jail.set_env("POSTER_TITLE", "off");
            jail.set_env("POSTER_TIMEOUT", "0");
            jail.set_env("POSTER_VIEWPORT__WIDTH", "1200");
            let config = resolve_in(jail, None);
            assert_eq!(config.dataset, "museums");
            assert_eq!(config.metric, "l2");
            assert_eq!(config.res, 2);
            assert_eq!(config.scheme, SchemeSelection::All);
            assert_eq!(config.title, TitleVisibility::Off);
            assert_eq!(config.timeout, TimeoutPolicy::Unbounded);
            assert_eq!(config.viewport.width, 1200);
            assert_eq!(config.viewport.height, Viewport::default().height);
            Ok(())
        });
    }

    #[test]
    fn out_of_range_values_pass_through() {
        Jail::expect_with(|jail| {
            jail.set_env("POSTER_ANGLE", "720");
            jail.set_env("POSTER_RES", "9");
            let config = resolve_in(jail, None);
            assert_eq!(config.angle, 720);
            assert_eq!(config.res, 9);
            Ok(())
        });
    }

    #[test]
    fn file_then_environment_then_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file("poster.toml", "dataset = \"museums\"\nmetric = \"l2\"\nangle = 10\non_failure = \"abort\"")?;
            jail.set_env("POSTER_METRIC", "linf");
            let figment = RenderConfig::layered(Some(jail.directory().join("poster.toml")))
                .merge(Serialized::default("angle", 45));
            let config = RenderConfig::from_figment(figment).unwrap();
            assert_eq!(config.dataset, "museums");
            assert_eq!(config.metric, "linf");
            assert_eq!(config.angle, 45);
            assert_eq!(config.on_failure, BatchPolicy::Abort);
            Ok(())
        });
    }

    #[test]
    fn flag_named_environment_variables() {
        Jail::expect_with(|jail| {
            jail.set_env("POSTER_NAV_TIMEOUT", "5");
            jail.set_env("POSTER_STYLE", "x.css");
            jail.set_env("POSTER_HEADFUL", "true");
            let config = resolve_in(jail, None);
            assert_eq!(config.navigation_timeout, TimeoutPolicy::Bounded(Duration::from_secs(5)));
            assert_eq!(config.styles, vec![PathBuf::from("x.css")]);
            assert!(!config.headless);
            Ok(())
        });
    }

    #[rstest]
    #[case("1", false)]
    #[case("false", true)]
    #[case("off", true)]
    fn headful_environment_inverts_headless(#[case] value: &str, #[case] headless: bool) {
        Jail::expect_with(|jail| {
            jail.set_env("POSTER_HEADFUL", value);
            assert_eq!(resolve_in(jail, None).headless, headless);
            Ok(())
        });
    }

    #[test]
    fn several_styles_from_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("POSTER_STYLE", "[a.css, b.css]");
            assert_eq!(resolve_in(jail, None).styles, vec![PathBuf::from("a.css"), PathBuf::from("b.css")]);
            Ok(())
        });
    }

    #[test]
    fn numeric_text_values_are_kept_as_text() {
        Jail::expect_with(|jail| {
            jail.set_env("POSTER_DATASET", "2024");
            jail.set_env("POSTER_METRIC", "2");
            jail.set_env("POSTER_PAGE", "404");
            jail.set_env("POSTER_TITLE_ALIGN", "1");
            jail.set_env("POSTER_OUT", "2024");
            let config = resolve_in(jail, None);
            assert_eq!(config.dataset, "2024");
            assert_eq!(config.metric, "2");
            assert_eq!(config.page, "404");
            assert_eq!(config.title_align.as_deref(), Some("1"));
            assert_eq!(config.out, PathBuf::from("2024"));
            Ok(())
        });
    }

    #[test]
    fn unreadable_headful_is_a_configuration_error() {
        Jail::expect_with(|jail| {
            jail.set_env("POSTER_HEADFUL", "maybe");
            let result = RenderConfig::from_figment(RenderConfig::layered(None));
            assert!(matches!(&*result.unwrap_err(), ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn invalid_scheme_is_a_configuration_error() {
        Jail::expect_with(|jail| {
            jail.set_env("POSTER_SCHEME", "neon");
            let result = RenderConfig::from_figment(RenderConfig::layered(None));
            assert!(matches!(&*result.unwrap_err(), ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let result = RenderConfig::resolve(Some(&missing), Serialized::defaults(RenderConfig::default()));
        assert!(matches!(&*result.unwrap_err(), ErrorKind::FileNotFound(_)));
    }

    #[rstest]
    #[case(Scheme::Ocean)]
    #[case(Scheme::Mono)]
    fn single_scheme_writes_configured_output(#[case] scheme: Scheme) {
        let config = RenderConfig {
            scheme: SchemeSelection::One(scheme),
            out: PathBuf::from("poster_a3_museums.pdf"),
            ..RenderConfig::default()
        };
        assert_eq!(config.jobs(), vec![PosterJob { scheme, output: PathBuf::from("poster_a3_museums.pdf") }]);
    }

    #[test]
    fn all_schemes_write_distinct_outputs() {
        let config = RenderConfig {
            scheme: SchemeSelection::All,
            out: PathBuf::from("ignored.pdf"),
            out_dir: PathBuf::from("posters"),
            ..RenderConfig::default()
        };
        let jobs = config.jobs();
        assert_eq!(jobs.len(), 4);
        let outputs: HashSet<_> = jobs.iter().map(|job| job.output.clone()).collect();
        assert_eq!(outputs.len(), 4);
        for job in &jobs {
            assert_eq!(job.output, Path::new("posters").join(format!("poster_a3_{}.pdf", job.scheme)));
        }
    }
}
