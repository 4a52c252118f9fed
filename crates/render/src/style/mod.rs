//! CSS injected into the page before it is printed.
//!
//! Styles are assembled through [`StyleConfig`]'s builder API, combining
//! compile-time embedded builtins with user-provided files. All styles are
//! read eagerly at construction time so that missing files fail fast rather
//! than once the browser is already running.

mod assets;

use crate::error::{ErrorKind, Result};
use crate::style::assets::Builtins;
use exn::ResultExt;
use poster_config::RenderConfig;
use std::path::Path;

/// Builtin that hides page chrome and stretches the canvas over the page.
pub const POSTER_STYLE: &str = "poster.css";
/// Builtin that hides the decorative title.
pub const NO_TITLE_STYLE: &str = "no-title.css";

enum Style {
    Builtin(String),
    // Styles are constructed once per invocation and injected once per job,
    // so file contents are read during construction.
    UserContent(String),
}

/// An ordered collection of CSS stylesheets to inject into poster pages.
///
/// Styles are applied in insertion order; later styles override earlier ones.
#[derive(Default)]
pub struct StyleConfig {
    styles: Vec<Style>,
}
impl StyleConfig {
    /// Creates an empty style configuration with no stylesheets.
    pub fn new() -> Self {
        Self::default()
    }

    /// The style sheet for a run: the poster builtin, the title builtin when the
    /// title is hidden, then any user stylesheets in configuration order.
    pub fn for_poster(config: &RenderConfig) -> Result<Self> {
        let mut styles = Self::new().with_builtin(POSTER_STYLE)?;
        if !config.title.is_visible() {
            styles = styles.with_builtin(NO_TITLE_STYLE)?;
        }
        for path in &config.styles {
            styles = styles.with_file(path)?;
        }
        Ok(styles)
    }

    /// Appends a builtin stylesheet by name.
    ///
    /// Returns [`ErrorKind::AssetNotFound`](crate::error::ErrorKind::AssetNotFound)
    /// if `name` does not match any embedded asset.
    pub fn with_builtin(mut self, name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if !Builtins::exists(name) {
            exn::bail!(ErrorKind::AssetNotFound(Builtins::identifier(name)));
        }
        self.styles.push(Style::Builtin(name.to_string()));
        Ok(self)
    }

    /// Appends a stylesheet read from a file on disk.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            exn::bail!(ErrorKind::AssetNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path).or_raise(|| ErrorKind::Io)?;
        self.styles.push(Style::UserContent(content));
        Ok(self)
    }

    /// Concatenate every stylesheet, in order, into one block of CSS.
    pub fn to_css(&self) -> Result<String> {
        let mut css = String::new();
        for style in &self.styles {
            match style {
                Style::Builtin(name) => css.push_str(&Builtins::load(name)?),
                Style::UserContent(content) => css.push_str(content),
            }
            css.push('\n');
        }
        Ok(css)
    }
}
