//! Target page URLs.

use crate::error::{ErrorKind, Result};
use poster_config::{RenderConfig, Scheme};
use url::Url;

/// Where the visualization page lives: the configured URL, or `page` under the
/// local server's base URL.
pub fn page_url(config: &RenderConfig, server_base: Option<&str>) -> Result<Url> {
    let (base, page) = match (&config.url, server_base) {
        (Some(url), _) => (url.as_str(), ""),
        (None, Some(base)) => (base, config.page.as_str()),
        (None, None) => exn::bail!(ErrorKind::Navigation("no page URL and no local server".to_string())),
    };
    let base = Url::parse(base).map_err(|e| ErrorKind::Navigation(format!("invalid URL `{base}`: {e}")))?;
    Ok(base.join(page).map_err(|e| ErrorKind::Navigation(format!("invalid page `{page}`: {e}")))?)
}

/// Append the poster-mode query parameters for one scheme to `page`.
///
/// `poster` comes first as a bare flag, followed by `scheme`, `res`, `angle`,
/// then `title=off`, `titleAlign` and `titleScale` when configured. Existing
/// query parameters on `page` are kept.
pub fn poster_url(page: &Url, config: &RenderConfig, scheme: Scheme) -> Url {
    let mut url = page.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_key_only("poster")
            .append_pair("scheme", scheme.as_str())
            .append_pair("res", &config.res.to_string())
            .append_pair("angle", &config.angle.to_string());
        if !config.title.is_visible() {
            query.append_pair("title", "off");
        }
        if let Some(align) = &config.title_align {
            query.append_pair("titleAlign", align);
        }
        if let Some(scale) = config.title_scale {
            query.append_pair("titleScale", &scale.to_string());
        }
    }
    url
}
