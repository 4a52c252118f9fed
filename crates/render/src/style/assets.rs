//! Embedded assets for rendering.
//!
//! This module provides access to the CSS injected into poster pages, embedded
//! into the binary at compile time using [`rust-embed`](rust_embed).

use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use rust_embed::Embed;
use std::borrow::Cow;

#[derive(Embed)]
#[folder = "../../assets/styles/"]
pub struct Builtins;
impl Builtins {
    /// Get the CSS content for a builtin style by name.
    pub fn load(name: impl AsRef<str>) -> Result<Cow<'static, str>> {
        let data = Self::get(name.as_ref())
            .map(|f| f.data)
            .ok_or_raise(|| ErrorKind::AssetNotFound(Self::identifier(&name)))?;
        Ok(match data {
            Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
            Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
        })
    }

    pub fn exists(name: impl AsRef<str>) -> bool {
        Self::get(name.as_ref()).is_some()
    }

    pub(crate) fn identifier(name: impl AsRef<str>) -> String {
        format!("builtin:{}", name.as_ref().trim().trim_start_matches("builtin:"))
    }
}
