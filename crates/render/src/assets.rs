//! Templates and styles embedded into the binary at compile time using
//! [`rust-embed`](rust_embed).

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;
use std::borrow::Cow;

#[derive(Embed)]
#[folder = "assets/"]
pub(crate) struct Builtins;
impl Builtins {
    pub(crate) fn load(name: impl AsRef<str>) -> Result<Cow<'static, [u8]>> {
        Self::get(name.as_ref()).map(|f| f.data).ok_or_raise(|| ErrorKind::AssetNotFound(Self::identifier(name)))
    }

    pub(crate) fn load_str(name: impl AsRef<str>) -> Result<String> {
        let name = name.as_ref();
        let data = Self::load(name)?;
        String::from_utf8(data.into_owned()).or_raise(|| ErrorKind::AssetNotFound(Self::identifier(name)))
    }

    pub(crate) fn identifier(name: impl AsRef<str>) -> String {
        format!("builtin:{}", name.as_ref().trim().trim_start_matches("builtin:"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_load_gallery_assets() {
        assert!(!Builtins::load_str("templates/gallery.html").unwrap().is_empty());
        assert!(!Builtins::load_str("styles/gallery.css").unwrap().is_empty());
    }

    #[test]
    fn missing_asset() {
        let err = Builtins::load("styles/missing.css").unwrap_err();
        assert!(matches!(&*err, ErrorKind::AssetNotFound(name) if name == "builtin:styles/missing.css"));
    }
}
