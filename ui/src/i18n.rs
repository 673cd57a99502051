//! Localized strings for `normscope-ui`.
//!
//! Bundles live in `i18n/<lang>/normscope-ui.ftl` and are embedded at compile
//! time; `en-US` is the fallback every other locale is checked against.
//!
//! ```ignore
//! crate::i18n::init();
//! let title = crate::t!("chart-qq-title");
//! let status = crate::t!("export-saved", path = path);
//! ```
use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use unic_langid::LanguageIdentifier;

pub use i18n_embed_fl::fl;

/// Look up a message through the shared [`LOADER`]; keys are checked against
/// the fallback bundle at compile time.
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Bundle file stem, identical in every locale folder.
const DOMAIN: &str = "normscope-ui";
const FALLBACK: &str = "en-US";

#[derive(Embed)]
#[folder = "i18n"]
struct Bundles;

pub static LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let fallback: LanguageIdentifier = FALLBACK.parse().expect("fallback tag parses");
    FluentLanguageLoader::new(DOMAIN, fallback)
});

static INIT: Once = Once::new();

/// Select the user's preferred languages once; later calls do nothing.
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        match i18n_embed::select(&*LOADER, &Bundles, &requested) {
            Ok(selected) => tracing::debug!(?selected, "languages selected"),
            Err(err) => tracing::warn!("language selection failed ({err}), using {FALLBACK}"),
        }
    });
}

/// Switch to `tag`. Unparseable tags are ignored.
pub fn set_language(tag: &str) -> Result<(), i18n_embed::I18nEmbedError> {
    let Ok(lang) = tag.parse::<LanguageIdentifier>() else {
        tracing::debug!(tag, "ignoring malformed language tag");
        return Ok(());
    };
    i18n_embed::select(&*LOADER, &Bundles, &[lang]).map(|_| ())
}

/// Locale folders embedded in the binary, sorted, for the language picker.
pub fn available_languages() -> Vec<String> {
    let mut langs: Vec<String> = Bundles::iter()
        .filter_map(|path| path.split('/').next().map(str::to_string))
        .collect();
    langs.sort();
    langs.dedup();
    langs
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_locales_are_embedded() {
        assert_eq!(available_languages(), vec!["en-US", "es-ES"]);
    }

    #[test]
    fn fallback_messages_resolve() {
        init();
        let _ = set_language(FALLBACK);
        assert_eq!(fl!(&*LOADER, "chart-qq-title"), "Q-Q plot");
    }

    #[test]
    fn unknown_language_keeps_current_messages() {
        init();
        let _ = set_language(FALLBACK);
        let before = fl!(&*LOADER, "nav-home");
        let _ = set_language("zz-ZZ");
        let _ = set_language("not a tag!");
        assert_eq!(fl!(&*LOADER, "nav-home"), before);
    }
}
