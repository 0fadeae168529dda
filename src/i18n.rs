use std::collections::HashMap;

use fluent_templates::{
    fluent_bundle::{FluentArgs, FluentValue},
    static_loader, Loader,
};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

use crate::core::config;

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "bn",
        customise: |bundle| bundle.set_use_isolating(false),
    };
}

/// Supported languages (code, human-readable name).
pub static SUPPORTED_LANGS: &[(&str, &str)] = &[("bn", "বাংলা"), ("en", "English")];

/// Default language identifier used as a fallback.
static DEFAULT_LANG: Lazy<LanguageIdentifier> = Lazy::new(|| "bn".parse().unwrap());

/// Operator-configured language, resolved once from BOT_LANG.
static OPERATOR_LANG: Lazy<LanguageIdentifier> = Lazy::new(|| lang_from_code(&config::BOT_LANG));

/// Normalizes a language code into a LanguageIdentifier (falls back to default).
pub fn lang_from_code(code: &str) -> LanguageIdentifier {
    let normalized = code.split('-').next().unwrap_or(code).to_lowercase();
    normalized.parse().unwrap_or_else(|_| DEFAULT_LANG.clone())
}

/// The language every outbound message is rendered in.
///
/// All replies (user-facing and admin-facing alike) use the operator's
/// configured language; there is no per-user language selection.
pub fn bot_lang() -> &'static LanguageIdentifier {
    &OPERATOR_LANG
}

/// Returns a localized string for the given key.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t(lang: &LanguageIdentifier, key: &str) -> String {
    let text = LOCALES
        .lookup(lang, key)
        .unwrap_or_else(|| LOCALES.lookup(&DEFAULT_LANG, key).unwrap_or_else(|| key.to_string()));
    text.replace("\\n", "\n")
}

/// Returns a localized string with arguments for interpolation.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t_args(lang: &LanguageIdentifier, key: &str, args: &FluentArgs) -> String {
    let args_map: HashMap<String, FluentValue> = args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();

    let text = LOCALES.lookup_with_args(lang, key, &args_map).unwrap_or_else(|| {
        LOCALES
            .lookup_with_args(&DEFAULT_LANG, key, &args_map)
            .unwrap_or_else(|| key.to_string())
    });
    text.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_known_translation() {
        let bn = lang_from_code("bn");
        let en = lang_from_code("en");

        assert_eq!(t(&bn, "menu-profile"), "আমার প্রোফাইল");
        assert_eq!(t(&en, "menu-profile"), "My profile");
    }

    #[test]
    fn unknown_language_falls_back_to_default() {
        let es = lang_from_code("es");
        assert_eq!(t(&es, "menu-profile"), "আমার প্রোফাইল");
    }

    #[test]
    fn unknown_key_passes_through() {
        let bn = lang_from_code("bn");
        assert_eq!(t(&bn, "no-such-key"), "no-such-key");
    }

    #[test]
    fn converts_newlines() {
        let en = lang_from_code("en");
        let mut args = FluentArgs::new();
        args.set("reward", "20");
        args.set("fee", "50");
        args.set("payment_number", "01700000000");
        let text = t_args(&en, "start-welcome", &args);

        // Should contain actual newlines, not literal \n
        assert!(text.contains('\n'));
        assert!(!text.contains("\\n"));
        assert!(text.contains("01700000000"));
    }

    #[test]
    fn interpolates_amounts() {
        let bn = lang_from_code("bn");
        let mut args = FluentArgs::new();
        args.set("amount", "75");
        let text = t_args(&bn, "withdraw-accepted", &args);
        assert!(text.contains("75"));
    }
}
