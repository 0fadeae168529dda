//! Reply and inline keyboards

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};
use unic_langid::LanguageIdentifier;

use crate::core::config;
use crate::i18n;

/// The fixed main menu: six labeled buttons in two-per-row layout.
pub fn main_menu_keyboard(lang: &LanguageIdentifier) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(i18n::t(lang, "menu-profile")),
            KeyboardButton::new(i18n::t(lang, "menu-refer")),
        ],
        vec![
            KeyboardButton::new(i18n::t(lang, "menu-withdraw")),
            KeyboardButton::new(i18n::t(lang, "menu-recharge")),
        ],
        vec![
            KeyboardButton::new(i18n::t(lang, "menu-history")),
            KeyboardButton::new(i18n::t(lang, "menu-contact")),
        ],
    ])
    .resize_keyboard()
}

/// Inline link button to the proof-of-earnings group, shown only
/// pre-activation. Returns `None` when GROUP_LINK is unset or unparseable.
pub fn join_group_keyboard(lang: &LanguageIdentifier) -> Option<InlineKeyboardMarkup> {
    let link = config::GROUP_LINK.as_str();
    let url = url::Url::parse(link).ok()?;

    Some(InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        i18n::t(lang, "start-join-group"),
        url,
    )]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_menu_is_six_buttons_in_three_rows() {
        let lang = crate::i18n::lang_from_code("bn");
        let keyboard = main_menu_keyboard(&lang);

        assert_eq!(keyboard.keyboard.len(), 3);
        for row in &keyboard.keyboard {
            assert_eq!(row.len(), 2);
        }
    }

    #[test]
    fn menu_labels_are_localized() {
        let bn = crate::i18n::lang_from_code("bn");
        let en = crate::i18n::lang_from_code("en");

        let bn_first = main_menu_keyboard(&bn).keyboard[0][0].text.clone();
        let en_first = main_menu_keyboard(&en).keyboard[0][0].text.clone();
        assert_eq!(bn_first, "আমার প্রোফাইল");
        assert_eq!(en_first, "My profile");
    }
}
