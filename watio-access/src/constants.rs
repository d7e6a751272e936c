//! Shared bounds and storage keys.
//!
//! Storage keys match the ones written by earlier releases of the dashboard,
//! so preferences saved on a device keep loading after upgrades. Every key is
//! read on its own; there is no monolithic settings blob to migrate.

pub const FONT_SIZE_MIN: u8 = 12;
pub const FONT_SIZE_MAX: u8 = 24;
pub const FONT_SIZE_DEFAULT: u8 = 16;
/// Step used by the voice and keyboard "aumentar/disminuir texto" actions.
pub const FONT_SIZE_STEP: i16 = 2;

pub const KEY_PROFILE: &str = "accessibility_perfil";
pub const KEY_THEME: &str = "theme_pref";
pub const KEY_FONT_SIZE: &str = "accessibility_font_size";
pub const KEY_HIGH_CONTRAST: &str = "accessibility_high_contrast";
pub const KEY_TTS: &str = "accessibility_tts";
pub const KEY_LINK_HIGHLIGHT: &str = "accessibility_link_highlight";
pub const KEY_SPACING: &str = "accessibility_spacing";
pub const KEY_FONT_FAMILY: &str = "accessibility_font_family";
pub const KEY_CUSTOM_COLORS: &str = "accessibility_custom_colors";
pub const KEY_CUSTOM_COLORS_ENABLED: &str = "accessibility_custom_colors_enabled";
pub const KEY_LETTER_SPACING: &str = "accessibility_letter_spacing";
pub const KEY_LINE_HEIGHT: &str = "accessibility_line_height";
pub const KEY_CUSTOM_SHORTCUTS: &str = "accessibility_custom_shortcuts";
pub const KEY_VOICE_CONTROL: &str = "accessibility_voice_control";

/// Every key owned by the engine, in load order.
pub const ALL_KEYS: [&str; 14] = [
    KEY_PROFILE,
    KEY_THEME,
    KEY_FONT_SIZE,
    KEY_HIGH_CONTRAST,
    KEY_TTS,
    KEY_LINK_HIGHLIGHT,
    KEY_SPACING,
    KEY_FONT_FAMILY,
    KEY_CUSTOM_COLORS,
    KEY_CUSTOM_COLORS_ENABLED,
    KEY_LETTER_SPACING,
    KEY_LINE_HEIGHT,
    KEY_CUSTOM_SHORTCUTS,
    KEY_VOICE_CONTROL,
];

/// Locale handed to the speech recognition engine.
pub const RECOGNITION_LANG: &str = "es-ES";

/// Clamp a requested font size into the supported range.
#[must_use]
pub fn clamp_font_size(requested: i32) -> u8 {
    let clamped = requested.clamp(i32::from(FONT_SIZE_MIN), i32::from(FONT_SIZE_MAX));
    u8::try_from(clamped).unwrap_or(FONT_SIZE_DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_font_size_respects_bounds() {
        assert_eq!(clamp_font_size(10), FONT_SIZE_MIN);
        assert_eq!(clamp_font_size(26), FONT_SIZE_MAX);
        assert_eq!(clamp_font_size(18), 18);
        assert_eq!(clamp_font_size(i32::MIN), FONT_SIZE_MIN);
    }

    #[test]
    fn keys_are_unique() {
        let mut keys = ALL_KEYS.to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ALL_KEYS.len());
    }
}
