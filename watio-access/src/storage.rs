//! Local key/value persistence for preferences.
//!
//! Each setting lives under its own string key. Reads fall back to the
//! default of the affected field only; writes never fail the caller.
use crate::constants::{
    KEY_CUSTOM_COLORS, KEY_CUSTOM_COLORS_ENABLED, KEY_CUSTOM_SHORTCUTS, KEY_FONT_FAMILY,
    KEY_FONT_SIZE, KEY_HIGH_CONTRAST, KEY_LETTER_SPACING, KEY_LINE_HEIGHT, KEY_LINK_HIGHLIGHT,
    KEY_PROFILE, KEY_SPACING, KEY_THEME, KEY_TTS, KEY_VOICE_CONTROL, clamp_font_size,
};
use crate::prefs::{CustomColors, PreferenceSet, ShortcutMap};
use crate::profile::AccessibilityProfile;
use std::str::FromStr;

/// Durable string storage on the local device.
pub trait PreferenceStore {
    type Error: std::error::Error + 'static;

    /// Read a raw value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write a raw value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage rejects the write (quota, privacy mode).
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage rejects the removal.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// A single persisted preference field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefField {
    DarkMode,
    FontSize,
    FontFamily,
    HighContrast,
    TextToSpeech,
    LinkHighlight,
    Spacing,
    LetterSpacing,
    LineHeight,
    CustomColors,
    CustomColorsEnabled,
    CustomShortcuts,
    VoiceControl,
}

impl PrefField {
    pub const ALL: [Self; 13] = [
        Self::DarkMode,
        Self::FontSize,
        Self::FontFamily,
        Self::HighContrast,
        Self::TextToSpeech,
        Self::LinkHighlight,
        Self::Spacing,
        Self::LetterSpacing,
        Self::LineHeight,
        Self::CustomColors,
        Self::CustomColorsEnabled,
        Self::CustomShortcuts,
        Self::VoiceControl,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::DarkMode => KEY_THEME,
            Self::FontSize => KEY_FONT_SIZE,
            Self::FontFamily => KEY_FONT_FAMILY,
            Self::HighContrast => KEY_HIGH_CONTRAST,
            Self::TextToSpeech => KEY_TTS,
            Self::LinkHighlight => KEY_LINK_HIGHLIGHT,
            Self::Spacing => KEY_SPACING,
            Self::LetterSpacing => KEY_LETTER_SPACING,
            Self::LineHeight => KEY_LINE_HEIGHT,
            Self::CustomColors => KEY_CUSTOM_COLORS,
            Self::CustomColorsEnabled => KEY_CUSTOM_COLORS_ENABLED,
            Self::CustomShortcuts => KEY_CUSTOM_SHORTCUTS,
            Self::VoiceControl => KEY_VOICE_CONTROL,
        }
    }

    /// String form written to storage for this field.
    #[must_use]
    pub fn encode(self, prefs: &PreferenceSet) -> String {
        match self {
            Self::DarkMode => String::from(if prefs.dark_mode { "dark" } else { "light" }),
            Self::FontSize => prefs.font_size_px.to_string(),
            Self::FontFamily => prefs.font_family.id().to_string(),
            Self::HighContrast => encode_bool(prefs.high_contrast),
            Self::TextToSpeech => encode_bool(prefs.text_to_speech),
            Self::LinkHighlight => encode_bool(prefs.link_highlight),
            Self::Spacing => prefs.spacing.id().to_string(),
            Self::LetterSpacing => prefs.letter_spacing.id().to_string(),
            Self::LineHeight => prefs.line_height.id().to_string(),
            Self::CustomColors => {
                serde_json::to_string(&prefs.custom_colors).unwrap_or_else(|_| "{}".to_string())
            }
            Self::CustomColorsEnabled => encode_bool(prefs.custom_colors_enabled),
            Self::CustomShortcuts => serde_json::to_string(&prefs.custom_shortcuts)
                .unwrap_or_else(|_| "{}".to_string()),
            Self::VoiceControl => encode_bool(prefs.voice_control_enabled),
        }
    }
}

fn encode_bool(value: bool) -> String {
    String::from(if value { "true" } else { "false" })
}

fn read<S: PreferenceStore>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("could not read preference {key}: {err}");
            None
        }
    }
}

fn read_bool<S: PreferenceStore>(store: &S, key: &str, fallback: bool) -> bool {
    match read(store, key).as_deref() {
        Some("true") => true,
        Some("false") => false,
        _ => fallback,
    }
}

fn read_choice<S: PreferenceStore, T: FromStr + Default>(store: &S, key: &str) -> T {
    read(store, key)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default()
}

/// Write a value, logging and swallowing storage failures.
pub fn write_quietly<S: PreferenceStore>(store: &S, key: &str, value: &str) {
    if let Err(err) = store.set(key, value) {
        log::warn!("could not persist preference {key}: {err}");
    }
}

/// Persist one field of `prefs`.
pub fn persist_field<S: PreferenceStore>(store: &S, prefs: &PreferenceSet, field: PrefField) {
    write_quietly(store, field.key(), &field.encode(prefs));
}

/// Persist the active profile.
pub fn persist_profile<S: PreferenceStore>(store: &S, profile: AccessibilityProfile) {
    write_quietly(store, KEY_PROFILE, profile.wire_value());
}

/// Profile explicitly stored on this device, if any.
#[must_use]
pub fn stored_profile<S: PreferenceStore>(store: &S) -> Option<AccessibilityProfile> {
    let raw = read(store, KEY_PROFILE)?;
    match raw.parse() {
        Ok(profile) => Some(profile),
        Err(err) => {
            log::warn!("ignoring stored profile: {err}");
            None
        }
    }
}

/// Load every preference, falling back per field.
///
/// `prefers_dark` is the OS colour-scheme hint, used only when no theme was
/// ever stored.
#[must_use]
pub fn load_preferences<S: PreferenceStore>(store: &S, prefers_dark: bool) -> PreferenceSet {
    let defaults = PreferenceSet::with_dark_mode(prefers_dark);

    let dark_mode = match read(store, KEY_THEME).as_deref() {
        Some("dark") => true,
        Some("light") => false,
        _ => defaults.dark_mode,
    };

    let font_size_px = read(store, KEY_FONT_SIZE)
        .and_then(|raw| raw.trim().parse::<i32>().ok())
        .map_or(defaults.font_size_px, clamp_font_size);

    let custom_colors = read(store, KEY_CUSTOM_COLORS)
        .and_then(|raw| match CustomColors::from_stored(&raw) {
            Ok(colors) => Some(colors),
            Err(err) => {
                log::warn!("ignoring stored custom colours: {err}");
                None
            }
        })
        .unwrap_or_default();

    let custom_shortcuts = read(store, KEY_CUSTOM_SHORTCUTS)
        .and_then(|raw| match serde_json::from_str::<ShortcutMap>(&raw) {
            Ok(map) => Some(crate::keyboard::normalize_shortcuts(&map)),
            Err(err) => {
                log::warn!("ignoring stored shortcuts: {err}");
                None
            }
        })
        .unwrap_or_default();

    PreferenceSet {
        dark_mode,
        font_size_px,
        font_family: read_choice(store, KEY_FONT_FAMILY),
        high_contrast: read_bool(store, KEY_HIGH_CONTRAST, defaults.high_contrast),
        text_to_speech: read_bool(store, KEY_TTS, defaults.text_to_speech),
        link_highlight: read_bool(store, KEY_LINK_HIGHLIGHT, defaults.link_highlight),
        spacing: read_choice(store, KEY_SPACING),
        letter_spacing: read_choice(store, KEY_LETTER_SPACING),
        line_height: read_choice(store, KEY_LINE_HEIGHT),
        custom_colors,
        custom_colors_enabled: read_bool(
            store,
            KEY_CUSTOM_COLORS_ENABLED,
            defaults.custom_colors_enabled,
        ),
        custom_shortcuts,
        voice_control_enabled: read_bool(store, KEY_VOICE_CONTROL, defaults.voice_control_enabled),
    }
}
