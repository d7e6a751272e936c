//! Fine-grained, device-local preferences.
use crate::constants::{FONT_SIZE_DEFAULT, clamp_font_size};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Chord string (`ctrl+shift+c`) to action id (`toggleContrast`).
pub type ShortcutMap = BTreeMap<String, String>;

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $id:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn id(self) -> &'static str {
                match self {
                    $(Self::$variant => $id),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($id => Ok(Self::$variant),)+
                    other => Err(UnknownChoice {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

choice_enum! {
    /// Typeface override for body text.
    FontFamily {
        Default => "default",
        Arial => "arial",
        Verdana => "verdana",
        OpenDyslexic => "opendyslexic",
        Comic => "comic",
    }
}

choice_enum! {
    /// Gap around interactive controls.
    Spacing {
        Normal => "normal",
        Medium => "medium",
        Wide => "wide",
    }
}

choice_enum! {
    LetterSpacing {
        Normal => "normal",
        Wide => "wide",
        Wider => "wider",
    }
}

choice_enum! {
    LineHeight {
        Normal => "normal",
        Relaxed => "relaxed",
        Loose => "loose",
    }
}

impl FontFamily {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Predeterminada",
            Self::Arial => "Arial",
            Self::Verdana => "Verdana",
            Self::OpenDyslexic => "OpenDyslexic",
            Self::Comic => "Comic Sans",
        }
    }

    /// CSS font stack, `None` for the stylesheet default.
    #[must_use]
    pub const fn css_stack(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Arial => Some("Arial, Helvetica, sans-serif"),
            Self::Verdana => Some("Verdana, Geneva, sans-serif"),
            Self::OpenDyslexic => Some("'OpenDyslexic', 'Comic Sans MS', sans-serif"),
            Self::Comic => Some("'Comic Sans MS', 'Comic Neue', cursive"),
        }
    }
}

impl Spacing {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Medium => "Medio",
            Self::Wide => "Amplio",
        }
    }

    #[must_use]
    pub const fn rem(self) -> f32 {
        match self {
            Self::Normal => 0.5,
            Self::Medium => 1.0,
            Self::Wide => 1.5,
        }
    }
}

impl LetterSpacing {
    #[must_use]
    pub const fn css_value(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Wide => "0.05em",
            Self::Wider => "0.1em",
        }
    }
}

impl LineHeight {
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::Normal => 1.5,
            Self::Relaxed => 1.75,
            Self::Loose => 2.0,
        }
    }
}

fn hex_color() -> Option<&'static Regex> {
    static HEX_COLOR: OnceLock<Option<Regex>> = OnceLock::new();
    HEX_COLOR
        .get_or_init(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").ok())
        .as_ref()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour value: {0:?}")]
pub struct ColorError(pub String);

/// Validated CSS hex colour, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorValue(String);

impl ColorValue {
    /// # Errors
    ///
    /// Returns an error unless the input is `#rgb` or `#rrggbb`.
    pub fn parse(raw: &str) -> Result<Self, ColorError> {
        let trimmed = raw.trim();
        if hex_color().is_some_and(|re| re.is_match(trimmed)) {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Err(ColorError(raw.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn white() -> Self {
        Self("#ffffff".to_string())
    }

    fn black() -> Self {
        Self("#000000".to_string())
    }
}

impl TryFrom<String> for ColorValue {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ColorValue> for String {
    fn from(value: ColorValue) -> Self {
        value.0
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomColors {
    pub background: ColorValue,
    pub text: ColorValue,
}

impl Default for CustomColors {
    fn default() -> Self {
        Self {
            background: ColorValue::white(),
            text: ColorValue::black(),
        }
    }
}

#[derive(Deserialize)]
struct RawCustomColors {
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl CustomColors {
    /// Parse stored JSON, default-filling missing or invalid members.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is not a JSON object.
    pub fn from_stored(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawCustomColors = serde_json::from_str(json)?;
        let defaults = Self::default();
        Ok(Self {
            background: raw
                .background
                .and_then(|c| ColorValue::parse(&c).ok())
                .unwrap_or(defaults.background),
            text: raw
                .text
                .and_then(|c| ColorValue::parse(&c).ok())
                .unwrap_or(defaults.text),
        })
    }
}

/// Every fine-grained accessibility setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSet {
    pub dark_mode: bool,
    pub font_size_px: u8,
    pub font_family: FontFamily,
    pub high_contrast: bool,
    pub text_to_speech: bool,
    pub link_highlight: bool,
    pub spacing: Spacing,
    pub letter_spacing: LetterSpacing,
    pub line_height: LineHeight,
    pub custom_colors: CustomColors,
    pub custom_colors_enabled: bool,
    pub custom_shortcuts: ShortcutMap,
    pub voice_control_enabled: bool,
}

impl Default for PreferenceSet {
    fn default() -> Self {
        Self::with_dark_mode(false)
    }
}

impl PreferenceSet {
    /// Defaults for a fresh device, seeded with the OS colour-scheme hint.
    #[must_use]
    pub fn with_dark_mode(dark_mode: bool) -> Self {
        Self {
            dark_mode,
            font_size_px: FONT_SIZE_DEFAULT,
            font_family: FontFamily::default(),
            high_contrast: false,
            text_to_speech: false,
            link_highlight: false,
            spacing: Spacing::default(),
            letter_spacing: LetterSpacing::default(),
            line_height: LineHeight::default(),
            custom_colors: CustomColors::default(),
            custom_colors_enabled: false,
            custom_shortcuts: ShortcutMap::new(),
            voice_control_enabled: false,
        }
    }

    /// Font size after clamping, for values built outside the setters.
    #[must_use]
    pub fn bounded_font_size(&self) -> u8 {
        clamp_font_size(i32::from(self.font_size_px))
    }
}
