//! Coarse accessibility profile, the only setting mirrored to the account.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mutually exclusive accessibility profile.
///
/// Serialized with the backend's enum literals (`ninguna`, `visual`,
/// `auditiva`, `motriz`, `cognitiva`); the English identifiers are accepted
/// when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum AccessibilityProfile {
    #[default]
    #[serde(rename = "ninguna", alias = "none")]
    None,
    #[serde(rename = "visual")]
    Visual,
    #[serde(rename = "auditiva", alias = "auditory")]
    Auditory,
    #[serde(rename = "motriz", alias = "motor")]
    Motor,
    #[serde(rename = "cognitiva", alias = "cognitive")]
    Cognitive,
}

impl AccessibilityProfile {
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Visual,
        Self::Auditory,
        Self::Motor,
        Self::Cognitive,
    ];

    /// Value stored locally and in the account row.
    #[must_use]
    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::None => "ninguna",
            Self::Visual => "visual",
            Self::Auditory => "auditiva",
            Self::Motor => "motriz",
            Self::Cognitive => "cognitiva",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Estándar",
            Self::Visual => "Discapacidad Visual",
            Self::Auditory => "Discapacidad Auditiva",
            Self::Motor => "Discapacidad Motriz",
            Self::Cognitive => "Discapacidad Cognitiva",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::None => "Interfaz estándar sin ajustes especiales",
            Self::Visual => "Texto grande, alto contraste, compatibilidad con lectores de pantalla",
            Self::Auditory => "Alertas visuales reforzadas, sin dependencia de audio",
            Self::Motor => "Áreas de clic más grandes, navegación por teclado mejorada",
            Self::Cognitive => "Contenido simplificado, instrucciones claras, menos distracciones",
        }
    }

    /// Document class toggled while the profile is active.
    #[must_use]
    pub fn class_name(self) -> Option<String> {
        match self {
            Self::None => None,
            other => Some(format!("perfil-{}", other.wire_value())),
        }
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown accessibility profile: {0}")]
pub struct UnknownProfile(pub String);

impl FromStr for AccessibilityProfile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ninguna" | "none" => Ok(Self::None),
            "visual" => Ok(Self::Visual),
            "auditiva" | "auditory" => Ok(Self::Auditory),
            "motriz" | "motor" => Ok(Self::Motor),
            "cognitiva" | "cognitive" => Ok(Self::Cognitive),
            other => Err(UnknownProfile(other.to_string())),
        }
    }
}

impl fmt::Display for AccessibilityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_and_english_values() {
        assert_eq!("motriz".parse(), Ok(AccessibilityProfile::Motor));
        assert_eq!("Motor".parse(), Ok(AccessibilityProfile::Motor));
        assert_eq!(" ninguna ".parse(), Ok(AccessibilityProfile::None));
        assert!("sorda".parse::<AccessibilityProfile>().is_err());
    }

    #[test]
    fn serde_uses_backend_literals() {
        let json = serde_json::to_string(&AccessibilityProfile::Cognitive).unwrap();
        assert_eq!(json, "\"cognitiva\"");
        let parsed: AccessibilityProfile = serde_json::from_str("\"auditory\"").unwrap();
        assert_eq!(parsed, AccessibilityProfile::Auditory);
    }

    #[test]
    fn only_real_profiles_carry_a_class() {
        assert_eq!(AccessibilityProfile::None.class_name(), None);
        assert_eq!(
            AccessibilityProfile::Visual.class_name().as_deref(),
            Some("perfil-visual")
        );
        for profile in AccessibilityProfile::ALL {
            assert_eq!(profile.to_string().parse(), Ok(profile));
        }
    }
}
