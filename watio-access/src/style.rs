//! Declarative styling model.
//!
//! The engine never touches a document directly. It derives a [`StyleModel`]
//! (document classes plus CSS custom properties) from the current state and
//! hands the minimal set of [`StyleOp`]s to a [`StyleSurface`]. The class and
//! variable names below are the contract with the stylesheet and the
//! presentation components.
use crate::prefs::PreferenceSet;
use crate::profile::AccessibilityProfile;
use std::collections::{BTreeMap, BTreeSet};

pub const VAR_FONT_SIZE_BASE: &str = "--font-size-base";
pub const VAR_FONT_SCALE: &str = "--font-scale";
pub const VAR_FONT_FAMILY: &str = "--font-family-base";
pub const VAR_CONTRAST_BOOST: &str = "--contrast-boost";
pub const VAR_SPACING_INTERACTIVE: &str = "--spacing-interactive";
pub const VAR_LETTER_SPACING: &str = "--letter-spacing";
pub const VAR_LINE_HEIGHT: &str = "--line-height";
pub const VAR_CUSTOM_BG: &str = "--custom-bg";
pub const VAR_CUSTOM_TEXT: &str = "--custom-text";
pub const VAR_ANIMATION_DURATION: &str = "--animation-duration";
pub const VAR_PREFERS_VISUAL_ALERTS: &str = "--prefers-visual-alerts";
pub const VAR_PREFERS_REDUCED_MOTION: &str = "--prefers-reduced-motion";
pub const VAR_TARGET_SIZE_MIN: &str = "--target-size-min";
pub const VAR_CONTENT_MAX_WIDTH: &str = "--content-max-width";

pub const CLASS_DARK: &str = "dark";
pub const CLASS_HIGH_CONTRAST: &str = "high-contrast";
pub const CLASS_LINK_HIGHLIGHT: &str = "link-highlight";
pub const CLASS_CUSTOM_COLORS: &str = "custom-colors";
pub const CLASS_VOICE_ACTIVE: &str = "voice-control-active";

/// Variables written only by profile overlays.
pub const PROFILE_SCOPED_VARIABLES: [&str; 6] = [
    VAR_FONT_SCALE,
    VAR_ANIMATION_DURATION,
    VAR_PREFERS_VISUAL_ALERTS,
    VAR_PREFERS_REDUCED_MOTION,
    VAR_TARGET_SIZE_MIN,
    VAR_CONTENT_MAX_WIDTH,
];

const HIGH_CONTRAST_BOOST: f32 = 1.5;
const VISUAL_CONTRAST_BOOST: f32 = 1.2;
const MOTOR_SPACING_REM: f32 = 1.0;
const COGNITIVE_LINE_HEIGHT: f32 = 1.8;

/// Document-level styling primitives.
pub trait StyleSurface {
    fn set_property(&self, name: &str, value: &str);
    fn remove_property(&self, name: &str);
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleOp {
    SetProperty { name: &'static str, value: String },
    RemoveProperty(&'static str),
    AddClass(String),
    RemoveClass(String),
}

impl StyleOp {
    pub fn apply<D: StyleSurface + ?Sized>(&self, surface: &D) {
        match self {
            Self::SetProperty { name, value } => surface.set_property(name, value),
            Self::RemoveProperty(name) => surface.remove_property(name),
            Self::AddClass(class) => surface.add_class(class),
            Self::RemoveClass(class) => surface.remove_class(class),
        }
    }
}

/// Apply ops in order.
pub fn apply_ops<D: StyleSurface + ?Sized>(surface: &D, ops: &[StyleOp]) {
    for op in ops {
        op.apply(surface);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleModel {
    classes: BTreeSet<String>,
    variables: BTreeMap<&'static str, String>,
}

fn number(value: f32) -> String {
    format!("{value}")
}

impl StyleModel {
    /// Derive the styling for a state snapshot.
    #[must_use]
    pub fn derive(
        profile: AccessibilityProfile,
        prefs: &PreferenceSet,
        voice_active: bool,
    ) -> Self {
        let mut model = Self::default();

        if prefs.dark_mode {
            model.add_class(CLASS_DARK);
        }
        if prefs.high_contrast {
            model.add_class(CLASS_HIGH_CONTRAST);
        }
        if prefs.link_highlight {
            model.add_class(CLASS_LINK_HIGHLIGHT);
        }
        if voice_active {
            model.add_class(CLASS_VOICE_ACTIVE);
        }
        model.add_class(&format!("spacing-{}", prefs.spacing.id()));
        if let Some(stack) = prefs.font_family.css_stack() {
            model.add_class(&format!("font-{}", prefs.font_family.id()));
            model.set(VAR_FONT_FAMILY, stack.to_string());
        }
        if prefs.custom_colors_enabled {
            model.add_class(CLASS_CUSTOM_COLORS);
            model.set(VAR_CUSTOM_BG, prefs.custom_colors.background.to_string());
            model.set(VAR_CUSTOM_TEXT, prefs.custom_colors.text.to_string());
        }

        model.set(
            VAR_FONT_SIZE_BASE,
            format!("{}px", prefs.bounded_font_size()),
        );
        model.set(VAR_LETTER_SPACING, prefs.letter_spacing.css_value().to_string());

        let mut spacing_rem = prefs.spacing.rem();
        let mut line_height = prefs.line_height.factor();
        let mut contrast_boost = prefs.high_contrast.then_some(HIGH_CONTRAST_BOOST);

        if let Some(class) = profile.class_name() {
            model.classes.insert(class);
        }
        match profile {
            AccessibilityProfile::None => {}
            AccessibilityProfile::Visual => {
                model.set(VAR_FONT_SCALE, "1.125".to_string());
                contrast_boost = Some(contrast_boost.map_or(VISUAL_CONTRAST_BOOST, |boost| {
                    boost.max(VISUAL_CONTRAST_BOOST)
                }));
            }
            AccessibilityProfile::Auditory => {
                model.set(VAR_ANIMATION_DURATION, "0.6s".to_string());
                model.set(VAR_PREFERS_VISUAL_ALERTS, "1".to_string());
                model.set(VAR_PREFERS_REDUCED_MOTION, "1".to_string());
            }
            AccessibilityProfile::Motor => {
                model.set(VAR_TARGET_SIZE_MIN, "48px".to_string());
                spacing_rem = spacing_rem.max(MOTOR_SPACING_REM);
            }
            AccessibilityProfile::Cognitive => {
                model.set(VAR_CONTENT_MAX_WIDTH, "65ch".to_string());
                line_height = line_height.max(COGNITIVE_LINE_HEIGHT);
            }
        }

        model.set(VAR_SPACING_INTERACTIVE, format!("{}rem", number(spacing_rem)));
        model.set(VAR_LINE_HEIGHT, number(line_height));
        if let Some(boost) = contrast_boost {
            model.set(VAR_CONTRAST_BOOST, number(boost));
        }

        model
    }

    fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    fn set(&mut self, name: &'static str, value: String) {
        self.variables.insert(name, value);
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.variables.iter().map(|(name, value)| (*name, value.as_str()))
    }

    /// Ops turning a surface showing `self` into one showing `next`.
    ///
    /// Stale entries are removed before new ones are written.
    #[must_use]
    pub fn diff(&self, next: &Self) -> Vec<StyleOp> {
        let mut ops = Vec::new();
        for name in self.variables.keys() {
            if !next.variables.contains_key(name) {
                ops.push(StyleOp::RemoveProperty(*name));
            }
        }
        for class in self.classes.difference(&next.classes) {
            ops.push(StyleOp::RemoveClass(class.clone()));
        }
        for (name, value) in &next.variables {
            if self.variables.get(name) != Some(value) {
                ops.push(StyleOp::SetProperty {
                    name: *name,
                    value: value.clone(),
                });
            }
        }
        for class in next.classes.difference(&self.classes) {
            ops.push(StyleOp::AddClass(class.clone()));
        }
        ops
    }

    /// Ops writing the whole model onto an untouched surface.
    #[must_use]
    pub fn full_ops(&self) -> Vec<StyleOp> {
        Self::default().diff(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{FontFamily, LineHeight, Spacing};

    fn prefs() -> PreferenceSet {
        PreferenceSet::with_dark_mode(false)
    }

    #[test]
    fn default_state_sets_base_variables_only() {
        let model = StyleModel::derive(AccessibilityProfile::None, &prefs(), false);
        assert_eq!(model.variable(VAR_FONT_SIZE_BASE), Some("16px"));
        assert_eq!(model.variable(VAR_SPACING_INTERACTIVE), Some("0.5rem"));
        assert_eq!(model.variable(VAR_LINE_HEIGHT), Some("1.5"));
        assert_eq!(model.variable(VAR_CONTRAST_BOOST), None);
        assert!(model.has_class("spacing-normal"));
        assert!(!model.has_class(CLASS_DARK));
        for name in PROFILE_SCOPED_VARIABLES {
            assert_eq!(model.variable(name), None);
        }
    }

    #[test]
    fn profile_overlays_match_vocabulary() {
        let visual = StyleModel::derive(AccessibilityProfile::Visual, &prefs(), false);
        assert_eq!(visual.variable(VAR_FONT_SCALE), Some("1.125"));
        assert_eq!(visual.variable(VAR_CONTRAST_BOOST), Some("1.2"));
        assert!(visual.has_class("perfil-visual"));

        let auditory = StyleModel::derive(AccessibilityProfile::Auditory, &prefs(), false);
        assert_eq!(auditory.variable(VAR_ANIMATION_DURATION), Some("0.6s"));
        assert_eq!(auditory.variable(VAR_PREFERS_VISUAL_ALERTS), Some("1"));
        assert_eq!(auditory.variable(VAR_PREFERS_REDUCED_MOTION), Some("1"));

        let motor = StyleModel::derive(AccessibilityProfile::Motor, &prefs(), false);
        assert_eq!(motor.variable(VAR_TARGET_SIZE_MIN), Some("48px"));
        assert_eq!(motor.variable(VAR_SPACING_INTERACTIVE), Some("1rem"));

        let cognitive = StyleModel::derive(AccessibilityProfile::Cognitive, &prefs(), false);
        assert_eq!(cognitive.variable(VAR_CONTENT_MAX_WIDTH), Some("65ch"));
        assert_eq!(cognitive.variable(VAR_LINE_HEIGHT), Some("1.8"));
    }

    #[test]
    fn shared_variables_keep_the_stronger_value() {
        let mut p = prefs();
        p.high_contrast = true;
        p.spacing = Spacing::Wide;
        p.line_height = LineHeight::Loose;
        let visual = StyleModel::derive(AccessibilityProfile::Visual, &p, false);
        assert_eq!(visual.variable(VAR_CONTRAST_BOOST), Some("1.5"));
        let motor = StyleModel::derive(AccessibilityProfile::Motor, &p, false);
        assert_eq!(motor.variable(VAR_SPACING_INTERACTIVE), Some("1.5rem"));
        let cognitive = StyleModel::derive(AccessibilityProfile::Cognitive, &p, false);
        assert_eq!(cognitive.variable(VAR_LINE_HEIGHT), Some("2"));
    }

    #[test]
    fn switching_profiles_clears_previous_overlay() {
        let p = prefs();
        let auditory = StyleModel::derive(AccessibilityProfile::Auditory, &p, false);
        let motor = StyleModel::derive(AccessibilityProfile::Motor, &p, false);
        let ops = auditory.diff(&motor);
        assert!(ops.contains(&StyleOp::RemoveProperty(VAR_ANIMATION_DURATION)));
        assert!(ops.contains(&StyleOp::RemoveClass("perfil-auditiva".to_string())));
        assert!(ops.contains(&StyleOp::AddClass("perfil-motriz".to_string())));

        let first_set = ops
            .iter()
            .position(|op| matches!(op, StyleOp::SetProperty { .. } | StyleOp::AddClass(_)))
            .unwrap();
        let last_removal = ops
            .iter()
            .rposition(|op| matches!(op, StyleOp::RemoveProperty(_) | StyleOp::RemoveClass(_)))
            .unwrap();
        assert!(last_removal < first_set);
    }

    #[test]
    fn identical_models_diff_to_nothing() {
        let mut p = prefs();
        p.font_family = FontFamily::OpenDyslexic;
        let a = StyleModel::derive(AccessibilityProfile::Motor, &p, true);
        let b = StyleModel::derive(AccessibilityProfile::Motor, &p, true);
        assert!(a.diff(&b).is_empty());
        assert!(a.has_class("font-opendyslexic"));
        assert!(a.has_class(CLASS_VOICE_ACTIVE));
        assert!(!a.full_ops().is_empty());
    }
}
