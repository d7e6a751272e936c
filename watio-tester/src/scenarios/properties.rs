//! Single-device properties of the preference engine.
use anyhow::{Result, ensure};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use watio_access::constants::{FONT_SIZE_DEFAULT, FONT_SIZE_MAX, FONT_SIZE_MIN};
use watio_access::style::{PROFILE_SCOPED_VARIABLES, VAR_FONT_SIZE_BASE};
use watio_access::{AccessibilityProfile, LetterSpacing, LineHeight, Spacing};

use super::{Scenario, SeededCheck};
use crate::device::{Device, Engine};

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(SeededCheck::new(
            "smoke",
            "Fresh device loads defaults and paints them",
            smoke,
        )),
        Box::new(SeededCheck::new(
            "font-bounds",
            "Font size setters clamp to the supported range",
            font_bounds,
        )),
        Box::new(SeededCheck::new(
            "profile-cleanup",
            "Leaving a profile removes every profile-scoped style",
            profile_cleanup,
        )),
        Box::new(SeededCheck::new(
            "idempotent-setters",
            "Repeating a setter leaves surface and storage untouched",
            idempotent_setters,
        )),
        Box::new(SeededCheck::new(
            "tts-cancel",
            "Turning read-aloud off silences pending speech",
            tts_cancel,
        )),
    ]
}

fn smoke(rng: &mut ChaCha8Rng) -> Result<()> {
    let prefers_dark = rng.gen_bool(0.5);
    let device = Device::fresh(prefers_dark);
    let prefs = device.engine.preferences();
    ensure!(
        device.engine.profile() == AccessibilityProfile::None,
        "fresh profile is {}",
        device.engine.profile()
    );
    ensure!(prefs.font_size_px == FONT_SIZE_DEFAULT, "font {}", prefs.font_size_px);
    ensure!(prefs.dark_mode == prefers_dark, "dark mode ignores the OS hint");
    ensure!(!prefs.high_contrast && !prefs.link_highlight, "fresh toggles are on");
    ensure!(!prefs.text_to_speech && !prefs.voice_control_enabled, "fresh inputs are on");
    ensure!(prefs.spacing == Spacing::Normal, "spacing {:?}", prefs.spacing);
    ensure!(prefs.letter_spacing == LetterSpacing::Normal, "letter spacing");
    ensure!(prefs.line_height == LineHeight::Normal, "line height");
    ensure!(prefs.custom_shortcuts.is_empty(), "fresh custom shortcuts");
    device.check_all()
}

fn font_bounds(rng: &mut ChaCha8Rng) -> Result<()> {
    let mut device = Device::fresh(false);
    for _ in 0..16 {
        let requested = rng.gen_range(-8..=48);
        let kept = device.engine.set_font_size(requested);
        let expected = requested.clamp(i32::from(FONT_SIZE_MIN), i32::from(FONT_SIZE_MAX));
        ensure!(i32::from(kept) == expected, "asked {requested}, kept {kept}");
        let painted = device.surface.property(VAR_FONT_SIZE_BASE);
        ensure!(
            painted.as_deref() == Some(format!("{kept}px").as_str()),
            "surface shows {painted:?} for {kept}"
        );
        device.check_bounds()?;
    }

    device.engine.set_font_size(i32::from(FONT_SIZE_MAX));
    ensure!(device.engine.adjust_font_size(2) == FONT_SIZE_MAX, "grew past max");
    device.engine.set_font_size(i32::from(FONT_SIZE_MIN));
    ensure!(device.engine.adjust_font_size(-2) == FONT_SIZE_MIN, "shrank past min");
    device.check_persisted()
}

fn profile_cleanup(rng: &mut ChaCha8Rng) -> Result<()> {
    let mut device = Device::fresh(rng.gen_bool(0.5));
    let profiles = &AccessibilityProfile::ALL[1..];
    for _ in 0..4 {
        if let Some(&profile) = profiles.choose(rng) {
            device.engine.apply_profile(profile);
            device.check_surface()?;
        }
    }
    device.engine.apply_profile(AccessibilityProfile::None);

    let classes = device.surface.classes();
    ensure!(
        !classes.iter().any(|class| class.starts_with("perfil-")),
        "profile class survived: {classes:?}"
    );
    let properties = device.surface.properties();
    for name in PROFILE_SCOPED_VARIABLES {
        ensure!(!properties.contains_key(name), "{name} survived the profile");
    }
    device.check_all()
}

type BoolSetter = fn(&mut Engine, bool);

const BOOL_SETTERS: [(&str, BoolSetter); 6] = [
    ("dark_mode", Engine::set_dark_mode),
    ("high_contrast", Engine::set_high_contrast),
    ("link_highlight", Engine::set_link_highlight),
    ("text_to_speech", Engine::set_text_to_speech),
    ("custom_colors_enabled", Engine::set_custom_colors_enabled),
    ("voice_control_enabled", Engine::set_voice_control_enabled),
];

fn idempotent_setters(rng: &mut ChaCha8Rng) -> Result<()> {
    let mut device = Device::fresh(false);
    for _ in 0..12 {
        let Some(&(name, setter)) = BOOL_SETTERS.choose(rng) else {
            continue;
        };
        let value = rng.gen_bool(0.5);
        setter(&mut device.engine, value);
        let mutations = device.surface.mutations();
        let stored = device.store.snapshot();
        let classes = device.surface.classes();
        setter(&mut device.engine, value);
        ensure!(
            device.surface.mutations() == mutations,
            "{name}({value}) touched the surface twice"
        );
        ensure!(device.store.snapshot() == stored, "{name}({value}) changed storage twice");
        ensure!(device.surface.classes() == classes, "{name}({value}) moved classes");
    }
    device.check_all()
}

const PHRASES: [&str; 4] = [
    "Consumo de hoy: 12 kWh",
    "Tema cambiado",
    "Texto aumentado a 18px",
    "Navegando a perfil",
];

fn tts_cancel(rng: &mut ChaCha8Rng) -> Result<()> {
    let mut device = Device::fresh(false);
    ensure!(!device.engine.speak("silencio"), "spoke with read-aloud off");

    device.engine.set_text_to_speech(true);
    let count = rng.gen_range(1..=PHRASES.len());
    for phrase in PHRASES.iter().take(count) {
        ensure!(device.engine.speak(phrase), "did not speak {phrase:?}");
        ensure!(
            device.speech.pending().len() == 1,
            "utterances stacked: {:?}",
            device.speech.pending()
        );
    }
    ensure!(!device.engine.speak("   "), "spoke blank text");

    device.engine.set_text_to_speech(false);
    ensure!(
        device.speech.pending().is_empty(),
        "speech left pending: {:?}",
        device.speech.pending()
    );
    device.check_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn properties_hold_across_seeds() {
        for seed in [0_u64, 7, 1337, 0xDEAD_BEEF] {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            smoke(&mut rng).unwrap();
            font_bounds(&mut rng).unwrap();
            profile_cleanup(&mut rng).unwrap();
            idempotent_setters(&mut rng).unwrap();
            tts_cancel(&mut rng).unwrap();
        }
    }
}
