//! Seeded stream of mixed user input with periodic invariant checks.
use anyhow::{Context, Result, ensure};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use watio_access::{
    AccessibilityProfile, Action, CommandTable, Dispatch, FontFamily, KeyChord,
    KeyboardDispatcher, LetterSpacing, LineHeight, MemoryRecognizer, Notice, RecognitionEvent,
    RecordingNavigator, ShortcutMap, Spacing, VoiceInterpreter, execute_action,
};

use super::{Scenario, SeededCheck};
use crate::device::Device;

const STEPS: usize = 120;
const CHECK_EVERY: usize = 8;

const EXTRA_CHORDS: [&str; 3] = ["ctrl+q", "ctrl+shift+x", "alt+d"];
const NOISE: [&str; 4] = ["xyz no existe", "encender la luz", "", "modo"];
const BAD_COLORS: [&str; 4] = ["red", "#12", "#gggggg", "rgb(0,0,0)"];
const CUSTOM_ACTION_IDS: [&str; 4] = ["toggleLinks", "goHome", "showHelp", "launchRocket"];

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    vec![Box::new(SeededCheck::new(
        "random-commands",
        "Random setters, chords and phrases keep state, surface and storage in step",
        random_commands,
    ))]
}

struct Tab {
    device: Device,
    voice: VoiceInterpreter<MemoryRecognizer>,
    keys: KeyboardDispatcher,
    navigator: RecordingNavigator,
    chords: Vec<String>,
}

impl Tab {
    fn new(prefers_dark: bool) -> Self {
        let mut chords: Vec<String> = CommandTable::global().shortcuts.keys().cloned().collect();
        chords.extend(EXTRA_CHORDS.iter().map(ToString::to_string));
        Self {
            device: Device::fresh(prefers_dark),
            voice: VoiceInterpreter::new(MemoryRecognizer::default()),
            keys: KeyboardDispatcher::default(),
            navigator: RecordingNavigator::default(),
            chords,
        }
    }

    fn show(&self, notices: &[Notice]) {
        for notice in notices {
            self.device.engine.speak(&notice.message);
        }
    }

    fn run(&mut self, action: Action) {
        let custom = &self.device.engine.preferences().custom_shortcuts.clone();
        let keys = &self.keys;
        let notice = execute_action(action, &mut self.device.engine, &mut self.navigator, || {
            keys.help_text(custom)
        });
        self.show(&[notice]);
    }

    /// Keep the interpreter in step with the voice-control preference.
    fn follow_voice_preference(&mut self) {
        let enabled = self.device.engine.preferences().voice_control_enabled;
        let outcome = self.voice.set_enabled(enabled);
        if let Some(active) = outcome.active {
            self.device.engine.set_voice_active(active);
        }
        self.show(&outcome.notices);
    }

    fn press(&mut self, rng: &mut ChaCha8Rng) -> Result<()> {
        let raw = self.chords.choose(rng).context("no chords")?;
        let chord = KeyChord::parse(raw).with_context(|| format!("chord {raw:?}"))?;
        let custom = self.device.engine.preferences().custom_shortcuts.clone();
        match self.keys.dispatch(&chord, &custom) {
            Dispatch::Action(action) => self.run(action),
            Dispatch::Unknown(id) => {
                log::debug!("{chord} bound to unknown action {id}");
                self.show(&[Notice::error(format!("Acción desconocida: {id}"))]);
            }
            Dispatch::Unbound => {}
        }
        Ok(())
    }

    fn say(&mut self, rng: &mut ChaCha8Rng) {
        if !self.voice.is_listening() {
            return;
        }
        let table = CommandTable::global();
        let transcript = if rng.gen_bool(0.75) {
            table
                .phrases()
                .collect::<Vec<_>>()
                .choose(rng)
                .map_or_else(String::new, |phrase| phrase.to_uppercase())
        } else {
            NOISE.choose(rng).copied().unwrap_or_default().to_string()
        };
        let outcome = self.voice.handle(RecognitionEvent::Result(transcript));
        self.show(&outcome.notices);
        if let Some(action) = outcome.action {
            self.run(action);
        }
    }

    fn step(&mut self, rng: &mut ChaCha8Rng) -> Result<()> {
        let engine = &mut self.device.engine;
        match rng.gen_range(0..13) {
            0 => {
                let action = *Action::ALL.choose(rng).context("no actions")?;
                self.run(action);
            }
            1 | 2 => self.press(rng)?,
            3 => self.say(rng),
            4 => {
                engine.set_font_size(rng.gen_range(0..40));
            }
            5 => match rng.gen_range(0..5) {
                0 => engine.set_dark_mode(rng.gen_bool(0.5)),
                1 => engine.set_high_contrast(rng.gen_bool(0.5)),
                2 => engine.set_link_highlight(rng.gen_bool(0.5)),
                3 => engine.set_custom_colors_enabled(rng.gen_bool(0.5)),
                _ => engine.set_text_to_speech(rng.gen_bool(0.5)),
            },
            6 => {
                if let Some(&family) = FontFamily::ALL.choose(rng) {
                    engine.set_font_family(family);
                }
                if let Some(&spacing) = Spacing::ALL.choose(rng) {
                    engine.set_spacing(spacing);
                }
                if let Some(&letters) = LetterSpacing::ALL.choose(rng) {
                    engine.set_letter_spacing(letters);
                }
                if let Some(&lines) = LineHeight::ALL.choose(rng) {
                    engine.set_line_height(lines);
                }
            }
            7 => {
                let before = engine.preferences().custom_colors.clone();
                if rng.gen_bool(0.3) {
                    let bad = BAD_COLORS.choose(rng).copied().unwrap_or("red");
                    ensure!(
                        engine.set_custom_colors(bad, "#000").is_err(),
                        "accepted colour {bad:?}"
                    );
                    ensure!(
                        engine.preferences().custom_colors == before,
                        "rejected colour changed state"
                    );
                } else {
                    let background = format!("#{:06x}", rng.gen_range(0..0x0100_0000));
                    let text = format!("#{:06X}", rng.gen_range(0..0x0100_0000));
                    engine.set_custom_colors(&background, &text)?;
                    ensure!(
                        engine.preferences().custom_colors.text.as_str() == text.to_lowercase(),
                        "colour not normalised"
                    );
                }
            }
            8 => {
                let spoke = engine.speak("Consumo actual: 1,2 kW");
                ensure!(
                    spoke == engine.preferences().text_to_speech,
                    "speak returned {spoke} with read-aloud {}",
                    engine.preferences().text_to_speech
                );
            }
            9 => {
                engine.set_voice_control_enabled(rng.gen_bool(0.5));
                self.follow_voice_preference();
            }
            10 => {
                if let Some(&profile) = AccessibilityProfile::ALL.choose(rng) {
                    engine.apply_profile(profile);
                }
            }
            11 => {
                let chord = self.chords.choose(rng).cloned().unwrap_or_default();
                let id = CUSTOM_ACTION_IDS.choose(rng).copied().unwrap_or("goHome");
                let mut custom = engine.preferences().custom_shortcuts.clone();
                custom.insert(chord, id.to_string());
                engine.set_custom_shortcuts(&custom);
            }
            _ => {
                if rng.gen_bool(0.2) {
                    let profile = engine.profile();
                    engine.reset_preferences();
                    ensure!(engine.profile() == profile, "reset dropped the profile");
                    engine.set_custom_shortcuts(&ShortcutMap::new());
                    self.follow_voice_preference();
                }
            }
        }
        Ok(())
    }
}

fn random_commands(rng: &mut ChaCha8Rng) -> Result<()> {
    let mut tab = Tab::new(rng.gen_bool(0.5));
    for step in 0..STEPS {
        tab
            .step(rng)
            .with_context(|| format!("step {step}"))?;
        if step % CHECK_EVERY == 0 {
            tab
                .device
                .check_all()
                .with_context(|| format!("after step {step}"))?;
        }
    }
    ensure!(
        tab.device.engine.voice_active() == tab.voice.is_listening(),
        "voice marker out of step with the interpreter"
    );
    tab.device.check_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn random_streams_hold_invariants() {
        for seed in [1_u64, 2, 3, 1337, 0xC0FFEE] {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            random_commands(&mut rng).unwrap();
        }
    }

    #[test]
    fn navigation_is_recorded() {
        let mut tab = Tab::new(false);
        tab.run(Action::GoBack);
        assert_eq!(tab.navigator.visited, ["back"]);
    }
}
